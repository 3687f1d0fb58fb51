//! Request-scoped storage and the component-resolution context.
//!
//! Both facilities are thread-local: a dispatch runs end to end on one
//! thread, and concurrent dispatches on other threads must never observe
//! each other's state. Teardown is RAII-driven: `begin` and `enter` hand
//! back guards whose `Drop` restores the previous state, so the
//! begin/end pairing holds on every exit path, panics included.

use std::cell::RefCell;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use trellis_types::{ParameterMap, Phase};

use crate::registry::ComponentRegistry;

thread_local! {
    static CURRENT_SCOPE: RefCell<Option<Arc<RequestScope>>> = const { RefCell::new(None) };
    static ACTIVE_REGISTRY: RefCell<Option<Arc<dyn ComponentRegistry>>> =
        const { RefCell::new(None) };
}

/// Dispatch-local data exposed to components while a request is active.
#[derive(Debug, Clone)]
pub struct RequestScope {
    phase: Phase,
    operation: String,
    parameters: ParameterMap,
}

impl RequestScope {
    /// Creates the scope data for one dispatch.
    #[must_use]
    pub fn new(phase: Phase, operation: impl Into<String>, parameters: ParameterMap) -> Self {
        Self {
            phase,
            operation: operation.into(),
            parameters,
        }
    }

    /// Returns the dispatch phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the resolved operation identifier.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the application parameters of the dispatch.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }
}

/// Errors establishing the request scope.
#[derive(Debug, Error)]
pub enum ScopeError {
    /// `begin` was called while a scope is already active on this thread.
    #[error("a request scope is already active on this thread")]
    AlreadyActive,
}

/// Process-wide lifecycle gate for request-scoped storage.
///
/// `begin` binds the scope to the current thread and returns a guard;
/// dropping the guard is `end`. The storage is unreadable before `begin`
/// and after `end`, and invisible to other threads throughout.
#[derive(Debug)]
pub struct ScopeController;

impl ScopeController {
    /// Establishes the request scope for the current thread.
    ///
    /// # Errors
    ///
    /// Returns [`ScopeError::AlreadyActive`] when a scope is already bound
    /// to this thread; dispatches never nest.
    pub fn begin(scope: Arc<RequestScope>) -> Result<ScopeGuard, ScopeError> {
        CURRENT_SCOPE.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_some() {
                return Err(ScopeError::AlreadyActive);
            }
            *slot = Some(scope);
            Ok(ScopeGuard { _private: () })
        })
    }

    /// Returns the scope bound to the current thread, if one is active.
    #[must_use]
    pub fn current() -> Option<Arc<RequestScope>> {
        CURRENT_SCOPE.with(|cell| cell.borrow().clone())
    }
}

/// Ends the request scope when dropped.
#[derive(Debug)]
pub struct ScopeGuard {
    _private: (),
}

impl Drop for ScopeGuard {
    fn drop(&mut self) {
        CURRENT_SCOPE.with(|cell| cell.borrow_mut().take());
    }
}

/// The thread-local component-resolution context.
///
/// While a dispatch runs, lookups resolve against the owning application's
/// registry. The previous registry (possibly another application's, when
/// one application dispatches into another) is saved on entry and
/// restored unconditionally when the guard drops.
#[derive(Debug)]
pub struct ResolutionContext;

impl ResolutionContext {
    /// Swaps the active registry for the current thread.
    pub fn enter(registry: Arc<dyn ComponentRegistry>) -> ResolutionContextGuard {
        let prior = ACTIVE_REGISTRY.with(|cell| cell.borrow_mut().replace(registry));
        ResolutionContextGuard { prior }
    }

    /// Returns the registry active on the current thread, if any.
    #[must_use]
    pub fn active() -> Option<Arc<dyn ComponentRegistry>> {
        ACTIVE_REGISTRY.with(|cell| cell.borrow().clone())
    }
}

/// Restores the prior resolution context when dropped.
pub struct ResolutionContextGuard {
    prior: Option<Arc<dyn ComponentRegistry>>,
}

impl Drop for ResolutionContextGuard {
    fn drop(&mut self) {
        let prior = self.prior.take();
        ACTIVE_REGISTRY.with(|cell| *cell.borrow_mut() = prior);
    }
}

impl fmt::Debug for ResolutionContextGuard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContextGuard")
            .field("had_prior", &self.prior.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::thread;

    use super::*;

    fn scope(operation: &str) -> Arc<RequestScope> {
        Arc::new(RequestScope::new(
            Phase::Render,
            operation,
            ParameterMap::new(),
        ))
    }

    #[test]
    fn begin_and_drop_are_paired() {
        assert!(ScopeController::current().is_none());
        {
            let _guard = ScopeController::begin(scope("index")).expect("begin");
            let current = ScopeController::current().expect("scope active");
            assert_eq!(current.operation(), "index");
        }
        assert!(ScopeController::current().is_none());
    }

    #[test]
    fn nested_begin_is_rejected() {
        let _guard = ScopeController::begin(scope("outer")).expect("begin");
        assert!(matches!(
            ScopeController::begin(scope("inner")),
            Err(ScopeError::AlreadyActive)
        ));
        // The failed begin must not have torn down the active scope.
        assert_eq!(
            ScopeController::current().expect("still active").operation(),
            "outer"
        );
    }

    #[test]
    fn scope_ends_even_when_the_body_panics() {
        let result = std::panic::catch_unwind(|| {
            let _guard = ScopeController::begin(scope("doomed")).expect("begin");
            panic!("controller blew up");
        });
        assert!(result.is_err());
        assert!(ScopeController::current().is_none());
    }

    #[test]
    fn scope_is_invisible_to_other_threads() {
        let _guard = ScopeController::begin(scope("local")).expect("begin");
        thread::spawn(|| {
            assert!(ScopeController::current().is_none());
        })
        .join()
        .expect("spawned thread");
    }

    #[test]
    fn resolution_context_restores_the_prior_registry() {
        use crate::registry::StaticRegistry;

        let outer: Arc<dyn ComponentRegistry> = Arc::new(StaticRegistry::new());
        let inner: Arc<dyn ComponentRegistry> = Arc::new(StaticRegistry::new());

        let _outer_guard = ResolutionContext::enter(Arc::clone(&outer));
        {
            let _inner_guard = ResolutionContext::enter(Arc::clone(&inner));
            let active = ResolutionContext::active().expect("inner active");
            assert!(Arc::ptr_eq(&active, &inner));
        }
        let active = ResolutionContext::active().expect("outer restored");
        assert!(Arc::ptr_eq(&active, &outer));
    }
}
