//! Application context orchestration.
//!
//! The context drives one dispatch end to end: classify the inbound
//! parameters, resolve the controller operation, bind its arguments, and
//! run the request through the filter chain between the bridge's begin and
//! end hooks, all inside the request scope and the application's
//! component-resolution context.

use std::any::Any;
use std::sync::Arc;

use once_cell::sync::OnceCell;
use tracing::{debug, warn};

use trellis_types::ParameterMap;

use crate::bridge::{OPERATION_PROPERTY, RESERVED_PREFIX, RequestBridge};
use crate::descriptor::ControllerDescriptor;
use crate::errors::{DispatchError, ResolutionError};
use crate::filter::RequestFilter;
use crate::registry::ComponentRegistry;
use crate::request::Request;
use crate::resolver::ControllerMethodResolver;
use crate::scope::{RequestScope, ResolutionContext, ScopeController};

/// Tracing target for dispatch operations.
pub(crate) const DISPATCH_TARGET: &str = concat!(env!("CARGO_PKG_NAME"), "::dispatch");

/// The reserved in-band parameters the dispatcher recognises.
///
/// The reserved namespace is wider than this set: any name under
/// [`RESERVED_PREFIX`] is intercepted, but only the names enumerated here
/// carry meaning today. The rest are dropped as forward-compatible
/// placeholders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReservedParameter {
    /// Selects an explicit operation identifier (`trellis.op`).
    Operation,
}

impl ReservedParameter {
    fn recognise(name: &str) -> Option<Self> {
        match name.strip_prefix(RESERVED_PREFIX)? {
            "op" => Some(Self::Operation),
            _ => None,
        }
    }
}

/// The outcome of parameter and phase classification.
#[derive(Debug)]
struct ClassifiedRequest {
    operation_id: Option<String>,
    parameters: ParameterMap,
}

/// Splits the bridge's raw parameters into reserved and application sets.
///
/// Classification is total and disjoint: every name lands in exactly one
/// set. The bridge-declared operation property is the default identifier;
/// an in-band `trellis.op` parameter takes precedence over it.
fn classify(bridge: &dyn RequestBridge) -> ClassifiedRequest {
    let mut operation_id = bridge.property(OPERATION_PROPERTY);
    let mut parameters = ParameterMap::new();
    for (name, values) in bridge.parameters().iter() {
        if name.starts_with(RESERVED_PREFIX) {
            match ReservedParameter::recognise(name) {
                Some(ReservedParameter::Operation) => {
                    if let Some(first) = values.first() {
                        operation_id = Some(first.clone());
                    }
                }
                // Unrecognised reserved names are intercepted and dropped.
                None => {}
            }
        } else {
            parameters.set(name, values.to_vec());
        }
    }
    ClassifiedRequest {
        operation_id,
        parameters,
    }
}

/// Orchestrates dispatch for one application.
pub struct ApplicationContext {
    name: String,
    descriptor: ControllerDescriptor,
    resolver: ControllerMethodResolver,
    registry: Arc<dyn ComponentRegistry>,
    filters: OnceCell<Arc<[Arc<dyn RequestFilter>]>>,
}

impl ApplicationContext {
    /// Creates the context for an application.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        descriptor: ControllerDescriptor,
        registry: Arc<dyn ComponentRegistry>,
    ) -> Self {
        let resolver = ControllerMethodResolver::new(&descriptor);
        Self {
            name: name.into(),
            descriptor,
            resolver,
            registry,
            filters: OnceCell::new(),
        }
    }

    /// Returns the application name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the application descriptor.
    #[must_use]
    pub const fn descriptor(&self) -> &ControllerDescriptor {
        &self.descriptor
    }

    /// Returns the application's component registry.
    #[must_use]
    pub fn registry(&self) -> Arc<dyn ComponentRegistry> {
        Arc::clone(&self.registry)
    }

    /// Returns the request filter chain, built once from the registry.
    ///
    /// Construction is lazy and runs at most once even under concurrent
    /// first use; reads after publication are lock-free.
    ///
    /// # Errors
    ///
    /// Returns a component error when a filter cannot be built. A failed
    /// construction is not cached; the next call retries.
    pub fn filters(&self) -> Result<Arc<[Arc<dyn RequestFilter>]>, DispatchError> {
        let filters = self.filters.get_or_try_init(|| {
            self.registry
                .request_filters()
                .map(Arc::from)
                .map_err(DispatchError::from)
        })?;
        Ok(Arc::clone(filters))
    }

    /// Resolves a named component through the application's registry.
    ///
    /// Absent names yield `Ok(None)`; construction failures surface as
    /// component errors carrying the underlying cause.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Component`] when construction fails.
    pub fn resolve_bean(
        &self,
        name: &str,
    ) -> Result<Option<Arc<dyn Any + Send + Sync>>, DispatchError> {
        self.registry.resolve(name).map_err(DispatchError::from)
    }

    /// Dispatches one inbound request end to end.
    ///
    /// Classifies parameters, resolves the operation, binds arguments,
    /// then runs the filter chain between the bridge's `begin` and `end`
    /// hooks. The request scope and the component-resolution context are
    /// established before `begin` and torn down after `end` on every exit
    /// path: success, dispatch failure, or panic.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] describing the first failure: resolution
    /// (with phase and the full original parameter map), binding,
    /// invocation, or transport completion. The bridge's `end` hook is not
    /// invoked when the chain itself failed.
    pub fn invoke(&self, bridge: &mut dyn RequestBridge) -> Result<(), DispatchError> {
        let phase = bridge.phase();
        let classified = classify(&*bridge);
        debug!(
            target: DISPATCH_TARGET,
            application = self.name,
            phase = %phase,
            operation = classified.operation_id.as_deref().unwrap_or("<unresolved>"),
            "classified inbound request"
        );

        let resolved = match classified.operation_id.as_deref() {
            Some(id) => self
                .resolver
                .resolve_operation(phase, id, &classified.parameters),
            None => match self.resolver.resolve(&classified.parameters) {
                Ok(found) => found,
                Err(ambiguity) => {
                    warn!(
                        target: DISPATCH_TARGET,
                        phase = %phase,
                        first = ambiguity.first,
                        second = ambiguity.second,
                        "ambiguous controller resolution"
                    );
                    return Err(ResolutionError::Ambiguous {
                        phase,
                        first: ambiguity.first,
                        second: ambiguity.second,
                        parameters: bridge.parameters().clone(),
                    }
                    .into());
                }
            },
        };
        let Some(method) = resolved else {
            warn!(target: DISPATCH_TARGET, phase = %phase, "no controller operation resolved");
            return Err(ResolutionError::NoMatch {
                phase,
                parameters: bridge.parameters().clone(),
            }
            .into());
        };

        let arguments = method.bind_arguments(&classified.parameters)?;
        let filters = self.filters()?;
        let scope = Arc::new(RequestScope::new(
            phase,
            method.id(),
            classified.parameters.clone(),
        ));
        let mut request = Request::new(
            self,
            Arc::clone(&method),
            classified.parameters,
            arguments,
            filters,
        );

        // Guards drop in reverse order at every return below: the scope
        // ends exactly once, then the prior resolution context comes back.
        let _resolution = ResolutionContext::enter(self.registry());
        let _scope = ScopeController::begin(scope)?;

        bridge.begin(&request);
        debug!(
            target: DISPATCH_TARGET,
            application = self.name,
            operation = method.id(),
            "running filter chain"
        );
        request.invoke()?;

        let response = request.take_response();
        bridge.end(response.as_ref()).map_err(DispatchError::transport)
    }
}

impl std::fmt::Debug for ApplicationContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApplicationContext")
            .field("name", &self.name)
            .field("operations", &self.descriptor.methods().len())
            .field("filters_built", &self.filters.get().is_some())
            .finish()
    }
}
