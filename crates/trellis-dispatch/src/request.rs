//! The unit of dispatch work.

use std::fmt;
use std::sync::Arc;

use trellis_types::{ParameterMap, Phase, Response};

use crate::context::ApplicationContext;
use crate::descriptor::{Argument, ControllerMethod};
use crate::errors::DispatchError;
use crate::filter::RequestFilter;

/// One dispatch in flight.
///
/// A request is created after resolution succeeds and dropped once the
/// bridge's completion hook has run; it is never shared across dispatches.
/// It owns the resolved operation, the classified application parameters,
/// the bound arguments, and the mutable response slot, and it drives the
/// filter chain through a position cursor.
pub struct Request<'a> {
    context: &'a ApplicationContext,
    method: Arc<ControllerMethod>,
    parameters: ParameterMap,
    arguments: Vec<Argument>,
    filters: Arc<[Arc<dyn RequestFilter>]>,
    position: usize,
    response: Option<Response>,
}

impl<'a> Request<'a> {
    pub(crate) fn new(
        context: &'a ApplicationContext,
        method: Arc<ControllerMethod>,
        parameters: ParameterMap,
        arguments: Vec<Argument>,
        filters: Arc<[Arc<dyn RequestFilter>]>,
    ) -> Self {
        Self {
            context,
            method,
            parameters,
            arguments,
            filters,
            position: 0,
            response: None,
        }
    }

    /// Returns the owning application context.
    #[must_use]
    pub const fn context(&self) -> &'a ApplicationContext {
        self.context
    }

    /// Returns the dispatch phase.
    #[must_use]
    pub fn phase(&self) -> Phase {
        self.method.phase()
    }

    /// Returns the resolved controller operation.
    #[must_use]
    pub const fn method(&self) -> &Arc<ControllerMethod> {
        &self.method
    }

    /// Returns the classified application parameters.
    #[must_use]
    pub const fn parameters(&self) -> &ParameterMap {
        &self.parameters
    }

    /// Returns the arguments bound for the operation's signature.
    #[must_use]
    pub fn arguments(&self) -> &[Argument] {
        &self.arguments
    }

    /// Returns the current response, if one has been produced.
    #[must_use]
    pub const fn response(&self) -> Option<&Response> {
        self.response.as_ref()
    }

    /// Installs a response, replacing any previous one.
    ///
    /// Filters use this to substitute a derived response after calling
    /// through; the previous value is discarded, not mutated.
    pub fn set_response(&mut self, response: Response) {
        self.response = Some(response);
    }

    /// Removes and returns the current response.
    #[must_use]
    pub fn take_response(&mut self) -> Option<Response> {
        self.response.take()
    }

    /// Advances the dispatch one layer inward.
    ///
    /// While filters remain, the next one runs with this request; the
    /// terminal step invokes the controller operation and captures its
    /// response. Filters call this to proceed through the onion.
    ///
    /// # Errors
    ///
    /// Returns the failure raised by an inner filter or by the operation
    /// itself.
    pub fn invoke(&mut self) -> Result<(), DispatchError> {
        if let Some(filter) = self.filters.get(self.position).map(Arc::clone) {
            self.position += 1;
            filter.invoke(self)
        } else {
            let response = self.method.invoke(&self.arguments)?;
            self.response = Some(response);
            Ok(())
        }
    }
}

impl fmt::Debug for Request<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("operation", &self.method.id())
            .field("phase", &self.method.phase())
            .field("parameters", &self.parameters)
            .field("position", &self.position)
            .field("has_response", &self.response.is_some())
            .finish()
    }
}
