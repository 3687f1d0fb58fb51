//! The transport bridge contract.
//!
//! A bridge adapts one inbound transport request/response pair to the
//! uniform shape the dispatcher consumes. The dispatcher is agnostic to
//! the transport behind it; concrete bridges (HTTP, portlet, test
//! harness) live outside this crate.

use std::io;

use trellis_types::{ParameterMap, Phase, Response};

use crate::request::Request;

/// Name prefix reserved for in-band framework parameters.
///
/// Parameters under this prefix are intercepted by the dispatcher and
/// never forwarded to application argument binding.
pub const RESERVED_PREFIX: &str = "trellis.";

/// Reserved parameter selecting an explicit operation identifier.
///
/// When present it overrides any operation the bridge itself declared.
pub const OPERATION_PARAMETER: &str = "trellis.op";

/// Bridge property under which a transport declares the operation
/// identifier it routed to, if it knows one.
pub const OPERATION_PROPERTY: &str = "trellis.request.operation";

/// A transport adapter presenting an inbound request to the dispatcher.
pub trait RequestBridge {
    /// Returns the phase this bridge was constructed for.
    ///
    /// The phase is fixed at construction; the dispatcher performs no
    /// runtime inspection of the bridge's concrete type.
    fn phase(&self) -> Phase;

    /// Returns a transport-level property, if the bridge declares it.
    fn property(&self, name: &str) -> Option<String>;

    /// Returns the raw inbound parameters, reserved names included.
    fn parameters(&self) -> &ParameterMap;

    /// Transport-level setup hook, called once the request scope is
    /// established and before the filter chain runs.
    fn begin(&mut self, request: &Request<'_>) {
        let _ = request;
    }

    /// Transport-level completion hook delivering the response.
    ///
    /// `None` means the chain was short-circuited without installing a
    /// response.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when response delivery fails; the
    /// dispatcher wraps it into its transport error kind.
    fn end(&mut self, response: Option<&Response>) -> io::Result<()>;
}
