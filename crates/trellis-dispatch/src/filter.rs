//! Cross-cutting request filters.

use crate::errors::DispatchError;
use crate::request::Request;

/// A cross-cutting handler composed around the controller invocation.
///
/// Filters form an onion: the first registered filter wraps every later
/// one, and the innermost step binds arguments and calls the controller
/// operation. A filter's `invoke` is expected to call
/// [`Request::invoke`] to proceed inward; afterwards it may read the
/// request's current response and install a derived one with
/// [`Request::set_response`]; responses are values, never mutated in
/// place.
///
/// A filter that does not call through terminates the chain for that
/// dispatch: the inner filters and the controller operation never run.
/// That is a legal way to short-circuit (an authorisation denial, say),
/// and a filter doing so must document it.
pub trait RequestFilter: Send + Sync {
    /// Runs this layer of the chain.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] from an inner layer, or one of its own.
    /// Filters may catch and translate inner errors, but scope teardown is
    /// guaranteed by the dispatcher regardless.
    fn invoke(&self, request: &mut Request<'_>) -> Result<(), DispatchError>;
}
