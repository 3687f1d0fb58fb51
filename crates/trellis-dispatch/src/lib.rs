//! Transport-agnostic request dispatch for phase-oriented applications.
//!
//! This crate is the core of the Trellis engine. An inbound request arrives
//! through a [`RequestBridge`] (the transport adapter), and the
//! [`ApplicationContext`] drives it end to end:
//!
//! 1. Parameters are classified into reserved framework parameters and
//!    application parameters; the phase comes from the bridge itself.
//! 2. The [`ControllerMethodResolver`] selects exactly one operation from
//!    the [`ControllerDescriptor`], or dispatch fails with a resolution
//!    error, never a silent default.
//! 3. Arguments are bound from the application parameters into the
//!    operation's declared signature.
//! 4. A [`Request`] is built and run through the ordered
//!    [`RequestFilter`] chain; the innermost step invokes the controller
//!    operation and captures its [`trellis_types::Response`].
//! 5. The bridge's completion hook delivers the response; transport I/O
//!    failures are wrapped into a single error vocabulary.
//!
//! Around the whole invocation the [`ScopeController`] establishes
//! request-scoped storage and the component-resolution context is swapped
//! to the application's own registry. Both are torn down through RAII
//! guards, so teardown runs exactly once per dispatch on every exit path.
//!
//! Dispatch is synchronous: one request runs end to end on the calling
//! thread with no internal parallelism. Concurrent dispatches on separate
//! threads share only the lazily built filter chain, which is published
//! through a once-only initialisation primitive.

mod assets;
mod bridge;
mod context;
mod descriptor;
mod errors;
mod filter;
mod redirect;
mod registry;
mod request;
mod resolver;
mod scope;

pub use assets::{AssetConfig, AssetDeclaration, AssetFilter, AssetLocation};
pub use bridge::{OPERATION_PARAMETER, OPERATION_PROPERTY, RESERVED_PREFIX, RequestBridge};
pub use context::ApplicationContext;
pub use descriptor::{
    Argument, Cardinality, ControllerDescriptor, ControllerHandler, ControllerMethod,
    ControllerParameter, HandlerResult, Value, ValueKind, ValueParseError,
};
pub use errors::{DispatchError, ResolutionError};
pub use filter::RequestFilter;
pub use redirect::write_update_target;
pub use registry::{ComponentError, ComponentRegistry, StaticRegistry};
pub use request::Request;
pub use resolver::{Ambiguity, ControllerMethodResolver};
pub use scope::{RequestScope, ResolutionContext, ScopeController, ScopeError, ScopeGuard};
