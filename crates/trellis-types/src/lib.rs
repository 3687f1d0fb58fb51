//! Shared value types for the Trellis dispatch engine.
//!
//! This crate defines the vocabulary exchanged between the dispatcher, the
//! transport bridges, and the request filters:
//!
//! - [`Phase`]: the closed set of request kinds the dispatcher recognises
//! - [`ParameterMap`]: multi-valued request parameters with per-name value
//!   order preserved
//! - [`PropertyMap`]: the ordered multimap attached to render responses
//! - [`Response`]: the tagged union of phase-specific results
//! - [`Streamable`]: the body contract for streamed response content
//!
//! Responses are immutable value objects. A component that wants to change
//! one builds a new value (typically by cloning and extending the property
//! map) and installs it on the request; shared response state is never
//! mutated in place.

mod parameters;
mod phase;
mod property;
mod response;

pub use parameters::ParameterMap;
pub use phase::Phase;
pub use property::{PropertyMap, SCRIPT, STYLESHEET};
pub use response::{Content, Redirect, Render, Response, Streamable, Update};
