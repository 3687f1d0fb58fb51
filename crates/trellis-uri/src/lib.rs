//! Incremental, percent-encoding URI construction.
//!
//! This crate builds relative URIs of the form
//! `segment…?name=value&name=value` onto a caller-supplied sink:
//!
//! - [`UriWriter`]: the stateful builder; path segments must precede the
//!   query section and the query parameter order is preserved exactly as
//!   called
//! - [`EncodingProfile`]: the two percent-encoding profiles consumed by
//!   the writer, one per URI component kind (path segment and query
//!   parameter have distinct reserved-character sets)
//! - [`QueryMode`]: how successive query parameters are joined (`&` or
//!   the XHTML entity form `&amp;`)
//!
//! A writer is reusable: [`UriWriter::reset`] rebinds the sink and clears
//! the query-section state while retaining the configured mode.

mod error;
mod percent;
mod writer;

pub use error::UriError;
pub use percent::EncodingProfile;
pub use writer::{QueryMode, UriWriter};
