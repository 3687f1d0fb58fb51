//! Errors raised by URI construction.

use std::fmt;

use thiserror::Error;

/// Errors surfaced while writing a URI.
#[derive(Debug, Error)]
pub enum UriError {
    /// A path segment was appended after the query section started.
    ///
    /// Segments must precede the first query parameter; this is a hard
    /// invariant of the writer, not a recoverable condition.
    #[error("path segment appended after the query section started")]
    SegmentAfterQuery,

    /// A query parameter was appended with an empty name.
    #[error("query parameter name must not be empty")]
    EmptyParameterName,

    /// The underlying sink rejected a write.
    #[error("failed to write to the URI sink: {0}")]
    Sink(#[from] fmt::Error),
}
