//! The stateful URI writer.

use std::fmt;
use std::mem;

use crate::error::UriError;
use crate::percent::EncodingProfile;

/// How successive query parameters are joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryMode {
    /// Standard ampersand form (`&`), the default.
    #[default]
    Plain,
    /// XHTML entity form (`&amp;`) for URIs embedded in markup.
    Xhtml,
}

impl QueryMode {
    /// Returns the separator written before each parameter after the first.
    #[must_use]
    pub const fn separator(self) -> &'static str {
        match self {
            Self::Plain => "&",
            Self::Xhtml => "&amp;",
        }
    }
}

/// Builds a relative URI incrementally onto a caller-supplied sink.
///
/// Path segments are written first, percent-encoded with the path-segment
/// profile; query parameters follow, percent-encoded with the query-param
/// profile. Once the first query parameter has been written the writer
/// refuses further segments. Query parameters are emitted in exactly the
/// order they are appended; repeated names are legal and never
/// deduplicated.
#[derive(Debug)]
pub struct UriWriter<W> {
    sink: W,
    mode: Option<QueryMode>,
    query_started: bool,
}

impl<W: fmt::Write> UriWriter<W> {
    /// Creates a writer with no explicit query mode.
    ///
    /// Without an explicit mode, parameters are joined with the plain
    /// ampersand form.
    pub fn new(sink: W) -> Self {
        Self {
            sink,
            mode: None,
            query_started: false,
        }
    }

    /// Creates a writer with an explicit query mode.
    pub fn with_mode(sink: W, mode: QueryMode) -> Self {
        Self {
            sink,
            mode: Some(mode),
            query_started: false,
        }
    }

    /// Returns the explicit query mode, if one was set.
    #[must_use]
    pub const fn mode(&self) -> Option<QueryMode> {
        self.mode
    }

    /// Sets the query mode for subsequent parameters.
    pub fn set_mode(&mut self, mode: QueryMode) {
        self.mode = Some(mode);
    }

    /// Appends raw, already-encoded text to the sink.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::Sink`] when the sink rejects the write.
    pub fn append(&mut self, raw: &str) -> Result<(), UriError> {
        self.sink.write_str(raw)?;
        Ok(())
    }

    /// Appends one percent-encoded path segment character.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::SegmentAfterQuery`] when a query parameter has
    /// already been written, or [`UriError::Sink`] when the write fails.
    pub fn append_segment_char(&mut self, c: char) -> Result<(), UriError> {
        if self.query_started {
            return Err(UriError::SegmentAfterQuery);
        }
        EncodingProfile::PATH_SEGMENT.encode_char(c, &mut self.sink)?;
        Ok(())
    }

    /// Appends a percent-encoded path segment.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::SegmentAfterQuery`] when a query parameter has
    /// already been written, or [`UriError::Sink`] when the write fails.
    pub fn append_segment(&mut self, segment: &str) -> Result<(), UriError> {
        if self.query_started {
            return Err(UriError::SegmentAfterQuery);
        }
        EncodingProfile::PATH_SEGMENT.encode_str(segment, &mut self.sink)?;
        Ok(())
    }

    /// Appends a percent-encoded query parameter.
    ///
    /// Writes `?` before the first parameter and the mode's separator
    /// before each subsequent one, then marks the query section as started.
    /// An empty value is legal and produces `name=`.
    ///
    /// # Errors
    ///
    /// Returns [`UriError::EmptyParameterName`] when the name is empty, or
    /// [`UriError::Sink`] when a write fails.
    pub fn append_query_parameter(&mut self, name: &str, value: &str) -> Result<(), UriError> {
        if name.is_empty() {
            return Err(UriError::EmptyParameterName);
        }

        let mode = self.mode.unwrap_or_default();
        self.sink
            .write_str(if self.query_started { mode.separator() } else { "?" })?;
        EncodingProfile::QUERY_PARAM.encode_str(name, &mut self.sink)?;
        self.sink.write_char('=')?;
        EncodingProfile::QUERY_PARAM.encode_str(value, &mut self.sink)?;
        self.query_started = true;
        Ok(())
    }

    /// Rebinds the writer to a new sink for building another URI.
    ///
    /// Clears the query-section state and returns the previous sink. The
    /// query mode is retained.
    pub fn reset(&mut self, sink: W) -> W {
        self.query_started = false;
        mem::replace(&mut self.sink, sink)
    }

    /// Consumes the writer and returns the sink.
    pub fn into_inner(self) -> W {
        self.sink
    }
}
