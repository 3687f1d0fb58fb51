//! Percent-encoding profiles for URI components.
//!
//! Each URI component kind escapes a different reserved-character set. The
//! profiles here are thin views over the `percent-encoding` crate's
//! `AsciiSet` machinery: a path segment keeps the RFC 3986 `pchar`
//! repertoire, while a query parameter escapes everything outside the
//! unreserved set so that `&`, `=`, and `+` can never leak through
//! unescaped.

use std::fmt;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

/// Escapes everything outside RFC 3986 `pchar` (unreserved, sub-delims,
/// `:` and `@`).
const PATH_SEGMENT_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~')
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=')
    .remove(b':')
    .remove(b'@');

/// Escapes everything outside RFC 3986 unreserved characters.
const QUERY_PARAM_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// A percent-encoding profile for one URI component kind.
#[derive(Clone, Copy)]
pub struct EncodingProfile {
    name: &'static str,
    escape: &'static AsciiSet,
}

impl EncodingProfile {
    /// Profile for path segments.
    pub const PATH_SEGMENT: Self = Self {
        name: "path-segment",
        escape: PATH_SEGMENT_SET,
    };

    /// Profile for query parameter names and values.
    pub const QUERY_PARAM: Self = Self {
        name: "query-param",
        escape: QUERY_PARAM_SET,
    };

    /// Percent-encodes a single character onto the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's formatting error when the write fails.
    pub fn encode_char(self, c: char, sink: &mut impl fmt::Write) -> fmt::Result {
        let mut buffer = [0_u8; 4];
        let encoded = utf8_percent_encode(c.encode_utf8(&mut buffer), self.escape);
        write!(sink, "{encoded}")
    }

    /// Percent-encodes a string onto the sink.
    ///
    /// # Errors
    ///
    /// Returns the sink's formatting error when the write fails.
    pub fn encode_str(self, value: &str, sink: &mut impl fmt::Write) -> fmt::Result {
        write!(sink, "{}", utf8_percent_encode(value, self.escape))
    }
}

impl fmt::Debug for EncodingProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("EncodingProfile").field(&self.name).finish()
    }
}
