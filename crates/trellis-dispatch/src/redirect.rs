//! Redirect-target construction for bridges.
//!
//! An update response names the operation to redirect to as data; the
//! bridge turns it into a concrete location by writing it through the URI
//! writer. The reserved operation parameter travels in-band so the next
//! dispatch resolves back to the named operation.

use std::fmt;

use trellis_types::Update;
use trellis_uri::{UriError, UriWriter};

use crate::bridge::OPERATION_PARAMETER;

/// Writes an update response as a relative URI.
///
/// The base path segments come first, separated by `/`, then the reserved
/// operation parameter, then the update's parameters in exactly the order
/// they were appended, repeated names included.
///
/// # Errors
///
/// Returns the writer's [`UriError`] when a write fails.
pub fn write_update_target<W: fmt::Write>(
    update: &Update,
    base: &[&str],
    writer: &mut UriWriter<W>,
) -> Result<(), UriError> {
    for (index, segment) in base.iter().enumerate() {
        if index > 0 {
            writer.append("/")?;
        }
        writer.append_segment(segment)?;
    }
    writer.append_query_parameter(OPERATION_PARAMETER, update.operation())?;
    for (name, value) in update.parameters() {
        writer.append_query_parameter(name, value)?;
    }
    Ok(())
}
