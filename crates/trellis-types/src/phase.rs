//! Request lifecycle phases.

use std::fmt;

/// The closed set of request kinds the dispatcher recognises.
///
/// The phase is declared by the transport bridge at construction and is
/// immutable for the lifetime of a dispatch. Controller operations are
/// registered against exactly one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    /// Produce markup for a view.
    Render,
    /// Perform a state-changing action; the result redirects.
    Action,
    /// Serve a raw resource stream.
    Resource,
}

impl Phase {
    /// Returns the canonical lowercase string for this phase.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Render => "render",
            Self::Action => "action",
            Self::Resource => "resource",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
