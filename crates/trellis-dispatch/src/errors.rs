//! Error taxonomy for dispatch failures.
//!
//! Resolution, binding, invocation, component, and transport failures all
//! surface through [`DispatchError`], so callers of
//! [`crate::ApplicationContext::invoke`] handle one error vocabulary
//! regardless of the transport behind the bridge. Nothing is retried at
//! this layer.

use std::io;

use thiserror::Error;

use trellis_types::{ParameterMap, Phase};

use crate::descriptor::ValueParseError;
use crate::registry::ComponentError;
use crate::scope::ScopeError;

/// Errors surfaced when no single controller operation can be selected.
///
/// Both variants carry the phase and the full original parameter map
/// (reserved names included) so the diagnostic describes the request as the
/// transport presented it.
#[derive(Debug, Error)]
pub enum ResolutionError {
    /// No registered operation matches the request.
    #[error("no controller operation matches phase '{phase}' with parameters {parameters}")]
    NoMatch {
        /// Phase of the failed dispatch.
        phase: Phase,
        /// Raw parameter map received from the bridge.
        parameters: ParameterMap,
    },

    /// Two operations matched with equally specific signatures.
    #[error(
        "ambiguous resolution for phase '{phase}': operations '{first}' and '{second}' \
         both match parameters {parameters}"
    )]
    Ambiguous {
        /// Phase of the failed dispatch.
        phase: Phase,
        /// Identifier of one tied candidate.
        first: String,
        /// Identifier of the other tied candidate.
        second: String,
        /// Raw parameter map received from the bridge.
        parameters: ParameterMap,
    },
}

/// Application-level errors surfaced by a dispatch.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// No single controller operation could be resolved.
    #[error(transparent)]
    Resolution(#[from] ResolutionError),

    /// A parameter value could not be converted to its declared kind.
    #[error("failed to bind parameter '{parameter}' of operation '{operation}': {source}")]
    Binding {
        /// Operation whose signature was being bound.
        operation: String,
        /// Declared parameter name that failed conversion.
        parameter: String,
        /// Underlying conversion failure.
        #[source]
        source: ValueParseError,
    },

    /// The resolved operation raised a failure while executing.
    #[error("operation '{operation}' failed: {source}")]
    Invocation {
        /// Operation that raised the failure.
        operation: String,
        /// Original cause, preserved for callers.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The bridge's completion hook failed performing transport I/O.
    ///
    /// Distinguished from the other kinds so callers can apply
    /// transport-specific recovery; this layer never retries.
    #[error("transport completion failed: {source}")]
    Transport {
        /// Underlying I/O failure from the bridge.
        #[source]
        source: io::Error,
    },

    /// A component could not be constructed by the registry.
    #[error(transparent)]
    Component(#[from] ComponentError),

    /// The request scope could not be established.
    #[error(transparent)]
    Scope(#[from] ScopeError),
}

impl DispatchError {
    /// Creates a binding error for one declared parameter.
    pub fn binding(
        operation: impl Into<String>,
        parameter: impl Into<String>,
        source: ValueParseError,
    ) -> Self {
        Self::Binding {
            operation: operation.into(),
            parameter: parameter.into(),
            source,
        }
    }

    /// Creates an invocation error wrapping the operation's failure.
    pub fn invocation(
        operation: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Invocation {
            operation: operation.into(),
            source,
        }
    }

    /// Wraps a bridge completion failure.
    pub fn transport(source: io::Error) -> Self {
        Self::Transport { source }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_match_diagnostic_carries_phase_and_parameters() {
        let mut parameters = ParameterMap::new();
        parameters.set("color", vec!["red".to_owned()]);
        parameters.set("trellis.op", vec!["index".to_owned()]);

        let error = ResolutionError::NoMatch {
            phase: Phase::Render,
            parameters,
        };
        let message = error.to_string();
        assert!(message.contains("phase 'render'"));
        assert!(message.contains("color=[red]"));
        assert!(message.contains("trellis.op=[index]"));
    }

    #[test]
    fn ambiguous_diagnostic_names_both_candidates() {
        let error = ResolutionError::Ambiguous {
            phase: Phase::Action,
            first: "save".to_owned(),
            second: "store".to_owned(),
            parameters: ParameterMap::new(),
        };
        let message = error.to_string();
        assert!(message.contains("'save'"));
        assert!(message.contains("'store'"));
    }

    #[test]
    fn transport_error_preserves_cause() {
        let error =
            DispatchError::transport(io::Error::new(io::ErrorKind::BrokenPipe, "peer gone"));
        assert!(matches!(error, DispatchError::Transport { .. }));
        assert!(error.to_string().contains("peer gone"));
    }
}
