//! Controller method resolution.
//!
//! Given the application parameter names, and optionally an explicit
//! operation identifier, the resolver selects exactly one registered
//! operation or reports why it cannot. Zero-or-many is never papered over:
//! no candidate and ambiguous ties are both failures the caller must
//! surface.

use std::sync::Arc;

use trellis_types::{ParameterMap, Phase};

use crate::descriptor::{ControllerDescriptor, ControllerMethod};

/// Two candidate operations tied for the most specific satisfied signature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ambiguity {
    /// Identifier of one tied candidate.
    pub first: String,
    /// Identifier of the other tied candidate.
    pub second: String,
}

/// Selects the single controller operation for a request.
#[derive(Debug, Clone)]
pub struct ControllerMethodResolver {
    methods: Vec<Arc<ControllerMethod>>,
}

impl ControllerMethodResolver {
    /// Builds a resolver over the descriptor's registered operations.
    #[must_use]
    pub fn new(descriptor: &ControllerDescriptor) -> Self {
        Self {
            methods: descriptor.methods().to_vec(),
        }
    }

    /// Id-less resolution over every registered operation.
    ///
    /// An operation is a candidate when its declared parameter signature is
    /// a subset of the supplied parameter names. Among candidates the most
    /// specific signature (the largest satisfied one) wins; matching is
    /// phase-insensitive on this path.
    ///
    /// # Errors
    ///
    /// Returns an [`Ambiguity`] when two distinct candidates are equally
    /// specific; a tie is a resolution failure, never an arbitrary pick.
    pub fn resolve(
        &self,
        parameters: &ParameterMap,
    ) -> Result<Option<Arc<ControllerMethod>>, Ambiguity> {
        let mut candidates: Vec<&Arc<ControllerMethod>> = self
            .methods
            .iter()
            .filter(|method| method.is_satisfied_by(parameters))
            .collect();

        let Some(most_specific) = candidates
            .iter()
            .map(|method| method.parameters().len())
            .max()
        else {
            return Ok(None);
        };
        candidates.retain(|method| method.parameters().len() == most_specific);

        match candidates.as_slice() {
            [] => Ok(None),
            [winner] => Ok(Some(Arc::clone(winner))),
            [first, second, ..] => Err(Ambiguity {
                first: first.id().to_owned(),
                second: second.id().to_owned(),
            }),
        }
    }

    /// Explicit-id resolution, scoped to the operation registered under
    /// the identifier for the given phase.
    ///
    /// Matches only when that operation exists and its signature is
    /// satisfied by the supplied parameter names; there is no fallback to
    /// the id-less path.
    #[must_use]
    pub fn resolve_operation(
        &self,
        phase: Phase,
        id: &str,
        parameters: &ParameterMap,
    ) -> Option<Arc<ControllerMethod>> {
        self.methods
            .iter()
            .find(|method| method.phase() == phase && method.id() == id)
            .filter(|method| method.is_satisfied_by(parameters))
            .cloned()
    }
}
