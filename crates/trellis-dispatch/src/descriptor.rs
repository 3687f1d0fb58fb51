//! Controller operations, parameter signatures, and argument binding.
//!
//! The descriptor is the application-provided registry the resolver selects
//! from. Each [`ControllerMethod`] couples an operation identifier and a
//! phase with a fixed parameter signature and the handler that executes the
//! operation. The dispatcher never constructs methods; it only selects
//! among the ones registered here.

use std::fmt;
use std::num::ParseIntError;
use std::str::ParseBoolError;
use std::sync::Arc;

use thiserror::Error;

use trellis_types::{ParameterMap, Phase, Response};

use crate::errors::DispatchError;

/// The closed set of value kinds a controller parameter can declare.
///
/// Each kind performs a bidirectional conversion between a raw parameter
/// string and a typed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueKind {
    /// Pass the raw string through unchanged.
    #[default]
    String,
    /// Parse a signed 64-bit integer.
    Integer,
    /// Parse `true` or `false`.
    Boolean,
}

impl ValueKind {
    /// Parses a raw parameter string into a typed value.
    ///
    /// # Errors
    ///
    /// Returns a [`ValueParseError`] wrapping the conversion failure.
    pub fn parse(self, raw: &str) -> Result<Value, ValueParseError> {
        match self {
            Self::String => Ok(Value::String(raw.to_owned())),
            Self::Integer => raw
                .trim()
                .parse::<i64>()
                .map(Value::Integer)
                .map_err(|source| ValueParseError::Integer {
                    raw: raw.to_owned(),
                    source,
                }),
            Self::Boolean => raw
                .trim()
                .parse::<bool>()
                .map(Value::Boolean)
                .map_err(|source| ValueParseError::Boolean {
                    raw: raw.to_owned(),
                    source,
                }),
        }
    }
}

/// Failures converting a raw parameter string to a declared kind.
#[derive(Debug, Error)]
pub enum ValueParseError {
    /// The raw string is not a valid integer.
    #[error("'{raw}' is not a valid integer")]
    Integer {
        /// Raw parameter value.
        raw: String,
        /// Underlying parse failure.
        #[source]
        source: ParseIntError,
    },

    /// The raw string is not a valid boolean.
    #[error("'{raw}' is not a valid boolean")]
    Boolean {
        /// Raw parameter value.
        raw: String,
        /// Underlying parse failure.
        #[source]
        source: ParseBoolError,
    },
}

/// A typed parameter value produced by binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// A raw string value.
    String(String),
    /// A parsed integer value.
    Integer(i64),
    /// A parsed boolean value.
    Boolean(bool),
}

impl Value {
    /// Formats the value back to its canonical string form.
    #[must_use]
    pub fn format(&self) -> String {
        match self {
            Self::String(value) => value.clone(),
            Self::Integer(value) => value.to_string(),
            Self::Boolean(value) => value.to_string(),
        }
    }

    /// Returns the string payload, if this is a string value.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer value.
    #[must_use]
    pub const fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean value.
    #[must_use]
    pub const fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(value) => Some(*value),
            _ => None,
        }
    }
}

/// Whether a parameter binds the first value or the full value list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cardinality {
    /// Bind the first value for the name.
    #[default]
    Single,
    /// Bind every value for the name, in arrival order.
    List,
}

/// One declared parameter of a controller operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerParameter {
    name: String,
    kind: ValueKind,
    cardinality: Cardinality,
}

impl ControllerParameter {
    /// Declares a single-valued string parameter.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ValueKind::default(),
            cardinality: Cardinality::default(),
        }
    }

    /// Sets the declared value kind.
    #[must_use]
    pub const fn with_kind(mut self, kind: ValueKind) -> Self {
        self.kind = kind;
        self
    }

    /// Declares the parameter as list-valued.
    #[must_use]
    pub const fn as_list(mut self) -> Self {
        self.cardinality = Cardinality::List;
        self
    }

    /// Returns the parameter name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the declared value kind.
    #[must_use]
    pub const fn kind(&self) -> ValueKind {
        self.kind
    }

    /// Returns the declared cardinality.
    #[must_use]
    pub const fn cardinality(&self) -> Cardinality {
        self.cardinality
    }
}

/// An argument bound for one declared parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Argument {
    /// The parameter was absent from the request.
    Missing,
    /// A single bound value.
    Single(Value),
    /// Every value for the name, in arrival order.
    List(Vec<Value>),
}

impl Argument {
    /// Returns `true` when the parameter was absent.
    #[must_use]
    pub const fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    /// Returns the single bound value, or the first of a list.
    #[must_use]
    pub fn value(&self) -> Option<&Value> {
        match self {
            Self::Missing => None,
            Self::Single(value) => Some(value),
            Self::List(values) => values.first(),
        }
    }
}

/// The outcome of a controller operation: a response, or the boxed cause
/// the dispatcher wraps into an invocation error.
pub type HandlerResult = Result<Response, Box<dyn std::error::Error + Send + Sync>>;

/// The application operation behind a controller method.
pub trait ControllerHandler: Send + Sync {
    /// Executes the operation with its bound arguments.
    ///
    /// # Errors
    ///
    /// Any failure is returned as a boxed cause; the dispatcher wraps it
    /// into an invocation error preserving the original information.
    fn handle(&self, arguments: &[Argument]) -> HandlerResult;
}

impl<F> ControllerHandler for F
where
    F: Fn(&[Argument]) -> HandlerResult + Send + Sync,
{
    fn handle(&self, arguments: &[Argument]) -> HandlerResult {
        self(arguments)
    }
}

/// An application operation registered for one phase with a fixed
/// parameter signature.
///
/// Methods are opaque handles from the dispatcher's point of view:
/// externally provided, immutable, selected but never constructed by the
/// resolver.
#[derive(Clone)]
pub struct ControllerMethod {
    id: String,
    phase: Phase,
    parameters: Vec<ControllerParameter>,
    handler: Arc<dyn ControllerHandler>,
}

impl ControllerMethod {
    /// Registers an operation under an identifier for one phase.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        phase: Phase,
        handler: impl ControllerHandler + 'static,
    ) -> Self {
        Self {
            id: id.into(),
            phase,
            parameters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Appends a declared parameter to the signature.
    #[must_use]
    pub fn with_parameter(mut self, parameter: ControllerParameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Returns the operation identifier.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the phase the operation is registered for.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Returns the declared parameter signature, in binding order.
    #[must_use]
    pub fn parameters(&self) -> &[ControllerParameter] {
        &self.parameters
    }

    /// Returns `true` when every declared parameter name is present.
    #[must_use]
    pub fn is_satisfied_by(&self, parameters: &ParameterMap) -> bool {
        self.parameters
            .iter()
            .all(|parameter| parameters.contains(parameter.name()))
    }

    /// Binds arguments from the application parameters into the declared
    /// signature order.
    ///
    /// Absent parameters bind as [`Argument::Missing`].
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Binding`] when a value cannot be converted
    /// to its declared kind.
    pub fn bind_arguments(&self, parameters: &ParameterMap) -> Result<Vec<Argument>, DispatchError> {
        let mut arguments = Vec::with_capacity(self.parameters.len());
        for parameter in &self.parameters {
            let Some(values) = parameters.values(parameter.name()) else {
                arguments.push(Argument::Missing);
                continue;
            };
            let bound = match parameter.cardinality() {
                Cardinality::Single => match values.first() {
                    Some(raw) => Argument::Single(self.parse(parameter, raw)?),
                    None => Argument::Missing,
                },
                Cardinality::List => {
                    let mut list = Vec::with_capacity(values.len());
                    for raw in values {
                        list.push(self.parse(parameter, raw)?);
                    }
                    Argument::List(list)
                }
            };
            arguments.push(bound);
        }
        Ok(arguments)
    }

    /// Executes the operation, wrapping any failure it raises.
    ///
    /// # Errors
    ///
    /// Returns [`DispatchError::Invocation`] preserving the original cause.
    pub fn invoke(&self, arguments: &[Argument]) -> Result<Response, DispatchError> {
        self.handler
            .handle(arguments)
            .map_err(|source| DispatchError::invocation(&self.id, source))
    }

    fn parse(&self, parameter: &ControllerParameter, raw: &str) -> Result<Value, DispatchError> {
        parameter
            .kind()
            .parse(raw)
            .map_err(|source| DispatchError::binding(&self.id, parameter.name(), source))
    }
}

impl fmt::Debug for ControllerMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ControllerMethod")
            .field("id", &self.id)
            .field("phase", &self.phase)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

/// The application descriptor: every registered controller operation.
#[derive(Debug, Clone, Default)]
pub struct ControllerDescriptor {
    methods: Vec<Arc<ControllerMethod>>,
}

impl ControllerDescriptor {
    /// Creates an empty descriptor.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an operation.
    #[must_use]
    pub fn with_method(mut self, method: ControllerMethod) -> Self {
        self.methods.push(Arc::new(method));
        self
    }

    /// Returns every registered operation, in registration order.
    #[must_use]
    pub fn methods(&self) -> &[Arc<ControllerMethod>] {
        &self.methods
    }

    /// Looks up the operation registered under an identifier for a phase.
    #[must_use]
    pub fn operation(&self, phase: Phase, id: &str) -> Option<&Arc<ControllerMethod>> {
        self.methods
            .iter()
            .find(|method| method.phase() == phase && method.id() == id)
    }
}
