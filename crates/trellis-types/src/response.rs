//! Phase-specific dispatch results.

use std::fmt;
use std::io;
use std::sync::Arc;

use crate::phase::Phase;
use crate::property::PropertyMap;

/// Body content that can be written to a transport sink.
pub trait Streamable: Send + Sync {
    /// Writes the body to the sink.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error when the sink rejects the write.
    fn stream_to(&self, sink: &mut dyn io::Write) -> io::Result<()>;
}

impl Streamable for String {
    fn stream_to(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        sink.write_all(self.as_bytes())
    }
}

impl Streamable for &'static str {
    fn stream_to(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        sink.write_all(self.as_bytes())
    }
}

impl Streamable for Vec<u8> {
    fn stream_to(&self, sink: &mut dyn io::Write) -> io::Result<()> {
        sink.write_all(self)
    }
}

/// The result of a dispatched controller operation.
///
/// Responses are immutable values. Filters that want to alter one construct
/// a new instance and install it on the request; the previous value stays
/// intact for anything already holding it.
#[derive(Debug, Clone)]
pub enum Response {
    /// A render-phase result: markup plus ordered properties.
    Render(Render),
    /// An action-phase result that redirects to another operation.
    Update(Update),
    /// An action-phase result that redirects to an absolute location.
    Redirect(Redirect),
    /// A resource-phase result: a raw content stream.
    Content(Content),
}

impl Response {
    /// Builds a render response around a streamable body.
    #[must_use]
    pub fn render(body: impl Streamable + 'static) -> Self {
        Self::Render(Render::new(body))
    }

    /// Builds an update response targeting a controller operation.
    #[must_use]
    pub fn update(operation: impl Into<String>) -> Self {
        Self::Update(Update::new(operation))
    }

    /// Builds a redirect response to an absolute location.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect(Redirect::new(location))
    }

    /// Builds a content response around a streamable body.
    #[must_use]
    pub fn content(body: impl Streamable + 'static) -> Self {
        Self::Content(Content::new(body))
    }

    /// Returns the phase this response kind belongs to.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        match self {
            Self::Render(_) => Phase::Render,
            Self::Update(_) | Self::Redirect(_) => Phase::Action,
            Self::Content(_) => Phase::Resource,
        }
    }
}

/// Markup produced by a render-phase operation.
#[derive(Clone)]
pub struct Render {
    properties: PropertyMap,
    body: Arc<dyn Streamable>,
}

impl Render {
    /// Creates a render result with empty properties.
    #[must_use]
    pub fn new(body: impl Streamable + 'static) -> Self {
        Self {
            properties: PropertyMap::new(),
            body: Arc::new(body),
        }
    }

    /// Creates a render result from an existing property map and body.
    ///
    /// This is the reconstruction path used by filters: clone the previous
    /// response's properties, extend the clone, and rebuild around the same
    /// body.
    #[must_use]
    pub fn with_properties(properties: PropertyMap, body: Arc<dyn Streamable>) -> Self {
        Self { properties, body }
    }

    /// Returns the ordered response properties.
    #[must_use]
    pub const fn properties(&self) -> &PropertyMap {
        &self.properties
    }

    /// Returns the streamable body.
    #[must_use]
    pub fn body(&self) -> Arc<dyn Streamable> {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for Render {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Render")
            .field("properties", &self.properties)
            .finish_non_exhaustive()
    }
}

/// A redirect to another controller operation, carried as data.
///
/// The transport bridge turns an update into a concrete location by writing
/// it through the URI writer; the dispatch core never renders URIs itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Update {
    operation: String,
    parameters: Vec<(String, String)>,
}

impl Update {
    /// Creates an update targeting the given operation identifier.
    #[must_use]
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            parameters: Vec::new(),
        }
    }

    /// Appends a parameter, preserving call order in the final URI.
    #[must_use]
    pub fn with_parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.push((name.into(), value.into()));
        self
    }

    /// Returns the target operation identifier.
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }

    /// Returns the parameters in the order they were appended.
    #[must_use]
    pub fn parameters(&self) -> &[(String, String)] {
        &self.parameters
    }
}

/// A redirect to an absolute location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redirect {
    location: String,
}

impl Redirect {
    /// Creates a redirect to the given location.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
        }
    }

    /// Returns the redirect location.
    #[must_use]
    pub fn location(&self) -> &str {
        &self.location
    }
}

/// A raw content stream served by a resource-phase operation.
#[derive(Clone)]
pub struct Content {
    mime_type: Option<String>,
    body: Arc<dyn Streamable>,
}

impl Content {
    /// Creates a content result without a declared mime type.
    #[must_use]
    pub fn new(body: impl Streamable + 'static) -> Self {
        Self {
            mime_type: None,
            body: Arc::new(body),
        }
    }

    /// Declares the content's mime type.
    #[must_use]
    pub fn with_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.mime_type = Some(mime_type.into());
        self
    }

    /// Returns the declared mime type, if any.
    #[must_use]
    pub fn mime_type(&self) -> Option<&str> {
        self.mime_type.as_deref()
    }

    /// Returns the streamable body.
    #[must_use]
    pub fn body(&self) -> Arc<dyn Streamable> {
        Arc::clone(&self.body)
    }
}

impl fmt::Debug for Content {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Content")
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}
