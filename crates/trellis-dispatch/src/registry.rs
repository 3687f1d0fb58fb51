//! Component lookup for beans and request filters.
//!
//! The registry is the dispatcher's window onto the application's
//! dependency-injection container. The dispatch core only consumes the
//! narrow contract here: resolve a component by name (absent is not an
//! error) and enumerate the request filters in their significant order.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use crate::filter::RequestFilter;

/// Errors raised while constructing components.
#[derive(Debug, Error)]
pub enum ComponentError {
    /// A component lookup found the name but construction failed.
    #[error("component '{name}' failed to construct: {source}")]
    Construction {
        /// Name of the failed component.
        name: String,
        /// Underlying cause from the container.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl ComponentError {
    /// Creates a construction error carrying the underlying cause.
    pub fn construction(
        name: impl Into<String>,
        source: Box<dyn std::error::Error + Send + Sync>,
    ) -> Self {
        Self::Construction {
            name: name.into(),
            source,
        }
    }
}

/// The component lookup capability consumed by the dispatcher.
pub trait ComponentRegistry: Send + Sync {
    /// Resolves a named component.
    ///
    /// A missing name yields `Ok(None)`, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Construction`] when the name is known but
    /// the component cannot be built.
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Any + Send + Sync>>, ComponentError>;

    /// Returns the request filters registered for the application.
    ///
    /// Order is significant and must be stable across calls: the first
    /// filter is the outermost layer of the chain.
    ///
    /// # Errors
    ///
    /// Returns [`ComponentError::Construction`] when a filter cannot be
    /// built.
    fn request_filters(&self) -> Result<Vec<Arc<dyn RequestFilter>>, ComponentError>;
}

/// An in-memory registry for embedding and tests.
#[derive(Default)]
pub struct StaticRegistry {
    components: HashMap<String, Arc<dyn Any + Send + Sync>>,
    filters: Vec<Arc<dyn RequestFilter>>,
}

impl StaticRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a component under a name.
    #[must_use]
    pub fn with_component(
        mut self,
        name: impl Into<String>,
        component: Arc<dyn Any + Send + Sync>,
    ) -> Self {
        self.components.insert(name.into(), component);
        self
    }

    /// Appends a request filter; earlier filters wrap later ones.
    #[must_use]
    pub fn with_filter(mut self, filter: Arc<dyn RequestFilter>) -> Self {
        self.filters.push(filter);
        self
    }
}

impl ComponentRegistry for StaticRegistry {
    fn resolve(&self, name: &str) -> Result<Option<Arc<dyn Any + Send + Sync>>, ComponentError> {
        Ok(self.components.get(name).map(Arc::clone))
    }

    fn request_filters(&self) -> Result<Vec<Arc<dyn RequestFilter>>, ComponentError> {
        Ok(self.filters.clone())
    }
}

impl fmt::Debug for StaticRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StaticRegistry")
            .field("components", &self.components.len())
            .field("filters", &self.filters.len())
            .finish()
    }
}
