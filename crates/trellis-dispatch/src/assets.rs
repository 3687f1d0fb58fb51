//! Asset contributions appended to render responses.
//!
//! The asset filter is configured from declarative JSON and, after calling
//! through the chain, appends its stylesheet and script references to a
//! render response's ordered properties. Application-supplied values stay
//! first; the response is rebuilt around the same body, never mutated.

use serde::Deserialize;

use trellis_types::{Phase, Render, Response, SCRIPT, STYLESHEET};

use crate::errors::DispatchError;
use crate::filter::RequestFilter;
use crate::request::Request;

/// Where an asset is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AssetLocation {
    /// Bundled with the application; relative sources are resolved against
    /// the configured package path.
    #[default]
    Application,
    /// Served by the hosting server under its own document root.
    Server,
    /// An absolute external URL, used verbatim.
    External,
}

/// One declared asset.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AssetDeclaration {
    /// Stable identifier other assets can depend on.
    #[serde(default)]
    pub id: Option<String>,
    /// Where the asset is served from.
    #[serde(default)]
    pub location: AssetLocation,
    /// Source path or URL.
    pub src: String,
    /// Identifiers of assets that must be served before this one.
    #[serde(default)]
    pub depends: Vec<String>,
}

/// Declarative asset configuration for an application.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AssetConfig {
    /// Package path (dot-separated) prefixed to relative application
    /// sources.
    #[serde(default)]
    pub package: Option<String>,
    /// Script assets, in contribution order.
    #[serde(default)]
    pub scripts: Vec<AssetDeclaration>,
    /// Stylesheet assets, in contribution order.
    #[serde(default)]
    pub stylesheets: Vec<AssetDeclaration>,
}

impl AssetConfig {
    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns the underlying JSON error when the document is malformed.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Appends configured asset references to render responses.
///
/// The filter always calls through; on the way back out it rebuilds
/// render responses with its contributions appended under the well-known
/// [`STYLESHEET`] and [`SCRIPT`] property keys. Non-render phases and
/// non-render responses pass through untouched.
#[derive(Debug, Clone)]
pub struct AssetFilter {
    stylesheets: Vec<String>,
    scripts: Vec<String>,
}

impl AssetFilter {
    /// Builds the filter from a parsed configuration.
    #[must_use]
    pub fn from_config(config: &AssetConfig) -> Self {
        let package = config.package.as_deref();
        Self {
            stylesheets: config
                .stylesheets
                .iter()
                .map(|asset| resolve_source(package, asset))
                .collect(),
            scripts: config
                .scripts
                .iter()
                .map(|asset| resolve_source(package, asset))
                .collect(),
        }
    }

    /// Returns the resolved stylesheet references, in contribution order.
    #[must_use]
    pub fn stylesheets(&self) -> &[String] {
        &self.stylesheets
    }

    /// Returns the resolved script references, in contribution order.
    #[must_use]
    pub fn scripts(&self) -> &[String] {
        &self.scripts
    }

    fn is_empty(&self) -> bool {
        self.stylesheets.is_empty() && self.scripts.is_empty()
    }
}

/// Resolves a declaration to the reference contributed to responses.
///
/// Relative application sources are rooted under the package path with
/// dots mapped to slashes; everything else passes through verbatim.
fn resolve_source(package: Option<&str>, asset: &AssetDeclaration) -> String {
    if asset.location == AssetLocation::Application && !asset.src.starts_with('/') {
        return match package {
            Some(package) => format!("/{}/{}", package.replace('.', "/"), asset.src),
            None => format!("/{}", asset.src),
        };
    }
    asset.src.clone()
}

impl RequestFilter for AssetFilter {
    fn invoke(&self, request: &mut Request<'_>) -> Result<(), DispatchError> {
        request.invoke()?;

        if request.phase() != Phase::Render || self.is_empty() {
            return Ok(());
        }
        let rebuilt = match request.response() {
            Some(Response::Render(render)) => {
                let mut properties = render.properties().clone();
                properties.add_values(STYLESHEET, self.stylesheets.iter().cloned());
                properties.add_values(SCRIPT, self.scripts.iter().cloned());
                Some(Response::Render(Render::with_properties(
                    properties,
                    render.body(),
                )))
            }
            _ => None,
        };
        if let Some(response) = rebuilt {
            request.set_response(response);
        }
        Ok(())
    }
}
