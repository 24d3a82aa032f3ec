//! The configuration reader
//!
//! Holds an ordered list of layers and the precomputed merged tree. The
//! reader is immutable: appending layers produces a new reader whose
//! merged tree is recomputed from scratch, so the invariant "merged tree
//! equals the fold of layers" holds by construction.

use std::sync::Arc;

use causa_template::{DEFAULT_MARKER, FetcherSet, TemplateRenderer, contains_template};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config_fetcher::ConfigurationFetcher;
use crate::error::{Error, Result};
use crate::layer::RawConfiguration;
use crate::merge::merge_layers;
use crate::path::lookup;

/// Options for safe configuration access.
#[derive(Debug, Clone, Copy, Default)]
pub struct GetOptions {
    /// Allow template objects in the returned subtree.
    ///
    /// Off by default: handing raw template markers to code that cannot
    /// resolve them is almost always a bug.
    pub allow_unrendered: bool,
}

impl GetOptions {
    /// The default, guarded options.
    pub fn safe() -> Self {
        Self::default()
    }

    /// Options that skip the template guard.
    pub fn unrendered() -> Self {
        Self {
            allow_unrendered: true,
        }
    }
}

/// Reads merged configuration assembled from ordered layers.
#[derive(Debug, Clone)]
pub struct ConfigurationReader {
    layers: Vec<RawConfiguration>,
    merged: Arc<Value>,
    marker: String,
}

impl Default for ConfigurationReader {
    fn default() -> Self {
        Self::empty()
    }
}

impl ConfigurationReader {
    /// Build a reader over the given layers with the default marker.
    pub fn new(layers: Vec<RawConfiguration>) -> Self {
        Self::with_marker(DEFAULT_MARKER, layers)
    }

    /// Build a reader recognizing a custom template marker.
    pub fn with_marker(marker: impl Into<String>, layers: Vec<RawConfiguration>) -> Self {
        let merged = Arc::new(merge_layers(&layers));
        Self {
            layers,
            merged,
            marker: marker.into(),
        }
    }

    /// A reader with no layers (an empty merged tree).
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// The ordered layers this reader was built from.
    pub fn layers(&self) -> &[RawConfiguration] {
        &self.layers
    }

    /// The template marker in effect.
    pub fn marker(&self) -> &str {
        &self.marker
    }

    /// The merged tree, shared for cheap hand-off to fetchers.
    pub fn merged(&self) -> &Arc<Value> {
        &self.merged
    }

    /// Return a new reader with additional layers appended.
    pub fn merged_with(&self, layers: impl IntoIterator<Item = RawConfiguration>) -> Self {
        let mut all = self.layers.clone();
        all.extend(layers);
        Self::with_marker(self.marker.clone(), all)
    }

    /// Get the merged tree, or the value at a dotted path.
    ///
    /// Missing paths yield `Ok(None)`. Unless
    /// [`GetOptions::allow_unrendered`] is set, a template object
    /// anywhere in the returned subtree fails with
    /// [`Error::UnrenderedTemplate`].
    pub fn get(&self, path: Option<&str>, options: GetOptions) -> Result<Option<&Value>> {
        let value = match path {
            None => &*self.merged,
            Some(path) => match lookup(&self.merged, path) {
                Some(value) => value,
                None => return Ok(None),
            },
        };

        if !options.allow_unrendered && contains_template(&self.marker, value) {
            return Err(Error::UnrenderedTemplate {
                path: path.unwrap_or_default().to_string(),
            });
        }
        Ok(Some(value))
    }

    /// Like [`get`](Self::get), but a missing path is an error.
    pub fn require(&self, path: &str, options: GetOptions) -> Result<&Value> {
        self.get(Some(path), options)?
            .ok_or_else(|| Error::value_not_found(path))
    }

    /// Get the value at a path, rendering every template object under
    /// it.
    ///
    /// The `configuration` fetcher is injected on top of the supplied
    /// fetcher table, so templates can reference other configuration
    /// values; cycles are detected per-render.
    pub async fn render(&self, fetchers: &FetcherSet, path: Option<&str>) -> Result<Option<Value>> {
        let subtree = match path {
            None => (*self.merged).clone(),
            Some(path) => match lookup(&self.merged, path) {
                Some(value) => value.clone(),
                None => return Ok(None),
            },
        };

        let set = ConfigurationFetcher::new(
            Arc::clone(&self.merged),
            self.marker.clone(),
            fetchers.clone(),
            path,
        )
        .into_set();

        let renderer = TemplateRenderer::with_marker(&self.marker);
        let rendered = renderer.render(&subtree, &set).await.map_err(Error::from)?;
        Ok(Some(rendered))
    }

    /// Like [`render`](Self::render), but a missing path is an error.
    pub async fn require_rendered(&self, fetchers: &FetcherSet, path: &str) -> Result<Value> {
        self.render(fetchers, Some(path))
            .await?
            .ok_or_else(|| Error::value_not_found(path))
    }

    /// Deserialize the merged tree into a typed configuration.
    ///
    /// The view is raw: template objects deserialize as the maps they
    /// are, so typed views are best taken over sections known to be
    /// template-free or after rendering.
    pub fn as_config<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_value((*self.merged).clone())?)
    }
}
