//! The built-in `configuration(path)` fetcher
//!
//! Templates may reference other configuration values, which may
//! themselves be templates. The fetcher renders the referenced subtree
//! recursively while tracking the chain of paths currently being
//! rendered; a request for a path that is a prefix of (or equal to) an
//! in-flight path is a cycle.

use std::sync::Arc;

use async_trait::async_trait;
use causa_template::{Fetcher, FetcherSet, FetchError, TemplateRenderer, contains_template};
use serde_json::Value;

use crate::error::Error;
use crate::path::{is_path_prefix, lookup};

/// Name under which the fetcher is injected into every render.
pub const CONFIGURATION_FETCHER: &str = "configuration";

/// Resolves `configuration(path)` calls against the merged tree.
pub struct ConfigurationFetcher {
    root: Arc<Value>,
    marker: String,
    /// Fetchers available to nested renders, without `configuration`.
    base: FetcherSet,
    /// Paths currently being rendered, outermost first.
    chain: Vec<String>,
}

impl ConfigurationFetcher {
    /// Create a fetcher over a merged configuration tree.
    ///
    /// `base` holds the other fetchers (such as `secret`) that stay
    /// available inside nested renders. `initial_path` seeds the chain
    /// when rendering starts below the configuration root.
    pub fn new(
        root: Arc<Value>,
        marker: impl Into<String>,
        base: FetcherSet,
        initial_path: Option<&str>,
    ) -> Self {
        Self {
            root,
            marker: marker.into(),
            base,
            chain: initial_path.map(str::to_string).into_iter().collect(),
        }
    }

    /// Build the full fetcher table for a render: `base` plus this
    /// fetcher under the `configuration` name.
    pub fn into_set(self) -> FetcherSet {
        let base = self.base.clone();
        base.with(CONFIGURATION_FETCHER, Arc::new(self))
    }

    fn child(&self, path: &str) -> Self {
        let mut chain = self.chain.clone();
        chain.push(path.to_string());
        Self {
            root: Arc::clone(&self.root),
            marker: self.marker.clone(),
            base: self.base.clone(),
            chain,
        }
    }
}

#[async_trait]
impl Fetcher for ConfigurationFetcher {
    async fn fetch(&self, args: &[Value]) -> Result<Option<Value>, FetchError> {
        let path = args
            .first()
            .and_then(Value::as_str)
            .ok_or("configuration() requires a string path argument")?;

        for in_flight in &self.chain {
            if is_path_prefix(path, in_flight) {
                return Err(Box::new(Error::CircularReference {
                    path: path.to_string(),
                }));
            }
        }

        let subtree = match lookup(&self.root, path) {
            Some(value) => value.clone(),
            None => return Ok(None),
        };

        if !contains_template(&self.marker, &subtree) {
            return Ok(Some(subtree));
        }

        // The referenced subtree holds templates of its own; render it
        // with the chain extended by this path. Recursion bottoms out
        // because each level consumes a template-bearing path and cycles
        // are rejected above.
        let fetchers = self.child(path).into_set();
        let renderer = TemplateRenderer::with_marker(&self.marker);
        let rendered = renderer
            .render(&subtree, &fetchers)
            .await
            .map_err(|err| match err {
                causa_template::Error::Fetch(inner) => inner,
                other => Box::new(other) as FetchError,
            })?;

        Ok(Some(rendered))
    }
}
