//! Fetcher trait and fetcher tables

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::FetchError;

/// An asynchronous value source callable from template expressions.
///
/// A fetcher returning `Ok(None)` models an undefined value: the
/// renderer leaves the enclosing template object intact instead of
/// substituting it.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, args: &[Value]) -> Result<Option<Value>, FetchError>;
}

/// The table of fetchers available to a single render call.
#[derive(Clone, Default)]
pub struct FetcherSet {
    entries: HashMap<String, Arc<dyn Fetcher>>,
}

impl FetcherSet {
    /// Create an empty fetcher table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insertion.
    pub fn with(mut self, name: impl Into<String>, fetcher: Arc<dyn Fetcher>) -> Self {
        self.insert(name, fetcher);
        self
    }

    /// Register a fetcher under a name, replacing any previous entry.
    pub fn insert(&mut self, name: impl Into<String>, fetcher: Arc<dyn Fetcher>) {
        self.entries.insert(name.into(), fetcher);
    }

    /// Look up a fetcher by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Fetcher>> {
        self.entries.get(name)
    }

    /// Whether a fetcher is registered under `name`.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered fetcher names (sorted).
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl std::fmt::Debug for FetcherSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FetcherSet")
            .field("names", &self.names())
            .finish()
    }
}

type FetchFuture = Pin<Box<dyn Future<Output = Result<Option<Value>, FetchError>> + Send>>;

struct FnFetcher<F> {
    func: F,
}

#[async_trait]
impl<F> Fetcher for FnFetcher<F>
where
    F: Fn(Vec<Value>) -> FetchFuture + Send + Sync,
{
    async fn fetch(&self, args: &[Value]) -> Result<Option<Value>, FetchError> {
        (self.func)(args.to_vec()).await
    }
}

/// Wrap a closure returning a boxed future as a [`Fetcher`].
///
/// Convenient for tests and for trivial fetchers such as the disabled
/// secret fetcher.
pub fn fetcher_fn<F>(func: F) -> Arc<dyn Fetcher>
where
    F: Fn(Vec<Value>) -> FetchFuture + Send + Sync + 'static,
{
    Arc::new(FnFetcher { func })
}
