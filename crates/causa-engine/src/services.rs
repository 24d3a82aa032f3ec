//! Per-context service singletons

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

/// Lazily-initialized singletons keyed by their concrete type.
///
/// Each context owns one cache; cloning a context through `clone_with`
/// produces a fresh, empty cache. Internal clones of the same logical
/// context share the table.
#[derive(Clone, Default)]
pub struct ServiceCache {
    inner: Arc<Mutex<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>>,
}

impl ServiceCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the singleton of type `T`, constructing it on first use.
    pub fn get_or_init<T, F>(&self, init: F) -> Arc<T>
    where
        T: Send + Sync + 'static,
        F: FnOnce() -> T,
    {
        let mut services = self.inner.lock();
        if let Some(existing) = services.get(&TypeId::of::<T>()) {
            return Arc::clone(existing)
                .downcast::<T>()
                .expect("service cache entries are keyed by their TypeId");
        }

        let service = Arc::new(init());
        services.insert(TypeId::of::<T>(), service.clone());
        service
    }

    /// Number of instantiated services.
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no service has been instantiated yet.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl std::fmt::Debug for ServiceCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceCache")
            .field("len", &self.len())
            .finish()
    }
}
