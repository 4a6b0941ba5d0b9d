//! Rendered output cache for one generation.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::Arc;

/// Route-keyed store of fully rendered responses.
///
/// No eviction: the whole cache is dropped together with its generation.
#[derive(Debug, Default)]
pub struct PageCache {
    entries: RwLock<FxHashMap<String, Arc<[u8]>>>,
}

impl PageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, route: &str) -> Option<Arc<[u8]>> {
        self.entries.read().get(route).cloned()
    }

    /// Store `bytes` under `route`, replacing any previous entry.
    pub fn set(&self, route: &str, bytes: Arc<[u8]>) {
        self.entries.write().insert(route.to_owned(), bytes);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }
}
