//! Canned collaborators for tests and demos: manifest sources that serve
//! fixed payloads or fail on purpose, and an in-memory knowledge store.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use manifest::{ManifestError, ManifestItem, ManifestPayload, ManifestSource};

use crate::types::{KnownProduct, ProductKnowledge};

/// Serves the same payload for every locator and counts fetches. Clones
/// share the fetch counter, so a test can keep a handle after handing the
/// source to an engine.
#[derive(Clone)]
pub struct StaticManifestSource {
    payload: ManifestPayload,
    fetches: Arc<AtomicUsize>,
}

impl StaticManifestSource {
    pub fn new(payload: ManifestPayload) -> Self {
        Self {
            payload,
            fetches: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn of_items(items: Vec<ManifestItem>) -> Self {
        Self::new(ManifestPayload {
            items: Some(items),
            ..Default::default()
        })
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

impl ManifestSource for StaticManifestSource {
    fn fetch(&self, _locator: &str) -> Result<ManifestPayload, ManifestError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.payload.clone())
    }
}

/// Fails every fetch, for exercising the hard-failure path.
pub struct FailingManifestSource;

impl ManifestSource for FailingManifestSource {
    fn fetch(&self, locator: &str) -> Result<ManifestPayload, ManifestError> {
        Err(ManifestError::Fetch(format!("unreachable: {locator}")))
    }
}

/// Exact-name knowledge store backed by a map.
#[derive(Default)]
pub struct MemoryKnowledge {
    products: BTreeMap<String, KnownProduct>,
}

impl MemoryKnowledge {
    pub fn with(mut self, name: &str, product: KnownProduct) -> Self {
        self.products.insert(name.to_string(), product);
        self
    }
}

impl ProductKnowledge for MemoryKnowledge {
    fn lookup(&self, name: &str) -> Option<KnownProduct> {
        self.products.get(name).cloned()
    }
}

/// A manifest item carrying only a name.
pub fn named_item(name: &str) -> ManifestItem {
    ManifestItem {
        name: Some(name.to_string()),
        ..Default::default()
    }
}
