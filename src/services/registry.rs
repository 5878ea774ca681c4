// src/services/registry.rs

//! Configured sources and their fingerprints.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, Source};
use crate::storage::FingerprintStore;

/// Enumerates sources and gives access to their persisted fingerprints.
pub struct SourceRegistry {
    config: Arc<Config>,
    store: Arc<dyn FingerprintStore>,
}

impl SourceRegistry {
    pub fn new(config: Arc<Config>, store: Arc<dyn FingerprintStore>) -> Self {
        Self { config, store }
    }

    /// All sources: those with a stored record plus those named in config.
    ///
    /// Sorted by id, each id once. No side effects.
    pub async fn list_sources(&self) -> Result<Vec<Source>> {
        let mut ids: BTreeSet<String> = self.store.source_ids().await?.into_iter().collect();
        ids.extend(self.config.sources.ids.iter().cloned());

        Ok(ids.iter().map(|id| self.config.source_for(id)).collect())
    }

    /// Last delivered title for `id`; empty if nothing was recorded.
    pub async fn fingerprint(&self, id: &str) -> Result<String> {
        self.store.load(id).await
    }

    pub async fn set_fingerprint(&self, id: &str, title: &str) -> Result<()> {
        self.store.save(id, title).await
    }
}
