//! Storage abstractions for source fingerprints.
//!
//! A fingerprint is the title of the last alert delivered for a source.
//! Each source has exactly one record holding that string and nothing else.
//!
//! ## Directory Structure
//!
//! ```text
//! titles/
//! ├── il        # "Security Alert: ..."
//! ├── ru
//! ├── tr
//! └── ua        # empty: tracked, nothing seen yet
//! ```

pub mod local;

use async_trait::async_trait;

use crate::error::Result;

// Re-export for convenience
pub use local::LocalStorage;

/// Trait for fingerprint storage backends.
#[async_trait]
pub trait FingerprintStore: Send + Sync {
    /// Ids of every source with a record, sorted and deduplicated.
    async fn source_ids(&self) -> Result<Vec<String>>;

    /// Last recorded title for `id`, or an empty string if none.
    async fn load(&self, id: &str) -> Result<String>;

    /// Durably replace the fingerprint for `id`.
    ///
    /// After a crash, either the old or the new value is observed.
    async fn save(&self, id: &str, title: &str) -> Result<()>;
}
