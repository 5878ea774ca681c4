//! Service layer for the alert relay.
//!
//! This module contains the collaborators of one poll cycle:
//! - Source enumeration and fingerprints (`SourceRegistry`)
//! - Page retrieval (`PageFetcher`, `HttpFetcher`)
//! - Latest alert detection (`AlertProbe`)
//! - Alert body retrieval (`ContentFetcher`)
//! - Message delivery (`Notifier`, `Messenger`, `TelegramMessenger`)

mod content;
mod fetcher;
mod notifier;
mod probe;
mod registry;

pub use content::{ContentFetcher, extract_body};
pub use fetcher::{HttpFetcher, PageFetcher};
pub use notifier::{Messenger, Notifier, TelegramMessenger};
pub use probe::{AlertProbe, extract_latest_alert};
pub use registry::SourceRegistry;
