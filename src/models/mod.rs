// src/models/mod.rs

//! Domain models for the alert relay.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod alert;
mod config;
mod selectors;
mod source;

// Re-export all public types
pub use alert::Alert;
pub use config::{
    BOT_TOKEN_VAR, Config, DeliveryConfig, FETCH_TIMEOUT, FailurePolicy, FetcherConfig,
    MAX_MESSAGE_LENGTH, POLL_INTERVAL, ScheduleConfig, Secrets, SourcesConfig, is_valid_source_id,
};
pub use selectors::AlertSelectors;
pub use source::{Destination, Source};
