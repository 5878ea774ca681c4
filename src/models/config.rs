//! Application configuration structures.

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};
use crate::models::{AlertSelectors, Destination, Source};

/// Largest message part the messaging platform accepts, in characters.
pub const MAX_MESSAGE_LENGTH: NonZeroUsize = match NonZeroUsize::new(4096) {
    Some(n) => n,
    None => panic!("message length must be non-zero"),
};

/// Time between two checks of all sources.
pub const POLL_INTERVAL: Duration = Duration::from_secs(60 * 60);

/// Upper bound on a single listing or detail page fetch.
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Environment variable holding the messaging bot token.
pub const BOT_TOKEN_VAR: &str = "BOT_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// HTTP fetch settings
    #[serde(default)]
    pub fetcher: FetcherConfig,

    /// Page structure selectors
    #[serde(default)]
    pub selectors: AlertSelectors,

    /// Source discovery and state location
    #[serde(default)]
    pub sources: SourcesConfig,

    /// Source id to notification destination
    #[serde(default)]
    pub destinations: BTreeMap<String, Destination>,

    /// Messaging settings
    #[serde(default)]
    pub delivery: DeliveryConfig,

    /// Loop cadence and failure handling
    #[serde(default)]
    pub schedule: ScheduleConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AppError::config(format!("cannot read {}: {e}", path.display())))?;
        let mut config: Config = toml::from_str(&content)?;
        config.fetcher.resolve_user_agent()?;
        Ok(config)
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.fetcher.user_agent.trim().is_empty() {
            return Err(AppError::config("fetcher.user_agent is empty"));
        }
        if self.fetcher.timeout_secs == 0 {
            return Err(AppError::config("fetcher.timeout_secs must be > 0"));
        }
        if self.delivery.timeout_secs == 0 {
            return Err(AppError::config("delivery.timeout_secs must be > 0"));
        }
        if self.schedule.interval_secs == 0 {
            return Err(AppError::config("schedule.interval_secs must be > 0"));
        }
        if !self.sources.listing_url_template.contains("{id}") {
            return Err(AppError::config(
                "sources.listing_url_template must contain '{id}'",
            ));
        }
        for id in self.destinations.keys().chain(self.sources.ids.iter()) {
            if !is_valid_source_id(id) {
                return Err(AppError::config(format!("invalid source id '{id}'")));
            }
        }
        Ok(())
    }

    /// Build the source for `id` with its mapped destination, if any.
    pub fn source_for(&self, id: &str) -> Source {
        Source::new(
            id,
            &self.sources.listing_url_template,
            self.destinations.get(id).cloned(),
        )
    }
}

/// Source ids double as file names in the state directory.
pub fn is_valid_source_id(id: &str) -> bool {
    !id.is_empty()
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// HTTP fetch settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// User-Agent header for page requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// File whose trimmed contents override `user_agent` when present
    #[serde(default = "defaults::user_agent_file")]
    pub user_agent_file: Option<PathBuf>,

    /// Request timeout in seconds
    #[serde(default = "defaults::fetch_timeout")]
    pub timeout_secs: u64,
}

impl FetcherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Replace `user_agent` with the contents of `user_agent_file`.
    ///
    /// A missing file keeps the configured value; an unreadable or empty
    /// one is a configuration error.
    pub fn resolve_user_agent(&mut self) -> Result<()> {
        let Some(path) = &self.user_agent_file else {
            return Ok(());
        };
        match fs::read_to_string(path) {
            Ok(content) => {
                let agent = content.trim();
                if agent.is_empty() {
                    return Err(AppError::config(format!(
                        "user agent file {} is empty",
                        path.display()
                    )));
                }
                log::debug!("Using user agent from {}", path.display());
                self.user_agent = agent.to_string();
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AppError::config(format!(
                "cannot read user agent file {}: {e}",
                path.display()
            ))),
        }
    }
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            user_agent_file: defaults::user_agent_file(),
            timeout_secs: defaults::fetch_timeout(),
        }
    }
}

/// Where sources come from and where their fingerprints live.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourcesConfig {
    /// Directory with one fingerprint file per source
    #[serde(default = "defaults::state_dir")]
    pub state_dir: PathBuf,

    /// Listing page address; `{id}` is replaced with the source id
    #[serde(default = "defaults::listing_url_template")]
    pub listing_url_template: String,

    /// Ids tracked even before a fingerprint file exists
    #[serde(default)]
    pub ids: Vec<String>,
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            state_dir: defaults::state_dir(),
            listing_url_template: defaults::listing_url_template(),
            ids: Vec::new(),
        }
    }
}

/// Messaging platform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryConfig {
    /// Bot API base URL
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Maximum characters per message part
    #[serde(default = "defaults::max_message_length")]
    pub max_message_length: NonZeroUsize,

    /// Timeout for one send call in seconds
    #[serde(default = "defaults::delivery_timeout")]
    pub timeout_secs: u64,
}

impl DeliveryConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            max_message_length: defaults::max_message_length(),
            timeout_secs: defaults::delivery_timeout(),
        }
    }
}

/// What the orchestrator does when one source fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Log the failure and go on with the next source
    #[default]
    Continue,
    /// Stop the whole process on the first failure
    Abort,
}

/// Loop cadence and failure handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Seconds between ticks
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,

    #[serde(default)]
    pub failure_policy: FailurePolicy,
}

impl ScheduleConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            interval_secs: defaults::interval(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

/// Credentials loaded from the environment, never from the config file.
#[derive(Clone)]
pub struct Secrets {
    bot_token: String,
}

impl Secrets {
    pub fn new(bot_token: impl Into<String>) -> Result<Self> {
        let bot_token = bot_token.into().trim().to_string();
        if bot_token.is_empty() {
            return Err(AppError::config(format!("{BOT_TOKEN_VAR} is empty")));
        }
        Ok(Self { bot_token })
    }

    /// Read the bot token, loading a `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        if let Ok(path) = dotenvy::dotenv() {
            log::debug!("Loaded environment from {}", path.display());
        }
        let token = std::env::var(BOT_TOKEN_VAR)
            .map_err(|_| AppError::config(format!("{BOT_TOKEN_VAR} is not set")))?;
        Self::new(token)
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Secrets")
            .field("bot_token", &"<redacted>")
            .finish()
    }
}

mod defaults {
    use std::num::NonZeroUsize;
    use std::path::PathBuf;

    use super::{FETCH_TIMEOUT, MAX_MESSAGE_LENGTH, POLL_INTERVAL};

    // Fetcher defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; alert-relay/0.1)".into()
    }
    pub fn user_agent_file() -> Option<PathBuf> {
        Some(PathBuf::from("useragent"))
    }
    pub fn fetch_timeout() -> u64 {
        FETCH_TIMEOUT.as_secs()
    }

    // Source defaults
    pub fn state_dir() -> PathBuf {
        PathBuf::from("titles")
    }
    pub fn listing_url_template() -> String {
        "https://{id}.usembassy.gov/category/alert/".into()
    }

    // Delivery defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn max_message_length() -> NonZeroUsize {
        MAX_MESSAGE_LENGTH
    }
    pub fn delivery_timeout() -> u64 {
        30
    }

    // Schedule defaults
    pub fn interval() -> u64 {
        POLL_INTERVAL.as_secs()
    }
}
