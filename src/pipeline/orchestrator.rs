// src/pipeline/orchestrator.rs

//! Poll, diff and dispatch loop.
//!
//! Each tick walks every configured source once, in id order:
//!
//! ```text
//! IDLE -> PROBING -> NO_CHANGE -> IDLE
//!                 -> CHANGED -> FETCHING -> CHUNKING -> DELIVERING -> PERSISTING -> IDLE
//! ```
//!
//! The fingerprint is written only after delivery finished (or was skipped
//! for a source without destination), so a restart never re-sends an alert
//! that went out and never loses one that did not.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use tokio::sync::watch;

use crate::error::{AppError, ErrorKind, Result};
use crate::models::{Config, FailurePolicy, Source};
use crate::services::{AlertProbe, ContentFetcher, Messenger, Notifier, PageFetcher, SourceRegistry};
use crate::storage::FingerprintStore;
use crate::utils::site_root;
use crate::utils::text::message_parts;

/// Step of a source's cycle, used to report where a failure happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Probing,
    Fetching,
    Chunking,
    Delivering,
    Persisting,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Probing => "probing",
            Stage::Fetching => "fetching",
            Stage::Chunking => "chunking",
            Stage::Delivering => "delivering",
            Stage::Persisting => "persisting",
        };
        f.write_str(name)
    }
}

/// How one source's cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceOutcome {
    /// Latest alert matches the stored fingerprint
    NoChange,
    /// New alert sent in `parts` messages and recorded
    Delivered { title: String, parts: usize },
    /// New alert recorded, but the source has no destination
    Undeliverable { title: String },
}

/// A source cycle that stopped early.
#[derive(Debug)]
pub struct SourceFailure {
    pub source_id: String,
    pub stage: Stage,
    pub error: AppError,
}

impl fmt::Display for SourceFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} failed while {}: {}",
            self.source_id, self.stage, self.error
        )
    }
}

/// Summary of one pass over all sources.
#[derive(Debug)]
pub struct TickReport {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub outcomes: Vec<(String, SourceOutcome)>,
    pub failures: Vec<SourceFailure>,
    /// Sources left unchecked because shutdown was requested
    pub skipped: usize,
}

impl TickReport {
    fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            outcomes: Vec::new(),
            failures: Vec::new(),
            skipped: 0,
        }
    }

    /// Number of sources that reached the end of their cycle.
    pub fn checked(&self) -> usize {
        self.outcomes.len()
    }

    /// Number of sources with a new alert.
    pub fn changed(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|(_, outcome)| *outcome != SourceOutcome::NoChange)
            .count()
    }

    pub fn outcome(&self, source_id: &str) -> Option<&SourceOutcome> {
        self.outcomes
            .iter()
            .find(|(id, _)| id == source_id)
            .map(|(_, outcome)| outcome)
    }
}

/// Drives the poll cycle for all sources.
pub struct Orchestrator {
    registry: SourceRegistry,
    probe: AlertProbe,
    content: ContentFetcher,
    notifier: Notifier,
    max_part_len: NonZeroUsize,
    interval: Duration,
    policy: FailurePolicy,
}

impl Orchestrator {
    /// Wire the orchestrator from configuration and collaborators.
    ///
    /// The probe and the content fetcher share one page fetcher.
    pub fn new(
        config: Arc<Config>,
        store: Arc<dyn FingerprintStore>,
        fetcher: Arc<dyn PageFetcher>,
        messenger: Arc<dyn Messenger>,
    ) -> Self {
        Self {
            probe: AlertProbe::new(Arc::clone(&fetcher), config.selectors.clone()),
            content: ContentFetcher::new(fetcher, config.selectors.clone()),
            notifier: Notifier::new(messenger),
            max_part_len: config.delivery.max_message_length,
            interval: config.schedule.interval(),
            policy: config.schedule.failure_policy,
            registry: SourceRegistry::new(config, store),
        }
    }

    pub fn registry(&self) -> &SourceRegistry {
        &self.registry
    }

    /// Run one source through its cycle.
    pub async fn run_source(
        &self,
        source: &Source,
    ) -> std::result::Result<SourceOutcome, SourceFailure> {
        let site = site_root(&source.listing_url);
        let fail = |stage: Stage| {
            let source_id = source.id.clone();
            move |error: AppError| SourceFailure {
                source_id,
                stage,
                error,
            }
        };

        log::debug!("{}: {}", source.id, Stage::Probing);
        let fingerprint = self
            .registry
            .fingerprint(&source.id)
            .await
            .map_err(fail(Stage::Probing))?;
        let alert = self
            .probe
            .probe(&source.listing_url)
            .await
            .map_err(fail(Stage::Probing))?;

        if !alert.is_new_since(&fingerprint) {
            log::info!("No new alerts: {site}");
            return Ok(SourceOutcome::NoChange);
        }
        log::info!("New alert found: {site}");
        log::debug!("{}: \"{}\" replaces \"{}\"", source.id, alert.title, fingerprint);

        log::debug!("{}: {}", source.id, Stage::Fetching);
        let body = self
            .content
            .fetch_body(&alert.detail_url)
            .await
            .map_err(fail(Stage::Fetching))?;

        log::debug!("{}: {}", source.id, Stage::Chunking);
        let parts = message_parts(&body, self.max_part_len);

        log::debug!("{}: {}", source.id, Stage::Delivering);
        let sent = match &source.destination {
            Some(destination) => self
                .notifier
                .deliver(destination, &parts)
                .await
                .map_err(fail(Stage::Delivering))?,
            None => {
                log::warn!(
                    "No destination for '{}', recording alert without sending",
                    source.id
                );
                0
            }
        };

        log::debug!("{}: {}", source.id, Stage::Persisting);
        self.registry
            .set_fingerprint(&source.id, &alert.title)
            .await
            .map_err(fail(Stage::Persisting))?;

        Ok(match source.destination {
            Some(_) => SourceOutcome::Delivered {
                title: alert.title,
                parts: sent,
            },
            None => SourceOutcome::Undeliverable { title: alert.title },
        })
    }

    /// Check every source once.
    pub async fn run_tick(&self) -> Result<TickReport> {
        self.tick(None).await
    }

    async fn tick(&self, shutdown: Option<&watch::Receiver<bool>>) -> Result<TickReport> {
        log::info!("Checking...");
        let mut report = TickReport::new();
        let sources = self.registry.list_sources().await?;

        for (index, source) in sources.iter().enumerate() {
            if shutdown.is_some_and(|rx| *rx.borrow()) {
                report.skipped = sources.len() - index;
                log::info!("Shutdown requested, skipping {} source(s)", report.skipped);
                break;
            }

            log::info!("Checking: {}", site_root(&source.listing_url));
            match self.run_source(source).await {
                Ok(outcome) => report.outcomes.push((source.id.clone(), outcome)),
                Err(failure) => {
                    log::error!("{failure}");
                    if self.policy == FailurePolicy::Abort
                        || failure.error.kind() == ErrorKind::Config
                    {
                        return Err(failure.error);
                    }
                    report.failures.push(failure);
                }
            }
        }

        report.finished_at = Utc::now();
        Ok(report)
    }

    /// Tick on the configured interval until `shutdown` turns true.
    ///
    /// Shutdown is honoured between sources and while sleeping; a source
    /// already in its cycle always finishes it.
    pub async fn run_forever(&self, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        loop {
            if *shutdown.borrow() {
                break;
            }

            let report = self.tick(Some(&shutdown)).await?;
            log::info!(
                "Checked {} source(s): {} new, {} failed",
                report.checked(),
                report.changed(),
                report.failures.len()
            );
            if report.skipped > 0 {
                break;
            }

            log::info!("Checking completed and sleeping...");
            if let Ok(delta) = chrono::Duration::from_std(self.interval) {
                let next = Local::now() + delta;
                log::debug!("Next check at {}", next.format("%Y-%m-%d %H:%M:%S"));
            }

            tokio::select! {
                _ = stop_requested(&mut shutdown) => break,
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        log::info!("Stopped");
        Ok(())
    }
}

/// Resolves once shutdown is signalled; never, if the sender is gone.
async fn stop_requested(shutdown: &mut watch::Receiver<bool>) {
    if shutdown.wait_for(|stop| *stop).await.is_err() {
        std::future::pending::<()>().await;
    }
}
