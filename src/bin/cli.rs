//! Alert relay CLI
//!
//! Local execution entry point.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::sync::watch;

use alert_relay::{
    error::{AppError, Result},
    models::{Config, Secrets, is_valid_source_id},
    pipeline::{Orchestrator, SourceOutcome},
    services::{HttpFetcher, SourceRegistry, TelegramMessenger},
    storage::{FingerprintStore, LocalStorage},
};

/// alert-relay - Embassy alert watcher
#[derive(Parser, Debug)]
#[command(
    name = "alert-relay",
    version,
    about = "Relays newly published alerts to chat channels"
)]

struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = "data/config.toml")]
    config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Check all sources every interval until interrupted
    Run,

    /// Check all sources once and exit
    Once,

    /// Validate configuration files
    Validate,

    /// Show sources, destinations and stored fingerprints
    Info,

    /// Start watching a new source
    Track {
        /// Source id, e.g. a country code
        id: String,
    },
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Build the orchestrator with production collaborators.
fn build_orchestrator(config: Arc<Config>, storage: LocalStorage) -> Result<Orchestrator> {
    let secrets = Secrets::from_env()?;
    let fetcher = HttpFetcher::new(&config.fetcher)?;
    let messenger = TelegramMessenger::new(&config.delivery, &secrets)?;

    Ok(Orchestrator::new(
        config,
        Arc::new(storage),
        Arc::new(fetcher),
        Arc::new(messenger),
    ))
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("alert-relay starting...");

    let config = Config::load(&cli.config)?;
    config.validate()?;
    log::info!("Loaded configuration from {}", cli.config.display());

    let storage = LocalStorage::new(&config.sources.state_dir);
    let config = Arc::new(config);

    match cli.command {
        Command::Run => {
            let orchestrator = build_orchestrator(Arc::clone(&config), storage)?;

            let (stop_tx, stop_rx) = watch::channel(false);
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::info!("Interrupt received, finishing current source...");
                    let _ = stop_tx.send(true);
                }
            });

            orchestrator.run_forever(stop_rx).await?;
        }

        Command::Once => {
            let orchestrator = build_orchestrator(Arc::clone(&config), storage)?;
            let report = orchestrator.run_tick().await?;

            for (id, outcome) in &report.outcomes {
                match outcome {
                    SourceOutcome::NoChange => log::info!("{id}: no change"),
                    SourceOutcome::Delivered { title, parts } => {
                        log::info!("{id}: sent \"{title}\" in {parts} message(s)")
                    }
                    SourceOutcome::Undeliverable { title } => {
                        log::info!("{id}: recorded \"{title}\" (no destination)")
                    }
                }
            }
            for failure in &report.failures {
                log::error!("{failure}");
            }
            if let Some(failure) = report.failures.into_iter().next() {
                return Err(failure.error);
            }
        }

        Command::Validate => {
            log::info!("Validating configuration...");

            let ids = storage.source_ids().await?;
            log::info!("✓ Config OK");
            log::info!(
                "{} source(s) in {}, {} destination(s) mapped",
                ids.len(),
                storage.root_dir().display(),
                config.destinations.len()
            );
            for id in ids.iter().filter(|id| !config.destinations.contains_key(*id)) {
                log::warn!("Source '{id}' has no destination; its alerts will not be sent");
            }

            log::info!("All validations passed!");
        }

        Command::Info => {
            log::info!("State directory: {}", storage.root_dir().display());
            log::info!("User agent: {}", config.fetcher.user_agent);

            let store: Arc<dyn FingerprintStore> = Arc::new(storage);
            let registry = SourceRegistry::new(Arc::clone(&config), store);
            let sources = registry.list_sources().await?;
            if sources.is_empty() {
                log::info!("No sources configured yet. Use 'track <id>' to add one.");
            }
            for source in sources {
                let fingerprint = registry.fingerprint(&source.id).await?;
                let destination = source
                    .destination
                    .as_ref()
                    .map_or_else(|| "-".to_string(), |d| d.to_string());
                let fingerprint = if fingerprint.is_empty() {
                    "(nothing seen yet)".to_string()
                } else {
                    fingerprint
                };
                log::info!(
                    "{} -> {} | {} | {}",
                    source.id,
                    destination,
                    source.listing_url,
                    fingerprint
                );
            }
        }

        Command::Track { id } => {
            if !is_valid_source_id(&id) {
                return Err(AppError::config(format!("invalid source id '{id}'")));
            }
            if storage.track(&id).await? {
                log::info!("Now tracking '{id}'");
            } else {
                log::warn!("'{id}' is already tracked");
            }
            if !config.destinations.contains_key(&id) {
                log::warn!("'{id}' has no destination; add it under [destinations]");
            }
        }
    }

    log::info!("Done!");

    Ok(())
}
