//! Pipeline entry points for the relay.
//!
//! - `Orchestrator::run_tick`: check every source once
//! - `Orchestrator::run_forever`: keep checking on a fixed interval

pub mod orchestrator;

pub use orchestrator::{Orchestrator, SourceFailure, SourceOutcome, Stage, TickReport};
