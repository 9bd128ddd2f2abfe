//! Simulation orchestration and control
//!
//! This module contains the corpus orchestrator, the continuous monitoring
//! mode, the output sinks, statistics collection, error handling and the
//! logging setup.
//!
//! # Overview
//!
//! The simulation module ties the generators together:
//!
//! - **generate_demo_corpus**: One-shot pipeline producing a full corpus
//! - **MonitorHandle**: Continuous mode on a generation and a sync cadence
//! - **RecordSink**: JSON-lines and text-line output per stream
//! - **CorpusStatistics**: Corpus-level counters and summaries
//! - **SimulationError**: Error classification and recovery handling

pub mod error;
pub mod logging;
pub mod monitor;
pub mod orchestrator;
pub mod output;
pub mod statistics;

// Re-export all public types for convenience
pub use error::*;
pub use logging::*;
pub use monitor::*;
pub use orchestrator::*;
pub use output::*;
pub use statistics::*;
