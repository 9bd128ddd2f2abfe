//! Offboarding Log Simulator
//!
//! A lifecycle-driven event synthesis engine that generates coherent,
//! cross-referenced employee-offboarding audit logs for testing compliance
//! pipelines, SIEM correlation rules and data-sync tooling.
//!
//! # Overview
//!
//! The simulator builds a synthetic employee cohort, drives a subset of it
//! through the resignation or termination lifecycle, and emits four
//! mutually consistent streams over the simulated window:
//!
//! - **HR stream**: lifecycle events with risk snapshots, onboarding
//!   registrations for mid-run hires, and account transfers during handover
//! - **Access stream**: routine per-day sessions plus risk-gated anomaly
//!   episodes before the exit and credential-reuse bursts after it
//! - **Violation alerts**: one alert per post-exit intrusion attempt
//! - **Data-sync batches**: full extracts and incremental batches with
//!   lineage back into the account-mutation journal
//!
//! A read-only consistency validator cross-checks the assembled streams;
//! its findings are advisory and never block emission.
//!
//! ## Quick Start
//!
//! ```no_run
//! use offboarding_log_simulator::{generate_demo_corpus, SimulationConfig};
//!
//! let config = SimulationConfig {
//!     employee_count: 200,
//!     resigning_count: 8,
//!     days: 30,
//!     seed: Some(42),
//!     ..Default::default()
//! };
//!
//! let corpus = generate_demo_corpus(&config)?;
//! println!("{}", corpus.statistics.summary());
//! # Ok::<(), offboarding_log_simulator::SimulationError>(())
//! ```
//!
//! ## Module Organization
//!
//! - [`types`]: Identifier newtypes, domain enums, and configuration
//! - [`employee`]: Employee model, risk profile, registry and journal
//! - [`hr`]: Offboarding schedules and the HR process simulator
//! - [`access`]: Routine access generation and anomaly injection
//! - [`sync`]: Full-extract and incremental data-sync batches
//! - [`validator`]: Cross-stream consistency checks
//! - [`simulation`]: Orchestration, monitoring, output, statistics, errors

#![warn(missing_docs, missing_debug_implementations, unreachable_pub)]

// Module declarations
pub mod access;
pub mod employee;
pub mod hr;
pub mod simulation;
pub mod sync;
pub mod validator;

pub mod types;

// Re-export the main entry points and core types

// Core types and identifiers
pub use types::{
    AccessAction,
    AccessResult,
    // Identifiers
    BatchId,
    CliArgs,
    Command,
    ConfigValidationError,
    EmployeeId,
    FindingCategory,
    FindingSeverity,
    // Enums
    HrEventType,
    ResignationState,
    RiskLevel,
    Role,
    SessionId,
    // Configuration
    SimulationConfig,
    SyncBatchType,
};

// Employee model and registry
pub use employee::{
    AccountBinding, AccountMutation, CohortGenerator, Employee, EmployeeRegistry, MutationCause,
    RiskProfile, TransitionError,
};

// HR stream
pub use hr::{HrProcessSimulator, HrRecord, HrStreamRecord, OffboardingSchedule};

// Access stream and anomalies
pub use access::{AccessLogGenerator, AccessRecord, AnomalyInjector, ViolationRecord};

// Data sync
pub use sync::{SyncBatch, SyncTracker, SyncedAccountRecord};

// Validation
pub use validator::{ConsistencyValidator, ValidationFinding, ValidationReport};

// Simulation entry points
pub use simulation::{
    generate_demo_corpus, generate_demo_corpus_from, load_corpus, validate_corpus, Corpus,
    CorpusStatistics, ErrorHandler, LoggingConfig, MonitorHandle, RecordSink, SimulationError,
    SimulationResult,
};
