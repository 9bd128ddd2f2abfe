//! Error types and handling
//!
//! This module contains the simulator's error types, their recoverability
//! classification, and the handler used to retry or skip failed operations.

use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::employee::TransitionError;
use crate::types::ConfigValidationError;

/// Errors that can occur during simulation
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration validation failed
    #[error("Configuration validation failed: {0}")]
    ConfigurationError(String),

    /// A lifecycle transition was rejected
    #[error("Lifecycle error: {0}")]
    LifecycleError(#[from] TransitionError),

    /// A sync or generation operation blew its wall-clock budget
    #[error("Performance budget exceeded in {operation}: budget {budget_secs}s, took {actual_secs}s")]
    PerformanceBudgetExceeded {
        /// The operation that overran
        operation: String,
        /// The configured budget in seconds
        budget_secs: u64,
        /// The measured duration in seconds
        actual_secs: u64,
    },

    /// Writing a record to an output stream failed
    #[error("Schema write error on the {stream} stream: {reason}")]
    SchemaWriteError {
        /// Which output stream failed
        stream: String,
        /// What went wrong
        reason: String,
    },

    /// Cohort generation failed
    #[error("Cohort generation failed: {0}")]
    CohortGenerationError(String),

    /// Corpus validation pass failed to run
    #[error("Validation error: {0}")]
    ValidationError(String),

    /// I/O error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
}

impl From<ConfigValidationError> for SimulationError {
    fn from(error: ConfigValidationError) -> Self {
        SimulationError::ConfigurationError(error.to_string())
    }
}

impl From<anyhow::Error> for SimulationError {
    fn from(error: anyhow::Error) -> Self {
        SimulationError::ValidationError(error.to_string())
    }
}

impl SimulationError {
    /// Create a schema write error
    pub fn schema_write_error(stream: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::SchemaWriteError { stream: stream.into(), reason: reason.into() }
    }

    /// Check if this is a recoverable error
    ///
    /// A rejected transition is fatal to the operation that requested it but
    /// recoverable for the run: the employee's state is unchanged and other
    /// timelines are unaffected. Configuration errors abort the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            SimulationError::ConfigurationError(_) => false,
            SimulationError::LifecycleError(_) => true,
            SimulationError::PerformanceBudgetExceeded { .. } => true,
            SimulationError::SchemaWriteError { .. } => true,
            SimulationError::CohortGenerationError(_) => false,
            SimulationError::ValidationError(_) => true,
            SimulationError::IoError(_) => true,
            SimulationError::SerializationError(_) => true,
        }
    }

    /// Get the error category
    pub fn category(&self) -> &'static str {
        match self {
            SimulationError::ConfigurationError(_) => "Configuration",
            SimulationError::LifecycleError(_) => "Lifecycle",
            SimulationError::PerformanceBudgetExceeded { .. } => "Performance",
            SimulationError::SchemaWriteError { .. } => "Output",
            SimulationError::CohortGenerationError(_) => "Cohort Generation",
            SimulationError::ValidationError(_) => "Validation",
            SimulationError::IoError(_) => "IO",
            SimulationError::SerializationError(_) => "Serialization",
        }
    }
}

/// Result type for simulation operations
pub type SimulationResult<T> = Result<T, SimulationError>;

/// Error recovery strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryStrategy {
    /// Retry the operation with the same parameters
    Retry,
    /// Skip the current operation and continue
    Skip,
    /// Abort the entire run
    Abort,
}

/// Error recovery context
#[derive(Debug, Clone)]
pub struct RecoveryContext {
    /// The recovery strategy to use
    pub strategy: RecoveryStrategy,
    /// Maximum number of retry attempts
    pub max_retries: usize,
    /// Current retry count
    pub retry_count: usize,
    /// Additional context information
    pub context: String,
}

impl Default for RecoveryContext {
    fn default() -> Self {
        Self {
            strategy: RecoveryStrategy::Skip,
            max_retries: 3,
            retry_count: 0,
            context: String::new(),
        }
    }
}

impl RecoveryContext {
    /// Create a new recovery context with retry strategy
    pub fn retry(max_retries: usize) -> Self {
        Self { strategy: RecoveryStrategy::Retry, max_retries, ..Default::default() }
    }

    /// Create a new recovery context with skip strategy
    pub fn skip() -> Self {
        Self { strategy: RecoveryStrategy::Skip, ..Default::default() }
    }

    /// Add context information
    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = context.into();
        self
    }

    /// Increment retry count
    pub fn increment_retry(&mut self) {
        self.retry_count += 1;
    }

    /// Check if more retries are available
    pub fn can_retry(&self) -> bool {
        self.retry_count < self.max_retries
    }
}

/// Error handler for graceful error recovery
#[derive(Debug, Default)]
pub struct ErrorHandler {
    /// Default recovery context
    pub default_recovery: RecoveryContext,
}

impl ErrorHandler {
    /// Create a new error handler
    pub fn new() -> Self {
        Self::default()
    }

    /// Handle an error with the given recovery context
    pub fn handle_error(
        &self,
        error: &SimulationError,
        context: &RecoveryContext,
    ) -> RecoveryStrategy {
        match error.category() {
            "Configuration" | "Cohort Generation" => {
                error!("Critical error in {}: {}", error.category(), error);
            }
            "Lifecycle" | "Output" | "Performance" => {
                warn!("Recoverable error in {}: {}", error.category(), error);
            }
            _ => {
                info!("Error in {}: {}", error.category(), error);
            }
        }
        if !context.context.is_empty() {
            debug!("Error context: {}", context.context);
        }

        if !error.is_recoverable() {
            return RecoveryStrategy::Abort;
        }

        match context.strategy {
            RecoveryStrategy::Retry if context.can_retry() => RecoveryStrategy::Retry,
            RecoveryStrategy::Retry => {
                warn!("Max retries exceeded, skipping operation");
                RecoveryStrategy::Skip
            }
            strategy => strategy,
        }
    }

    /// Execute an operation with error recovery
    ///
    /// Returns `Ok(None)` when the operation was skipped after its retries
    /// ran out; only non-recoverable errors propagate.
    pub fn execute_with_recovery<T, F>(
        &self,
        mut operation: F,
        mut context: RecoveryContext,
    ) -> SimulationResult<Option<T>>
    where
        F: FnMut() -> SimulationResult<T>,
    {
        loop {
            match operation() {
                Ok(result) => return Ok(Some(result)),
                Err(error) => match self.handle_error(&error, &context) {
                    RecoveryStrategy::Retry => {
                        context.increment_retry();
                        continue;
                    }
                    RecoveryStrategy::Skip => {
                        warn!("Skipping operation due to error: {}", error);
                        return Ok(None);
                    }
                    RecoveryStrategy::Abort => {
                        error!("Aborting due to non-recoverable error: {}", error);
                        return Err(error);
                    }
                },
            }
        }
    }
}
