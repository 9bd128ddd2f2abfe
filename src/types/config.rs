//! Configuration structures for the offboarding log simulator
//!
//! This module contains the simulation configuration, the enterprise-system
//! and anomaly-pattern catalogs, performance thresholds, CLI argument
//! definitions, and the validation logic applied before a run starts.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use super::{PostTerminationPattern, PreResignationPattern, Role};

/// Command line arguments structure
#[derive(Debug, Clone, Parser)]
#[command(
    name = "offboarding-log-simulator",
    version,
    about = "Synthesizes coherent employee-offboarding audit logs across HR, access and sync streams",
    long_about = "Generates an internally consistent, cross-referenced multi-stream log corpus \
describing an employee-offboarding process: HR lifecycle events, per-day access activity with \
risk-driven anomaly injection, account-management records, and data-sync batches with lineage. \
Every record resolves to a canonical employee and every timestamp respects process ordering.

EXAMPLES:
    # Generate a demo corpus with defaults
    offboarding-log-simulator generate

    # Reproducible corpus for 1000 employees over 30 days
    offboarding-log-simulator generate --employee-count 1000 --days 30 --seed 42

    # Run continuous monitoring mode for ten minutes
    offboarding-log-simulator monitor --duration-secs 600

    # Validate an already-generated corpus directory
    offboarding-log-simulator validate ./corpus"
)]
pub struct CliArgs {
    /// Configuration file path (JSON format); CLI arguments override file settings
    #[arg(short, long, help = "Configuration file path (JSON format)")]
    pub config: Option<String>,

    /// Random seed for reproducible corpora
    #[arg(long, help = "Random seed for reproducible corpora")]
    pub seed: Option<u64>,

    /// Enable verbose logging
    #[arg(short, long, help = "Enable verbose logging")]
    pub verbose: bool,

    /// Enable debug logging
    #[arg(short, long, help = "Enable debug logging")]
    pub debug: bool,

    /// Print the default configuration in JSON format and exit
    #[arg(long, help = "Print default configuration in JSON format and exit")]
    pub print_config: bool,

    /// Validate configuration without running
    #[arg(long, help = "Validate configuration without running the simulator")]
    pub dry_run: bool,

    /// Operation to perform
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Operations exposed by the CLI
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Generate a one-shot demo corpus
    Generate {
        /// Total number of employees in the cohort
        #[arg(long, help = "Total number of employees in the cohort")]
        employee_count: Option<usize>,

        /// Number of employees with a resignation in flight
        #[arg(long, help = "Number of employees with a resignation in flight")]
        resigning_count: Option<usize>,

        /// Number of days to simulate
        #[arg(long, help = "Number of days to simulate")]
        days: Option<usize>,

        /// Directory for the generated stream files (stdout when omitted)
        #[arg(long, help = "Directory for generated stream files")]
        output_dir: Option<String>,
    },

    /// Run continuous monitoring mode (generation + sync cadences)
    Monitor {
        /// How long to run before a graceful stop, in seconds
        #[arg(long, default_value = "60", help = "Seconds to run before stopping")]
        duration_secs: u64,

        /// Directory for the generated stream files
        #[arg(long, help = "Directory for generated stream files")]
        output_dir: Option<String>,
    },

    /// Validate an already-generated corpus and print the finding summary
    Validate {
        /// Directory containing the corpus stream files
        corpus_dir: String,
    },
}

/// Enterprise-system catalog: category → list of system names
///
/// The access generator draws role-appropriate systems from here; the
/// permission baselines reference the same names, keeping the closed world
/// consistent across streams.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SystemCatalog {
    /// HR-side systems of record
    pub hr_systems: Vec<String>,
    /// Systems employees access day to day
    pub access_systems: Vec<String>,
}

impl Default for SystemCatalog {
    fn default() -> Self {
        Self {
            hr_systems: vec!["HRIS".into(), "ERP".into(), "Payroll".into()],
            access_systems: vec![
                "VPN".into(),
                "Email".into(),
                "OfficeSuite".into(),
                "DevEnvironment".into(),
                "Database".into(),
                "FileServer".into(),
                "FinanceLedger".into(),
                "CRM".into(),
            ],
        }
    }
}

impl SystemCatalog {
    /// Systems a role routinely works in (its permission baseline)
    pub fn baseline_systems(&self, role: Role) -> Vec<String> {
        let wanted: &[&str] = match role {
            Role::Executive => &["VPN", "Email", "OfficeSuite", "FinanceLedger", "CRM"],
            Role::Finance => &["VPN", "Email", "OfficeSuite", "FinanceLedger", "Database"],
            Role::Engineering => &["VPN", "Email", "DevEnvironment", "Database", "FileServer"],
            Role::Sales => &["VPN", "Email", "OfficeSuite", "CRM"],
            Role::Hr => &["VPN", "Email", "OfficeSuite", "FileServer"],
            Role::General => &["VPN", "Email", "OfficeSuite"],
        };
        self.access_systems
            .iter()
            .filter(|s| wanted.contains(&s.as_str()))
            .cloned()
            .collect()
    }

    /// Systems outside a role's baseline, the targets of probing anomalies
    pub fn off_baseline_systems(&self, role: Role) -> Vec<String> {
        let baseline = self.baseline_systems(role);
        self.access_systems
            .iter()
            .filter(|s| !baseline.contains(s))
            .cloned()
            .collect()
    }
}

/// Anomaly-pattern catalog: per-phase closed pattern sets with weights
///
/// Patterns are a tagged enumeration rather than free-form strings; adding a
/// pattern means extending the variant set and its weight entry.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyCatalog {
    /// Weighted pre-resignation episode patterns
    pub pre_resignation: Vec<(PreResignationPattern, f64)>,
    /// Weighted post-termination violation patterns
    pub post_termination: Vec<(PostTerminationPattern, f64)>,
}

impl Default for AnomalyCatalog {
    fn default() -> Self {
        Self {
            pre_resignation: vec![
                (PreResignationPattern::BulkDownload, 0.6),
                (PreResignationPattern::AccessProbing, 0.4),
            ],
            post_termination: vec![
                (PostTerminationPattern::CredentialReuse, 0.5),
                (PostTerminationPattern::BruteForcePattern, 0.3),
                (PostTerminationPattern::OffHoursAccess, 0.2),
            ],
        }
    }
}

/// Tunable anomaly-injection thresholds
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnomalyConfig {
    /// Risk score above which pre-resignation episodes may fire
    pub risk_threshold: f64,
    /// Probability gain per unit of risk above the threshold
    pub episode_probability_scale: f64,
    /// Upper bound on the per-day episode probability
    pub max_episode_probability: f64,
    /// Day-zero probability of a post-termination violation attempt
    pub violation_base_probability: f64,
    /// Multiplicative decay of the violation probability per day since exit
    pub violation_daily_decay: f64,
    /// Days after exit during which violations may still be injected
    pub monitoring_window_days: i64,
    /// Grace period after exit with halved violation probability
    pub grace_period_days: i64,
    /// Hard cap on violation attempts within one monitoring window
    pub max_attempts_per_window: usize,
}

impl Default for AnomalyConfig {
    fn default() -> Self {
        Self {
            risk_threshold: 0.6,
            episode_probability_scale: 1.5,
            max_episode_probability: 0.8,
            violation_base_probability: 0.25,
            violation_daily_decay: 0.85,
            monitoring_window_days: 30,
            grace_period_days: 7,
            max_attempts_per_window: 5,
        }
    }
}

/// Nominal transition offsets (in days from resignation submission) and jitter
///
/// Jitter is bounded and re-clamped so that `offset[n] >= offset[n-1] +
/// min_gap_days` always holds after the draw.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScheduleConfig {
    /// Day the resignation is submitted
    pub submit_offset_days: i64,
    /// Day the handover phase opens
    pub handover_start_offset_days: i64,
    /// Day account revocation begins
    pub revocation_offset_days: i64,
    /// Day the handover phase completes
    pub handover_complete_offset_days: i64,
    /// Maximum jitter applied to each offset, in hours either direction
    pub jitter_hours: i64,
    /// Minimum gap enforced between consecutive transitions, in days
    pub min_gap_days: i64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            submit_offset_days: 1,
            handover_start_offset_days: 3,
            revocation_offset_days: 5,
            handover_complete_offset_days: 7,
            jitter_hours: 10,
            min_gap_days: 1,
        }
    }
}

/// Performance budgets consumed by the sync tracker and monitor
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PerformanceThresholds {
    /// Hard upper bound on a full extract, in seconds
    pub full_extract_time_limit_secs: u64,
    /// Hard upper bound on an incremental sync, in seconds
    pub incremental_sync_time_limit_secs: u64,
    /// Incremental sync cadence in continuous mode, in minutes
    pub sync_frequency_minutes: u64,
    /// Maximum concurrent access sessions modeled per day
    pub max_concurrent_sessions: usize,
    /// Maximum records covered by one incremental batch
    pub incremental_batch_cap: usize,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            full_extract_time_limit_secs: 900,
            incremental_sync_time_limit_secs: 15,
            sync_frequency_minutes: 10,
            max_concurrent_sessions: 200,
            incremental_batch_cap: 5000,
        }
    }
}

/// Configuration file structure (allows partial configuration)
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ConfigFile {
    /// Total number of employees in the cohort
    pub employee_count: Option<usize>,
    /// Number of employees with a resignation in flight
    pub resigning_count: Option<usize>,
    /// Fraction of exits taking the abrupt Terminated edge (0.0-1.0)
    pub abrupt_exit_ratio: Option<f64>,
    /// Number of days to simulate
    pub days: Option<usize>,
    /// Random seed for reproducible corpora
    pub seed: Option<u64>,
    /// Directory for generated stream files
    pub output_dir: Option<String>,
    /// Enterprise-system catalog override
    pub systems: Option<SystemCatalog>,
    /// Anomaly-pattern catalog override
    pub anomaly_catalog: Option<AnomalyCatalog>,
    /// Anomaly threshold overrides
    pub anomaly: Option<AnomalyConfig>,
    /// Offboarding schedule overrides
    pub schedule: Option<ScheduleConfig>,
    /// Performance threshold overrides
    pub performance: Option<PerformanceThresholds>,
    /// Lower bound of the plausible access:HR record ratio
    pub volume_ratio_min: Option<f64>,
    /// Upper bound of the plausible access:HR record ratio
    pub volume_ratio_max: Option<f64>,
}

/// Configuration for the offboarding log simulation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SimulationConfig {
    /// Total number of employees in the cohort
    pub employee_count: usize,
    /// Number of employees with a resignation in flight
    pub resigning_count: usize,
    /// Fraction of exits taking the abrupt Terminated edge (0.0-1.0)
    pub abrupt_exit_ratio: f64,
    /// Number of days to simulate
    pub days: usize,
    /// Random seed for reproducible corpora
    pub seed: Option<u64>,
    /// Directory for generated stream files (stdout when None)
    pub output_dir: Option<String>,
    /// Enterprise-system catalog
    pub systems: SystemCatalog,
    /// Anomaly-pattern catalog with weights
    pub anomaly_catalog: AnomalyCatalog,
    /// Anomaly-injection thresholds
    pub anomaly: AnomalyConfig,
    /// Offboarding schedule offsets and jitter
    pub schedule: ScheduleConfig,
    /// Performance budgets
    pub performance: PerformanceThresholds,
    /// Lower bound of the plausible access:HR record ratio
    pub volume_ratio_min: f64,
    /// Upper bound of the plausible access:HR record ratio
    pub volume_ratio_max: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            employee_count: 1000,
            resigning_count: 20,
            abrupt_exit_ratio: 0.1,
            days: 30,
            seed: None,
            output_dir: None,
            systems: SystemCatalog::default(),
            anomaly_catalog: AnomalyCatalog::default(),
            anomaly: AnomalyConfig::default(),
            schedule: ScheduleConfig::default(),
            performance: PerformanceThresholds::default(),
            volume_ratio_min: 40.0,
            volume_ratio_max: 400.0,
        }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    /// Configuration file read error
    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    /// JSON parsing error
    #[error("Failed to parse JSON configuration: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Unsupported configuration file format
    #[error("Unsupported configuration file format: {0} (supported: .json)")]
    UnsupportedFormat(String),
}

/// Validation errors for the simulation configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    /// Employee count is invalid
    #[error("Employee count must be greater than 0, got {0}")]
    InvalidEmployeeCount(usize),

    /// Resigning count exceeds the cohort
    #[error("Resigning count ({resigning}) must not exceed employee count ({total})")]
    InvalidResigningCount {
        /// Requested resigning count
        resigning: usize,
        /// Total cohort size
        total: usize,
    },

    /// Days count is invalid
    #[error("Days count must be greater than 0, got {0}")]
    InvalidDaysCount(usize),

    /// Ratio or probability value out of [0, 1]
    #[error("Invalid ratio for {field}: {value} (must be between 0.0 and 1.0)")]
    InvalidRatio {
        /// Name of the offending field
        field: String,
        /// The invalid value
        value: f64,
    },

    /// Volume band is inverted or non-positive
    #[error("Invalid volume ratio band: min ({0}) must be positive and <= max ({1})")]
    InvalidVolumeBand(f64, f64),

    /// Schedule offsets violate ordering
    #[error("Schedule offsets must be strictly increasing with min gap {min_gap}d: {detail}")]
    InvalidSchedule {
        /// Configured minimum gap
        min_gap: i64,
        /// Which offsets broke ordering
        detail: String,
    },

    /// Anomaly weight table empty or non-positive
    #[error("Anomaly weight table for {0} must contain positive weights")]
    InvalidAnomalyWeights(String),
}

impl SimulationConfig {
    /// Load configuration from a JSON file
    pub fn from_file(path: &str) -> Result<ConfigFile, ConfigError> {
        let p = Path::new(path);
        if !p.exists() {
            return Err(ConfigError::FileNotFound(path.to_string()));
        }
        match p.extension().and_then(|e| e.to_str()) {
            Some("json") => {
                let contents = fs::read_to_string(p)?;
                Ok(serde_json::from_str(&contents)?)
            }
            other => Err(ConfigError::UnsupportedFormat(other.unwrap_or("none").to_string())),
        }
    }

    /// Build the effective configuration from CLI args and optional file
    ///
    /// Precedence: CLI arguments, then config file, then defaults.
    pub fn from_cli_args(args: &CliArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => Self::from_file(path)?,
            None => ConfigFile::default(),
        };

        let mut config = SimulationConfig {
            employee_count: file.employee_count.unwrap_or(1000),
            resigning_count: file.resigning_count.unwrap_or(20),
            abrupt_exit_ratio: file.abrupt_exit_ratio.unwrap_or(0.1),
            days: file.days.unwrap_or(30),
            seed: args.seed.or(file.seed),
            output_dir: file.output_dir,
            systems: file.systems.unwrap_or_default(),
            anomaly_catalog: file.anomaly_catalog.unwrap_or_default(),
            anomaly: file.anomaly.unwrap_or_default(),
            schedule: file.schedule.unwrap_or_default(),
            performance: file.performance.unwrap_or_default(),
            volume_ratio_min: file.volume_ratio_min.unwrap_or(40.0),
            volume_ratio_max: file.volume_ratio_max.unwrap_or(400.0),
        };

        if let Some(Command::Generate { employee_count, resigning_count, days, output_dir }) =
            &args.command
        {
            if let Some(n) = employee_count {
                config.employee_count = *n;
            }
            if let Some(n) = resigning_count {
                config.resigning_count = *n;
            }
            if let Some(n) = days {
                config.days = *n;
            }
            if let Some(dir) = output_dir {
                config.output_dir = Some(dir.clone());
            }
        }
        if let Some(Command::Monitor { output_dir, .. }) = &args.command {
            if let Some(dir) = output_dir {
                config.output_dir = Some(dir.clone());
            }
        }

        Ok(config)
    }

    /// Validate the configuration before a run starts
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.employee_count == 0 {
            return Err(ConfigValidationError::InvalidEmployeeCount(self.employee_count));
        }
        if self.resigning_count > self.employee_count {
            return Err(ConfigValidationError::InvalidResigningCount {
                resigning: self.resigning_count,
                total: self.employee_count,
            });
        }
        if self.days == 0 {
            return Err(ConfigValidationError::InvalidDaysCount(self.days));
        }
        if !(0.0..=1.0).contains(&self.abrupt_exit_ratio) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "abrupt_exit_ratio".into(),
                value: self.abrupt_exit_ratio,
            });
        }
        if !(0.0..=1.0).contains(&self.anomaly.risk_threshold) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "anomaly.risk_threshold".into(),
                value: self.anomaly.risk_threshold,
            });
        }
        if !(0.0..=1.0).contains(&self.anomaly.max_episode_probability) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "anomaly.max_episode_probability".into(),
                value: self.anomaly.max_episode_probability,
            });
        }
        if !(0.0..=1.0).contains(&self.anomaly.violation_base_probability) {
            return Err(ConfigValidationError::InvalidRatio {
                field: "anomaly.violation_base_probability".into(),
                value: self.anomaly.violation_base_probability,
            });
        }
        if self.volume_ratio_min <= 0.0 || self.volume_ratio_min > self.volume_ratio_max {
            return Err(ConfigValidationError::InvalidVolumeBand(
                self.volume_ratio_min,
                self.volume_ratio_max,
            ));
        }

        let s = &self.schedule;
        let offsets = [
            ("submit", s.submit_offset_days),
            ("handover_start", s.handover_start_offset_days),
            ("revocation", s.revocation_offset_days),
            ("handover_complete", s.handover_complete_offset_days),
        ];
        for pair in offsets.windows(2) {
            if pair[1].1 < pair[0].1 + s.min_gap_days {
                return Err(ConfigValidationError::InvalidSchedule {
                    min_gap: s.min_gap_days,
                    detail: format!(
                        "{} (day {}) follows {} (day {}) too closely",
                        pair[1].0, pair[1].1, pair[0].0, pair[0].1
                    ),
                });
            }
        }

        if self.anomaly_catalog.pre_resignation.is_empty()
            || self.anomaly_catalog.pre_resignation.iter().any(|(_, w)| *w <= 0.0)
        {
            return Err(ConfigValidationError::InvalidAnomalyWeights("pre_resignation".into()));
        }
        if self.anomaly_catalog.post_termination.is_empty()
            || self.anomaly_catalog.post_termination.iter().any(|(_, w)| *w <= 0.0)
        {
            return Err(ConfigValidationError::InvalidAnomalyWeights("post_termination".into()));
        }

        Ok(())
    }

    /// Serialize the configuration to pretty JSON
    pub fn print_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
