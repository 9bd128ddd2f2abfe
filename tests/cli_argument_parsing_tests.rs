//! Tests for CLI argument parsing and configuration merging
//!
//! These tests verify that command line arguments parse into the expected
//! subcommands and that CLI overrides win over configuration-file defaults.

use clap::Parser;

use offboarding_log_simulator::{CliArgs, Command, ConfigValidationError, SimulationConfig};

#[test]
fn test_generate_subcommand_parsing() {
    let args = CliArgs::try_parse_from([
        "offboarding-log-simulator",
        "generate",
        "--employee-count",
        "500",
        "--resigning-count",
        "12",
        "--days",
        "14",
        "--output-dir",
        "./corpus",
    ])
    .unwrap();

    match args.command {
        Some(Command::Generate { employee_count, resigning_count, days, output_dir }) => {
            assert_eq!(employee_count, Some(500));
            assert_eq!(resigning_count, Some(12));
            assert_eq!(days, Some(14));
            assert_eq!(output_dir.as_deref(), Some("./corpus"));
        }
        other => panic!("expected generate subcommand, got {other:?}"),
    }
}

#[test]
fn test_monitor_subcommand_defaults() {
    let args =
        CliArgs::try_parse_from(["offboarding-log-simulator", "monitor"]).unwrap();

    match args.command {
        Some(Command::Monitor { duration_secs, output_dir }) => {
            assert_eq!(duration_secs, 60);
            assert_eq!(output_dir, None);
        }
        other => panic!("expected monitor subcommand, got {other:?}"),
    }
}

#[test]
fn test_validate_subcommand_takes_a_directory() {
    let args =
        CliArgs::try_parse_from(["offboarding-log-simulator", "validate", "./corpus"]).unwrap();

    match args.command {
        Some(Command::Validate { corpus_dir }) => assert_eq!(corpus_dir, "./corpus"),
        other => panic!("expected validate subcommand, got {other:?}"),
    }
}

#[test]
fn test_seed_and_logging_flags() {
    let args = CliArgs::try_parse_from([
        "offboarding-log-simulator",
        "--seed",
        "42",
        "--verbose",
    ])
    .unwrap();

    assert_eq!(args.seed, Some(42));
    assert!(args.verbose);
    assert!(!args.debug);
    assert!(args.command.is_none());
}

#[test]
fn test_cli_overrides_reach_the_configuration() {
    let args = CliArgs::try_parse_from([
        "offboarding-log-simulator",
        "--seed",
        "7",
        "generate",
        "--employee-count",
        "250",
        "--days",
        "7",
    ])
    .unwrap();

    let config = SimulationConfig::from_cli_args(&args).unwrap();
    assert_eq!(config.employee_count, 250);
    assert_eq!(config.days, 7);
    assert_eq!(config.seed, Some(7));
    // Untouched settings keep their defaults
    assert_eq!(config.resigning_count, 20);
    assert_eq!(config.output_dir, None);
}

#[test]
fn test_defaults_validate_cleanly() {
    let args = CliArgs::try_parse_from(["offboarding-log-simulator"]).unwrap();
    let config = SimulationConfig::from_cli_args(&args).unwrap();
    assert!(config.validate().is_ok());
}

#[test]
fn test_resigning_count_above_cohort_is_rejected() {
    let config = SimulationConfig {
        employee_count: 10,
        resigning_count: 11,
        ..SimulationConfig::default()
    };

    assert!(matches!(
        config.validate(),
        Err(ConfigValidationError::InvalidResigningCount { resigning: 11, total: 10 })
    ));
}

#[test]
fn test_unknown_argument_is_rejected() {
    assert!(CliArgs::try_parse_from(["offboarding-log-simulator", "--bogus"]).is_err());
    assert!(CliArgs::try_parse_from(["offboarding-log-simulator", "generate", "--days", "x"])
        .is_err());
}
