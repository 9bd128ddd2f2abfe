// Offboarding Log Simulator - Main Entry Point
//
// You can run it via Cargo:
//
// ```console
// $ cargo build --release
// $ ./target/release/offboarding-log-simulator generate --output-dir ./corpus
// ```
//
// Or in continuous monitoring mode:
//
// ```console
// $ ./target/release/offboarding-log-simulator monitor --duration-secs 120 --output-dir ./corpus
// ```

use clap::Parser;
use offboarding_log_simulator::simulation::{
    generate_demo_corpus, load_corpus, run_monitor_for, Corpus, LoggingConfig, RecordSink,
    SimulationResult,
};
use offboarding_log_simulator::types::{CliArgs, Command, SimulationConfig};
use std::path::Path;
use std::process;
use std::time::Duration;
use tracing::{error, info};

fn main() {
    // Parse CLI arguments first to check for special flags
    let args = CliArgs::parse();

    // Handle special CLI flags that don't require full initialization
    if args.print_config {
        let default_config = SimulationConfig::default();
        match default_config.print_json() {
            Ok(json) => {
                println!("{}", json);
                return;
            }
            Err(e) => {
                eprintln!("Failed to serialize default configuration: {}", e);
                process::exit(1);
            }
        }
    }

    // Initialize logging based on CLI flags
    let logging_result = if args.debug {
        LoggingConfig::init_debug()
    } else if args.verbose {
        LoggingConfig::init_verbose()
    } else {
        LoggingConfig::new().with_level(tracing::Level::WARN).init()
    };
    if let Err(e) = logging_result {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(1);
    }

    info!("Starting offboarding log simulator");

    // Load configuration from CLI arguments and optional config file
    let config = match SimulationConfig::from_cli_args(&args) {
        Ok(config) => config,
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            process::exit(1);
        }
    };

    if let Err(e) = config.validate() {
        error!("Configuration validation failed: {}", e);
        process::exit(1);
    }
    info!("Configuration loaded and validated successfully");

    // Handle dry run mode
    if args.dry_run {
        eprintln!("Configuration validation successful!");
        eprintln!("Dry run mode - no corpus will be generated.");
        print_configuration_summary(&config);
        return;
    }

    let result = match &args.command {
        Some(Command::Monitor { duration_secs, .. }) => run_monitor(&config, *duration_secs),
        Some(Command::Validate { corpus_dir }) => run_validate(&config, corpus_dir),
        // `generate` is also the default when no subcommand is given
        _ => run_generate(&config),
    };

    if let Err(e) = result {
        error!("Run failed: {}", e);
        process::exit(1);
    }
    info!("Offboarding log simulator completed successfully");
}

/// Generate a one-shot demo corpus and write it through the sink
fn run_generate(config: &SimulationConfig) -> SimulationResult<()> {
    eprintln!(
        "Generating corpus: {} employees, {} resigning, {} days...",
        config.employee_count, config.resigning_count, config.days
    );

    let mut corpus = generate_demo_corpus(config)?;
    write_and_report(config, &mut corpus)
}

/// Run continuous mode for the requested duration, then write the corpus
fn run_monitor(config: &SimulationConfig, duration_secs: u64) -> SimulationResult<()> {
    eprintln!("Monitoring for {} seconds (one simulated day per second)...", duration_secs);

    let mut corpus = run_monitor_for(config.clone(), Duration::from_secs(duration_secs))?;
    write_and_report(config, &mut corpus)
}

/// Revalidate an already-written corpus and print the finding summary
fn run_validate(config: &SimulationConfig, corpus_dir: &str) -> SimulationResult<()> {
    let corpus = load_corpus(config, Path::new(corpus_dir))?;

    eprintln!("{}", corpus.statistics.summary());
    eprintln!("{}", corpus.report.summary());
    for finding in &corpus.report.findings {
        eprintln!("  {}", finding);
    }
    // Findings are advisory; a corpus with findings still validates cleanly
    Ok(())
}

fn write_and_report(config: &SimulationConfig, corpus: &mut Corpus) -> SimulationResult<()> {
    let mut sink = RecordSink::new(config.output_dir.as_deref())?;
    corpus.write_to(&mut sink)?;

    if let Some(dir) = &config.output_dir {
        eprintln!("Corpus written to: {}", dir);
    }
    if sink.dropped_records() > 0 {
        eprintln!("Warning: {} records dropped during output", sink.dropped_records());
    }

    eprintln!("\n{}", corpus.statistics.detailed_breakdown());
    eprintln!("{}", corpus.report.summary());
    Ok(())
}

/// Print a short configuration summary for dry runs
fn print_configuration_summary(config: &SimulationConfig) {
    eprintln!("\nConfiguration Summary:");
    eprintln!("  Employees:        {}", config.employee_count);
    eprintln!("  Resigning:        {}", config.resigning_count);
    eprintln!("  Abrupt ratio:     {:.2}", config.abrupt_exit_ratio);
    eprintln!("  Days:             {}", config.days);
    eprintln!("  Seed:             {:?}", config.seed);
    eprintln!(
        "  Output:           {}",
        config.output_dir.as_deref().unwrap_or("stdout")
    );
    eprintln!(
        "  Sync budgets:     full {}s / incremental {}s, cadence {} min",
        config.performance.full_extract_time_limit_secs,
        config.performance.incremental_sync_time_limit_secs,
        config.performance.sync_frequency_minutes
    );
}
