//! Demo corpus orchestration
//!
//! Runs the one-shot pipeline: cohort synthesis, exit planning, the
//! interleaved day loop (HR lifecycle steps, routine access, anomaly
//! injection, daily incremental sync), final merge, validation and
//! statistics. Per-employee timelines are independent and every stream is
//! merge-sorted on (timestamp, employee id), so the same seed yields the
//! same corpus.

use chrono::{DateTime, Duration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, instrument};

use crate::access::{AccessLogGenerator, AccessRecord, AnomalyInjector, ViolationRecord};
use crate::employee::{CohortGenerator, EmployeeRegistry};
use crate::hr::{HrProcessSimulator, HrStreamRecord};
use crate::simulation::{CorpusStatistics, RecordSink, SimulationError, SimulationResult};
use crate::sync::{SyncBatch, SyncTracker};
use crate::types::SimulationConfig;
use crate::validator::{ConsistencyValidator, ValidationReport};

/// A fully assembled offboarding corpus
#[derive(Debug)]
pub struct Corpus {
    /// Final registry state, including the account-mutation journal
    pub registry: EmployeeRegistry,
    /// HR stream: lifecycle events, onboarding registrations, transfers
    pub hr_stream: Vec<HrStreamRecord>,
    /// Access stream: routine sessions plus injected anomaly episodes
    pub access_stream: Vec<AccessRecord>,
    /// Post-exit violation alerts
    pub violation_stream: Vec<ViolationRecord>,
    /// Data-sync batches with lineage back into the journal
    pub sync_batches: Vec<SyncBatch>,
    /// Consistency validation report over the assembled streams
    pub report: ValidationReport,
    /// Corpus-level counters
    pub statistics: CorpusStatistics,
}

impl Corpus {
    /// Write every stream through the sink, JSON lines plus text lines
    ///
    /// Records the sink's drop count into the statistics before they are
    /// written, so the persisted counters reflect the actual output.
    pub fn write_to(&mut self, sink: &mut RecordSink) -> SimulationResult<()> {
        sink.write_jsonl("hr_events", &self.hr_stream)?;
        sink.write_text(
            "hr_events",
            &self.hr_stream.iter().map(|r| r.text_line()).collect::<Vec<_>>(),
        )?;

        sink.write_jsonl("access_log", &self.access_stream)?;
        sink.write_text(
            "access_log",
            &self.access_stream.iter().map(|r| r.text_line()).collect::<Vec<_>>(),
        )?;

        sink.write_jsonl("violation_alerts", &self.violation_stream)?;
        sink.write_text(
            "violation_alerts",
            &self.violation_stream.iter().map(|r| r.text_line()).collect::<Vec<_>>(),
        )?;

        sink.write_jsonl("sync_batches", &self.sync_batches)?;
        sink.write_text(
            "sync_batches",
            &self.sync_batches.iter().map(|b| b.text_line()).collect::<Vec<_>>(),
        )?;

        sink.write_jsonl("validation_report", std::slice::from_ref(&self.report))?;

        self.statistics.dropped_records = sink.dropped_records();
        sink.write_jsonl("statistics", std::slice::from_ref(&self.statistics))?;

        // Registry snapshot, so a written corpus can be revalidated later
        sink.write_jsonl("registry", std::slice::from_ref(&self.registry))?;
        Ok(())
    }
}

/// Load a previously written corpus from its stream files
///
/// The report and statistics are recomputed over the loaded streams rather
/// than trusted from disk.
pub fn load_corpus(config: &SimulationConfig, dir: &Path) -> SimulationResult<Corpus> {
    let mut registry: EmployeeRegistry = read_single_json(dir, "registry")?;
    registry.rebuild_index();

    let hr_stream: Vec<HrStreamRecord> = read_jsonl(dir, "hr_events")?;
    let access_stream: Vec<AccessRecord> = read_jsonl(dir, "access_log")?;
    let violation_stream: Vec<ViolationRecord> = read_jsonl(dir, "violation_alerts")?;
    let sync_batches: Vec<SyncBatch> = read_jsonl(dir, "sync_batches")?;

    let report = ConsistencyValidator::new(config).validate(
        &registry,
        &hr_stream,
        &access_stream,
        &violation_stream,
        &sync_batches,
    );
    let statistics = CorpusStatistics::collect(
        &registry,
        &hr_stream,
        &access_stream,
        &violation_stream,
        &sync_batches,
        &report,
        config.days,
        std::time::Duration::from_secs(0),
    );

    Ok(Corpus {
        registry,
        hr_stream,
        access_stream,
        violation_stream,
        sync_batches,
        report,
        statistics,
    })
}

fn read_jsonl<T: serde::de::DeserializeOwned>(dir: &Path, stream: &str) -> SimulationResult<Vec<T>> {
    let content = std::fs::read_to_string(dir.join(format!("{stream}.jsonl")))?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(Into::into))
        .collect()
}

fn read_single_json<T: serde::de::DeserializeOwned>(dir: &Path, stream: &str) -> SimulationResult<T> {
    let mut records: Vec<T> = read_jsonl(dir, stream)?;
    records.pop().ok_or_else(|| {
        SimulationError::ValidationError(format!("{stream}.jsonl holds no record"))
    })
}

/// Generate a demo corpus covering the configured window, ending today
pub fn generate_demo_corpus(config: &SimulationConfig) -> SimulationResult<Corpus> {
    let today = Utc::now().date_naive();
    let start = (today - chrono::Days::new(config.days as u64))
        .and_hms_opt(0, 0, 0)
        .map(|dt| dt.and_utc())
        .unwrap_or_else(Utc::now);
    generate_demo_corpus_from(config, start)
}

/// Generate a demo corpus anchored at an explicit window start
#[instrument(skip(config), fields(employees = config.employee_count, days = config.days))]
pub fn generate_demo_corpus_from(
    config: &SimulationConfig,
    start: DateTime<Utc>,
) -> SimulationResult<Corpus> {
    config.validate()?;
    let clock = Instant::now();

    let mut rng: StdRng = match config.seed {
        Some(seed) => {
            info!(seed, "using deterministic seed");
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };

    let mut registry = CohortGenerator::new(config).generate(&mut rng, start);
    info!(employees = registry.employee_count(), "cohort generated");

    let hr_sim = HrProcessSimulator::new(config);
    let plans = hr_sim.plan_exits(&registry, &mut rng, start);
    let (mut hr_run, mut hr_stream) = hr_sim.start_run(&mut registry, &plans, &mut rng, start);

    let mut tracker = SyncTracker::new(config);
    let mut sync_batches = vec![tracker.run_full_extract(&registry, start)];

    let access_gen = AccessLogGenerator::new(config);
    let mut anomaly_injector = AnomalyInjector::new(config);
    let mut access_stream: Vec<AccessRecord> = Vec::new();
    let mut violation_stream: Vec<ViolationRecord> = Vec::new();

    for day in 0..config.days {
        let day_start = start + Duration::days(day as i64);
        let day_end = day_start + Duration::days(1);

        // Lifecycle first, so the day's access sees each employee in the
        // state they held once that day's HR steps had run
        hr_stream.extend(hr_sim.advance(&mut hr_run, &mut registry, day_end, &mut rng));

        access_stream.extend(access_gen.generate_day(&mut registry, day_start, &mut rng));

        let anomalies = anomaly_injector.inject_day(&mut registry, day_start, &mut rng);
        access_stream.extend(anomalies.access);
        violation_stream.extend(anomalies.violations);

        let batch = tracker.run_incremental_sync(&registry, day_end);
        if batch.record_count() > 0 {
            sync_batches.push(batch);
        }
        debug!(day, access = access_stream.len(), "day simulated");
    }

    hr_stream.sort_by_key(|r| (r.timestamp(), r.employee_id()));
    access_stream.sort_by_key(|r| (r.timestamp, r.user_id));
    violation_stream.sort_by_key(|r| (r.timestamp, r.employee_id));

    let report = ConsistencyValidator::new(config).validate(
        &registry,
        &hr_stream,
        &access_stream,
        &violation_stream,
        &sync_batches,
    );
    info!(findings = report.findings.len(), "corpus validated");

    let statistics = CorpusStatistics::collect(
        &registry,
        &hr_stream,
        &access_stream,
        &violation_stream,
        &sync_batches,
        &report,
        config.days,
        clock.elapsed(),
    );
    info!("{}", statistics.summary());

    Ok(Corpus {
        registry,
        hr_stream,
        access_stream,
        violation_stream,
        sync_batches,
        report,
        statistics,
    })
}

/// Re-run the consistency checks over an assembled corpus
pub fn validate_corpus(config: &SimulationConfig, corpus: &Corpus) -> ValidationReport {
    ConsistencyValidator::new(config).validate(
        &corpus.registry,
        &corpus.hr_stream,
        &corpus.access_stream,
        &corpus.violation_stream,
        &corpus.sync_batches,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SyncBatchType;
    use chrono::TimeZone;

    fn small_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            employee_count: 50,
            resigning_count: 6,
            days: 21,
            seed: Some(seed),
            ..Default::default()
        }
    }

    fn fixed_start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 0, 0, 0).unwrap()
    }

    #[test]
    fn test_corpus_covers_every_stream() {
        let config = small_config(11);
        let corpus = generate_demo_corpus_from(&config, fixed_start()).unwrap();

        assert!(!corpus.hr_stream.is_empty());
        assert!(!corpus.access_stream.is_empty());
        assert!(!corpus.sync_batches.is_empty());
        assert_eq!(corpus.sync_batches[0].batch_type, SyncBatchType::Full);
        assert!(corpus.statistics.access_records > corpus.statistics.hr_records);
    }

    #[test]
    fn test_streams_are_sorted() {
        let config = small_config(12);
        let corpus = generate_demo_corpus_from(&config, fixed_start()).unwrap();

        assert!(corpus
            .hr_stream
            .windows(2)
            .all(|w| (w[0].timestamp(), w[0].employee_id()) <= (w[1].timestamp(), w[1].employee_id())));
        assert!(corpus
            .access_stream
            .windows(2)
            .all(|w| (w[0].timestamp, w[0].user_id) <= (w[1].timestamp, w[1].user_id)));
    }

    #[test]
    fn test_same_seed_same_corpus() {
        let a = generate_demo_corpus_from(&small_config(13), fixed_start()).unwrap();
        let b = generate_demo_corpus_from(&small_config(13), fixed_start()).unwrap();

        assert_eq!(a.hr_stream.len(), b.hr_stream.len());
        assert_eq!(a.access_stream.len(), b.access_stream.len());
        assert_eq!(a.violation_stream.len(), b.violation_stream.len());
        assert_eq!(a.sync_batches.len(), b.sync_batches.len());
        for (x, y) in a.access_stream.iter().zip(&b.access_stream) {
            assert_eq!(x.timestamp, y.timestamp);
            assert_eq!(x.session_id, y.session_id);
            assert_eq!(x.system, y.system);
        }
    }

    #[test]
    fn test_validation_is_idempotent() {
        let config = small_config(14);
        let corpus = generate_demo_corpus_from(&config, fixed_start()).unwrap();

        let again = validate_corpus(&config, &corpus);
        assert_eq!(corpus.report.findings.len(), again.findings.len());
        for (a, b) in corpus.report.findings.iter().zip(&again.findings) {
            assert_eq!(a.message, b.message);
        }
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let mut config = small_config(15);
        config.resigning_count = config.employee_count + 1;
        assert!(generate_demo_corpus_from(&config, fixed_start()).is_err());
    }

    #[test]
    fn test_written_corpus_reloads_and_revalidates() {
        let config = small_config(17);
        let mut corpus = generate_demo_corpus_from(&config, fixed_start()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut sink = RecordSink::new(dir.path().to_str()).unwrap();
        corpus.write_to(&mut sink).unwrap();

        let loaded = load_corpus(&config, dir.path()).unwrap();
        assert_eq!(loaded.hr_stream.len(), corpus.hr_stream.len());
        assert_eq!(loaded.access_stream.len(), corpus.access_stream.len());
        assert_eq!(loaded.sync_batches.len(), corpus.sync_batches.len());
        assert_eq!(loaded.report.findings.len(), corpus.report.findings.len());
    }

    #[test]
    fn test_corpus_written_through_sink() {
        let config = small_config(16);
        let mut corpus = generate_demo_corpus_from(&config, fixed_start()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let mut sink = RecordSink::new(dir.path().to_str()).unwrap();
        corpus.write_to(&mut sink).unwrap();
        assert_eq!(sink.dropped_records(), 0);
        assert_eq!(corpus.statistics.dropped_records, sink.dropped_records());

        for name in
            ["hr_events.jsonl", "access_log.jsonl", "violation_alerts.jsonl", "sync_batches.jsonl"]
        {
            assert!(dir.path().join(name).is_file(), "missing {name}");
        }
    }
}
