//! Continuous monitoring mode
//!
//! Runs generation on two plain threads: a generation cadence that
//! simulates one day per tick (HR lifecycle steps, routine access, anomaly
//! injection) and a sync cadence that drains the account-mutation journal
//! into incremental batches. Both share the registry behind a mutex; the
//! sync checkpoint only moves once a batch is fully assembled, so stopping
//! mid-cycle never loses or double-counts journal entries.

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};
use tracing::{info, warn};

use crate::access::{AccessLogGenerator, AccessRecord, AnomalyInjector, ViolationRecord};
use crate::employee::{CohortGenerator, EmployeeRegistry};
use crate::hr::{HrProcessSimulator, HrStreamRecord};
use crate::simulation::{Corpus, CorpusStatistics, SimulationError, SimulationResult};
use crate::sync::{SyncBatch, SyncTracker};
use crate::types::SimulationConfig;
use crate::validator::ConsistencyValidator;

/// Default real-time length of one simulated day
const DEFAULT_DAY_TICK: Duration = Duration::from_secs(1);

/// Default real-time cadence of incremental sync batches
const DEFAULT_SYNC_TICK: Duration = Duration::from_secs(5);

/// Shared state both cadence threads work against
#[derive(Debug)]
struct MonitorState {
    registry: EmployeeRegistry,
    hr_stream: Vec<HrStreamRecord>,
    access_stream: Vec<AccessRecord>,
    violation_stream: Vec<ViolationRecord>,
    sync_batches: Vec<SyncBatch>,
    sim_day: usize,
}

/// Handle over a running continuous-mode simulation
#[derive(Debug)]
pub struct MonitorHandle {
    config: Arc<SimulationConfig>,
    stop_flag: Arc<AtomicBool>,
    state: Arc<Mutex<MonitorState>>,
    generation_thread: Option<JoinHandle<()>>,
    sync_thread: Option<JoinHandle<()>>,
}

impl MonitorHandle {
    /// Start continuous mode with the default cadences
    pub fn start(config: SimulationConfig) -> SimulationResult<Self> {
        Self::start_with_cadence(config, DEFAULT_DAY_TICK, DEFAULT_SYNC_TICK)
    }

    /// Start continuous mode with explicit tick lengths
    pub fn start_with_cadence(
        config: SimulationConfig,
        day_tick: Duration,
        sync_tick: Duration,
    ) -> SimulationResult<Self> {
        config.validate()?;
        let config = Arc::new(config);

        let start = Utc::now()
            .date_naive()
            .and_hms_opt(0, 0, 0)
            .map(|dt| dt.and_utc())
            .unwrap_or_else(Utc::now);

        let mut rng: StdRng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let registry = CohortGenerator::new(&config).generate(&mut rng, start);
        info!(employees = registry.employee_count(), "monitor cohort generated");

        let state = Arc::new(Mutex::new(MonitorState {
            registry,
            hr_stream: Vec::new(),
            access_stream: Vec::new(),
            violation_stream: Vec::new(),
            sync_batches: Vec::new(),
            sim_day: 0,
        }));
        let stop_flag = Arc::new(AtomicBool::new(false));

        let generation_thread = spawn_generation_thread(
            Arc::clone(&config),
            Arc::clone(&state),
            Arc::clone(&stop_flag),
            rng,
            start,
            day_tick,
        );
        let sync_thread = spawn_sync_thread(
            Arc::clone(&config),
            Arc::clone(&state),
            Arc::clone(&stop_flag),
            start,
            sync_tick,
        );

        Ok(Self {
            config,
            stop_flag,
            state,
            generation_thread: Some(generation_thread),
            sync_thread: Some(sync_thread),
        })
    }

    /// Number of simulated days completed so far
    pub fn days_simulated(&self) -> usize {
        lock(&self.state).sim_day
    }

    /// Stop both cadences, join them, and assemble the collected corpus
    pub fn stop(mut self) -> SimulationResult<Corpus> {
        self.stop_flag.store(true, Ordering::SeqCst);
        for handle in [self.generation_thread.take(), self.sync_thread.take()].into_iter().flatten()
        {
            if handle.join().is_err() {
                return Err(SimulationError::ValidationError(
                    "monitor worker thread panicked".to_string(),
                ));
            }
        }

        let state = Arc::try_unwrap(self.state)
            .map_err(|_| {
                SimulationError::ValidationError("monitor state still shared after join".into())
            })?
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);

        let MonitorState {
            registry,
            mut hr_stream,
            mut access_stream,
            mut violation_stream,
            sync_batches,
            sim_day,
        } = state;

        hr_stream.sort_by_key(|r| (r.timestamp(), r.employee_id()));
        access_stream.sort_by_key(|r| (r.timestamp, r.user_id));
        violation_stream.sort_by_key(|r| (r.timestamp, r.employee_id));

        let report = ConsistencyValidator::new(&self.config).validate(
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
            sim_day,
            Duration::from_secs(0),
        );
        info!(days = sim_day, "monitor stopped, corpus assembled");

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
}

/// Run continuous mode for a wall-clock duration, then stop and collect
pub fn run_monitor_for(
    config: SimulationConfig,
    duration: Duration,
) -> SimulationResult<Corpus> {
    let handle = MonitorHandle::start(config)?;
    thread::sleep(duration);
    handle.stop()
}

fn spawn_generation_thread(
    config: Arc<SimulationConfig>,
    state: Arc<Mutex<MonitorState>>,
    stop_flag: Arc<AtomicBool>,
    mut rng: StdRng,
    start: DateTime<Utc>,
    day_tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let hr_sim = HrProcessSimulator::new(&config);
        let access_gen = AccessLogGenerator::new(&config);
        let mut injector = AnomalyInjector::new(&config);

        let mut hr_run = {
            let mut guard = lock(&state);
            let plans = hr_sim.plan_exits(&guard.registry, &mut rng, start);
            let (run, records) = hr_sim.start_run(&mut guard.registry, &plans, &mut rng, start);
            guard.hr_stream.extend(records);
            run
        };

        while !stop_flag.load(Ordering::SeqCst) {
            {
                let mut guard = lock(&state);
                let day_start = start + ChronoDuration::days(guard.sim_day as i64);
                let day_end = day_start + ChronoDuration::days(1);

                let hr = hr_sim.advance(&mut hr_run, &mut guard.registry, day_end, &mut rng);
                guard.hr_stream.extend(hr);

                let access = access_gen.generate_day(&mut guard.registry, day_start, &mut rng);
                guard.access_stream.extend(access);

                let anomalies = injector.inject_day(&mut guard.registry, day_start, &mut rng);
                guard.access_stream.extend(anomalies.access);
                guard.violation_stream.extend(anomalies.violations);

                guard.sim_day += 1;
            }
            sleep_until_stopped(&stop_flag, day_tick);
        }
    })
}

fn spawn_sync_thread(
    config: Arc<SimulationConfig>,
    state: Arc<Mutex<MonitorState>>,
    stop_flag: Arc<AtomicBool>,
    start: DateTime<Utc>,
    sync_tick: Duration,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut tracker = SyncTracker::new(&config);

        {
            let mut guard = lock(&state);
            let batch = tracker.run_full_extract(&guard.registry, start);
            guard.sync_batches.push(batch);
        }

        loop {
            let stopped = sleep_until_stopped(&stop_flag, sync_tick);

            let mut guard = lock(&state);
            let now = start + ChronoDuration::days(guard.sim_day as i64);
            let batch = tracker.run_incremental_sync(&guard.registry, now);
            if batch.record_count() > 0 {
                guard.sync_batches.push(batch);
            }
            if tracker.is_degraded() {
                warn!("sync tracker degraded, incremental budget overrun");
            }
            if stopped {
                // Final drain already ran above; in-flight journal entries
                // are either in this batch or left beyond the checkpoint
                break;
            }
        }
    })
}

fn lock(state: &Mutex<MonitorState>) -> std::sync::MutexGuard<'_, MonitorState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Sleep in short slices so a stop request is honored promptly
///
/// Returns true when the stop flag was raised during the sleep.
fn sleep_until_stopped(stop_flag: &AtomicBool, duration: Duration) -> bool {
    let deadline = Instant::now() + duration;
    while Instant::now() < deadline {
        if stop_flag.load(Ordering::SeqCst) {
            return true;
        }
        thread::sleep(Duration::from_millis(5).min(duration));
    }
    stop_flag.load(Ordering::SeqCst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SyncBatchType;

    fn monitor_config(seed: u64) -> SimulationConfig {
        SimulationConfig {
            employee_count: 30,
            resigning_count: 4,
            days: 10,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn test_monitor_collects_a_corpus() {
        let handle = MonitorHandle::start_with_cadence(
            monitor_config(21),
            Duration::from_millis(10),
            Duration::from_millis(25),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(120));
        let corpus = handle.stop().unwrap();

        assert!(corpus.statistics.days_simulated > 0);
        assert!(!corpus.access_stream.is_empty());
        assert!(!corpus.sync_batches.is_empty());
        assert_eq!(corpus.sync_batches[0].batch_type, SyncBatchType::Full);
    }

    #[test]
    fn test_monitor_batches_never_overlap() {
        let handle = MonitorHandle::start_with_cadence(
            monitor_config(22),
            Duration::from_millis(10),
            Duration::from_millis(20),
        )
        .unwrap();
        thread::sleep(Duration::from_millis(150));
        let corpus = handle.stop().unwrap();

        let incrementals: Vec<_> = corpus
            .sync_batches
            .iter()
            .filter(|b| b.batch_type == SyncBatchType::Incremental)
            .collect();
        for pair in incrementals.windows(2) {
            assert!(pair[0].range_end_seq <= pair[1].range_start_seq);
        }
    }

    #[test]
    fn test_stop_is_prompt() {
        let handle = MonitorHandle::start_with_cadence(
            monitor_config(23),
            Duration::from_secs(30),
            Duration::from_secs(30),
        )
        .unwrap();
        let clock = Instant::now();
        handle.stop().unwrap();
        assert!(clock.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn test_invalid_config_rejected_before_spawn() {
        let mut config = monitor_config(24);
        config.days = 0;
        assert!(MonitorHandle::start(config).is_err());
    }
}
