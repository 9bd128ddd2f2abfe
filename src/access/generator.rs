//! Routine access log generation
//!
//! This module produces the day-to-day access activity of the cohort. The
//! closed-world rule holds throughout: every session runs on a system the
//! employee holds a usable binding for, and timestamps within a session are
//! strictly increasing by construction.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};
use rand::Rng;
use tracing::debug;

use crate::access::{AccessRecord, DeviceProfile};
use crate::employee::EmployeeRegistry;
use crate::types::{AccessAction, AccessResult, SessionId, SimulationConfig};

/// Probability an employee works on a weekday
const WEEKDAY_WORK_PROBABILITY: f64 = 0.9;

/// Probability an employee logs in on a weekend
const WEEKEND_WORK_PROBABILITY: f64 = 0.12;

/// Generates routine per-day access activity
#[derive(Debug)]
pub struct AccessLogGenerator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> AccessLogGenerator<'a> {
    /// Create a generator over the given configuration
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Generate one day of routine activity for the whole cohort
    ///
    /// Also advances every employee's quiet-day risk decay. Employees with
    /// no usable binding (post-exit, fully revoked) generate nothing here;
    /// their only possible activity comes from the anomaly injector.
    pub fn generate_day<R: Rng>(
        &self,
        registry: &mut EmployeeRegistry,
        day_start: DateTime<Utc>,
        rng: &mut R,
    ) -> Vec<AccessRecord> {
        let work_probability = match day_start.weekday() {
            Weekday::Sat | Weekday::Sun => WEEKEND_WORK_PROBABILITY,
            _ => WEEKDAY_WORK_PROBABILITY,
        };

        let mut records = Vec::new();
        let mut session_budget = self.config.performance.max_concurrent_sessions;

        for employee in registry.employees_mut() {
            employee.risk.advance_day();

            // Mid-window hires start generating the day after their hire
            // moment, so no access can precede the hire date
            if employee.hire_date > day_start {
                continue;
            }
            let systems: Vec<String> =
                employee.usable_systems().iter().map(|s| s.to_string()).collect();
            if systems.is_empty() || !rng.gen_bool(work_probability) {
                continue;
            }

            // Activity winds down once the offboarding process is in flight
            let max_sessions = if employee.is_offboarding() { 2 } else { 3 };
            let session_count = rng.gen_range(1..=max_sessions.min(systems.len()));

            let profile = DeviceProfile::for_employee(employee.id);
            let risk_score = employee.risk_score();

            for _ in 0..session_count {
                if session_budget == 0 {
                    debug!(day = %day_start.date_naive(), "daily session budget exhausted");
                    break;
                }
                session_budget -= 1;

                let system = systems[rng.gen_range(0..systems.len())].clone();
                records.extend(generate_session(
                    employee.id,
                    &system,
                    &profile,
                    risk_score,
                    day_start,
                    rng,
                ));
            }
        }

        records.sort_by_key(|r| (r.timestamp, r.user_id));
        records
    }
}

/// One login/operations/logout sequence on a single system
fn generate_session<R: Rng>(
    user_id: crate::types::EmployeeId,
    system: &str,
    profile: &DeviceProfile,
    risk_score: f64,
    day_start: DateTime<Utc>,
    rng: &mut R,
) -> Vec<AccessRecord> {
    let session_id = SessionId::from_bits(rng.gen());
    let mut at = day_start
        + Duration::hours(rng.gen_range(8..=10))
        + Duration::minutes(rng.gen_range(0..60));

    let record = |at: DateTime<Utc>, action: AccessAction, data_volume: u64| AccessRecord {
        timestamp: at,
        session_id,
        user_id,
        system: system.to_string(),
        action,
        result: AccessResult::Success,
        data_volume,
        ip_address: profile.ip_address.clone(),
        geolocation: profile.geolocation.clone(),
        device_fingerprint: profile.device_fingerprint.clone(),
        is_suspicious: false,
        risk_score,
    };

    let mut records = vec![record(at, AccessAction::Login, 0)];

    for _ in 0..rng.gen_range(1..=5) {
        at += Duration::minutes(rng.gen_range(1..=20));
        let action = draw_action(rng);
        let volume = match action {
            AccessAction::FileAccess | AccessAction::DataQuery => rng.gen_range(1..=50),
            AccessAction::DataModify => rng.gen_range(0..=5),
            _ => 0,
        };
        records.push(record(at, action, volume));
    }

    at += Duration::minutes(rng.gen_range(1..=30));
    records.push(record(at, AccessAction::Logout, 0));
    records
}

fn draw_action<R: Rng>(rng: &mut R) -> AccessAction {
    let roll: f64 = rng.gen();
    if roll < 0.35 {
        AccessAction::FileAccess
    } else if roll < 0.70 {
        AccessAction::DataQuery
    } else if roll < 0.90 {
        AccessAction::DataModify
    } else {
        AccessAction::PermissionOp
    }
}
