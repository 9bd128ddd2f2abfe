//! Two-tier anomaly injection
//!
//! Pre-exit episodes fire for employees whose offboarding is in flight once
//! their risk score clears the configured threshold; the probability rises
//! with the score. Post-exit violations target departed employees during
//! the monitoring window with a probability that decays day by day and a
//! hard cap on attempts per window. Every injected anomaly feeds back into
//! the employee's risk score.

use chrono::{DateTime, Duration, Utc};
use rand::Rng;
use std::collections::HashMap;
use tracing::debug;

use crate::access::event::SUSPICIOUS_ORIGINS;
use crate::access::{AccessRecord, DeviceProfile, ViolationDetails, ViolationRecord};
use crate::employee::{Employee, EmployeeRegistry};
use crate::types::{
    AccessAction, AccessResult, EmployeeId, PostTerminationPattern, PreResignationPattern,
    RiskLevel, SessionId, SimulationConfig,
};

/// Risk contribution of a bulk-download episode
const BULK_DOWNLOAD_RISK: f64 = 0.12;

/// Risk contribution of an access-probing episode
const ACCESS_PROBING_RISK: f64 = 0.10;

/// Risk contribution of a post-exit violation
const VIOLATION_RISK: f64 = 0.15;

/// Anomalies injected for one day
#[derive(Debug, Default)]
pub struct DayAnomalies {
    /// Anomalous access records, merged into the access stream
    pub access: Vec<AccessRecord>,
    /// Violation alerts, written to their own stream
    pub violations: Vec<ViolationRecord>,
}

/// Injects pre-exit episodes and post-exit violations
#[derive(Debug)]
pub struct AnomalyInjector<'a> {
    config: &'a SimulationConfig,
    /// Violation attempts per employee within the monitoring window
    attempts: HashMap<EmployeeId, usize>,
}

impl<'a> AnomalyInjector<'a> {
    /// Create an injector over the given configuration
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config, attempts: HashMap::new() }
    }

    /// Inject anomalies for one day across the cohort
    pub fn inject_day<R: Rng>(
        &mut self,
        registry: &mut EmployeeRegistry,
        day_start: DateTime<Utc>,
        rng: &mut R,
    ) -> DayAnomalies {
        let mut out = DayAnomalies::default();

        for employee in registry.employees_mut() {
            if employee.state.is_pre_exit() && employee.is_offboarding() {
                self.try_pre_exit_episode(employee, day_start, rng, &mut out);
            } else if employee.state.is_post_exit() {
                self.try_post_exit_violation(employee, day_start, rng, &mut out);
            }
        }

        out.access.sort_by_key(|r| (r.timestamp, r.user_id));
        out.violations.sort_by_key(|r| (r.timestamp, r.employee_id));
        out
    }

    fn try_pre_exit_episode<R: Rng>(
        &self,
        employee: &mut Employee,
        day_start: DateTime<Utc>,
        rng: &mut R,
        out: &mut DayAnomalies,
    ) {
        let risk = employee.risk_score();
        if risk <= self.config.anomaly.risk_threshold {
            return;
        }
        let probability = ((risk - self.config.anomaly.risk_threshold)
            * self.config.anomaly.episode_probability_scale)
            .min(self.config.anomaly.max_episode_probability);
        if !rng.gen_bool(probability) {
            return;
        }

        let pattern = pick_weighted(&self.config.anomaly_catalog.pre_resignation, rng);
        debug!(employee = %employee.id, %pattern, "pre-exit episode injected");
        match pattern {
            PreResignationPattern::BulkDownload => {
                self.emit_bulk_download(employee, day_start, rng, out)
            }
            PreResignationPattern::AccessProbing => {
                self.emit_access_probing(employee, day_start, rng, out)
            }
        }
    }

    /// Large off-routine downloads on a system the employee legitimately uses
    fn emit_bulk_download<R: Rng>(
        &self,
        employee: &mut Employee,
        day_start: DateTime<Utc>,
        rng: &mut R,
        out: &mut DayAnomalies,
    ) {
        let systems: Vec<String> =
            employee.usable_systems().iter().map(|s| s.to_string()).collect();
        let Some(system) = systems.get(rng.gen_range(0..systems.len().max(1))).cloned() else {
            return;
        };

        employee.risk.record_anomaly(BULK_DOWNLOAD_RISK);
        let risk_score = employee.risk_score();
        let profile = DeviceProfile::for_employee(employee.id);
        let session_id = SessionId::from_bits(rng.gen());

        // Evening burst, outside the usual working hours
        let mut at = day_start
            + Duration::hours(rng.gen_range(19..=22))
            + Duration::minutes(rng.gen_range(0..60));
        for _ in 0..rng.gen_range(3..=6) {
            out.access.push(AccessRecord {
                timestamp: at,
                session_id,
                user_id: employee.id,
                system: system.clone(),
                action: AccessAction::FileAccess,
                result: AccessResult::Success,
                data_volume: rng.gen_range(300..=1500),
                ip_address: profile.ip_address.clone(),
                geolocation: profile.geolocation.clone(),
                device_fingerprint: profile.device_fingerprint.clone(),
                is_suspicious: true,
                risk_score,
            });
            at += Duration::minutes(rng.gen_range(2..=8));
        }
    }

    /// Probing systems outside the role baseline; always flagged
    fn emit_access_probing<R: Rng>(
        &self,
        employee: &mut Employee,
        day_start: DateTime<Utc>,
        rng: &mut R,
        out: &mut DayAnomalies,
    ) {
        let targets = self.config.systems.off_baseline_systems(employee.role);
        if targets.is_empty() {
            return;
        }

        employee.risk.record_anomaly(ACCESS_PROBING_RISK);
        let risk_score = employee.risk_score();
        let profile = DeviceProfile::for_employee(employee.id);
        let session_id = SessionId::from_bits(rng.gen());

        let mut at = day_start
            + Duration::hours(rng.gen_range(11..=17))
            + Duration::minutes(rng.gen_range(0..60));
        for i in 0..rng.gen_range(2..=5) {
            let action =
                if i % 2 == 0 { AccessAction::PermissionOp } else { AccessAction::DataQuery };
            out.access.push(AccessRecord {
                timestamp: at,
                session_id,
                user_id: employee.id,
                system: targets[rng.gen_range(0..targets.len())].clone(),
                action,
                result: AccessResult::Denied,
                data_volume: 0,
                ip_address: profile.ip_address.clone(),
                geolocation: profile.geolocation.clone(),
                device_fingerprint: profile.device_fingerprint.clone(),
                is_suspicious: true,
                risk_score,
            });
            at += Duration::minutes(rng.gen_range(1..=5));
        }
    }

    fn try_post_exit_violation<R: Rng>(
        &mut self,
        employee: &mut Employee,
        day_start: DateTime<Utc>,
        rng: &mut R,
        out: &mut DayAnomalies,
    ) {
        let Some(days) = employee.days_since_exit(day_start + Duration::hours(12)) else {
            return;
        };
        if days < 0 || days > self.config.anomaly.monitoring_window_days {
            return;
        }
        let attempts = self.attempts.entry(employee.id).or_insert(0);
        if *attempts >= self.config.anomaly.max_attempts_per_window {
            return;
        }

        let mut probability = self.config.anomaly.violation_base_probability
            * self.config.anomaly.violation_daily_decay.powi(days as i32);
        if days > self.config.anomaly.grace_period_days {
            probability *= 0.5;
        }
        if !rng.gen_bool(probability.clamp(0.0, 1.0)) {
            return;
        }
        *attempts += 1;

        let pattern = pick_weighted(&self.config.anomaly_catalog.post_termination, rng);
        employee.risk.record_anomaly(VIOLATION_RISK);
        let risk_score = employee.risk_score();

        let (source_ip, origin) = SUSPICIOUS_ORIGINS[rng.gen_range(0..SUSPICIOUS_ORIGINS.len())];
        let system = employee
            .bindings
            .get(rng.gen_range(0..employee.bindings.len().max(1)))
            .map(|b| b.system.clone())
            .unwrap_or_else(|| "VPN".to_string());

        let (at, attempt_count, result) = match pattern {
            PostTerminationPattern::CredentialReuse => (
                day_start
                    + Duration::hours(rng.gen_range(9..=21))
                    + Duration::minutes(rng.gen_range(0..60)),
                rng.gen_range(1..=3),
                AccessResult::Denied,
            ),
            PostTerminationPattern::BruteForcePattern => (
                day_start
                    + Duration::hours(rng.gen_range(0..=23))
                    + Duration::minutes(rng.gen_range(0..60)),
                rng.gen_range(5..=15),
                AccessResult::Failure,
            ),
            PostTerminationPattern::OffHoursAccess => (
                day_start
                    + Duration::hours(rng.gen_range(1..=5))
                    + Duration::minutes(rng.gen_range(0..60)),
                1,
                AccessResult::Denied,
            ),
        };

        debug!(employee = %employee.id, %pattern, days, "post-exit violation injected");

        // Attempted accesses also land on the access stream, all rejected
        let session_id = SessionId::from_bits(rng.gen());
        let burst = (attempt_count as usize).min(6);
        let mut t = at;
        for _ in 0..burst {
            out.access.push(AccessRecord {
                timestamp: t,
                session_id,
                user_id: employee.id,
                system: system.clone(),
                action: AccessAction::Login,
                result,
                data_volume: 0,
                ip_address: source_ip.to_string(),
                geolocation: origin.to_string(),
                device_fingerprint: format!("DEV-unknown-{:04x}", rng.gen::<u16>()),
                is_suspicious: true,
                risk_score,
            });
            t += Duration::seconds(rng.gen_range(5..=90));
        }

        // Alert level ladders with how long ago the employee left
        let risk_level = if days <= self.config.anomaly.grace_period_days {
            RiskLevel::Medium
        } else if days <= self.config.anomaly.monitoring_window_days {
            RiskLevel::High
        } else {
            RiskLevel::Critical
        };

        out.violations.push(ViolationRecord {
            timestamp: at,
            alert_type: ViolationRecord::ALERT_TYPE.to_string(),
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            violation_type: pattern,
            affected_system: system,
            risk_level,
            days_since_resignation: days,
            details: ViolationDetails {
                attempt_count,
                source_ip: source_ip.to_string(),
                geolocation: origin.to_string(),
            },
        });
    }
}

/// Draw from a weighted table; the table must be non-empty
fn pick_weighted<T: Copy, R: Rng>(table: &[(T, f64)], rng: &mut R) -> T {
    let total: f64 = table.iter().map(|(_, w)| w).sum();
    let mut roll = rng.gen::<f64>() * total;
    for (item, weight) in table {
        if roll < *weight {
            return *item;
        }
        roll -= weight;
    }
    table[table.len() - 1].0
}
