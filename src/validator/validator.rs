//! Cross-stream consistency validation
//!
//! Four checks run over a finished corpus: user linkage, temporal ordering,
//! process rules, and the access-to-HR volume ratio. The validator never
//! fails fast; it accumulates every finding it can see and returns them in a
//! deterministic order, so running it twice over the same corpus yields the
//! same report.

use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tracing::info;

use crate::access::{AccessRecord, ViolationRecord};
use crate::employee::EmployeeRegistry;
use crate::hr::HrStreamRecord;
use crate::sync::SyncBatch;
use crate::types::{
    AccessAction, AccessResult, EmployeeId, FindingCategory, FindingSeverity, HrEventType,
    SessionId, SimulationConfig,
};
use crate::validator::{ValidationFinding, ValidationReport};

/// Relative order of lifecycle events within one employee's timeline
fn event_rank(event: HrEventType) -> u8 {
    match event {
        HrEventType::ResignationSubmitted => 0,
        HrEventType::Terminated => 1,
        HrEventType::HandoverStarted => 1,
        HrEventType::PermissionRevoked => 2,
        HrEventType::HandoverCompleted => 3,
        HrEventType::Closed => 4,
    }
}

/// Runs the consistency checks over a finished corpus
#[derive(Debug)]
pub struct ConsistencyValidator<'a> {
    config: &'a SimulationConfig,
}

impl<'a> ConsistencyValidator<'a> {
    /// Create a validator over the given configuration
    pub fn new(config: &'a SimulationConfig) -> Self {
        Self { config }
    }

    /// Validate every stream against the registry
    pub fn validate(
        &self,
        registry: &EmployeeRegistry,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        violations: &[ViolationRecord],
        batches: &[SyncBatch],
    ) -> ValidationReport {
        let mut findings = Vec::new();

        self.check_user_links(registry, hr, access, violations, batches, &mut findings);
        self.check_temporal_order(registry, hr, access, &mut findings);
        self.check_process_rules(registry, hr, access, &mut findings);
        self.check_volume_ratio(hr, access, &mut findings);

        findings.sort_by(|a, b| {
            (a.category as u8, a.employee_id, a.message.clone()).cmp(&(
                b.category as u8,
                b.employee_id,
                b.message.clone(),
            ))
        });

        let records_checked = hr.len()
            + access.len()
            + violations.len()
            + batches.iter().map(|b| b.record_count()).sum::<usize>();

        info!(records_checked, findings = findings.len(), "validation pass finished");
        ValidationReport { findings, records_checked }
    }

    /// Every employee reference in every stream must resolve
    fn check_user_links(
        &self,
        registry: &EmployeeRegistry,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        violations: &[ViolationRecord],
        batches: &[SyncBatch],
        findings: &mut Vec<ValidationFinding>,
    ) {
        let mut report = |id: EmployeeId, stream: &str| {
            if !registry.resolves(id) {
                findings.push(ValidationFinding {
                    category: FindingCategory::UserLink,
                    severity: FindingSeverity::Error,
                    employee_id: Some(id),
                    message: format!("unresolved employee id on the {} stream", stream),
                });
            }
        };

        for record in hr {
            report(record.employee_id(), "hr");
            if let HrStreamRecord::Transfer(t) = record {
                report(t.successor_id, "hr");
            }
        }
        for record in access {
            report(record.user_id, "access");
        }
        for record in violations {
            report(record.employee_id, "violation");
        }
        for batch in batches {
            for record in &batch.records {
                report(record.employee_id, "sync");
            }
        }
    }

    /// Session ordering and hire-date precedence
    fn check_temporal_order(
        &self,
        registry: &EmployeeRegistry,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        findings: &mut Vec<ValidationFinding>,
    ) {
        // Per session: the last timestamp seen and whether a login has happened
        let mut sessions: HashMap<SessionId, (DateTime<Utc>, bool)> = HashMap::new();
        for record in access {
            let seen = sessions.get(&record.session_id).copied();
            let seen_login = seen.map(|(_, login)| login).unwrap_or(false);

            if let Some((previous, _)) = seen {
                if record.timestamp <= previous {
                    findings.push(ValidationFinding {
                        category: FindingCategory::TemporalOrder,
                        severity: FindingSeverity::Error,
                        employee_id: Some(record.user_id),
                        message: format!(
                            "session {} not strictly increasing at {}",
                            record.session_id, record.timestamp
                        ),
                    });
                }
            }

            // A logout only closes a session that was opened by a login
            if record.action == AccessAction::Logout && !seen_login {
                findings.push(ValidationFinding {
                    category: FindingCategory::TemporalOrder,
                    severity: FindingSeverity::Error,
                    employee_id: Some(record.user_id),
                    message: format!(
                        "session {} logs out at {} before any login",
                        record.session_id, record.timestamp
                    ),
                });
            }

            sessions.insert(
                record.session_id,
                (record.timestamp, seen_login || record.action == AccessAction::Login),
            );

            if let Some(employee) = registry.get(record.user_id) {
                if record.timestamp < employee.hire_date {
                    findings.push(ValidationFinding {
                        category: FindingCategory::TemporalOrder,
                        severity: FindingSeverity::Error,
                        employee_id: Some(record.user_id),
                        message: format!(
                            "access at {} precedes hire date {}",
                            record.timestamp, employee.hire_date
                        ),
                    });
                }
            }
        }

        // Lifecycle events must advance monotonically per employee
        let mut last_rank: HashMap<EmployeeId, u8> = HashMap::new();
        for record in hr {
            let HrStreamRecord::Lifecycle(rec) = record else { continue };
            let rank = event_rank(rec.action);
            if let Some(&previous) = last_rank.get(&rec.employee_id) {
                if rank < previous {
                    findings.push(ValidationFinding {
                        category: FindingCategory::TemporalOrder,
                        severity: FindingSeverity::Error,
                        employee_id: Some(rec.employee_id),
                        message: format!("lifecycle event {} regresses the process", rec.action),
                    });
                }
            }
            last_rank.insert(rec.employee_id, rank);
        }
    }

    /// Process rules: revocation aftermath and the closed-world flag rule
    fn check_process_rules(
        &self,
        registry: &EmployeeRegistry,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        findings: &mut Vec<ValidationFinding>,
    ) {
        let mut revoked_at: HashMap<EmployeeId, DateTime<Utc>> = HashMap::new();
        let mut handover_at: HashMap<EmployeeId, DateTime<Utc>> = HashMap::new();
        for record in hr {
            let HrStreamRecord::Lifecycle(rec) = record else { continue };
            match rec.action {
                HrEventType::PermissionRevoked => {
                    revoked_at.entry(rec.employee_id).or_insert(rec.timestamp);
                }
                // Either event opens the phase in which revocation is allowed
                HrEventType::HandoverStarted | HrEventType::Terminated => {
                    let at = handover_at.entry(rec.employee_id).or_insert(rec.timestamp);
                    *at = (*at).min(rec.timestamp);
                }
                _ => {}
            }
        }

        // Revocation must not happen before the handover phase has begun
        for (&employee_id, &revoked) in &revoked_at {
            let premature = match handover_at.get(&employee_id) {
                Some(&opened) => revoked < opened,
                None => true,
            };
            if premature {
                findings.push(ValidationFinding {
                    category: FindingCategory::ProcessRule,
                    severity: FindingSeverity::Error,
                    employee_id: Some(employee_id),
                    message: format!(
                        "permissions revoked at {} before handover or termination",
                        revoked
                    ),
                });
            }
        }

        for record in access {
            // Successful routine access after revocation breaks the process
            if let Some(&cutoff) = revoked_at.get(&record.user_id) {
                if record.timestamp > cutoff
                    && record.result == AccessResult::Success
                    && !record.is_suspicious
                {
                    findings.push(ValidationFinding {
                        category: FindingCategory::ProcessRule,
                        severity: FindingSeverity::Error,
                        employee_id: Some(record.user_id),
                        message: format!(
                            "unflagged successful access to {} after revocation at {}",
                            record.system, cutoff
                        ),
                    });
                }
            }

            // Out-of-baseline access must always carry the suspicious flag
            if let Some(employee) = registry.get(record.user_id) {
                if !employee.has_binding(&record.system) && !record.is_suspicious {
                    findings.push(ValidationFinding {
                        category: FindingCategory::ProcessRule,
                        severity: FindingSeverity::Error,
                        employee_id: Some(record.user_id),
                        message: format!("unflagged out-of-baseline access to {}", record.system),
                    });
                }
            }
        }
    }

    /// The access stream should dwarf the HR stream, within a plausible band
    fn check_volume_ratio(
        &self,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        findings: &mut Vec<ValidationFinding>,
    ) {
        if hr.is_empty() {
            return;
        }
        let ratio = access.len() as f64 / hr.len() as f64;
        if ratio < self.config.volume_ratio_min || ratio > self.config.volume_ratio_max {
            findings.push(ValidationFinding {
                category: FindingCategory::VolumeRatio,
                severity: FindingSeverity::Warning,
                employee_id: None,
                message: format!(
                    "access:hr ratio {:.1} outside plausible band [{:.0}, {:.0}]",
                    ratio, self.config.volume_ratio_min, self.config.volume_ratio_max
                ),
            });
        }
    }
}
