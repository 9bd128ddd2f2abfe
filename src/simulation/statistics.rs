//! Statistics collection and reporting
//!
//! This module contains corpus-level statistics collection and reporting.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::access::{AccessRecord, ViolationRecord};
use crate::employee::EmployeeRegistry;
use crate::hr::HrStreamRecord;
use crate::sync::SyncBatch;
use crate::types::RiskLevel;
use crate::validator::ValidationReport;

/// Aggregate statistics for one generated corpus
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusStatistics {
    // Cohort
    /// Total number of employees in the registry, including mid-run hires
    pub total_employees: usize,
    /// Number of employees that left the Active state
    pub offboarded_employees: usize,
    /// Number of employees that took the abrupt Terminated edge
    pub terminated_employees: usize,

    // Risk breakdown at end of run
    /// Employees at critical risk
    pub critical_risk_employees: usize,
    /// Employees at high risk
    pub high_risk_employees: usize,
    /// Employees at medium risk
    pub medium_risk_employees: usize,

    // Streams
    /// Total HR stream records (lifecycle, onboarding and transfer)
    pub hr_records: usize,
    /// Total access stream records
    pub access_records: usize,
    /// Access records flagged suspicious
    pub suspicious_access_records: usize,
    /// Post-exit violation alerts
    pub violation_alerts: usize,
    /// Data-sync batches emitted
    pub sync_batches: usize,
    /// Account records carried across all sync batches
    pub sync_records: usize,
    /// Sync batches that overran their time budget
    pub over_budget_batches: usize,
    /// Records dropped by the output sink after retries; zero until the
    /// corpus has been written
    pub dropped_records: usize,

    // Validation
    /// Total findings reported by the consistency validator
    pub validation_findings: usize,

    // Run metadata
    /// Number of days simulated
    pub days_simulated: usize,
    /// Wall-clock duration of corpus generation
    pub generation_duration: Duration,
}

impl CorpusStatistics {
    /// Collect statistics over a fully assembled corpus
    #[allow(clippy::too_many_arguments)]
    pub fn collect(
        registry: &EmployeeRegistry,
        hr: &[HrStreamRecord],
        access: &[AccessRecord],
        violations: &[ViolationRecord],
        batches: &[SyncBatch],
        report: &ValidationReport,
        days_simulated: usize,
        generation_duration: Duration,
    ) -> Self {
        let mut offboarded = 0;
        let mut terminated = 0;
        let mut critical = 0;
        let mut high = 0;
        let mut medium = 0;
        for employee in registry.employees() {
            if employee.resignation_date.is_some() {
                offboarded += 1;
            }
            if employee.resignation_reason.as_deref() == Some("辞退") {
                terminated += 1;
            }
            match employee.risk_level() {
                RiskLevel::Critical => critical += 1,
                RiskLevel::High => high += 1,
                RiskLevel::Medium => medium += 1,
                RiskLevel::Low => {}
            }
        }

        Self {
            total_employees: registry.employee_count(),
            offboarded_employees: offboarded,
            terminated_employees: terminated,
            critical_risk_employees: critical,
            high_risk_employees: high,
            medium_risk_employees: medium,
            hr_records: hr.len(),
            access_records: access.len(),
            suspicious_access_records: access.iter().filter(|r| r.is_suspicious).count(),
            violation_alerts: violations.len(),
            sync_batches: batches.len(),
            sync_records: batches.iter().map(|b| b.record_count()).sum(),
            over_budget_batches: batches.iter().filter(|b| b.over_budget).count(),
            // Filled in by Corpus::write_to once the sink has run
            dropped_records: 0,
            validation_findings: report.findings.len(),
            days_simulated,
            generation_duration,
        }
    }

    /// Ratio of access stream records to HR stream records
    pub fn access_hr_ratio(&self) -> f64 {
        if self.hr_records == 0 {
            0.0
        } else {
            self.access_records as f64 / self.hr_records as f64
        }
    }

    /// Percentage of access records flagged suspicious
    pub fn suspicious_percentage(&self) -> f64 {
        if self.access_records == 0 {
            0.0
        } else {
            (self.suspicious_access_records as f64 / self.access_records as f64) * 100.0
        }
    }

    /// Generate a one-line summary of the corpus
    pub fn summary(&self) -> String {
        format!(
            "Corpus Summary: {} employees ({} offboarded) over {} days | HR: {} | Access: {} ({:.1}% suspicious) | Violations: {} | Sync: {} batches / {} records | Findings: {}",
            self.total_employees,
            self.offboarded_employees,
            self.days_simulated,
            self.hr_records,
            self.access_records,
            self.suspicious_percentage(),
            self.violation_alerts,
            self.sync_batches,
            self.sync_records,
            self.validation_findings,
        )
    }

    /// Generate a detailed multi-line breakdown of the corpus
    pub fn detailed_breakdown(&self) -> String {
        let mut breakdown = String::new();
        breakdown.push_str("=== Corpus Breakdown ===\n");
        breakdown.push_str(&format!("Days Simulated: {}\n", self.days_simulated));
        breakdown
            .push_str(&format!("Generation Time: {:.2}s\n\n", self.generation_duration.as_secs_f64()));

        breakdown.push_str("Cohort:\n");
        breakdown.push_str(&format!("  Total Employees: {}\n", self.total_employees));
        breakdown.push_str(&format!("  Offboarded: {}\n", self.offboarded_employees));
        breakdown.push_str(&format!("  Terminated: {}\n", self.terminated_employees));
        breakdown.push_str(&format!(
            "  Risk Levels: {} critical, {} high, {} medium\n\n",
            self.critical_risk_employees, self.high_risk_employees, self.medium_risk_employees
        ));

        breakdown.push_str("Streams:\n");
        breakdown.push_str(&format!("  HR Records: {}\n", self.hr_records));
        breakdown.push_str(&format!(
            "  Access Records: {} ({:.1}% suspicious, ratio {:.1}x HR)\n",
            self.access_records,
            self.suspicious_percentage(),
            self.access_hr_ratio()
        ));
        breakdown.push_str(&format!("  Violation Alerts: {}\n", self.violation_alerts));
        breakdown.push_str(&format!(
            "  Sync Batches: {} ({} records, {} over budget)\n",
            self.sync_batches, self.sync_records, self.over_budget_batches
        ));
        if self.dropped_records > 0 {
            breakdown.push_str(&format!("  Dropped Records: {}\n", self.dropped_records));
        }

        breakdown.push_str(&format!("\nValidation Findings: {}\n", self.validation_findings));
        breakdown
    }
}
