//! Validation findings and reports
//!
//! Findings are advisory: the validator accumulates everything it sees and
//! reports, it never rejects a corpus.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::types::{EmployeeId, FindingCategory, FindingSeverity};

/// One consistency finding
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationFinding {
    /// Which check raised the finding
    pub category: FindingCategory,
    /// How serious it is
    pub severity: FindingSeverity,
    /// The employee concerned, when one is identifiable
    pub employee_id: Option<EmployeeId>,
    /// Human-readable description
    pub message: String,
}

impl fmt::Display for ValidationFinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.employee_id {
            Some(id) => write!(f, "[{}] {} ({}): {}", self.severity, self.category, id, self.message),
            None => write!(f, "[{}] {}: {}", self.severity, self.category, self.message),
        }
    }
}

/// Result of a validation pass over a corpus
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ValidationReport {
    /// All findings, in deterministic order
    pub findings: Vec<ValidationFinding>,
    /// How many records the pass examined
    pub records_checked: usize,
}

impl ValidationReport {
    /// Whether the pass raised no findings at all
    pub fn is_clean(&self) -> bool {
        self.findings.is_empty()
    }

    /// Number of findings in a category
    pub fn count_in(&self, category: FindingCategory) -> usize {
        self.findings.iter().filter(|f| f.category == category).count()
    }

    /// The most severe finding raised, if any
    pub fn worst_severity(&self) -> Option<FindingSeverity> {
        self.findings.iter().map(|f| f.severity).max()
    }

    /// Multi-line human-readable summary
    pub fn summary(&self) -> String {
        let mut lines = vec![format!(
            "validation: {} records checked, {} findings",
            self.records_checked,
            self.findings.len()
        )];
        for category in FindingCategory::ALL {
            lines.push(format!("  {}: {}", category, self.count_in(category)));
        }
        for finding in &self.findings {
            lines.push(format!("  - {}", finding));
        }
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(category: FindingCategory, severity: FindingSeverity) -> ValidationFinding {
        ValidationFinding {
            category,
            severity,
            employee_id: Some(EmployeeId::new(1)),
            message: "test".into(),
        }
    }

    #[test]
    fn test_clean_report() {
        let report = ValidationReport { findings: Vec::new(), records_checked: 100 };
        assert!(report.is_clean());
        assert_eq!(report.worst_severity(), None);
        assert!(report.summary().contains("100 records checked, 0 findings"));
    }

    #[test]
    fn test_counts_and_worst_severity() {
        let report = ValidationReport {
            findings: vec![
                finding(FindingCategory::UserLink, FindingSeverity::Error),
                finding(FindingCategory::VolumeRatio, FindingSeverity::Warning),
                finding(FindingCategory::VolumeRatio, FindingSeverity::Info),
            ],
            records_checked: 10,
        };
        assert!(!report.is_clean());
        assert_eq!(report.count_in(FindingCategory::VolumeRatio), 2);
        assert_eq!(report.count_in(FindingCategory::TemporalOrder), 0);
        assert_eq!(report.worst_severity(), Some(FindingSeverity::Error));
    }

    #[test]
    fn test_finding_display_includes_employee() {
        let f = finding(FindingCategory::ProcessRule, FindingSeverity::Error);
        assert_eq!(format!("{}", f), "[error] ProcessRule (EMP000001): test");
    }
}
