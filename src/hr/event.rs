//! HR stream record structures
//!
//! This module contains the records emitted on the HR stream: lifecycle
//! events, onboarding registrations, and account-transfer records, together
//! with their JSON schemas and semi-structured text renderings.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{EmployeeId, HrEventType, RiskLevel};

/// Employee details attached to an HR lifecycle record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrDetails {
    /// Display name of the employee
    pub employee_name: String,
    /// Department of record
    pub department: String,
    /// Position title
    pub position: String,
    /// Stated reason for leaving, when one was given
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resignation_reason: Option<String>,
    /// Agreed final working day
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_last_work_date: Option<NaiveDate>,
}

/// Risk snapshot taken at emission time
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Numeric risk score in [0, 1]
    pub risk_score: f64,
    /// Coarse risk level derived from the score
    pub risk_level: RiskLevel,
}

impl RiskAssessment {
    /// Snapshot a risk score
    pub fn from_score(score: f64) -> Self {
        Self { risk_score: (score * 100.0).round() / 100.0, risk_level: RiskLevel::from_score(score) }
    }
}

/// One HR lifecycle event record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HrRecord {
    /// When the event occurred
    pub timestamp: DateTime<Utc>,
    /// Which lifecycle action fired
    pub action: HrEventType,
    /// The employee the event is about
    pub employee_id: EmployeeId,
    /// Employee details at emission time
    pub details: HrDetails,
    /// Risk snapshot at emission time
    pub risk_assessment: RiskAssessment,
}

impl HrRecord {
    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        let mut line = format!(
            "[{}] {} - 员工ID: {}, 姓名: {}, 部门: {}, 职位: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.action.label_zh(),
            self.employee_id,
            self.details.employee_name,
            self.details.department,
            self.details.position,
        );
        if let Some(reason) = &self.details.resignation_reason {
            line.push_str(&format!(", 离职原因: {}", reason));
        }
        if let Some(last_day) = self.details.expected_last_work_date {
            line.push_str(&format!(", 最后工作日: {}", last_day.format("%Y-%m-%d")));
        }
        line.push_str(&format!(", 风险等级: {}", self.risk_assessment.risk_level));
        line
    }
}

/// Onboarding registration for a new hire
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OnboardingRecord {
    /// When the hire was registered
    pub timestamp: DateTime<Utc>,
    /// The new employee
    pub employee_id: EmployeeId,
    /// Display name of the employee
    pub employee_name: String,
    /// Department of record
    pub department: String,
    /// Position title
    pub position: String,
    /// Systems provisioned on day one
    pub provisioned_systems: Vec<String>,
}

impl OnboardingRecord {
    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        format!(
            "[{}] 入职登记 - 员工ID: {}, 姓名: {}, 部门: {}, 职位: {}, 开通系统: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.employee_id,
            self.employee_name,
            self.department,
            self.position,
            self.provisioned_systems.join("/"),
        )
    }
}

/// Transfer of one system responsibility to a successor during handover
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRecord {
    /// When the transfer was registered
    pub timestamp: DateTime<Utc>,
    /// The departing employee
    pub employee_id: EmployeeId,
    /// Display name of the departing employee
    pub employee_name: String,
    /// The colleague taking over
    pub successor_id: EmployeeId,
    /// Display name of the successor
    pub successor_name: String,
    /// The system whose responsibility moves
    pub system: String,
}

impl TransferRecord {
    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        format!(
            "[{}] 账号移交 - 员工ID: {}, 姓名: {}, 系统: {}, 接收人ID: {}, 接收人: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.employee_id,
            self.employee_name,
            self.system,
            self.successor_id,
            self.successor_name,
        )
    }
}

/// One record on the HR stream
///
/// Untagged on the wire so each variant serializes with its own schema, the
/// way separate upstream HR subsystems would write them into a shared log.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HrStreamRecord {
    /// A lifecycle event
    Lifecycle(HrRecord),
    /// An onboarding registration
    Onboarding(OnboardingRecord),
    /// An account transfer
    Transfer(TransferRecord),
}

impl HrStreamRecord {
    /// Timestamp of the record, used for chronological merging
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            HrStreamRecord::Lifecycle(r) => r.timestamp,
            HrStreamRecord::Onboarding(r) => r.timestamp,
            HrStreamRecord::Transfer(r) => r.timestamp,
        }
    }

    /// The employee the record is about
    pub fn employee_id(&self) -> EmployeeId {
        match self {
            HrStreamRecord::Lifecycle(r) => r.employee_id,
            HrStreamRecord::Onboarding(r) => r.employee_id,
            HrStreamRecord::Transfer(r) => r.employee_id,
        }
    }

    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        match self {
            HrStreamRecord::Lifecycle(r) => r.text_line(),
            HrStreamRecord::Onboarding(r) => r.text_line(),
            HrStreamRecord::Transfer(r) => r.text_line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_record() -> HrRecord {
        HrRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 10, 0, 0).unwrap(),
            action: HrEventType::ResignationSubmitted,
            employee_id: EmployeeId::new(1),
            details: HrDetails {
                employee_name: "张伟".into(),
                department: "技术部".into(),
                position: "高级工程师".into(),
                resignation_reason: Some("个人发展".into()),
                expected_last_work_date: NaiveDate::from_ymd_opt(2024, 2, 1),
            },
            risk_assessment: RiskAssessment::from_score(0.55),
        }
    }

    #[test]
    fn test_hr_record_json_schema() {
        let json = serde_json::to_value(sample_record()).unwrap();
        assert_eq!(json["action"], "resignation_submitted");
        assert_eq!(json["employee_id"], "EMP000001");
        assert_eq!(json["details"]["employee_name"], "张伟");
        assert_eq!(json["details"]["resignation_reason"], "个人发展");
        assert_eq!(json["risk_assessment"]["risk_score"], 0.55);
        assert_eq!(json["risk_assessment"]["risk_level"], "medium");
    }

    #[test]
    fn test_hr_record_text_line() {
        let line = sample_record().text_line();
        assert!(line.starts_with("[2024-01-02 10:00:00] 离职申请 - 员工ID: EMP000001"));
        assert!(line.contains("姓名: 张伟"));
        assert!(line.contains("离职原因: 个人发展"));
        assert!(line.contains("最后工作日: 2024-02-01"));
        assert!(line.contains("风险等级: medium"));
    }

    #[test]
    fn test_optional_details_omitted() {
        let mut record = sample_record();
        record.details.resignation_reason = None;
        record.details.expected_last_work_date = None;
        let json = serde_json::to_value(&record).unwrap();
        assert!(json["details"].get("resignation_reason").is_none());
        assert!(!record.text_line().contains("离职原因"));
    }

    #[test]
    fn test_risk_assessment_rounds_to_two_decimals() {
        let snap = RiskAssessment::from_score(0.61234);
        assert_eq!(snap.risk_score, 0.61);
        assert_eq!(snap.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_stream_record_accessors() {
        let record = HrStreamRecord::Transfer(TransferRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 4, 14, 0, 0).unwrap(),
            employee_id: EmployeeId::new(1),
            employee_name: "张伟".into(),
            successor_id: EmployeeId::new(2),
            successor_name: "李娜".into(),
            system: "DevEnvironment".into(),
        });
        assert_eq!(record.employee_id(), EmployeeId::new(1));
        assert!(record.text_line().contains("账号移交"));
        assert!(record.text_line().contains("接收人ID: EMP000002"));
    }
}
