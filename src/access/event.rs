//! Access and violation record structures
//!
//! This module contains the records emitted on the access stream, the
//! violation alerts raised during post-exit monitoring, and the stable
//! device profile attached to an employee's routine activity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    AccessAction, AccessResult, EmployeeId, PostTerminationPattern, RiskLevel, SessionId,
};

/// Cities used for routine geolocation
const CITIES: &[&str] = &["北京", "上海", "深圳", "杭州", "成都"];

/// Origins used for violation attempts coming from outside the usual profile
pub const SUSPICIOUS_ORIGINS: &[(&str, &str)] = &[
    ("203.0.113.77", "境外-未知"),
    ("198.51.100.23", "境外-新加坡"),
    ("192.0.2.146", "境外-美国"),
    ("203.0.113.5", "广州"),
];

/// Stable network and device identity of one employee
///
/// Derived from the employee id so the same employee always appears from the
/// same address, city and device across runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeviceProfile {
    /// Workstation IP on the office network
    pub ip_address: String,
    /// City the employee works from
    pub geolocation: String,
    /// Device fingerprint of the usual workstation
    pub device_fingerprint: String,
}

impl DeviceProfile {
    /// Derive the profile for an employee
    pub fn for_employee(id: EmployeeId) -> Self {
        let n = id.0;
        Self {
            ip_address: format!("10.{}.{}.{}", 1 + n % 4, (n / 254) % 254, 1 + n % 254),
            geolocation: CITIES[(n as usize) % CITIES.len()].to_string(),
            device_fingerprint: format!("DEV-{:08x}", n.wrapping_mul(2654435761)),
        }
    }
}

/// One record on the access stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessRecord {
    /// When the access happened
    pub timestamp: DateTime<Utc>,
    /// Session the access belongs to
    pub session_id: SessionId,
    /// The employee who accessed the system
    pub user_id: EmployeeId,
    /// The enterprise system accessed
    pub system: String,
    /// What was done
    pub action: AccessAction,
    /// How the attempt ended
    pub result: AccessResult,
    /// Data moved, in megabytes (zero for non-transfer actions)
    pub data_volume: u64,
    /// Source IP address
    pub ip_address: String,
    /// Source city or origin label
    pub geolocation: String,
    /// Device fingerprint of the source machine
    pub device_fingerprint: String,
    /// Whether the record was flagged suspicious at emission time
    pub is_suspicious: bool,
    /// Employee risk score at emission time
    pub risk_score: f64,
}

impl AccessRecord {
    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        let mut line = format!(
            "[{}] 系统访问 - 员工ID: {}, 系统: {}, 操作: {}, 状态: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.user_id,
            self.system,
            self.action,
            self.result,
        );
        if self.data_volume > 0 {
            line.push_str(&format!(", 数据量: {}MB", self.data_volume));
        }
        line.push_str(&format!(
            ", IP: {}, 地点: {}, 可疑: {}",
            self.ip_address,
            self.geolocation,
            if self.is_suspicious { "是" } else { "否" },
        ));
        line
    }
}

/// Attempt details attached to a violation alert
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationDetails {
    /// How many attempts were observed in the burst
    pub attempt_count: u32,
    /// Source IP of the attempts
    pub source_ip: String,
    /// Origin label of the attempts
    pub geolocation: String,
}

/// Alert raised when a departed employee's credentials are used
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRecord {
    /// When the violation was detected
    pub timestamp: DateTime<Utc>,
    /// Alert classification label
    pub alert_type: String,
    /// The departed employee
    pub employee_id: EmployeeId,
    /// Display name of the employee
    pub employee_name: String,
    /// Which violation pattern fired
    pub violation_type: PostTerminationPattern,
    /// The system that was targeted
    pub affected_system: String,
    /// Risk level at detection time
    pub risk_level: RiskLevel,
    /// Whole days since the employee left
    pub days_since_resignation: i64,
    /// Attempt details
    pub details: ViolationDetails,
}

impl ViolationRecord {
    /// Alert classification used for every post-exit violation
    pub const ALERT_TYPE: &'static str = "离职后违规访问";

    /// Render the record as a semi-structured text line
    pub fn text_line(&self) -> String {
        format!(
            "[{}] 违规访问告警 - 员工ID: {}, 姓名: {}, 违规类型: {}, 系统: {}, 风险等级: {}, 离职天数: {}, 尝试次数: {}, 来源IP: {}, 地点: {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.employee_id,
            self.employee_name,
            self.violation_type,
            self.affected_system,
            self.risk_level,
            self.days_since_resignation,
            self.details.attempt_count,
            self.details.source_ip,
            self.details.geolocation,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_access() -> AccessRecord {
        AccessRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 3, 9, 15, 0).unwrap(),
            session_id: SessionId::from_bits(1),
            user_id: EmployeeId::new(7),
            system: "VPN".into(),
            action: AccessAction::Login,
            result: AccessResult::Success,
            data_volume: 0,
            ip_address: "10.2.0.8".into(),
            geolocation: "上海".into(),
            device_fingerprint: "DEV-0000abcd".into(),
            is_suspicious: false,
            risk_score: 0.2,
        }
    }

    #[test]
    fn test_device_profile_is_stable_per_employee() {
        let a = DeviceProfile::for_employee(EmployeeId::new(12));
        let b = DeviceProfile::for_employee(EmployeeId::new(12));
        let c = DeviceProfile::for_employee(EmployeeId::new(13));
        assert_eq!(a.ip_address, b.ip_address);
        assert_eq!(a.device_fingerprint, b.device_fingerprint);
        assert_ne!(a.device_fingerprint, c.device_fingerprint);
        assert!(a.ip_address.starts_with("10."));
    }

    #[test]
    fn test_access_record_json_schema() {
        let json = serde_json::to_value(sample_access()).unwrap();
        assert_eq!(json["user_id"], "EMP000007");
        assert_eq!(json["action"], "login");
        assert_eq!(json["result"], "success");
        assert_eq!(json["is_suspicious"], false);
        assert!(json["session_id"].as_str().unwrap().starts_with("SESS_"));
    }

    #[test]
    fn test_access_text_line_omits_zero_volume() {
        let line = sample_access().text_line();
        assert!(line.starts_with("[2024-01-03 09:15:00] 系统访问 - 员工ID: EMP000007"));
        assert!(line.contains("系统: VPN, 操作: login, 状态: success"));
        assert!(!line.contains("数据量"));
        assert!(line.contains("可疑: 否"));

        let mut bulky = sample_access();
        bulky.data_volume = 850;
        bulky.is_suspicious = true;
        let line = bulky.text_line();
        assert!(line.contains("数据量: 850MB"));
        assert!(line.contains("可疑: 是"));
    }

    #[test]
    fn test_violation_record_schema_and_text() {
        let record = ViolationRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 10, 2, 30, 0).unwrap(),
            alert_type: ViolationRecord::ALERT_TYPE.to_string(),
            employee_id: EmployeeId::new(3),
            employee_name: "王芳".into(),
            violation_type: PostTerminationPattern::CredentialReuse,
            affected_system: "VPN".into(),
            risk_level: RiskLevel::High,
            days_since_resignation: 4,
            details: ViolationDetails {
                attempt_count: 2,
                source_ip: "203.0.113.77".into(),
                geolocation: "境外-未知".into(),
            },
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["alert_type"], "离职后违规访问");
        assert_eq!(json["violation_type"], "credential_reuse");
        assert_eq!(json["days_since_resignation"], 4);
        assert_eq!(json["details"]["attempt_count"], 2);

        let line = record.text_line();
        assert!(line.contains("违规访问告警"));
        assert!(line.contains("违规类型: credential_reuse"));
        assert!(line.contains("离职天数: 4"));
    }
}
