//! Sync batch structures
//!
//! A batch carries account-management records derived from the registry's
//! account-mutation journal. Each record keeps the journal sequence number
//! it came from, so every synced row traces back through the journal to the
//! HR lifecycle event (or onboarding) that caused it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::employee::MutationCause;
use crate::types::{AccountState, BatchId, EmployeeId, SyncBatchType};

/// One account-management record carried by a sync batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncedAccountRecord {
    /// When the underlying mutation took effect
    pub timestamp: DateTime<Utc>,
    /// The employee the account belongs to
    pub employee_id: EmployeeId,
    /// The system the account is on
    pub system: String,
    /// Account state carried by this record
    pub account_state: AccountState,
    /// Journal sequence number this record was derived from
    pub source_seq: u64,
    /// What caused the underlying mutation
    pub cause: MutationCause,
}

/// One data-sync batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncBatch {
    /// Batch identifier, derived from type and start time
    pub batch_id: BatchId,
    /// Full extract or incremental
    pub batch_type: SyncBatchType,
    /// System of record the batch was extracted from
    pub source_system: String,
    /// When the batch started
    pub started_at: DateTime<Utc>,
    /// When batch assembly finished
    pub completed_at: DateTime<Utc>,
    /// Journal range covered, inclusive start
    pub range_start_seq: u64,
    /// Journal range covered, exclusive end
    pub range_end_seq: u64,
    /// The synced records
    pub records: Vec<SyncedAccountRecord>,
    /// Wall-clock time the batch took, in milliseconds
    pub elapsed_ms: u64,
    /// Whether the batch blew its time budget
    pub over_budget: bool,
}

impl SyncBatch {
    /// System of record account mutations are extracted from
    pub const SOURCE_SYSTEM: &'static str = "HRIS";

    /// Number of records carried
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    /// Render a one-line batch summary
    pub fn text_line(&self) -> String {
        format!(
            "[{}] 数据同步 - 批次: {}, 类型: {}, 记录数: {}, 区间: [{}, {}), 耗时: {}ms, 超时: {}",
            self.started_at.format("%Y-%m-%d %H:%M:%S"),
            self.batch_id,
            self.batch_type,
            self.records.len(),
            self.range_start_seq,
            self.range_end_seq,
            self.elapsed_ms,
            if self.over_budget { "是" } else { "否" },
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_batch_summary_line() {
        let started = Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let batch = SyncBatch {
            batch_id: BatchId::derive(SyncBatchType::Full.label(), started),
            batch_type: SyncBatchType::Full,
            source_system: "HRIS".into(),
            started_at: started,
            completed_at: started + chrono::Duration::milliseconds(41),
            range_start_seq: 0,
            range_end_seq: 12,
            records: Vec::new(),
            elapsed_ms: 41,
            over_budget: false,
        };
        let line = batch.text_line();
        assert!(line.contains("批次: FULL_20240115T093000"));
        assert!(line.contains("类型: full"));
        assert!(line.contains("区间: [0, 12)"));
        assert!(line.contains("超时: 否"));
    }

    #[test]
    fn test_synced_record_serialization() {
        let record = SyncedAccountRecord {
            timestamp: Utc.with_ymd_and_hms(2024, 1, 6, 9, 0, 0).unwrap(),
            employee_id: EmployeeId::new(9),
            system: "VPN".into(),
            account_state: AccountState::Revoked,
            source_seq: 17,
            cause: MutationCause::Lifecycle(crate::types::HrEventType::PermissionRevoked),
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["employee_id"], "EMP000009");
        assert_eq!(json["source_seq"], 17);
        assert_eq!(json["cause"]["lifecycle"], "permission_revoked");
    }
}
