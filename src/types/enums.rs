//! Enumeration types for the offboarding log simulator
//!
//! This module contains all enumeration types used throughout the simulation
//! system: employee roles, lifecycle states, account states, event and
//! finding categories, and the closed anomaly-pattern catalogs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Job roles assigned to employees
///
/// Roles drive which enterprise systems an employee routinely touches and
/// the baseline component of the risk score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// C-level and senior leadership
    Executive,
    /// Finance and accounting
    Finance,
    /// Software and infrastructure engineering
    Engineering,
    /// Sales and account management
    Sales,
    /// Human resources
    Hr,
    /// Everyone else (operations, admin, support)
    General,
}

impl Role {
    /// All roles, used when drawing a synthetic cohort
    pub const ALL: [Role; 6] = [
        Role::Executive,
        Role::Finance,
        Role::Engineering,
        Role::Sales,
        Role::Hr,
        Role::General,
    ];
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Executive => write!(f, "Executive"),
            Role::Finance => write!(f, "Finance"),
            Role::Engineering => write!(f, "Engineering"),
            Role::Sales => write!(f, "Sales"),
            Role::Hr => write!(f, "HR"),
            Role::General => write!(f, "General"),
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "executive" => Ok(Role::Executive),
            "finance" => Ok(Role::Finance),
            "engineering" => Ok(Role::Engineering),
            "sales" => Ok(Role::Sales),
            "hr" | "human resources" => Ok(Role::Hr),
            "general" => Ok(Role::General),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

/// Lifecycle states of the offboarding state machine
///
/// The normal path runs `Active → ResignationSubmitted → HandoverInProgress
/// → HandoverComplete → Monitored → Closed`. Abrupt exits take the direct
/// `Active → Terminated → Monitored` edge, skipping the submission phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResignationState {
    /// Employed, no resignation in flight
    Active,
    /// Resignation filed, notice period running
    ResignationSubmitted,
    /// Account and knowledge handover underway
    HandoverInProgress,
    /// Handover finished, accounts revoked
    HandoverComplete,
    /// Post-exit monitoring window
    Monitored,
    /// Disciplinary or abrupt exit, submission phase skipped
    Terminated,
    /// Process closed, terminal state
    Closed,
}

impl ResignationState {
    /// Valid successor states in the lifecycle graph
    pub fn successors(&self) -> &'static [ResignationState] {
        match self {
            ResignationState::Active => {
                &[ResignationState::ResignationSubmitted, ResignationState::Terminated]
            }
            ResignationState::ResignationSubmitted => &[ResignationState::HandoverInProgress],
            ResignationState::HandoverInProgress => &[ResignationState::HandoverComplete],
            ResignationState::HandoverComplete => &[ResignationState::Monitored],
            ResignationState::Terminated => &[ResignationState::Monitored],
            ResignationState::Monitored => &[ResignationState::Closed],
            ResignationState::Closed => &[],
        }
    }

    /// Check whether `target` is a valid direct successor of this state
    pub fn can_transition_to(&self, target: ResignationState) -> bool {
        self.successors().contains(&target)
    }

    /// Position along the lifecycle, used to check monotonicity
    ///
    /// `Terminated` shares rank with the handover phase it replaces so the
    /// direct edge does not read as a regression.
    pub fn rank(&self) -> u8 {
        match self {
            ResignationState::Active => 0,
            ResignationState::ResignationSubmitted => 1,
            ResignationState::HandoverInProgress => 2,
            ResignationState::Terminated => 2,
            ResignationState::HandoverComplete => 3,
            ResignationState::Monitored => 4,
            ResignationState::Closed => 5,
        }
    }

    /// Whether the employee is still pre-exit (access routines are normal)
    pub fn is_pre_exit(&self) -> bool {
        matches!(
            self,
            ResignationState::Active
                | ResignationState::ResignationSubmitted
                | ResignationState::HandoverInProgress
                | ResignationState::HandoverComplete
        )
    }

    /// Whether the employee is in the post-exit monitoring phase
    pub fn is_post_exit(&self) -> bool {
        matches!(self, ResignationState::Terminated | ResignationState::Monitored)
    }
}

impl fmt::Display for ResignationState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResignationState::Active => write!(f, "Active"),
            ResignationState::ResignationSubmitted => write!(f, "Resignation Submitted"),
            ResignationState::HandoverInProgress => write!(f, "Handover In Progress"),
            ResignationState::HandoverComplete => write!(f, "Handover Complete"),
            ResignationState::Monitored => write!(f, "Monitored"),
            ResignationState::Terminated => write!(f, "Terminated"),
            ResignationState::Closed => write!(f, "Closed"),
        }
    }
}

/// States of an account binding on a single enterprise system
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountState {
    /// Account usable
    Active,
    /// Revocation queued during handover
    PendingRevoke,
    /// Access withdrawn; binding retained for audit
    Revoked,
}

impl fmt::Display for AccountState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccountState::Active => write!(f, "active"),
            AccountState::PendingRevoke => write!(f, "pending_revoke"),
            AccountState::Revoked => write!(f, "revoked"),
        }
    }
}

/// Kinds of permission grants within a system baseline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrantKind {
    /// Read-only access
    Read,
    /// Read and write access
    ReadWrite,
    /// Administrative access
    Admin,
}

impl fmt::Display for GrantKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GrantKind::Read => write!(f, "read"),
            GrantKind::ReadWrite => write!(f, "read_write"),
            GrantKind::Admin => write!(f, "admin"),
        }
    }
}

/// Types of HR lifecycle events emitted by the process simulator
///
/// One event is emitted per state-machine transition; the Monitored
/// transition is journal-only and has no event variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrEventType {
    /// Employee filed a resignation
    ResignationSubmitted,
    /// Handover phase opened
    HandoverStarted,
    /// Account bindings revoked during handover
    PermissionRevoked,
    /// Handover phase finished
    HandoverCompleted,
    /// Abrupt exit, submission phase skipped
    Terminated,
    /// Offboarding process closed
    Closed,
}

impl HrEventType {
    /// Chinese action label used in semi-structured text lines
    pub fn label_zh(&self) -> &'static str {
        match self {
            HrEventType::ResignationSubmitted => "离职申请",
            HrEventType::HandoverStarted => "工作交接开始",
            HrEventType::PermissionRevoked => "权限回收",
            HrEventType::HandoverCompleted => "工作交接完成",
            HrEventType::Terminated => "辞退处理",
            HrEventType::Closed => "离职流程关闭",
        }
    }
}

impl fmt::Display for HrEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HrEventType::ResignationSubmitted => write!(f, "resignation_submitted"),
            HrEventType::HandoverStarted => write!(f, "handover_started"),
            HrEventType::PermissionRevoked => write!(f, "permission_revoked"),
            HrEventType::HandoverCompleted => write!(f, "handover_completed"),
            HrEventType::Terminated => write!(f, "terminated"),
            HrEventType::Closed => write!(f, "closed"),
        }
    }
}

/// Actions recorded in access events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessAction {
    /// Session start
    Login,
    /// Session end
    Logout,
    /// File read/download
    FileAccess,
    /// Database or report query
    DataQuery,
    /// Record mutation
    DataModify,
    /// Permission inspection or change attempt
    PermissionOp,
}

impl fmt::Display for AccessAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessAction::Login => write!(f, "login"),
            AccessAction::Logout => write!(f, "logout"),
            AccessAction::FileAccess => write!(f, "file_access"),
            AccessAction::DataQuery => write!(f, "data_query"),
            AccessAction::DataModify => write!(f, "data_modify"),
            AccessAction::PermissionOp => write!(f, "permission_op"),
        }
    }
}

/// Outcome of an access attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessResult {
    /// Attempt succeeded
    Success,
    /// Attempt failed (technical or credential error)
    Failure,
    /// Attempt rejected by access control
    Denied,
}

impl fmt::Display for AccessResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessResult::Success => write!(f, "success"),
            AccessResult::Failure => write!(f, "failure"),
            AccessResult::Denied => write!(f, "denied"),
        }
    }
}

/// Coarse risk levels derived from the numeric risk score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    /// Risk score below 0.3
    Low,
    /// Risk score in [0.3, 0.6)
    Medium,
    /// Risk score in [0.6, 0.85)
    High,
    /// Risk score at or above 0.85
    Critical,
}

impl RiskLevel {
    /// Bucket a numeric risk score into a level
    pub fn from_score(score: f64) -> Self {
        if score >= 0.85 {
            RiskLevel::Critical
        } else if score >= 0.6 {
            RiskLevel::High
        } else if score >= 0.3 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RiskLevel::Low => write!(f, "low"),
            RiskLevel::Medium => write!(f, "medium"),
            RiskLevel::High => write!(f, "high"),
            RiskLevel::Critical => write!(f, "critical"),
        }
    }
}

/// Anomaly patterns injected while a resignation is in flight
///
/// Closed enumeration with an explicit weight table (see
/// [`crate::access::anomaly`]); new patterns are added by extending the
/// variant set and its weight, not by string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreResignationPattern {
    /// Large-volume file downloads outside the daily routine
    BulkDownload,
    /// Probing systems and permissions the role rarely touches
    AccessProbing,
}

impl fmt::Display for PreResignationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreResignationPattern::BulkDownload => write!(f, "bulk_download"),
            PreResignationPattern::AccessProbing => write!(f, "access_probing"),
        }
    }
}

/// Violation patterns injected after termination, during the monitoring window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostTerminationPattern {
    /// Reuse of revoked credentials
    CredentialReuse,
    /// Repeated failed logins in a short burst
    BruteForcePattern,
    /// Attempted access at unusual hours
    OffHoursAccess,
}

impl fmt::Display for PostTerminationPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PostTerminationPattern::CredentialReuse => write!(f, "credential_reuse"),
            PostTerminationPattern::BruteForcePattern => write!(f, "brute_force_pattern"),
            PostTerminationPattern::OffHoursAccess => write!(f, "off_hours_access"),
        }
    }
}

/// Type of a sync batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyncBatchType {
    /// Entire registry + binding snapshot
    Full,
    /// Bindings mutated since the last checkpoint
    Incremental,
}

impl SyncBatchType {
    /// Short label used in derived batch ids
    pub fn label(&self) -> &'static str {
        match self {
            SyncBatchType::Full => "FULL",
            SyncBatchType::Incremental => "INCR",
        }
    }
}

impl fmt::Display for SyncBatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncBatchType::Full => write!(f, "full"),
            SyncBatchType::Incremental => write!(f, "incremental"),
        }
    }
}

/// Categories of validator findings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingCategory {
    /// An employee id failed to resolve in the registry
    UserLink,
    /// Timestamp ordering broken within a session or against hire date
    TemporalOrder,
    /// Lifecycle/process rule violated (revocation ordering, unflagged
    /// out-of-baseline access)
    ProcessRule,
    /// Access-to-HR volume ratio outside the plausible band
    VolumeRatio,
}

impl FindingCategory {
    /// All categories, in reporting order
    pub const ALL: [FindingCategory; 4] = [
        FindingCategory::UserLink,
        FindingCategory::TemporalOrder,
        FindingCategory::ProcessRule,
        FindingCategory::VolumeRatio,
    ];
}

impl fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingCategory::UserLink => write!(f, "UserLink"),
            FindingCategory::TemporalOrder => write!(f, "TemporalOrder"),
            FindingCategory::ProcessRule => write!(f, "ProcessRule"),
            FindingCategory::VolumeRatio => write!(f, "VolumeRatio"),
        }
    }
}

/// Severity of a validator finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FindingSeverity {
    /// Informational, corpus still usable
    Info,
    /// Suspicious but tolerable
    Warning,
    /// Breaks a hard invariant
    Error,
}

impl fmt::Display for FindingSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FindingSeverity::Info => write!(f, "info"),
            FindingSeverity::Warning => write!(f, "warning"),
            FindingSeverity::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lifecycle_successors() {
        use ResignationState::*;

        assert!(Active.can_transition_to(ResignationSubmitted));
        assert!(Active.can_transition_to(Terminated));
        assert!(ResignationSubmitted.can_transition_to(HandoverInProgress));
        assert!(HandoverInProgress.can_transition_to(HandoverComplete));
        assert!(HandoverComplete.can_transition_to(Monitored));
        assert!(Terminated.can_transition_to(Monitored));
        assert!(Monitored.can_transition_to(Closed));

        // Closed is terminal
        assert!(Closed.successors().is_empty());

        // No skipping and no regressions
        assert!(!Active.can_transition_to(HandoverInProgress));
        assert!(!Active.can_transition_to(Closed));
        assert!(!HandoverInProgress.can_transition_to(ResignationSubmitted));
        assert!(!Monitored.can_transition_to(Active));
    }

    #[test]
    fn test_lifecycle_rank_is_monotone_along_paths() {
        use ResignationState::*;

        for state in [Active, ResignationSubmitted, HandoverInProgress, HandoverComplete, Monitored, Terminated] {
            for next in state.successors() {
                assert!(next.rank() > state.rank(), "{} -> {} must increase rank", state, next);
            }
        }
    }

    #[test]
    fn test_phase_predicates() {
        assert!(ResignationState::Active.is_pre_exit());
        assert!(ResignationState::HandoverInProgress.is_pre_exit());
        assert!(!ResignationState::Monitored.is_pre_exit());
        assert!(ResignationState::Terminated.is_post_exit());
        assert!(ResignationState::Monitored.is_post_exit());
        assert!(!ResignationState::Closed.is_post_exit());
    }

    #[test]
    fn test_risk_level_buckets() {
        assert_eq!(RiskLevel::from_score(0.0), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.29), RiskLevel::Low);
        assert_eq!(RiskLevel::from_score(0.3), RiskLevel::Medium);
        assert_eq!(RiskLevel::from_score(0.6), RiskLevel::High);
        assert_eq!(RiskLevel::from_score(0.85), RiskLevel::Critical);
        assert_eq!(RiskLevel::from_score(1.0), RiskLevel::Critical);
    }

    #[test]
    fn test_role_from_str() {
        assert_eq!("engineering".parse::<Role>().unwrap(), Role::Engineering);
        assert_eq!("HR".parse::<Role>().unwrap(), Role::Hr);
        assert!("plumber".parse::<Role>().is_err());
    }

    #[test]
    fn test_enum_serialization() {
        let state = ResignationState::HandoverInProgress;
        let json = serde_json::to_string(&state).unwrap();
        let back: ResignationState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);

        let action = AccessAction::FileAccess;
        assert_eq!(serde_json::to_string(&action).unwrap(), "\"file_access\"");

        let pattern = PostTerminationPattern::CredentialReuse;
        assert_eq!(serde_json::to_string(&pattern).unwrap(), "\"credential_reuse\"");
    }

    #[test]
    fn test_batch_type_labels() {
        assert_eq!(SyncBatchType::Full.label(), "FULL");
        assert_eq!(SyncBatchType::Incremental.label(), "INCR");
    }
}
