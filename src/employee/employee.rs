//! Core employee struct and methods
//!
//! This module contains the Employee struct, its account bindings, and the
//! lifecycle-related accessors used across the generation streams.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::employee::RiskProfile;
use crate::types::{AccountState, EmployeeId, GrantKind, ResignationState, RiskLevel, Role};

/// An account binding on a single enterprise system
///
/// Bindings are never deleted; revocation flips the state and the binding is
/// retained for audit, so access events can always be checked against the
/// permission baseline in force at the time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountBinding {
    /// Name of the enterprise system
    pub system: String,
    /// Kind of grant held on the system
    pub grant: GrantKind,
    /// Current account state
    pub state: AccountState,
    /// When the state last changed
    pub updated_at: DateTime<Utc>,
}

impl AccountBinding {
    /// Create a new active binding
    pub fn new(system: impl Into<String>, grant: GrantKind, provisioned_at: DateTime<Utc>) -> Self {
        Self { system: system.into(), grant, state: AccountState::Active, updated_at: provisioned_at }
    }

    /// Whether the binding currently permits access
    pub fn is_usable(&self) -> bool {
        self.state == AccountState::Active
    }
}

/// Represents an employee in the simulation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    /// Unique identifier for the employee
    pub id: EmployeeId,
    /// Display name, as carried by the HR system of record
    pub name: String,
    /// Department name
    pub department: String,
    /// Position title within the department
    pub position: String,
    /// Job role, drives system baselines and the risk base weight
    pub role: Role,
    /// When the employee was hired
    pub hire_date: DateTime<Utc>,
    /// Current lifecycle state
    pub state: ResignationState,
    /// When the resignation was submitted (or the termination took effect)
    pub resignation_date: Option<DateTime<Utc>>,
    /// Agreed final working day
    pub expected_last_work_date: Option<NaiveDate>,
    /// Stated reason for leaving
    pub resignation_reason: Option<String>,
    /// Current risk profile
    pub risk: RiskProfile,
    /// Account bindings across enterprise systems
    pub bindings: Vec<AccountBinding>,
}

impl Employee {
    /// Create a new active employee with the given bindings
    pub fn new(
        id: EmployeeId,
        name: impl Into<String>,
        department: impl Into<String>,
        position: impl Into<String>,
        role: Role,
        hire_date: DateTime<Utc>,
        bindings: Vec<AccountBinding>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            department: department.into(),
            position: position.into(),
            role,
            hire_date,
            state: ResignationState::Active,
            resignation_date: None,
            expected_last_work_date: None,
            resignation_reason: None,
            risk: RiskProfile::for_role(role),
            bindings,
        }
    }

    /// Whether an offboarding process is in flight or finished
    pub fn is_offboarding(&self) -> bool {
        self.state != ResignationState::Active
    }

    /// The moment the employee left (or will leave), when known
    ///
    /// For abrupt terminations this is the resignation date itself; for the
    /// normal path it is the expected last working day.
    pub fn exit_date(&self) -> Option<DateTime<Utc>> {
        if self.state == ResignationState::Terminated {
            return self.resignation_date;
        }
        self.expected_last_work_date
            .and_then(|d| d.and_hms_opt(18, 0, 0))
            .map(|dt| DateTime::from_naive_utc_and_offset(dt, Utc))
            .or(self.resignation_date)
    }

    /// Whole days elapsed since the exit date, negative before it
    pub fn days_since_exit(&self, now: DateTime<Utc>) -> Option<i64> {
        self.exit_date().map(|exit| (now - exit).num_days())
    }

    /// Systems the employee currently holds a usable account on
    pub fn usable_systems(&self) -> Vec<&str> {
        self.bindings.iter().filter(|b| b.is_usable()).map(|b| b.system.as_str()).collect()
    }

    /// Whether the employee ever held an account on the system
    pub fn has_binding(&self, system: &str) -> bool {
        self.bindings.iter().any(|b| b.system == system)
    }

    /// Look up a binding by system name
    pub fn binding(&self, system: &str) -> Option<&AccountBinding> {
        self.bindings.iter().find(|b| b.system == system)
    }

    /// Current numeric risk score
    pub fn risk_score(&self) -> f64 {
        self.risk.score()
    }

    /// Current coarse risk level
    pub fn risk_level(&self) -> RiskLevel {
        RiskLevel::from_score(self.risk.score())
    }
}
