//! Employee registry and account-mutation journal
//!
//! This module contains the EmployeeRegistry, the single source of truth for
//! employee identity, lifecycle state, and account bindings. Every binding
//! change is appended to a sequenced journal, which is what the sync tracker
//! reads to build incremental batches and what gives account-management
//! records their lineage back to HR lifecycle events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

use crate::employee::Employee;
use crate::types::{AccountState, EmployeeId, HrEventType, ResignationState};

/// Why an account mutation happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationCause {
    /// Initial provisioning when the employee joined
    Onboarding,
    /// Driven by an HR lifecycle event
    Lifecycle(HrEventType),
}

/// One entry in the account-mutation journal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountMutation {
    /// Monotonic sequence number, equals the entry's journal index
    pub seq: u64,
    /// When the mutation took effect
    pub timestamp: DateTime<Utc>,
    /// The employee whose binding changed
    pub employee_id: EmployeeId,
    /// The system the binding is on
    pub system: String,
    /// State before the mutation (None for initial provisioning)
    pub from_state: Option<AccountState>,
    /// State after the mutation
    pub to_state: AccountState,
    /// What drove the mutation
    pub cause: MutationCause,
}

/// Lifecycle transition errors
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    /// The requested transition is not an edge of the lifecycle graph
    #[error("Invalid lifecycle transition for {employee}: {from} -> {to}")]
    InvalidTransition {
        /// The employee the transition was requested for
        employee: EmployeeId,
        /// State the employee is currently in
        from: ResignationState,
        /// State that was requested
        to: ResignationState,
    },

    /// The employee id does not resolve in the registry
    #[error("Unknown employee: {0}")]
    UnknownEmployee(EmployeeId),
}

/// The canonical collection of employees with lookup and journaling
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct EmployeeRegistry {
    /// All employees in the cohort
    employees: Vec<Employee>,
    /// Quick lookup map from employee ID to index
    #[serde(skip)]
    index: HashMap<EmployeeId, usize>,
    /// Append-only account-mutation journal
    journal: Vec<AccountMutation>,
}

impl EmployeeRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an employee, journaling one onboarding mutation per binding
    pub fn add_employee(&mut self, employee: Employee) {
        for binding in &employee.bindings {
            self.push_journal(
                binding.updated_at,
                employee.id,
                binding.system.clone(),
                None,
                AccountState::Active,
                MutationCause::Onboarding,
            );
        }
        self.index.insert(employee.id, self.employees.len());
        self.employees.push(employee);
    }

    /// Rebuild the lookup index (call after deserializing)
    pub fn rebuild_index(&mut self) {
        self.index =
            self.employees.iter().enumerate().map(|(i, e)| (e.id, i)).collect();
    }

    /// Get an employee by ID
    pub fn get(&self, id: EmployeeId) -> Option<&Employee> {
        self.index.get(&id).and_then(|&i| self.employees.get(i))
    }

    /// Get a mutable employee by ID
    pub fn get_mut(&mut self, id: EmployeeId) -> Option<&mut Employee> {
        let idx = *self.index.get(&id)?;
        self.employees.get_mut(idx)
    }

    /// Whether an employee ID resolves
    pub fn resolves(&self, id: EmployeeId) -> bool {
        self.index.contains_key(&id)
    }

    /// All employees
    pub fn employees(&self) -> &[Employee] {
        &self.employees
    }

    /// Mutable access to all employees
    pub fn employees_mut(&mut self) -> &mut [Employee] {
        &mut self.employees
    }

    /// Number of employees in the registry
    pub fn employee_count(&self) -> usize {
        self.employees.len()
    }

    /// Apply a lifecycle transition
    ///
    /// Rejected transitions leave the employee state unchanged. On success
    /// the risk profile is recomputed with the transition's contribution, and
    /// entering `ResignationSubmitted` or `Terminated` stamps the
    /// resignation date.
    pub fn transition(
        &mut self,
        id: EmployeeId,
        to: ResignationState,
        at: DateTime<Utc>,
    ) -> Result<(), TransitionError> {
        let employee = self
            .index
            .get(&id)
            .and_then(|&i| self.employees.get_mut(i))
            .ok_or(TransitionError::UnknownEmployee(id))?;

        let from = employee.state;
        if !from.can_transition_to(to) {
            return Err(TransitionError::InvalidTransition { employee: id, from, to });
        }

        employee.state = to;
        employee.risk.record_transition(to);
        if matches!(to, ResignationState::ResignationSubmitted | ResignationState::Terminated) {
            employee.resignation_date = Some(at);
        }

        debug!(employee = %id, %from, %to, "lifecycle transition applied");
        Ok(())
    }

    /// Queue revocation of every active binding
    ///
    /// Returns how many bindings moved to `PendingRevoke`.
    pub fn mark_pending_revoke(
        &mut self,
        id: EmployeeId,
        at: DateTime<Utc>,
        cause: HrEventType,
    ) -> Result<usize, TransitionError> {
        self.mutate_bindings(id, at, AccountState::Active, AccountState::PendingRevoke, cause)
    }

    /// Complete revocation of every queued binding
    ///
    /// Returns how many bindings moved to `Revoked`.
    pub fn revoke_pending(
        &mut self,
        id: EmployeeId,
        at: DateTime<Utc>,
        cause: HrEventType,
    ) -> Result<usize, TransitionError> {
        self.mutate_bindings(id, at, AccountState::PendingRevoke, AccountState::Revoked, cause)
    }

    fn mutate_bindings(
        &mut self,
        id: EmployeeId,
        at: DateTime<Utc>,
        from: AccountState,
        to: AccountState,
        cause: HrEventType,
    ) -> Result<usize, TransitionError> {
        let idx = *self.index.get(&id).ok_or(TransitionError::UnknownEmployee(id))?;
        let mut changed = Vec::new();
        {
            let employee = &mut self.employees[idx];
            for binding in employee.bindings.iter_mut().filter(|b| b.state == from) {
                binding.state = to;
                binding.updated_at = at;
                changed.push(binding.system.clone());
            }
        }
        for system in &changed {
            self.push_journal(at, id, system.clone(), Some(from), to, MutationCause::Lifecycle(cause));
        }
        Ok(changed.len())
    }

    fn push_journal(
        &mut self,
        timestamp: DateTime<Utc>,
        employee_id: EmployeeId,
        system: String,
        from_state: Option<AccountState>,
        to_state: AccountState,
        cause: MutationCause,
    ) {
        let seq = self.journal.len() as u64;
        self.journal.push(AccountMutation {
            seq,
            timestamp,
            employee_id,
            system,
            from_state,
            to_state,
            cause,
        });
    }

    /// The full account-mutation journal
    pub fn journal(&self) -> &[AccountMutation] {
        &self.journal
    }

    /// Journal entries at or after the given sequence number
    pub fn mutations_since(&self, seq: u64) -> &[AccountMutation] {
        let start = (seq as usize).min(self.journal.len());
        &self.journal[start..]
    }

    /// Sequence number the next journal entry will receive
    pub fn next_seq(&self) -> u64 {
        self.journal.len() as u64
    }
}
