//! Risk scoring for employees
//!
//! The risk score is recomputed whenever a lifecycle transition fires or an
//! anomaly is injected, and decays while nothing suspicious happens:
//!
//! ```text
//! score = clamp(role_weight + anomaly_accumulator - decay_term, 0.0, 1.0)
//! ```

use serde::{Deserialize, Serialize};

use crate::types::{ResignationState, Role};

/// How much the decay term grows per quiet day
const DAILY_DECAY: f64 = 0.02;

/// Ceiling on the decay term so old anomalies never push the score below the
/// role base for an employee mid-offboarding
const MAX_DECAY: f64 = 0.3;

/// Risk profile of a single employee
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskProfile {
    /// Base weight contributed by the role
    pub role_weight: f64,
    /// Accumulated contribution of injected anomalies and transitions
    pub anomaly_accumulator: f64,
    /// Decay accrued since the last anomaly
    pub decay_term: f64,
}

impl RiskProfile {
    /// Starting profile for a role
    pub fn for_role(role: Role) -> Self {
        Self { role_weight: role_weight(role), anomaly_accumulator: 0.0, decay_term: 0.0 }
    }

    /// Current clamped score
    pub fn score(&self) -> f64 {
        (self.role_weight + self.anomaly_accumulator - self.decay_term).clamp(0.0, 1.0)
    }

    /// Record an injected anomaly and reset the decay
    pub fn record_anomaly(&mut self, weight: f64) {
        self.anomaly_accumulator += weight;
        self.decay_term = 0.0;
    }

    /// Record a lifecycle transition
    pub fn record_transition(&mut self, to: ResignationState) {
        self.anomaly_accumulator += transition_weight(to);
    }

    /// Advance one quiet day, growing the decay term
    pub fn advance_day(&mut self) {
        self.decay_term = (self.decay_term + DAILY_DECAY).min(MAX_DECAY);
    }
}

/// Base risk weight of a role
///
/// Executives, finance and engineering carry more sensitive access, so their
/// base weight is higher.
pub fn role_weight(role: Role) -> f64 {
    match role {
        Role::Executive => 0.45,
        Role::Finance => 0.40,
        Role::Engineering => 0.40,
        Role::Sales => 0.25,
        Role::Hr => 0.25,
        Role::General => 0.20,
    }
}

/// Risk contribution of entering a lifecycle state
fn transition_weight(to: ResignationState) -> f64 {
    match to {
        ResignationState::ResignationSubmitted => 0.15,
        ResignationState::HandoverInProgress => 0.05,
        ResignationState::Terminated => 0.35,
        ResignationState::HandoverComplete => 0.0,
        ResignationState::Monitored => 0.05,
        ResignationState::Closed => 0.0,
        ResignationState::Active => 0.0,
    }
}
