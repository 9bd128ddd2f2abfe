//! Unique identifier types for the offboarding log simulator
//!
//! This module contains the prefixed identifier types for employees, access
//! sessions, and sync batches used throughout the simulation system.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for an employee
///
/// Rendered as `EMP` followed by six digits (`EMP000042`), matching the
/// format HR systems emit in their audit trails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EmployeeId(pub u32);

impl EmployeeId {
    /// Create an employee ID from its numeric component
    pub fn new(n: u32) -> Self {
        Self(n)
    }
}

impl fmt::Display for EmployeeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMP{:06}", self.0)
    }
}

impl Serialize for EmployeeId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("EMP{:06}", self.0))
    }
}

impl<'de> Deserialize<'de> for EmployeeId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let digits = s.strip_prefix("EMP").unwrap_or(&s);
        let n = digits.parse::<u32>().map_err(serde::de::Error::custom)?;
        Ok(EmployeeId(n))
    }
}

/// Unique identifier for an access session
///
/// One session covers a login/operations/logout sequence on a single system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a session ID from raw bits
    ///
    /// Used by generators drawing from a seeded RNG so that corpora are
    /// reproducible for a given seed.
    pub fn from_bits(bits: u128) -> Self {
        Self(Uuid::from_u128(bits))
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SESS_{}", self.0.simple())
    }
}

impl Serialize for SessionId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("SESS_{}", self.0.simple()))
    }
}

impl<'de> Deserialize<'de> for SessionId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        let uuid_str = s.strip_prefix("SESS_").unwrap_or(&s);
        let uuid = Uuid::parse_str(uuid_str).map_err(serde::de::Error::custom)?;
        Ok(SessionId(uuid))
    }
}

/// Identifier for a sync batch, derived from its type and start timestamp
///
/// Full batches render as `FULL_20240115T093000`, incremental batches as
/// `INCR_20240115T094000`. Deriving from the clock keeps batch ids monotonic
/// alongside the checkpoint cursor.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BatchId(pub String);

impl BatchId {
    /// Derive a batch ID from a type label and start timestamp
    pub fn derive(kind: &str, started_at: chrono::DateTime<chrono::Utc>) -> Self {
        Self(format!("{}_{}", kind, started_at.format("%Y%m%dT%H%M%S")))
    }
}

impl fmt::Display for BatchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_employee_id_display() {
        assert_eq!(format!("{}", EmployeeId::new(1)), "EMP000001");
        assert_eq!(format!("{}", EmployeeId::new(123456)), "EMP123456");
    }

    #[test]
    fn test_employee_id_serialization_round_trip() {
        let id = EmployeeId::new(4711);
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"EMP004711\"");
        let back: EmployeeId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_employee_id_deserialization_without_prefix() {
        // Bare numeric strings still parse for backward compatibility
        let id: EmployeeId = serde_json::from_str("\"000042\"").unwrap();
        assert_eq!(id, EmployeeId::new(42));
    }

    #[test]
    fn test_employee_id_ordering() {
        assert!(EmployeeId::new(1) < EmployeeId::new(2));
    }

    #[test]
    fn test_session_id_display_and_uniqueness() {
        let a = SessionId::new();
        let b = SessionId::new();
        assert_ne!(a, b);
        assert!(format!("{}", a).starts_with("SESS_"));
        assert_eq!(format!("{}", a).len(), 37);
    }

    #[test]
    fn test_session_id_from_bits_is_deterministic() {
        assert_eq!(SessionId::from_bits(99), SessionId::from_bits(99));
        assert_ne!(SessionId::from_bits(99), SessionId::from_bits(100));
    }

    #[test]
    fn test_session_id_serialization_round_trip() {
        let id = SessionId::from_bits(7);
        let json = serde_json::to_string(&id).unwrap();
        assert!(json.contains("SESS_"));
        let back: SessionId = serde_json::from_str(&json).unwrap();
        assert_eq!(id, back);
    }

    #[test]
    fn test_batch_id_derivation() {
        let ts = chrono::Utc.with_ymd_and_hms(2024, 1, 15, 9, 30, 0).unwrap();
        let id = BatchId::derive("FULL", ts);
        assert_eq!(id.to_string(), "FULL_20240115T093000");
    }
}
