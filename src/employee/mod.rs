//! Employee management module
//!
//! This module contains the employee model, the risk profile, the canonical
//! registry with its account-mutation journal, and the synthetic cohort
//! generator.

pub mod employee;
pub mod generator;
pub mod registry;
pub mod risk;

pub use employee::*;
pub use generator::*;
pub use registry::*;
pub use risk::*;
