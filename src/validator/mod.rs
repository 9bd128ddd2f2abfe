//! Consistency validation module
//!
//! This module contains the advisory cross-stream validator and its finding
//! and report structures.

pub mod finding;
pub mod validator;

pub use finding::*;
pub use validator::*;
