//! Core type definitions for the offboarding log simulator
//!
//! This module contains the fundamental types used throughout the simulator:
//! identifier newtypes, domain enumerations, and configuration structures.

pub mod config;
pub mod enums;
pub mod identifiers;

pub use config::*;
pub use enums::*;
pub use identifiers::*;
