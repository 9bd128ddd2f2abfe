//! HR process simulation module
//!
//! This module contains the HR stream record types, the offboarding
//! schedule planner, and the process simulator that drives the lifecycle
//! state machine and emits the merged HR stream.

pub mod event;
pub mod schedule;
pub mod simulator;

pub use event::*;
pub use schedule::*;
pub use simulator::*;
