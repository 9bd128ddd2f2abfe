//! Access stream module
//!
//! This module contains the access and violation record types, the routine
//! daily access generator, and the two-tier anomaly injector.

pub mod anomaly;
pub mod event;
pub mod generator;

pub use anomaly::*;
pub use event::*;
pub use generator::*;
