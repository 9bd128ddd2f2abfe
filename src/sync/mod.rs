//! Data-sync module
//!
//! This module contains the sync batch structures and the tracker that
//! assembles full extracts and incremental batches from the registry's
//! account-mutation journal.

pub mod batch;
pub mod tracker;

pub use batch::*;
pub use tracker::*;
