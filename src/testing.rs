//! Test infrastructure
//!
//! [`MemoryProvider`] stands in for the three database servers so that
//! provisioning, seeding and reporting can be exercised end to end without
//! a running engine. [`fixtures`] builds exact rows for report tests.

pub mod fixtures;
pub mod memory;

pub use memory::{MemoryEngine, MemoryProvider};
