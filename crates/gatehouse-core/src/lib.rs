//! Vehicle registry and occupancy ledger for the Gatehouse gate.
//!
//! Holds the records, the [`store::GateStore`] contract every backend
//! fulfils, and the plate-driven gate flows built on it. Storage and HTTP
//! live in the sibling crates.

pub mod error;
pub mod gate;
pub mod ledger;
pub mod memory;
pub mod occupancy;
pub mod report;
pub mod store;
pub mod vehicle;

pub use error::{Error, Result};
