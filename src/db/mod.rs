//! Storage module for LatencyTrail.
//!
//! Keeps the measurement log and the derived summary in JSON files.

mod models;
mod store;
pub mod timestamp;

pub use models::*;
pub use store::*;
