#![warn(missing_docs)]
//! Deterministic testing surfaces for map generation: canonical JSON
//! comparison, golden snapshots and CI metrics reports.

mod metrics;
mod snapshot;

pub use metrics::*;
pub use snapshot::*;
