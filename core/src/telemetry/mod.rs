//! telemetry/mod.rs
//! Stage timings and byte counts for a sign operation.
//!
//! - Timers accumulate per `Stage`; a snapshot freezes them with the byte counts.
//! - Snapshots are serde-serializable for export.

pub mod timers;
pub mod snapshot;

pub use timers::*;
pub use snapshot::*;
