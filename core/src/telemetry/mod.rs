//! telemetry/mod.rs
//! Counters, stage timers and immutable snapshots for harness runs.
//!
//! Counters are plain values owned by one pipeline (or one wave) and
//! merged into the run total; snapshots are taken once the run is over.

pub mod counters;
pub mod timers;
pub mod snapshot;

pub use counters::*;
pub use timers::*;
pub use snapshot::*;
