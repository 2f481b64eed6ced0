//! scheduler/mod.rs
//! Single-threaded cooperative scheduling.
//!
//! Work is never run inline: `Scheduler::defer` queues a continuation that
//! the owning `CooperativeRuntime` executes on a later tick.

pub mod runtime;

pub use runtime::{CooperativeRuntime, Scheduler};
