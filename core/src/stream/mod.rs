//! stream/mod.rs
//! Single-threaded stream stages and the pipe that joins them.
//!
//! Stages are cheap `Clone` handles over shared state; every stage emits
//! through an `Emitter` and consumes through `Writable`.

pub mod signal;
pub mod trickle;
pub mod sink;
pub mod pipe;

pub use signal::{Emitter, SignalSource, Terminal};
pub use trickle::TrickleSource;
pub use sink::Sink;
pub use pipe::{pipe, FlowControl, Writable};
