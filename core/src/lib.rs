//! roundtrip-core
//!
//! Cooperative streaming round-trip harness.
//! Drives encoder/decoder pairs through a trickle-fed pipe and checks
//! that every configuration reproduces its input byte for byte.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;
pub mod config;
pub mod fixtures;

// Cooperative runtime
pub mod scheduler;

// Stream layers
pub mod stream;
pub mod transform;
pub mod harness;

pub mod telemetry;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{Dimensions, HarnessConfig, MatrixMode};
    pub use crate::fixtures::Fixture;
    pub use crate::harness::{
        CompatibilityCheck, MatrixReport, ParameterMatrixRunner, PipelineHandle, PipelineRunner,
        VerificationCallback, VerificationResult,
    };
    pub use crate::scheduler::{CooperativeRuntime, Scheduler};
    pub use crate::stream::{pipe, FlowControl, SignalSource, Sink, TrickleSource, Writable};
    pub use crate::telemetry::{Stage, StageTimes, TelemetryCounters, TelemetrySnapshot};
    pub use crate::transform::{Transform, TransformError, TransformPair, TransformStage};
    pub use crate::types::{Configuration, HarnessError, StreamState, Strategy, TestCase};
}
