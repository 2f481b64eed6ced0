//! harness/mod.rs
//! Pipeline composition, verification and the parameter matrix.

pub mod verify;
pub mod pipeline;
pub mod matrix;
pub mod compat;

pub use verify::VerificationCallback;
pub use pipeline::{PipelineHandle, PipelineRunner, PipelineTelemetry};
pub use matrix::{enumerate_cases, CaseIter, MatrixReport, ParameterMatrixRunner};
pub use compat::CompatibilityCheck;
pub use crate::types::VerificationResult;
