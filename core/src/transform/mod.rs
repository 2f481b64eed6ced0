//! transform/mod.rs
//! Encoder/decoder pairs and the stage adapter that streams them.

pub mod types;
pub mod codecs;
pub mod registry;
pub mod stage;

pub use types::{Transform, TransformError};
pub use registry::TransformPair;
pub use stage::TransformStage;
