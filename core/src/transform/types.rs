//! transform/types.rs
//! Streaming transform contract and its errors.

use bytes::Bytes;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransformError {
    #[error("unsupported transform pair: 0x{id:x}")]
    UnsupportedPair { id: u16 },

    #[error("codec {codec} init failed: {msg}")]
    InitFailed { codec: &'static str, msg: String },

    #[error("codec {codec} process failed: {msg}")]
    ProcessFailed { codec: &'static str, msg: String },

    /// Input ended before the compressed stream did.
    #[error("codec {codec}: unexpected end of compressed stream")]
    Truncated { codec: &'static str },

    /// The codec neither consumed input nor produced output.
    #[error("codec {codec} made no progress")]
    Stalled { codec: &'static str },
}

impl TransformError {
    pub fn process(codec: &'static str, err: impl ToString) -> Self {
        TransformError::ProcessFailed { codec, msg: err.to_string() }
    }
}

/// One direction of a transform pair: consumes bytes, produces bytes, finishes.
///
/// Output pieces are at most the configured chunk size.
pub trait Transform: Send {
    fn name(&self) -> &'static str;
    /// Consume `input`, appending any produced pieces to `out`.
    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError>;
    /// Flush pending state; called exactly once after the last `push`.
    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError>;
}
