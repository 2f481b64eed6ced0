//! Zstd frames: write adapter for encoding, raw streaming API for decoding.
//!
//! Only `level` applies; `-1` and `0` both select the zstd default.

use std::io::Write;

use bytes::Bytes;
use ::zstd::stream::raw::{Decoder, Operation};

use crate::transform::codecs::drain_chunked;
use crate::transform::types::{Transform, TransformError};
use crate::types::Configuration;

pub struct ZstdEncoder {
    encoder: ::zstd::stream::write::Encoder<'static, Vec<u8>>,
    chunk_size: usize,
}

impl ZstdEncoder {
    pub fn new(config: &Configuration) -> Result<Self, TransformError> {
        let level = i32::from(config.level().max(0));
        let encoder = ::zstd::stream::write::Encoder::new(Vec::new(), level)
            .map_err(|e| TransformError::InitFailed { codec: "zstd", msg: e.to_string() })?;
        Ok(Self { encoder, chunk_size: config.chunk_size() })
    }
}

impl Transform for ZstdEncoder {
    fn name(&self) -> &'static str {
        "zstd"
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        self.encoder
            .write_all(input)
            .map_err(|e| TransformError::process("zstd", e))?;
        drain_chunked(self.encoder.get_mut(), self.chunk_size, out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        self.encoder
            .do_finish()
            .map_err(|e| TransformError::process("zstd", e))?;
        drain_chunked(self.encoder.get_mut(), self.chunk_size, out);
        Ok(())
    }
}

/// Frame-aware decoder over the raw zstd streaming API.
///
/// `frame_done` tracks whether the last frame seen was fully decoded; a
/// `finish` in the middle of a frame is reported as truncation.
pub struct ZstdDecoder {
    decoder: Decoder<'static>,
    scratch: Vec<u8>,
    frame_done: bool,
}

impl ZstdDecoder {
    pub fn new(config: &Configuration) -> Result<Self, TransformError> {
        let decoder = Decoder::new()
            .map_err(|e| TransformError::InitFailed { codec: "unzstd", msg: e.to_string() })?;
        Ok(Self { decoder, scratch: vec![0; config.chunk_size()], frame_done: false })
    }

    /// One decompression step into `scratch`; returns (read, written).
    fn step(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(usize, usize), TransformError> {
        let status = self
            .decoder
            .run_on_buffers(input, &mut self.scratch)
            .map_err(|e| TransformError::process("unzstd", e))?;
        if status.bytes_written > 0 {
            out.push(Bytes::copy_from_slice(&self.scratch[..status.bytes_written]));
        }
        // An idle step reports the next header size, not frame state.
        if status.bytes_read > 0 || status.bytes_written > 0 {
            self.frame_done = status.remaining == 0;
        }
        Ok((status.bytes_read, status.bytes_written))
    }
}

impl Transform for ZstdDecoder {
    fn name(&self) -> &'static str {
        "unzstd"
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        let mut consumed = 0;
        loop {
            let (read, written) = self.step(&input[consumed..], out)?;
            consumed += read;
            if consumed >= input.len() && written < self.scratch.len() {
                return Ok(());
            }
            if read == 0 && written == 0 {
                return Ok(());
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        loop {
            let (_, written) = self.step(&[], out)?;
            if written < self.scratch.len() {
                break;
            }
        }
        if !self.frame_done {
            return Err(TransformError::Truncated { codec: "unzstd" });
        }
        Ok(())
    }
}
