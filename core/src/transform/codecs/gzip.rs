//! Gzip member encode/decode via flate2 write adapters.
//!
//! The gzip writer always uses a 15-bit window; only `level` applies.

use std::io::Write;

use bytes::Bytes;
use flate2::write::{GzDecoder as GzWriteDecoder, GzEncoder as GzWriteEncoder};

use crate::transform::codecs::deflate::compression_level;
use crate::transform::codecs::drain_chunked;
use crate::transform::types::{Transform, TransformError};
use crate::types::Configuration;

pub struct GzipEncoder {
    encoder: GzWriteEncoder<Vec<u8>>,
    chunk_size: usize,
}

impl GzipEncoder {
    pub fn new(config: &Configuration) -> Self {
        Self {
            encoder: GzWriteEncoder::new(Vec::new(), compression_level(config.level())),
            chunk_size: config.chunk_size(),
        }
    }
}

impl Transform for GzipEncoder {
    fn name(&self) -> &'static str {
        "gzip"
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        self.encoder
            .write_all(input)
            .map_err(|e| TransformError::process("gzip", e))?;
        drain_chunked(self.encoder.get_mut(), self.chunk_size, out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        self.encoder
            .try_finish()
            .map_err(|e| TransformError::process("gzip", e))?;
        drain_chunked(self.encoder.get_mut(), self.chunk_size, out);
        Ok(())
    }
}

pub struct GzipDecoder {
    decoder: GzWriteDecoder<Vec<u8>>,
    chunk_size: usize,
}

impl GzipDecoder {
    pub fn new(config: &Configuration) -> Self {
        Self {
            decoder: GzWriteDecoder::new(Vec::new()),
            chunk_size: config.chunk_size(),
        }
    }
}

impl GzipDecoder {
    /// flate2 reports a missing trailer and a bad one alike. A finished
    /// member with its full trailer refuses any further byte; a truncated
    /// one still takes input.
    fn member_complete(&mut self) -> bool {
        matches!(self.decoder.write(&[0]), Ok(0))
    }
}

impl Transform for GzipDecoder {
    fn name(&self) -> &'static str {
        "gunzip"
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        self.decoder
            .write_all(input)
            .map_err(|e| TransformError::process("gunzip", e))?;
        drain_chunked(self.decoder.get_mut(), self.chunk_size, out);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        if self.decoder.header().is_none() {
            return Err(TransformError::Truncated { codec: "gunzip" });
        }
        if let Err(e) = self.decoder.try_finish() {
            if e.kind() == std::io::ErrorKind::UnexpectedEof || !self.member_complete() {
                return Err(TransformError::Truncated { codec: "gunzip" });
            }
            return Err(TransformError::process("gunzip", e));
        }
        drain_chunked(self.decoder.get_mut(), self.chunk_size, out);
        Ok(())
    }
}
