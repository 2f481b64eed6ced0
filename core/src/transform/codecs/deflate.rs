//! Deflate (zlib wrapper or raw) via flate2 low-level streams.
//!
//! Window sizes below 9 are raised to 9 on both the encode and decode
//! side, so a decoder asking for 8 still reads data written with 9.

use bytes::Bytes;
use flate2::{Compress, Compression, Decompress, FlushCompress, FlushDecompress, Status};

use crate::constants::MIN_EFFECTIVE_WINDOW_SIZE;
use crate::transform::types::{Transform, TransformError};
use crate::types::Configuration;

/// Container around the deflate stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Framing {
    Zlib,
    Raw,
}

impl Framing {
    fn zlib_header(self) -> bool {
        matches!(self, Framing::Zlib)
    }
}

/// Legacy normalization: window size 8 is treated as 9.
pub fn effective_window_bits(window_size: u8) -> u8 {
    window_size.max(MIN_EFFECTIVE_WINDOW_SIZE)
}

/// `-1` selects the library default.
pub fn compression_level(level: i8) -> Compression {
    match u32::try_from(level) {
        Ok(lvl) => Compression::new(lvl),
        Err(_) => Compression::default(),
    }
}

pub struct DeflateEncoder {
    codec: &'static str,
    compress: Compress,
    chunk_size: usize,
    /// Reused output buffer with room for one chunk.
    scratch: Vec<u8>,
}

impl DeflateEncoder {
    pub fn new(config: &Configuration, framing: Framing) -> Self {
        let codec = match framing {
            Framing::Zlib => "deflate",
            Framing::Raw => "deflate-raw",
        };
        let compress = Compress::new_with_window_bits(
            compression_level(config.level()),
            framing.zlib_header(),
            effective_window_bits(config.window_size()),
        );
        let chunk_size = config.chunk_size();
        Self { codec, compress, chunk_size, scratch: Vec::with_capacity(chunk_size) }
    }
}

impl Transform for DeflateEncoder {
    fn name(&self) -> &'static str {
        self.codec
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        let mut consumed = 0;
        loop {
            self.scratch.clear();
            let before = self.compress.total_in();
            self.compress
                .compress_vec(&input[consumed..], &mut self.scratch, FlushCompress::None)
                .map_err(|e| TransformError::process(self.codec, e))?;
            let read = (self.compress.total_in() - before) as usize;
            let written = self.scratch.len();
            consumed += read;
            if written > 0 {
                out.push(Bytes::copy_from_slice(&self.scratch));
            }
            // A full output buffer may mean more output is pending.
            if consumed >= input.len() && written < self.chunk_size {
                return Ok(());
            }
            if read == 0 && written == 0 {
                return Err(TransformError::Stalled { codec: self.codec });
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        loop {
            self.scratch.clear();
            let status = self
                .compress
                .compress_vec(&[], &mut self.scratch, FlushCompress::Finish)
                .map_err(|e| TransformError::process(self.codec, e))?;
            let written = self.scratch.len();
            if written > 0 {
                out.push(Bytes::copy_from_slice(&self.scratch));
            }
            match status {
                Status::StreamEnd => return Ok(()),
                _ if written == 0 => return Err(TransformError::Stalled { codec: self.codec }),
                _ => {}
            }
        }
    }
}

pub struct DeflateDecoder {
    codec: &'static str,
    decompress: Decompress,
    chunk_size: usize,
    scratch: Vec<u8>,
    done: bool,
}

impl DeflateDecoder {
    pub fn new(config: &Configuration, framing: Framing) -> Self {
        let codec = match framing {
            Framing::Zlib => "inflate",
            Framing::Raw => "inflate-raw",
        };
        let decompress = Decompress::new_with_window_bits(
            framing.zlib_header(),
            effective_window_bits(config.window_size()),
        );
        let chunk_size = config.chunk_size();
        Self { codec, decompress, chunk_size, scratch: Vec::with_capacity(chunk_size), done: false }
    }
}

impl Transform for DeflateDecoder {
    fn name(&self) -> &'static str {
        self.codec
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        if self.done {
            if !input.is_empty() {
                log::debug!("[{}] ignoring {} bytes after stream end", self.codec, input.len());
            }
            return Ok(());
        }
        let mut consumed = 0;
        loop {
            self.scratch.clear();
            let before = self.decompress.total_in();
            let status = self
                .decompress
                .decompress_vec(&input[consumed..], &mut self.scratch, FlushDecompress::None)
                .map_err(|e| TransformError::process(self.codec, e))?;
            let read = (self.decompress.total_in() - before) as usize;
            let written = self.scratch.len();
            consumed += read;
            if written > 0 {
                out.push(Bytes::copy_from_slice(&self.scratch));
            }
            if status == Status::StreamEnd {
                self.done = true;
                if consumed < input.len() {
                    log::debug!("[{}] ignoring {} bytes after stream end", self.codec, input.len() - consumed);
                }
                return Ok(());
            }
            if consumed >= input.len() && written < self.chunk_size {
                return Ok(());
            }
            // Needs more input before it can continue.
            if read == 0 && written == 0 {
                return Ok(());
            }
        }
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        while !self.done {
            self.scratch.clear();
            let status = self
                .decompress
                .decompress_vec(&[], &mut self.scratch, FlushDecompress::Finish)
                .map_err(|e| TransformError::process(self.codec, e))?;
            let written = self.scratch.len();
            if written > 0 {
                out.push(Bytes::copy_from_slice(&self.scratch));
            }
            if status == Status::StreamEnd {
                self.done = true;
            } else if written == 0 {
                return Err(TransformError::Truncated { codec: self.codec });
            }
        }
        Ok(())
    }
}
