//! Auto-detecting decoder: gzip when the stream starts with the gzip
//! magic, zlib-wrapped deflate otherwise.

use bytes::Bytes;

use crate::transform::codecs::deflate::{DeflateDecoder, Framing};
use crate::transform::codecs::gzip::GzipDecoder;
use crate::transform::types::{Transform, TransformError};
use crate::types::Configuration;

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

pub struct UnzipDecoder {
    config: Configuration,
    head: Vec<u8>,
    inner: Option<Box<dyn Transform>>,
}

impl UnzipDecoder {
    pub fn new(config: &Configuration) -> Self {
        Self { config: *config, head: Vec::with_capacity(GZIP_MAGIC.len()), inner: None }
    }

    fn detect(&self) -> Box<dyn Transform> {
        if self.head[..GZIP_MAGIC.len()] == GZIP_MAGIC {
            Box::new(GzipDecoder::new(&self.config))
        } else {
            Box::new(DeflateDecoder::new(&self.config, Framing::Zlib))
        }
    }
}

impl Transform for UnzipDecoder {
    fn name(&self) -> &'static str {
        "unzip"
    }

    fn push(&mut self, input: &[u8], out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        if let Some(inner) = self.inner.as_mut() {
            return inner.push(input, out);
        }
        self.head.extend_from_slice(input);
        if self.head.len() < GZIP_MAGIC.len() {
            return Ok(());
        }
        let mut inner = self.detect();
        log::trace!("[unzip] detected {}", inner.name());
        let head = std::mem::take(&mut self.head);
        inner.push(&head, out)?;
        self.inner = Some(inner);
        Ok(())
    }

    fn finish(&mut self, out: &mut Vec<Bytes>) -> Result<(), TransformError> {
        match self.inner.as_mut() {
            Some(inner) => inner.finish(out),
            None => Err(TransformError::Truncated { codec: "unzip" }),
        }
    }
}
