//! transform/registry.rs
//! Transform pair registry and factory functions.

use std::fmt;

use num_enum::TryFromPrimitive;
use serde::Serialize;

use crate::constants::pair_ids;
use crate::transform::codecs::{
    DeflateDecoder, DeflateEncoder, Framing, GzipDecoder, GzipEncoder, UnzipDecoder, ZstdDecoder,
    ZstdEncoder,
};
use crate::transform::types::{Transform, TransformError};
use crate::types::Configuration;

/// Encoder/decoder combination exercised by the matrix.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize)]
pub enum TransformPair {
    DeflateInflate       = pair_ids::DEFLATE_INFLATE,
    GzipGunzip           = pair_ids::GZIP_GUNZIP,
    DeflateUnzip         = pair_ids::DEFLATE_UNZIP,
    GzipUnzip            = pair_ids::GZIP_UNZIP,
    DeflateRawInflateRaw = pair_ids::DEFLATE_RAW_INFLATE,
    ZstdZstd             = pair_ids::ZSTD_ZSTD,
}

impl TransformPair {
    pub const ALL: [TransformPair; 6] = [
        TransformPair::DeflateInflate,
        TransformPair::GzipGunzip,
        TransformPair::DeflateUnzip,
        TransformPair::GzipUnzip,
        TransformPair::DeflateRawInflateRaw,
        TransformPair::ZstdZstd,
    ];

    pub fn from_id(id: u16) -> Result<Self, TransformError> {
        Self::try_from_primitive(id).map_err(|_| TransformError::UnsupportedPair { id })
    }

    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn encoder_name(self) -> &'static str {
        match self {
            TransformPair::DeflateInflate | TransformPair::DeflateUnzip => "deflate",
            TransformPair::GzipGunzip | TransformPair::GzipUnzip => "gzip",
            TransformPair::DeflateRawInflateRaw => "deflate-raw",
            TransformPair::ZstdZstd => "zstd",
        }
    }

    pub fn decoder_name(self) -> &'static str {
        match self {
            TransformPair::DeflateInflate => "inflate",
            TransformPair::GzipGunzip => "gunzip",
            TransformPair::DeflateUnzip | TransformPair::GzipUnzip => "unzip",
            TransformPair::DeflateRawInflateRaw => "inflate-raw",
            TransformPair::ZstdZstd => "unzstd",
        }
    }

    /// Whether the decoder honors the configured window size.
    pub fn uses_window(self) -> bool {
        matches!(
            self,
            TransformPair::DeflateInflate
                | TransformPair::DeflateUnzip
                | TransformPair::DeflateRawInflateRaw
        )
    }

    pub fn create_encoder(self, config: &Configuration) -> Result<Box<dyn Transform>, TransformError> {
        match self {
            TransformPair::DeflateInflate | TransformPair::DeflateUnzip => {
                Ok(Box::new(DeflateEncoder::new(config, Framing::Zlib)))
            }
            TransformPair::GzipGunzip | TransformPair::GzipUnzip => {
                Ok(Box::new(GzipEncoder::new(config)))
            }
            TransformPair::DeflateRawInflateRaw => {
                Ok(Box::new(DeflateEncoder::new(config, Framing::Raw)))
            }
            TransformPair::ZstdZstd => Ok(Box::new(ZstdEncoder::new(config)?)),
        }
    }

    pub fn create_decoder(self, config: &Configuration) -> Result<Box<dyn Transform>, TransformError> {
        match self {
            TransformPair::DeflateInflate => Ok(Box::new(DeflateDecoder::new(config, Framing::Zlib))),
            TransformPair::GzipGunzip => Ok(Box::new(GzipDecoder::new(config))),
            TransformPair::DeflateUnzip | TransformPair::GzipUnzip => {
                Ok(Box::new(UnzipDecoder::new(config)))
            }
            TransformPair::DeflateRawInflateRaw => {
                Ok(Box::new(DeflateDecoder::new(config, Framing::Raw)))
            }
            TransformPair::ZstdZstd => Ok(Box::new(ZstdDecoder::new(config)?)),
        }
    }
}

impl fmt::Display for TransformPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}->{}", self.encoder_name(), self.decoder_name())
    }
}
