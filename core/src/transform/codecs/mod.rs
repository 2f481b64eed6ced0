//! transform/codecs/mod.rs
//! Concrete encoders and decoders.

pub mod deflate;
pub mod gzip;
pub mod unzip;
pub mod zstd;

pub use deflate::{DeflateDecoder, DeflateEncoder, Framing};
pub use gzip::{GzipDecoder, GzipEncoder};
pub use unzip::UnzipDecoder;
pub use self::zstd::{ZstdDecoder, ZstdEncoder};

use bytes::Bytes;

/// Move everything `writer_buf` holds into `out`, split into `chunk_size` pieces.
pub(crate) fn drain_chunked(writer_buf: &mut Vec<u8>, chunk_size: usize, out: &mut Vec<Bytes>) {
    if writer_buf.is_empty() {
        return;
    }
    let mut produced = Bytes::from(std::mem::take(writer_buf));
    while produced.len() > chunk_size {
        out.push(produced.split_to(chunk_size));
    }
    out.push(produced);
}
