//! fixtures.rs
//! Named input buffers.
//!
//! Loading from disk is a thin convenience; the matrix only ever sees
//! `Fixture` values.

use std::path::Path;

use anyhow::Context;
use bytes::Bytes;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fixture {
    id: String,
    data: Bytes,
}

impl Fixture {
    pub fn new(id: impl Into<String>, data: impl Into<Bytes>) -> Self {
        Self { id: id.into(), data: data.into() }
    }

    /// Read a file; the file name becomes the id.
    pub fn from_path(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read(path)
            .with_context(|| format!("reading fixture {}", path.display()))?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(Self::new(id, data))
    }

    /// The running test binary: real machine code, poorly compressible.
    pub fn current_executable() -> anyhow::Result<Self> {
        let exe = std::env::current_exe().context("locating current executable")?;
        Self::from_path(exe)
    }

    pub fn empty(id: impl Into<String>) -> Self {
        Self::new(id, Bytes::new())
    }

    /// Seeded noise, stands in for already-compressed media.
    pub fn random(id: impl Into<String>, len: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = vec![0u8; len];
        rng.fill(&mut data[..]);
        Self::new(id, data)
    }

    /// Seeded text built from a small vocabulary, highly compressible.
    pub fn text(id: impl Into<String>, len: usize, seed: u64) -> Self {
        const WORDS: &[&str] = &[
            "ellipsis", "stream", "window", "deflate", "trickle", "chunk", "pipe", "sink",
            "\u{2026}", "\n", "level", "strategy",
        ];
        let mut rng = StdRng::seed_from_u64(seed);
        let mut data = Vec::with_capacity(len + 16);
        while data.len() < len {
            let word = WORDS[rng.gen_range(0..WORDS.len())];
            data.extend_from_slice(word.as_bytes());
            data.push(b' ');
        }
        data.truncate(len);
        Self::new(id, data)
    }

    /// Image-like, text and empty inputs.
    pub fn standard_set() -> Vec<Fixture> {
        vec![
            Fixture::random("person.jpg", 45 * 1024, 0x5eed),
            Fixture::text("elipses.txt", 64 * 1024, 0x7e87),
            Fixture::empty("empty.txt"),
        ]
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn data(&self) -> &Bytes {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
