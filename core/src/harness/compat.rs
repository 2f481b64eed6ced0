//! harness/compat.rs
//! Asymmetric window-size scenario: encode with one window size, decode
//! with a smaller one, and require a byte-exact round trip.

use crate::fixtures::Fixture;
use crate::harness::pipeline::PipelineRunner;
use crate::scheduler::CooperativeRuntime;
use crate::transform::TransformPair;
use crate::types::{Configuration, HarnessError, TestCase, VerificationResult};

const ENCODE_WINDOW: u8 = 9;
const DECODE_WINDOW: u8 = 8;

pub struct CompatibilityCheck {
    fixture: Fixture,
    encode_window: u8,
    decode_window: u8,
    pair: TransformPair,
}

impl CompatibilityCheck {
    pub fn new(fixture: Fixture) -> Self {
        Self {
            fixture,
            encode_window: ENCODE_WINDOW,
            decode_window: DECODE_WINDOW,
            pair: TransformPair::DeflateRawInflateRaw,
        }
    }

    /// Uses the running executable as real binary input.
    pub fn current_executable() -> Result<Self, HarnessError> {
        let path = std::env::current_exe()?;
        let data = std::fs::read(&path)?;
        let id = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "current-exe".to_string());
        Ok(Self::new(Fixture::new(id, data)))
    }

    pub fn with_windows(mut self, encode_window: u8, decode_window: u8) -> Self {
        self.encode_window = encode_window;
        self.decode_window = decode_window;
        self
    }

    pub fn with_pair(mut self, pair: TransformPair) -> Self {
        self.pair = pair;
        self
    }

    pub fn fixture(&self) -> &Fixture {
        &self.fixture
    }

    pub fn run(&self) -> Result<VerificationResult, HarnessError> {
        let base = Configuration::default();
        let encode = base.with_window_size(self.encode_window)?;
        let decode = base.with_window_size(self.decode_window)?;
        log::debug!(
            "compat: {} ({} bytes) encode window {} decode window {}",
            self.fixture.id(),
            self.fixture.len(),
            self.encode_window,
            self.decode_window
        );

        let mut runtime = CooperativeRuntime::new();
        let case = TestCase::new(0, self.fixture.clone(), encode, self.pair);
        let handle = PipelineRunner::new(case, runtime.scheduler())
            .with_decode_config(decode)
            .run()?;
        runtime.run_until_stalled();
        Ok(handle.settle())
    }
}
