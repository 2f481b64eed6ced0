//! types.rs
//! Shared errors, stream states, configuration and per-case records.

use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::{
    DEFAULT_CHUNK_SIZE, DEFAULT_LEVEL, DEFAULT_MEMORY_LEVEL, DEFAULT_TRICKLE_RATE, DEFAULT_WINDOW_SIZE,
    LEVEL_RANGE, MEMORY_LEVEL_RANGE, MIN_CHUNK_SIZE, STRATEGY_RANGE, WINDOW_SIZE_RANGE,
};
use crate::fixtures::Fixture;
use crate::transform::{TransformError, TransformPair};

/// Unified harness error.
/// - Cloneable so an error signal can reach every listener of a stage.
/// - Data mismatches are not errors; they surface as a failed `VerificationResult`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// An operation outside a stage's documented contract.
    #[error("contract violation in {stage}.{op}: {reason}")]
    ContractViolation {
        stage: &'static str,
        op: &'static str,
        reason: String,
    },

    /// The sink saw `end` before every expected byte arrived.
    #[error("premature end: expected {expected} bytes, received {received}")]
    PrematureEnd { expected: usize, received: usize },

    #[error("transform error: {0}")]
    Transform(#[from] TransformError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("scheduler error: {0}")]
    Scheduler(String),

    #[error("io error: {0}")]
    Io(String),
}

impl From<std::io::Error> for HarnessError {
    fn from(err: std::io::Error) -> Self {
        HarnessError::Io(err.to_string())
    }
}

impl HarnessError {
    pub fn contract(stage: &'static str, op: &'static str, reason: impl Into<String>) -> Self {
        HarnessError::ContractViolation { stage, op, reason: reason.into() }
    }
}

/// Lifecycle of a single stream stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamState {
    Idle,
    Flowing,
    Paused,
    Ended,
}

impl fmt::Display for StreamState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamState::Idle    => "idle",
            StreamState::Flowing => "flowing",
            StreamState::Paused  => "paused",
            StreamState::Ended   => "ended",
        };
        f.write_str(name)
    }
}

/// Deflate strategy identifiers (zlib numbering).
#[repr(u8)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
pub enum Strategy {
    Default     = 0,
    Filtered    = 1,
    HuffmanOnly = 2,
    Rle         = 3,
    Fixed       = 4,
}

/// Immutable per-case parameters.
///
/// Only `Configuration::new` builds one, so every instance is in range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Configuration {
    level: i8,
    window_size: u8,
    memory_level: u8,
    strategy: Strategy,
    chunk_size: usize,
    trickle_rate: usize,
}

impl Configuration {
    pub fn new(
        level: i8,
        window_size: u8,
        memory_level: u8,
        strategy: u8,
        chunk_size: usize,
        trickle_rate: usize,
    ) -> Result<Self, HarnessError> {
        if !LEVEL_RANGE.contains(&level) {
            return Err(HarnessError::InvalidConfig(format!(
                "level {level} outside {LEVEL_RANGE:?}"
            )));
        }
        if !WINDOW_SIZE_RANGE.contains(&window_size) {
            return Err(HarnessError::InvalidConfig(format!(
                "window size {window_size} outside {WINDOW_SIZE_RANGE:?}"
            )));
        }
        if !MEMORY_LEVEL_RANGE.contains(&memory_level) {
            return Err(HarnessError::InvalidConfig(format!(
                "memory level {memory_level} outside {MEMORY_LEVEL_RANGE:?}"
            )));
        }
        if !STRATEGY_RANGE.contains(&strategy) {
            return Err(HarnessError::InvalidConfig(format!(
                "strategy {strategy} outside {STRATEGY_RANGE:?}"
            )));
        }
        let strategy = Strategy::try_from_primitive(strategy)
            .map_err(|_| HarnessError::InvalidConfig(format!("unknown strategy {strategy}")))?;
        if chunk_size < MIN_CHUNK_SIZE {
            return Err(HarnessError::InvalidConfig(format!(
                "chunk size {chunk_size} below minimum {MIN_CHUNK_SIZE}"
            )));
        }
        if trickle_rate == 0 {
            return Err(HarnessError::InvalidConfig("trickle rate must be positive".into()));
        }

        Ok(Self { level, window_size, memory_level, strategy, chunk_size, trickle_rate })
    }

    /// Same configuration with a different window size (validated).
    pub fn with_window_size(&self, window_size: u8) -> Result<Self, HarnessError> {
        Self::new(
            self.level,
            window_size,
            self.memory_level,
            self.strategy as u8,
            self.chunk_size,
            self.trickle_rate,
        )
    }

    pub fn level(&self) -> i8 { self.level }
    pub fn window_size(&self) -> u8 { self.window_size }
    pub fn memory_level(&self) -> u8 { self.memory_level }
    pub fn strategy(&self) -> Strategy { self.strategy }
    pub fn chunk_size(&self) -> usize { self.chunk_size }
    pub fn trickle_rate(&self) -> usize { self.trickle_rate }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            level: DEFAULT_LEVEL,
            window_size: DEFAULT_WINDOW_SIZE,
            memory_level: DEFAULT_MEMORY_LEVEL,
            strategy: Strategy::Default,
            chunk_size: DEFAULT_CHUNK_SIZE,
            trickle_rate: DEFAULT_TRICKLE_RATE,
        }
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{ level: {}, windowSize: {}, memLevel: {}, strategy: {:?}, chunkSize: {}, trickle: {} }}",
            self.level, self.window_size, self.memory_level, self.strategy, self.chunk_size, self.trickle_rate
        )
    }
}

/// One matrix cell: fixture, parameters, and the pair under test.
#[derive(Debug, Clone)]
pub struct TestCase {
    pub id: usize,
    pub fixture: Fixture,
    pub config: Configuration,
    pub pair: TransformPair,
}

impl TestCase {
    pub fn new(id: usize, fixture: Fixture, config: Configuration, pair: TransformPair) -> Self {
        Self { id, fixture, config, pair }
    }

    /// Human-readable coordinates used in failure messages.
    pub fn describe(&self) -> String {
        format!(
            "fixture={} chunkSize={} config={} transform={}->{}",
            self.fixture.id(),
            self.config.chunk_size(),
            self.config,
            self.pair.encoder_name(),
            self.pair.decoder_name(),
        )
    }
}

/// Outcome of one pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub test_case_id: usize,
    pub passed: bool,
    pub mismatch_index: Option<usize>,
    pub message: String,
    pub expected_crc32: u32,
    pub actual_crc32: Option<u32>,
}

impl VerificationResult {
    pub fn failed(test_case_id: usize, expected_crc32: u32, message: impl Into<String>) -> Self {
        Self {
            test_case_id,
            passed: false,
            mismatch_index: None,
            message: message.into(),
            expected_crc32,
            actual_crc32: None,
        }
    }
}
