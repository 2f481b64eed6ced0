//! config.rs
//! Matrix dimensions and harness settings.
//!
//! Dimension lists are built by a pure function of the mode; nothing here
//! is global or mutable.

use serde::{Deserialize, Serialize};

use crate::constants::{full, quick, DEFAULT_MAX_IN_FLIGHT};
use crate::transform::TransformPair;
use crate::types::{Configuration, HarnessError};

/// Which parameter ranges the matrix covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatrixMode {
    /// One representative value per parameter.
    #[default]
    Quick,
    /// Every value of every parameter.
    Full,
}

impl MatrixMode {
    pub fn from_flag(full: bool) -> Self {
        if full { MatrixMode::Full } else { MatrixMode::Quick }
    }
}

/// Independent dimensions of the cross-product, outer to inner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dimensions {
    pub chunk_sizes: Vec<usize>,
    pub trickle_rates: Vec<usize>,
    pub window_sizes: Vec<u8>,
    pub levels: Vec<i8>,
    pub memory_levels: Vec<u8>,
    pub strategies: Vec<u8>,
    pub pairs: Vec<TransformPair>,
}

impl Dimensions {
    pub fn for_mode(mode: MatrixMode) -> Self {
        match mode {
            MatrixMode::Full => Self {
                chunk_sizes: full::CHUNK_SIZES.to_vec(),
                trickle_rates: full::TRICKLE_RATES.to_vec(),
                window_sizes: full::WINDOW_SIZES.to_vec(),
                levels: full::LEVELS.to_vec(),
                memory_levels: full::MEMORY_LEVELS.to_vec(),
                strategies: full::STRATEGIES.to_vec(),
                pairs: TransformPair::ALL.to_vec(),
            },
            MatrixMode::Quick => Self {
                chunk_sizes: quick::CHUNK_SIZES.to_vec(),
                trickle_rates: quick::TRICKLE_RATES.to_vec(),
                window_sizes: quick::WINDOW_SIZES.to_vec(),
                levels: quick::LEVELS.to_vec(),
                memory_levels: quick::MEMORY_LEVELS.to_vec(),
                strategies: quick::STRATEGIES.to_vec(),
                pairs: TransformPair::ALL.to_vec(),
            },
        }
    }

    /// Number of parameter combinations per fixture.
    pub fn combinations(&self) -> usize {
        self.chunk_sizes.len()
            * self.trickle_rates.len()
            * self.window_sizes.len()
            * self.levels.len()
            * self.memory_levels.len()
            * self.strategies.len()
            * self.pairs.len()
    }

    /// Reject any value `Configuration::new` would refuse.
    pub fn validate(&self) -> Result<(), HarnessError> {
        let base = Configuration::default();
        let check = |level: i8, window: u8, mem: u8, strategy: u8, chunk: usize, trickle: usize| {
            Configuration::new(level, window, mem, strategy, chunk, trickle).map(|_| ())
        };
        let strategy = base.strategy() as u8;
        for &v in &self.levels {
            check(v, base.window_size(), base.memory_level(), strategy, base.chunk_size(), base.trickle_rate())?;
        }
        for &v in &self.window_sizes {
            check(base.level(), v, base.memory_level(), strategy, base.chunk_size(), base.trickle_rate())?;
        }
        for &v in &self.memory_levels {
            check(base.level(), base.window_size(), v, strategy, base.chunk_size(), base.trickle_rate())?;
        }
        for &v in &self.strategies {
            check(base.level(), base.window_size(), base.memory_level(), v, base.chunk_size(), base.trickle_rate())?;
        }
        for &v in &self.chunk_sizes {
            check(base.level(), base.window_size(), base.memory_level(), strategy, v, base.trickle_rate())?;
        }
        for &v in &self.trickle_rates {
            check(base.level(), base.window_size(), base.memory_level(), strategy, base.chunk_size(), v)?;
        }
        Ok(())
    }

    /// Restrict the pair dimension (useful for focused runs).
    pub fn with_pairs(mut self, pairs: &[TransformPair]) -> Self {
        self.pairs = pairs.to_vec();
        self
    }
}

/// Harness-level settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HarnessConfig {
    pub mode: MatrixMode,
    /// Pipelines launched before the runtime is driven to completion.
    pub max_in_flight: usize,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self { mode: MatrixMode::Quick, max_in_flight: DEFAULT_MAX_IN_FLIGHT }
    }
}

impl HarnessConfig {
    pub fn new(mode: MatrixMode, max_in_flight: usize) -> Result<Self, HarnessError> {
        let config = Self { mode, max_in_flight };
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(raw: &str) -> Result<Self, HarnessError> {
        let config: Self = serde_json::from_str(raw)
            .map_err(|e| HarnessError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), HarnessError> {
        if self.max_in_flight == 0 {
            return Err(HarnessError::InvalidConfig("max_in_flight must be positive".into()));
        }
        Ok(())
    }

    pub fn dimensions(&self) -> Dimensions {
        Dimensions::for_mode(self.mode)
    }
}
