//! telemetry/snapshot.rs
//! Immutable summary of a finished run.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::telemetry::counters::TelemetryCounters;
use crate::telemetry::timers::{Stage, StageTimes, TelemetryTimer};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySnapshot {
    pub cases_total: u64,
    pub cases_passed: u64,
    pub cases_failed: u64,
    pub slices_emitted: u64,
    pub max_slice_len: u64,
    pub bytes_source: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
    /// Encoded over source bytes; above 1.0 for incompressible input.
    pub compression_ratio: f64,
    pub throughput_source_bytes_per_sec: f64,
    /// Scheduler continuations executed during the run.
    pub ticks: u64,
    pub elapsed: Duration,
    pub stage_times: StageTimes,
}

impl TelemetrySnapshot {
    pub fn from(counters: &TelemetryCounters, timer: &TelemetryTimer, ticks: u64) -> Self {
        let elapsed = timer.elapsed();

        let compression_ratio = if counters.bytes_source > 0 {
            counters.bytes_encoded as f64 / counters.bytes_source as f64
        } else {
            0.0
        };

        let throughput = if elapsed.as_secs_f64() > 0.0 {
            counters.bytes_source as f64 / elapsed.as_secs_f64()
        } else {
            0.0
        };

        Self {
            cases_total: counters.cases_total,
            cases_passed: counters.cases_passed,
            cases_failed: counters.cases_failed,
            slices_emitted: counters.slices_emitted,
            max_slice_len: counters.max_slice_len,
            bytes_source: counters.bytes_source,
            bytes_encoded: counters.bytes_encoded,
            bytes_decoded: counters.bytes_decoded,
            compression_ratio,
            throughput_source_bytes_per_sec: throughput,
            ticks,
            elapsed,
            stage_times: timer.stage_times.clone(),
        }
    }

    pub fn total_stage_time(&self) -> Duration {
        self.stage_times.total()
    }

    pub fn has_all_stages(&self, expected: &[Stage]) -> bool {
        self.stage_times.has_all(expected)
    }

    /// Every case is counted once; without failures, decoded bytes equal source bytes.
    pub fn sanity_check(&self) -> bool {
        self.cases_passed + self.cases_failed == self.cases_total
            && (self.cases_failed > 0 || self.bytes_decoded == self.bytes_source)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
