//! telemetry/counters.rs
//! Mutable counters updated by stream taps while pipelines run.

use std::ops::AddAssign;

use serde::{Deserialize, Serialize};

use crate::types::VerificationResult;

#[derive(Default, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TelemetryCounters {
    pub cases_total: u64,
    pub cases_passed: u64,
    pub cases_failed: u64,
    /// Slices emitted by trickle sources.
    pub slices_emitted: u64,
    /// Largest single slice seen; never exceeds the largest trickle rate.
    pub max_slice_len: u64,
    pub bytes_source: u64,
    pub bytes_encoded: u64,
    pub bytes_decoded: u64,
}

impl TelemetryCounters {
    /// Record one slice emitted by a source.
    pub fn add_slice(&mut self, len: usize) {
        let len = len as u64;
        self.slices_emitted += 1;
        self.bytes_source += len;
        self.max_slice_len = self.max_slice_len.max(len);
    }

    pub fn add_encoded(&mut self, len: usize) {
        self.bytes_encoded += len as u64;
    }

    pub fn add_decoded(&mut self, len: usize) {
        self.bytes_decoded += len as u64;
    }

    pub fn record_result(&mut self, result: &VerificationResult) {
        self.cases_total += 1;
        if result.passed {
            self.cases_passed += 1;
        } else {
            self.cases_failed += 1;
        }
    }

    pub fn merge(&mut self, other: &TelemetryCounters) {
        self.cases_total += other.cases_total;
        self.cases_passed += other.cases_passed;
        self.cases_failed += other.cases_failed;
        self.slices_emitted += other.slices_emitted;
        self.max_slice_len = self.max_slice_len.max(other.max_slice_len);
        self.bytes_source += other.bytes_source;
        self.bytes_encoded += other.bytes_encoded;
        self.bytes_decoded += other.bytes_decoded;
    }
}

impl AddAssign for TelemetryCounters {
    fn add_assign(&mut self, rhs: Self) {
        self.merge(&rhs);
    }
}
