//! harness/verify.rs
//! Byte-exact comparison of sink output against the reference buffer.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Instant;

use bytes::Bytes;
use futures::channel::oneshot;

use crate::stream::{SignalSource, Sink};
use crate::telemetry::{Stage, StageTimes};
use crate::types::{TestCase, VerificationResult};

pub struct VerificationCallback {
    case_id: usize,
    description: String,
    reference: Bytes,
    expected_crc32: u32,
    times: Option<Rc<RefCell<StageTimes>>>,
}

impl VerificationCallback {
    pub fn new(case: &TestCase, reference: Bytes) -> Self {
        Self {
            case_id: case.id,
            description: case.describe(),
            expected_crc32: crc32fast::hash(&reference),
            reference,
            times: None,
        }
    }

    pub fn with_timing(mut self, times: Rc<RefCell<StageTimes>>) -> Self {
        self.times = Some(times);
        self
    }

    pub fn expected_crc32(&self) -> u32 {
        self.expected_crc32
    }

    /// Compare position by position up to the longer length; the first
    /// differing index (or the first index past the shorter buffer) fails.
    pub fn verify(&self, actual: &[u8]) -> VerificationResult {
        let expected = &self.reference[..];
        let mismatch = expected
            .iter()
            .zip(actual)
            .position(|(e, a)| e != a)
            .or_else(|| (expected.len() != actual.len()).then(|| expected.len().min(actual.len())));

        let actual_crc32 = Some(crc32fast::hash(actual));
        match mismatch {
            None => VerificationResult {
                test_case_id: self.case_id,
                passed: true,
                mismatch_index: None,
                message: format!("{}: {} bytes verified", self.description, actual.len()),
                expected_crc32: self.expected_crc32,
                actual_crc32,
            },
            Some(index) => VerificationResult {
                test_case_id: self.case_id,
                passed: false,
                mismatch_index: Some(index),
                message: format!(
                    "{}: mismatch at byte {} (expected {}, got {}; lengths {} vs {})",
                    self.description,
                    index,
                    show_byte(expected.get(index)),
                    show_byte(actual.get(index)),
                    expected.len(),
                    actual.len(),
                ),
                expected_crc32: self.expected_crc32,
                actual_crc32,
            },
        }
    }

    /// Listen on `sink` and send exactly one result through `done`.
    pub fn attach(self, sink: &Sink, done: oneshot::Sender<VerificationResult>) {
        let this = Rc::new(self);
        let outcome: Rc<RefCell<Option<VerificationResult>>> = Rc::new(RefCell::new(None));
        let done = Rc::new(RefCell::new(Some(done)));

        {
            let this = this.clone();
            let outcome = outcome.clone();
            sink.signals().on_data(move |buffer| {
                let started = Instant::now();
                let result = this.verify(&buffer);
                if let Some(times) = &this.times {
                    times.borrow_mut().add(Stage::Verify, started.elapsed());
                }
                let mut slot = outcome.borrow_mut();
                // Keep the first failure.
                if slot.as_ref().map_or(true, |r| r.passed) {
                    *slot = Some(result);
                }
            });
        }

        {
            let this = this.clone();
            let done = done.clone();
            sink.signals().on_end(move || {
                let result = outcome.borrow_mut().take().unwrap_or_else(|| {
                    VerificationResult::failed(
                        this.case_id,
                        this.expected_crc32,
                        format!("{}: sink ended without data", this.description),
                    )
                });
                this.settle(&done, result);
            });
        }

        sink.signals().on_error(move |err| {
            let result = VerificationResult::failed(
                this.case_id,
                this.expected_crc32,
                format!("{}: pipeline error: {err}", this.description),
            );
            this.settle(&done, result);
        });
    }

    fn settle(&self, done: &RefCell<Option<oneshot::Sender<VerificationResult>>>, result: VerificationResult) {
        if result.passed {
            log::debug!("case {} passed", self.case_id);
        } else {
            log::warn!("case {} failed: {}", self.case_id, result.message);
        }
        if let Some(sender) = done.borrow_mut().take() {
            // The receiver may have been dropped by a caller that stopped waiting.
            let _ = sender.send(result);
        }
    }
}

fn show_byte(byte: Option<&u8>) -> String {
    match byte {
        Some(b) => format!("0x{b:02x}"),
        None => "<end>".to_string(),
    }
}
