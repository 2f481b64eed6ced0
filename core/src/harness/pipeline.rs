//! harness/pipeline.rs
//! One round trip: source -> encoder -> decoder -> sink, verified on completion.

use std::cell::RefCell;
use std::rc::Rc;

use futures::channel::oneshot;

use crate::harness::verify::VerificationCallback;
use crate::scheduler::{CooperativeRuntime, Scheduler};
use crate::stream::{pipe, SignalSource, Sink, TrickleSource};
use crate::telemetry::{Stage, StageTimes, TelemetryCounters};
use crate::transform::TransformStage;
use crate::types::{Configuration, HarnessError, TestCase, VerificationResult};

/// Shared per-run telemetry sinks the pipeline taps into.
#[derive(Clone, Default)]
pub struct PipelineTelemetry {
    pub counters: Rc<RefCell<TelemetryCounters>>,
    pub times: Rc<RefCell<StageTimes>>,
}

/// Builds and starts a single pipeline; consumed by `run`.
pub struct PipelineRunner {
    case: TestCase,
    scheduler: Scheduler,
    decode_config: Option<Configuration>,
    telemetry: Option<PipelineTelemetry>,
}

impl PipelineRunner {
    pub fn new(case: TestCase, scheduler: Scheduler) -> Self {
        Self { case, scheduler, decode_config: None, telemetry: None }
    }

    /// Decode with different parameters than the case encodes with.
    pub fn with_decode_config(mut self, config: Configuration) -> Self {
        self.decode_config = Some(config);
        self
    }

    pub fn with_telemetry(mut self, telemetry: PipelineTelemetry) -> Self {
        self.telemetry = Some(telemetry);
        self
    }

    /// Wire every stage and hand the reference buffer to the source.
    ///
    /// Nothing flows until the runtime owning `scheduler` is driven.
    pub fn run(self) -> Result<PipelineHandle, HarnessError> {
        let case = self.case;
        let encode_config = case.config;
        let decode_config = self.decode_config.unwrap_or(encode_config);
        let reference = case.fixture.data().clone();

        let source = TrickleSource::new(encode_config.trickle_rate(), self.scheduler)?;
        let encoder = case.pair.create_encoder(&encode_config)?;
        let decoder = case.pair.create_decoder(&decode_config)?;
        let sink = Sink::expecting(reference.len());

        let (encoder, decoder) = match &self.telemetry {
            Some(t) => (
                TransformStage::timed(encoder, Stage::Encode, t.times.clone()),
                TransformStage::timed(decoder, Stage::Decode, t.times.clone()),
            ),
            None => (TransformStage::new(encoder), TransformStage::new(decoder)),
        };

        if let Some(t) = &self.telemetry {
            let counters = t.counters.clone();
            source.signals().on_data(move |slice| counters.borrow_mut().add_slice(slice.len()));
            let counters = t.counters.clone();
            encoder.signals().on_data(move |chunk| counters.borrow_mut().add_encoded(chunk.len()));
            let counters = t.counters.clone();
            decoder.signals().on_data(move |chunk| counters.borrow_mut().add_decoded(chunk.len()));
        }

        pipe(&source, &encoder);
        pipe(&encoder, &decoder);
        pipe(&decoder, &sink);

        let mut verifier = VerificationCallback::new(&case, reference.clone());
        if let Some(t) = &self.telemetry {
            verifier = verifier.with_timing(t.times.clone());
        }
        let expected_crc32 = verifier.expected_crc32();
        let (done, completion) = oneshot::channel();
        verifier.attach(&sink, done);

        log::debug!("case {} started: {}", case.id, case.describe());
        source.end(reference)?;

        Ok(PipelineHandle { case_id: case.id, expected_crc32, completion })
    }

    /// Run on a private runtime until the pipeline settles.
    pub fn run_to_completion(case: TestCase) -> Result<VerificationResult, HarnessError> {
        let mut runtime = CooperativeRuntime::new();
        let handle = PipelineRunner::new(case, runtime.scheduler()).run()?;
        runtime.run_until_stalled();
        Ok(handle.settle())
    }
}

/// Completion side of a launched pipeline.
#[derive(Debug)]
pub struct PipelineHandle {
    case_id: usize,
    expected_crc32: u32,
    completion: oneshot::Receiver<VerificationResult>,
}

impl PipelineHandle {
    pub fn case_id(&self) -> usize {
        self.case_id
    }

    /// The result if the pipeline has already reported one.
    pub fn poll_result(&mut self) -> Option<VerificationResult> {
        self.completion.try_recv().ok().flatten()
    }

    /// Final result once the runtime has stalled. A pipeline that never
    /// reported is a failure, never a silent pass.
    pub fn settle(mut self) -> VerificationResult {
        match self.completion.try_recv() {
            Ok(Some(result)) => result,
            Ok(None) => VerificationResult::failed(
                self.case_id,
                self.expected_crc32,
                format!("case {} never completed", self.case_id),
            ),
            Err(_) => VerificationResult::failed(
                self.case_id,
                self.expected_crc32,
                format!("case {} abandoned before reporting", self.case_id),
            ),
        }
    }
}
