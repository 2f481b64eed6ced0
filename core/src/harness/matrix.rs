//! harness/matrix.rs
//! Cross-product enumeration and wave-based fan-out/fan-in.
//!
//! Cases are generated lazily in nested order (fixture outermost, pair
//! innermost). Each wave of at most `max_in_flight` pipelines is launched
//! in full and then driven until every one of them has reported.

use serde::Serialize;

use crate::config::{Dimensions, HarnessConfig};
use crate::fixtures::Fixture;
use crate::harness::pipeline::{PipelineHandle, PipelineRunner, PipelineTelemetry};
use crate::scheduler::CooperativeRuntime;
use crate::telemetry::{TelemetryCounters, TelemetrySnapshot, TelemetryTimer};
use crate::types::{Configuration, HarnessError, TestCase, VerificationResult};

/// Lazy iterator over every case of `fixtures` x `dimensions`.
pub struct CaseIter<'a> {
    fixtures: &'a [Fixture],
    dims: &'a Dimensions,
    next: usize,
    total: usize,
}

impl<'a> CaseIter<'a> {
    pub fn new(fixtures: &'a [Fixture], dims: &'a Dimensions) -> Self {
        Self { fixtures, dims, next: 0, total: fixtures.len() * dims.combinations() }
    }

    fn case_at(&self, id: usize) -> Result<TestCase, HarnessError> {
        let d = self.dims;
        // Mixed-radix decomposition, innermost dimension first.
        let mut rest = id;
        let mut digit = |radix: usize| {
            let value = rest % radix;
            rest /= radix;
            value
        };
        let pair = d.pairs[digit(d.pairs.len())];
        let strategy = d.strategies[digit(d.strategies.len())];
        let memory_level = d.memory_levels[digit(d.memory_levels.len())];
        let level = d.levels[digit(d.levels.len())];
        let window_size = d.window_sizes[digit(d.window_sizes.len())];
        let trickle_rate = d.trickle_rates[digit(d.trickle_rates.len())];
        let chunk_size = d.chunk_sizes[digit(d.chunk_sizes.len())];
        let fixture = &self.fixtures[digit(self.fixtures.len())];

        let config = Configuration::new(level, window_size, memory_level, strategy, chunk_size, trickle_rate)?;
        Ok(TestCase::new(id, fixture.clone(), config, pair))
    }
}

impl Iterator for CaseIter<'_> {
    type Item = Result<TestCase, HarnessError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.total {
            return None;
        }
        let case = self.case_at(self.next);
        self.next += 1;
        Some(case)
    }

    /// Skips without building the skipped cases.
    fn nth(&mut self, n: usize) -> Option<Self::Item> {
        self.next = self.next.saturating_add(n).min(self.total);
        self.next()
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let left = self.total - self.next;
        (left, Some(left))
    }
}

impl ExactSizeIterator for CaseIter<'_> {}

/// Every case, collected. Pure: same inputs, same list, same order.
pub fn enumerate_cases(fixtures: &[Fixture], dims: &Dimensions) -> Result<Vec<TestCase>, HarnessError> {
    CaseIter::new(fixtures, dims).collect()
}

/// Aggregate outcome of a matrix run.
#[derive(Debug, Clone, Serialize)]
pub struct MatrixReport {
    pub launched: usize,
    pub results: Vec<VerificationResult>,
    pub telemetry: TelemetrySnapshot,
}

impl MatrixReport {
    /// True only if every launched case reported and passed.
    pub fn passed(&self) -> bool {
        self.results.len() == self.launched && self.results.iter().all(|r| r.passed)
    }

    pub fn failures(&self) -> impl Iterator<Item = &VerificationResult> {
        self.results.iter().filter(|r| !r.passed)
    }

    pub fn failure_count(&self) -> usize {
        self.failures().count()
    }
}

pub struct ParameterMatrixRunner {
    fixtures: Vec<Fixture>,
    dims: Dimensions,
    max_in_flight: usize,
}

impl ParameterMatrixRunner {
    pub fn new(fixtures: Vec<Fixture>, config: &HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self { fixtures, dims: config.dimensions(), max_in_flight: config.max_in_flight })
    }

    /// Replace the mode's dimensions; every value must be in range.
    pub fn with_dimensions(mut self, dims: Dimensions) -> Result<Self, HarnessError> {
        dims.validate()?;
        self.dims = dims;
        Ok(self)
    }

    pub fn dimensions(&self) -> &Dimensions {
        &self.dims
    }

    pub fn case_count(&self) -> usize {
        self.fixtures.len() * self.dims.combinations()
    }

    pub fn cases(&self) -> CaseIter<'_> {
        CaseIter::new(&self.fixtures, &self.dims)
    }

    pub fn run(&self) -> Result<MatrixReport, HarnessError> {
        let mut runtime = CooperativeRuntime::new();
        let telemetry = PipelineTelemetry::default();
        let mut timer = TelemetryTimer::new();
        let mut results = Vec::with_capacity(self.case_count());
        let mut launched = 0;

        log::info!(
            "matrix: {} fixtures x {} combinations = {} cases",
            self.fixtures.len(),
            self.dims.combinations(),
            self.case_count()
        );

        let mut cases = self.cases();
        loop {
            let mut wave: Vec<PipelineHandle> = Vec::with_capacity(self.max_in_flight);
            for case in cases.by_ref().take(self.max_in_flight) {
                let case = case?;
                let id = case.id;
                launched += 1;
                match PipelineRunner::new(case, runtime.scheduler())
                    .with_telemetry(telemetry.clone())
                    .run()
                {
                    Ok(handle) => wave.push(handle),
                    // A case that cannot start is recorded; siblings still run.
                    Err(err) => {
                        let result = VerificationResult::failed(id, 0, format!("case {id} failed to start: {err}"));
                        log::warn!("{}", result.message);
                        results.push(result);
                    }
                }
            }
            if wave.is_empty() && cases.len() == 0 {
                break;
            }
            runtime.run_until_stalled();
            results.extend(wave.into_iter().map(PipelineHandle::settle));
        }

        timer.finish();
        let mut counters: TelemetryCounters = telemetry.counters.borrow().clone();
        for result in &results {
            counters.record_result(result);
        }
        timer.stage_times = telemetry.times.borrow().clone();
        let snapshot = TelemetrySnapshot::from(&counters, &timer, runtime.ticks());

        let report = MatrixReport { launched, results, telemetry: snapshot };
        log::info!(
            "matrix: {} launched, {} passed, {} failed in {:?}",
            report.launched,
            report.launched - report.failure_count(),
            report.failure_count(),
            report.telemetry.elapsed
        );
        Ok(report)
    }
}
