//! transform/stage.rs
//! Stream stage wrapping one direction of a transform pair.
//!
//! Output produced while the stage is paused, or while older output is
//! still queued, is held back and flushed in order on `resume`.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Instant;

use bytes::Bytes;

use crate::stream::{Emitter, FlowControl, SignalSource, Writable};
use crate::telemetry::{Stage, StageTimes};
use crate::transform::types::{Transform, TransformError};
use crate::types::{HarnessError, StreamState};

struct StageState {
    status: StreamState,
    queued: VecDeque<Bytes>,
    /// `end` was received; the stage ends once the queue is empty.
    ending: bool,
}

struct StageInner {
    transform: RefCell<Box<dyn Transform>>,
    state: RefCell<StageState>,
    signals: Emitter,
    timing: Option<(Stage, Rc<RefCell<StageTimes>>)>,
}

#[derive(Clone)]
pub struct TransformStage {
    inner: Rc<StageInner>,
}

impl TransformStage {
    pub fn new(transform: Box<dyn Transform>) -> Self {
        Self::build(transform, None)
    }

    /// Like `new`, accumulating time spent in the codec under `stage`.
    pub fn timed(transform: Box<dyn Transform>, stage: Stage, times: Rc<RefCell<StageTimes>>) -> Self {
        Self::build(transform, Some((stage, times)))
    }

    fn build(transform: Box<dyn Transform>, timing: Option<(Stage, Rc<RefCell<StageTimes>>)>) -> Self {
        let name = transform.name();
        Self {
            inner: Rc::new(StageInner {
                transform: RefCell::new(transform),
                state: RefCell::new(StageState {
                    status: StreamState::Idle,
                    queued: VecDeque::new(),
                    ending: false,
                }),
                signals: Emitter::new(name),
                timing,
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        self.inner.signals.stage()
    }

    pub fn state(&self) -> StreamState {
        self.inner.state.borrow().status
    }

    /// Chunks held back by a pause.
    pub fn queued(&self) -> usize {
        self.inner.state.borrow().queued.len()
    }

    fn run<F>(&self, op: F) -> Result<Vec<Bytes>, HarnessError>
    where
        F: FnOnce(&mut dyn Transform, &mut Vec<Bytes>) -> Result<(), TransformError>,
    {
        let mut out = Vec::new();
        let started = Instant::now();
        let result = op(&mut **self.inner.transform.borrow_mut(), &mut out);
        if let Some((stage, times)) = &self.inner.timing {
            times.borrow_mut().add(*stage, started.elapsed());
        }
        result?;
        Ok(out)
    }

    fn deliver(&self, out: Vec<Bytes>) -> Result<(), HarnessError> {
        let ready = {
            let mut st = self.inner.state.borrow_mut();
            if st.status == StreamState::Paused || !st.queued.is_empty() {
                st.queued.extend(out);
                return Ok(());
            }
            out
        };
        let mut ready = ready.into_iter();
        while let Some(chunk) = ready.next() {
            self.inner.signals.emit_data(chunk)?;
            // A downstream write may have paused us mid-delivery.
            if self.is_paused() {
                self.inner.state.borrow_mut().queued.extend(ready);
                break;
            }
        }
        Ok(())
    }

    fn try_complete(&self) -> Result<(), HarnessError> {
        let done = {
            let mut st = self.inner.state.borrow_mut();
            if st.ending && st.queued.is_empty() && st.status != StreamState::Paused
                && st.status != StreamState::Ended
            {
                st.status = StreamState::Ended;
                true
            } else {
                false
            }
        };
        if done {
            log::trace!("[{}] complete", self.name());
            self.inner.signals.emit_end()?;
        }
        Ok(())
    }

    fn ensure_open(&self, op: &'static str) -> Result<(), HarnessError> {
        let st = self.inner.state.borrow();
        if st.ending || st.status == StreamState::Ended || self.inner.signals.is_terminated() {
            return Err(HarnessError::contract(self.name(), op, format!("{op} after end")));
        }
        Ok(())
    }
}

impl SignalSource for TransformStage {
    fn signals(&self) -> &Emitter {
        &self.inner.signals
    }
}

impl Writable for TransformStage {
    fn write(&self, chunk: Bytes) -> Result<bool, HarnessError> {
        self.ensure_open("write")?;
        {
            let mut st = self.inner.state.borrow_mut();
            if st.status == StreamState::Idle {
                st.status = StreamState::Flowing;
            }
        }
        let out = self.run(|t, out| t.push(&chunk, out))?;
        self.deliver(out)?;
        Ok(!self.is_paused())
    }

    fn end(&self, chunk: Option<Bytes>) -> Result<bool, HarnessError> {
        self.ensure_open("end")?;
        let out = self.run(|t, out| {
            if let Some(chunk) = &chunk {
                t.push(chunk, out)?;
            }
            t.finish(out)
        })?;
        {
            let mut st = self.inner.state.borrow_mut();
            st.ending = true;
            if st.status == StreamState::Idle {
                st.status = StreamState::Flowing;
            }
        }
        self.deliver(out)?;
        self.try_complete()?;
        Ok(self.state() == StreamState::Ended)
    }

    fn fail(&self, err: HarnessError) {
        if self.inner.signals.is_terminated() {
            return;
        }
        {
            let mut st = self.inner.state.borrow_mut();
            st.status = StreamState::Ended;
            st.queued.clear();
        }
        log::debug!("[{}] failed: {err}", self.name());
        let _ = self.inner.signals.emit_error(err);
    }
}

impl FlowControl for TransformStage {
    fn pause(&self) {
        let mut st = self.inner.state.borrow_mut();
        if st.status != StreamState::Ended {
            st.status = StreamState::Paused;
        }
    }

    fn resume(&self) {
        {
            let mut st = self.inner.state.borrow_mut();
            if st.status != StreamState::Paused {
                return;
            }
            st.status = StreamState::Flowing;
        }
        loop {
            let next = {
                let mut st = self.inner.state.borrow_mut();
                if st.status == StreamState::Paused {
                    None
                } else {
                    st.queued.pop_front()
                }
            };
            let Some(chunk) = next else { break };
            if let Err(err) = self.inner.signals.emit_data(chunk) {
                log::debug!("[{}] flush stopped: {err}", self.name());
                return;
            }
        }
        if self.is_paused() {
            return;
        }
        self.inner.signals.emit_drain();
        if let Err(err) = self.try_complete() {
            log::debug!("[{}] end not delivered: {err}", self.name());
        }
    }

    fn is_paused(&self) -> bool {
        self.state() == StreamState::Paused
    }
}
