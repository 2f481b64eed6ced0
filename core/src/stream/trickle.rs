//! stream/trickle.rs
//! Flow-controlled source that drip-feeds a bulk-supplied buffer.
//!
//! The whole payload arrives through `end(buffer)`; the source then emits
//! contiguous slices of at most `trickle_rate` bytes, one per scheduler tick,
//! and signals `end` on the tick after the last slice.

use std::cell::RefCell;
use std::rc::Rc;

use bytes::Bytes;

use crate::scheduler::Scheduler;
use crate::stream::pipe::{FlowControl, Writable};
use crate::stream::signal::{Emitter, SignalSource};
use crate::types::{HarnessError, StreamState};

const STAGE: &str = "trickle";

#[derive(Debug)]
struct TrickleState {
    buffer: Option<Bytes>,
    offset: usize,
    status: StreamState,
    /// A tick continuation is queued.
    scheduled: bool,
}

#[derive(Debug)]
struct TrickleInner {
    trickle_rate: usize,
    scheduler: Scheduler,
    state: RefCell<TrickleState>,
    signals: Emitter,
}

enum Step {
    Wait,
    Slice(Bytes),
    Finish,
}

#[derive(Debug, Clone)]
pub struct TrickleSource {
    inner: Rc<TrickleInner>,
}

impl TrickleSource {
    pub fn new(trickle_rate: usize, scheduler: Scheduler) -> Result<Self, HarnessError> {
        if trickle_rate == 0 {
            return Err(HarnessError::InvalidConfig("trickle rate must be positive".into()));
        }
        Ok(Self {
            inner: Rc::new(TrickleInner {
                trickle_rate,
                scheduler,
                state: RefCell::new(TrickleState {
                    buffer: None,
                    offset: 0,
                    status: StreamState::Idle,
                    scheduled: false,
                }),
                signals: Emitter::new(STAGE),
            }),
        })
    }

    /// Arm the source with `buffer` and start emitting.
    ///
    /// A second call replaces the buffer and restarts at offset zero. Only a
    /// re-arm before the first slice yields the new buffer alone; once slices
    /// of the previous buffer were emitted, downstream sees that prefix
    /// followed by the whole new buffer.
    /// Returns whether the source has already ended, which it never has:
    /// emission happens on later ticks.
    pub fn end(&self, buffer: Bytes) -> Result<bool, HarnessError> {
        {
            let mut st = self.inner.state.borrow_mut();
            if st.status == StreamState::Ended {
                return Err(HarnessError::contract(STAGE, "end", "source already ended"));
            }
            if st.buffer.is_some() && st.offset > 0 {
                log::debug!("[{STAGE}] re-armed after {} bytes of the previous buffer were emitted", st.offset);
            }
            log::trace!("[{STAGE}] armed with {} bytes (rearm: {})", buffer.len(), st.buffer.is_some());
            st.buffer = Some(buffer);
            st.offset = 0;
        }
        self.resume();
        Ok(self.state() == StreamState::Ended)
    }

    pub fn state(&self) -> StreamState {
        self.inner.state.borrow().status
    }

    /// Bytes emitted from the current buffer.
    pub fn offset(&self) -> usize {
        self.inner.state.borrow().offset
    }

    pub fn trickle_rate(&self) -> usize {
        self.inner.trickle_rate
    }

    fn schedule_tick(&self) {
        let this = self.clone();
        if let Err(err) = self.inner.scheduler.defer(move || this.tick()) {
            self.inner.state.borrow_mut().scheduled = false;
            let _ = self.inner.signals.emit_error(err);
        }
    }

    fn tick(&self) {
        let step = {
            let mut st = self.inner.state.borrow_mut();
            st.scheduled = false;
            match (st.buffer.clone(), st.status) {
                (Some(buffer), StreamState::Flowing) => {
                    if st.offset >= buffer.len() {
                        st.status = StreamState::Ended;
                        Step::Finish
                    } else {
                        let start = st.offset;
                        let n = self.inner.trickle_rate.min(buffer.len() - start);
                        st.offset += n;
                        st.scheduled = true;
                        Step::Slice(buffer.slice(start..start + n))
                    }
                }
                // Paused, or resumed before any buffer was supplied.
                _ => Step::Wait,
            }
        };

        match step {
            Step::Wait => {}
            Step::Slice(slice) => {
                self.schedule_tick();
                log::trace!("[{STAGE}] slice {} bytes", slice.len());
                if let Err(err) = self.inner.signals.emit_data(slice) {
                    log::debug!("[{STAGE}] dropped slice: {err}");
                }
            }
            Step::Finish => {
                if let Err(err) = self.inner.signals.emit_end() {
                    log::debug!("[{STAGE}] end not delivered: {err}");
                }
            }
        }
    }
}

impl SignalSource for TrickleSource {
    fn signals(&self) -> &Emitter {
        &self.inner.signals
    }
}

impl FlowControl for TrickleSource {
    fn pause(&self) {
        let mut st = self.inner.state.borrow_mut();
        if st.status == StreamState::Flowing {
            st.status = StreamState::Paused;
        }
    }

    fn resume(&self) {
        let schedule = {
            let mut st = self.inner.state.borrow_mut();
            if st.status == StreamState::Ended {
                false
            } else {
                st.status = StreamState::Flowing;
                !std::mem::replace(&mut st.scheduled, true)
            }
        };
        if schedule {
            self.schedule_tick();
        }
    }

    fn is_paused(&self) -> bool {
        self.state() == StreamState::Paused
    }
}

impl Writable for TrickleSource {
    /// Always rejected: the payload is supplied in bulk through `end`.
    fn write(&self, _chunk: Bytes) -> Result<bool, HarnessError> {
        Err(HarnessError::contract(
            STAGE,
            "write",
            "source accepts its payload only through end(buffer)",
        ))
    }

    fn end(&self, chunk: Option<Bytes>) -> Result<bool, HarnessError> {
        TrickleSource::end(self, chunk.unwrap_or_default())
    }

    fn fail(&self, err: HarnessError) {
        self.inner.state.borrow_mut().status = StreamState::Ended;
        let _ = self.inner.signals.emit_error(err);
    }
}
