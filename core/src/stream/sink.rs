//! stream/sink.rs
//! Deterministic collecting sink.
//!
//! Accepts every chunk unconditionally, then on `end` concatenates them in
//! arrival order and emits `data` once followed by `end` once.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use bytes::{Bytes, BytesMut};

use crate::stream::pipe::Writable;
use crate::stream::signal::{Emitter, SignalSource};
use crate::types::{HarnessError, StreamState};

const STAGE: &str = "sink";

#[derive(Debug)]
struct SinkInner {
    chunks: RefCell<Vec<Bytes>>,
    received: Cell<usize>,
    state: Cell<StreamState>,
    /// Total the sink must see before `end`; a shortfall is a premature end.
    expected: Option<usize>,
    signals: Emitter,
}

#[derive(Debug, Clone)]
pub struct Sink {
    inner: Rc<SinkInner>,
}

impl Sink {
    pub fn new() -> Self {
        Self::build(None)
    }

    /// A sink that treats `end` before `expected` bytes as a contract violation.
    pub fn expecting(expected: usize) -> Self {
        Self::build(Some(expected))
    }

    fn build(expected: Option<usize>) -> Self {
        Self {
            inner: Rc::new(SinkInner {
                chunks: RefCell::new(Vec::new()),
                received: Cell::new(0),
                state: Cell::new(StreamState::Idle),
                expected,
                signals: Emitter::new(STAGE),
            }),
        }
    }

    pub fn state(&self) -> StreamState {
        self.inner.state.get()
    }

    /// Bytes appended so far.
    pub fn received(&self) -> usize {
        self.inner.received.get()
    }

    fn append(&self, chunk: Bytes) {
        self.inner.received.set(self.inner.received.get() + chunk.len());
        self.inner.chunks.borrow_mut().push(chunk);
    }

    fn concat(chunks: Vec<Bytes>, total: usize) -> Bytes {
        if chunks.len() == 1 {
            return chunks.into_iter().next().unwrap_or_default();
        }
        let mut out = BytesMut::with_capacity(total);
        for chunk in &chunks {
            out.extend_from_slice(chunk);
        }
        out.freeze()
    }
}

impl Default for Sink {
    fn default() -> Self {
        Self::new()
    }
}

impl SignalSource for Sink {
    fn signals(&self) -> &Emitter {
        &self.inner.signals
    }
}

impl Writable for Sink {
    fn write(&self, chunk: Bytes) -> Result<bool, HarnessError> {
        if self.state() == StreamState::Ended {
            return Err(HarnessError::contract(STAGE, "write", "write after end"));
        }
        self.inner.state.set(StreamState::Flowing);
        self.append(chunk);
        Ok(true)
    }

    fn end(&self, chunk: Option<Bytes>) -> Result<bool, HarnessError> {
        if self.state() == StreamState::Ended {
            return Err(HarnessError::contract(STAGE, "end", "end called twice"));
        }
        if let Some(chunk) = chunk {
            self.append(chunk);
        }
        self.inner.state.set(StreamState::Ended);

        let received = self.received();
        if let Some(expected) = self.inner.expected {
            if received < expected {
                let err = HarnessError::PrematureEnd { expected, received };
                self.inner.chunks.borrow_mut().clear();
                self.inner.signals.emit_error(err.clone())?;
                return Err(err);
            }
        }

        let chunks = std::mem::take(&mut *self.inner.chunks.borrow_mut());
        log::trace!("[{STAGE}] reassembling {} chunks, {} bytes", chunks.len(), received);
        let buffer = Self::concat(chunks, received);
        self.inner.signals.emit_data(buffer)?;
        self.inner.signals.emit_end()?;
        Ok(true)
    }

    fn fail(&self, err: HarnessError) {
        if self.inner.signals.is_terminated() {
            return;
        }
        self.inner.state.set(StreamState::Ended);
        self.inner.chunks.borrow_mut().clear();
        let _ = self.inner.signals.emit_error(err);
    }
}
