//! stream/signal.rs
//! Signal emitter shared by every stage.
//!
//! Guarantees:
//! - `data` fires any number of times, in emission order.
//! - `end` and `error` fire at most once and are mutually terminal.
//! - All listeners are dropped when a terminal signal fires, which also
//!   breaks the reference cycles a pipe creates between two stages.
//!
//! Listener lists are snapshotted before dispatch, so a listener may
//! register further listeners or call back into other stages.

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use bytes::Bytes;

use crate::types::HarnessError;

type DataListener = Rc<RefCell<dyn FnMut(Bytes)>>;
type DrainListener = Rc<RefCell<dyn FnMut()>>;
type EndListener = Box<dyn FnOnce()>;
type ErrorListener = Box<dyn FnOnce(HarnessError)>;

/// Which terminal signal a stage emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Terminal {
    Ended,
    Errored,
}

#[derive(Default)]
struct Listeners {
    data: Vec<DataListener>,
    drain: Vec<DrainListener>,
    end: Vec<EndListener>,
    error: Vec<ErrorListener>,
}

pub struct Emitter {
    stage: &'static str,
    listeners: RefCell<Listeners>,
    terminal: Cell<Option<Terminal>>,
}

impl Emitter {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            listeners: RefCell::new(Listeners::default()),
            terminal: Cell::new(None),
        }
    }

    pub fn stage(&self) -> &'static str {
        self.stage
    }

    pub fn terminal(&self) -> Option<Terminal> {
        self.terminal.get()
    }

    pub fn is_terminated(&self) -> bool {
        self.terminal.get().is_some()
    }

    pub fn on_data<F>(&self, listener: F)
    where
        F: FnMut(Bytes) + 'static,
    {
        if self.is_terminated() {
            return;
        }
        self.listeners.borrow_mut().data.push(Rc::new(RefCell::new(listener)));
    }

    pub fn on_drain<F>(&self, listener: F)
    where
        F: FnMut() + 'static,
    {
        if self.is_terminated() {
            return;
        }
        self.listeners.borrow_mut().drain.push(Rc::new(RefCell::new(listener)));
    }

    pub fn on_end<F>(&self, listener: F)
    where
        F: FnOnce() + 'static,
    {
        if self.is_terminated() {
            return;
        }
        self.listeners.borrow_mut().end.push(Box::new(listener));
    }

    pub fn on_error<F>(&self, listener: F)
    where
        F: FnOnce(HarnessError) + 'static,
    {
        if self.is_terminated() {
            return;
        }
        self.listeners.borrow_mut().error.push(Box::new(listener));
    }

    pub fn emit_data(&self, chunk: Bytes) -> Result<(), HarnessError> {
        if let Some(terminal) = self.terminal.get() {
            return Err(HarnessError::contract(
                self.stage,
                "emit_data",
                format!("data after {terminal:?}"),
            ));
        }
        let listeners: Vec<DataListener> = self.listeners.borrow().data.clone();
        for listener in listeners {
            let mut callback = listener.borrow_mut();
            (*callback)(chunk.clone());
        }
        Ok(())
    }

    /// Tell upstream writers that buffered output has been flushed.
    pub fn emit_drain(&self) {
        if self.is_terminated() {
            return;
        }
        let listeners: Vec<DrainListener> = self.listeners.borrow().drain.clone();
        for listener in listeners {
            let mut callback = listener.borrow_mut();
            (*callback)();
        }
    }

    pub fn emit_end(&self) -> Result<(), HarnessError> {
        self.terminate(Terminal::Ended, "emit_end")?;
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        log::trace!("[{}] end", self.stage);
        for listener in listeners.end {
            listener();
        }
        Ok(())
    }

    pub fn emit_error(&self, err: HarnessError) -> Result<(), HarnessError> {
        self.terminate(Terminal::Errored, "emit_error")?;
        let listeners = std::mem::take(&mut *self.listeners.borrow_mut());
        if listeners.error.is_empty() {
            log::warn!("[{}] unhandled error: {}", self.stage, err);
        }
        for listener in listeners.error {
            listener(err.clone());
        }
        Ok(())
    }

    fn terminate(&self, terminal: Terminal, op: &'static str) -> Result<(), HarnessError> {
        if let Some(previous) = self.terminal.get() {
            return Err(HarnessError::contract(
                self.stage,
                op,
                format!("already {previous:?}"),
            ));
        }
        self.terminal.set(Some(terminal));
        Ok(())
    }
}

impl fmt::Debug for Emitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let listeners = self.listeners.borrow();
        f.debug_struct("Emitter")
            .field("stage", &self.stage)
            .field("terminal", &self.terminal.get())
            .field("data_listeners", &listeners.data.len())
            .field("end_listeners", &listeners.end.len())
            .field("error_listeners", &listeners.error.len())
            .finish()
    }
}

/// Anything that emits stream signals.
pub trait SignalSource {
    fn signals(&self) -> &Emitter;
}
