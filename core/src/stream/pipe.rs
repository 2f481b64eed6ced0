//! stream/pipe.rs
//! Stage capabilities and generic pipe wiring.

use std::cell::Cell;
use std::rc::Rc;

use bytes::Bytes;

use crate::stream::signal::SignalSource;
use crate::types::HarnessError;

/// Consumer side of a stage.
pub trait Writable {
    /// Feed one chunk. `Ok(false)` asks the writer to pause until `drain`.
    fn write(&self, chunk: Bytes) -> Result<bool, HarnessError>;
    /// Optional final chunk, then finish.
    fn end(&self, chunk: Option<Bytes>) -> Result<bool, HarnessError>;
    /// Terminate with an upstream error; ignored once the stage has terminated.
    fn fail(&self, err: HarnessError);
}

/// Producer side flow control.
pub trait FlowControl: SignalSource {
    fn pause(&self);
    fn resume(&self);
    fn is_paused(&self) -> bool;
}

#[derive(Debug)]
struct Link {
    /// Cleared after end or error; nothing is forwarded afterwards.
    open: Cell<bool>,
    /// Upstream was paused because downstream reported backpressure.
    holding: Cell<bool>,
}

/// Connect `src` to `dest`.
///
/// - data is forwarded in emission order, each chunk exactly once
/// - `end` from `src` ends `dest` after every earlier chunk was forwarded
/// - `error` from `src`, or a failed write into `dest`, fails `dest`
/// - `Ok(false)` from `dest.write` pauses `src` until `dest` emits `drain`
pub fn pipe<S, D>(src: &S, dest: &D)
where
    S: FlowControl + Clone + 'static,
    D: Writable + SignalSource + Clone + 'static,
{
    let link = Rc::new(Link { open: Cell::new(true), holding: Cell::new(false) });
    log::trace!("[pipe] {} -> {}", src.signals().stage(), dest.signals().stage());

    {
        let link = link.clone();
        let upstream = src.clone();
        let dest = dest.clone();
        src.signals().on_data(move |chunk| {
            if !link.open.get() {
                return;
            }
            match dest.write(chunk) {
                Ok(true) => {}
                Ok(false) => {
                    link.holding.set(true);
                    upstream.pause();
                }
                Err(err) => {
                    link.open.set(false);
                    log::debug!("[pipe] write into {} failed: {err}", dest.signals().stage());
                    dest.fail(err);
                }
            }
        });
    }

    {
        let link = link.clone();
        let upstream = src.clone();
        dest.signals().on_drain(move || {
            if link.holding.replace(false) {
                upstream.resume();
            }
        });
    }

    {
        let link = link.clone();
        let dest = dest.clone();
        src.signals().on_end(move || {
            if !link.open.replace(false) {
                return;
            }
            if let Err(err) = dest.end(None) {
                log::debug!("[pipe] end of {} failed: {err}", dest.signals().stage());
                dest.fail(err);
            }
        });
    }

    {
        let dest = dest.clone();
        src.signals().on_error(move |err| {
            link.open.set(false);
            dest.fail(err);
        });
    }
}
