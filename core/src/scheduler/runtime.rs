//! scheduler/runtime.rs
//! Local executor and the cloneable handle stages defer work through.

use std::cell::Cell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::executor::{LocalPool, LocalSpawner};
use futures::task::LocalSpawnExt;

use crate::types::HarnessError;

/// Cloneable handle used by stages to defer their next unit of work.
#[derive(Clone)]
pub struct Scheduler {
    spawner: LocalSpawner,
    ticks: Rc<Cell<u64>>,
}

impl Scheduler {
    /// Queue `work` for a later tick.
    pub fn defer<F>(&self, work: F) -> Result<(), HarnessError>
    where
        F: FnOnce() + 'static,
    {
        let ticks = self.ticks.clone();
        self.spawner
            .spawn_local(async move {
                ticks.set(ticks.get() + 1);
                work();
            })
            .map_err(|e| HarnessError::Scheduler(e.to_string()))
    }

    /// Continuations executed so far.
    pub fn ticks(&self) -> u64 {
        self.ticks.get()
    }
}

impl fmt::Debug for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scheduler").field("ticks", &self.ticks.get()).finish()
    }
}

/// Owns the local executor; whoever holds it drives every tick.
pub struct CooperativeRuntime {
    pool: LocalPool,
    scheduler: Scheduler,
}

impl CooperativeRuntime {
    pub fn new() -> Self {
        let pool = LocalPool::new();
        let scheduler = Scheduler {
            spawner: pool.spawner(),
            ticks: Rc::new(Cell::new(0)),
        };
        Self { pool, scheduler }
    }

    pub fn scheduler(&self) -> Scheduler {
        self.scheduler.clone()
    }

    /// Run queued continuations (and any they queue) until none remain runnable.
    pub fn run_until_stalled(&mut self) {
        self.pool.run_until_stalled();
    }

    /// Drive the pool while polling `future` to completion.
    ///
    /// Blocks if `future` depends on work that is never scheduled; prefer
    /// `run_until_stalled` when completion is not guaranteed.
    pub fn run_until<F: Future>(&mut self, future: F) -> F::Output {
        self.pool.run_until(future)
    }

    pub fn ticks(&self) -> u64 {
        self.scheduler.ticks()
    }
}

impl Default for CooperativeRuntime {
    fn default() -> Self {
        Self::new()
    }
}
