//! Fixed-size worker pool with a shared FIFO of pending tasks.
//!
//! The pool is a process-wide singleton of `POOL_SIZE` native threads. A
//! producer pushes a task under the pending gate's lock and releases the
//! gate at 1 (non-empty); an idle worker parked on the gate wakes, pops the
//! front task and releases the gate at 0 or 1 depending on what is left.
//! The gate owns the queue, so the queue cannot be touched without holding
//! the gate's mutex.
//!
//! Shutdown goes through [`ThreadPool::wait_and_die`]: wait for the queue
//! to drain, invalidate the gate (which turns every parked worker's wait
//! into a negative answer), then join the workers. Aborting a task retires
//! its worker instead of killing it; a replacement is inserted first so the
//! pool never runs below capacity.

mod worker;

#[cfg(test)]
mod tests;

use std::collections::VecDeque;
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::Mutex;
use thiserror::Error;

use crate::condition::Gate;
use crate::diag;
use crate::task::TaskHandle;

use worker::Worker;

/// Number of worker threads the process-wide pool keeps alive.
const POOL_SIZE: usize = 10;

/// Identifier of a worker within its pool. Monotonic; replacement workers
/// get fresh ids.
pub(crate) type WorkerId = u64;

/// Errors from the pool's thread plumbing.
#[derive(Debug, Error)]
pub enum PoolError {
    /// The OS refused to start a worker thread.
    #[error("worker thread spawn failed: {0}")]
    Spawn(#[from] io::Error),
}

/// Shared state of one pool: the gated queue plus the worker set.
///
/// Worker threads hold an `Arc` to this; the public [`ThreadPool`] is a
/// thin wrapper around the same `Arc`.
pub(crate) struct PoolCore {
    /// Gate value 1 while `pending` is non-empty, 0 otherwise.
    has_pending: Gate<VecDeque<TaskHandle>>,
    workers: Mutex<Vec<Worker>>,
    /// One-shot start guard, re-armed by a full shutdown.
    started: Mutex<bool>,
    size: usize,
    next_worker_id: AtomicU64,
}

/// Non-owning reference from a running task back to the worker executing
/// it, used to route an abort. Holds the pool weakly so a task handle that
/// outlives the pool cannot keep it alive, or retire anything once the
/// pool is gone.
#[derive(Clone)]
pub(crate) struct WorkerRef {
    pool: Weak<PoolCore>,
    worker: WorkerId,
}

impl WorkerRef {
    fn new(pool: &Arc<PoolCore>, worker: WorkerId) -> Self {
        Self {
            pool: Arc::downgrade(pool),
            worker,
        }
    }

    pub(crate) fn retire(&self) {
        if let Some(pool) = self.pool.upgrade() {
            PoolCore::retire_worker(&pool, self.worker);
        }
    }
}

/// The pool of background worker threads.
pub struct ThreadPool {
    core: Arc<PoolCore>,
}

static POOL: OnceLock<ThreadPool> = OnceLock::new();

impl ThreadPool {
    /// Returns the process-wide pool, starting its workers on first touch.
    ///
    /// The first call also declares the calling thread as the application's
    /// main thread for diagnostic labelling.
    pub fn global() -> &'static ThreadPool {
        let pool = POOL.get_or_init(|| {
            diag::register_main_thread();
            ThreadPool::new(POOL_SIZE)
        });
        pool.start();
        pool
    }

    fn new(size: usize) -> Self {
        Self {
            core: Arc::new(PoolCore {
                has_pending: Gate::with_data(0, VecDeque::new()),
                workers: Mutex::new(Vec::new()),
                started: Mutex::new(false),
                size,
                next_worker_id: AtomicU64::new(0),
            }),
        }
    }

    /// Spawns the workers if the pool is not currently running. Also
    /// brings a pool that went through [`ThreadPool::wait_and_die`] back
    /// up, picking up anything queued in the meantime.
    fn start(&self) {
        let mut started = self.core.started.lock();
        if *started {
            return;
        }

        self.core.has_pending.restore();
        {
            let mut workers = self.core.workers.lock();
            for _ in 0..self.core.size {
                workers.push(PoolCore::spawn_worker(&self.core));
            }
        }
        *started = true;
        log::debug!("pool started with {} workers", self.core.size);
    }

    /// Appends `task` to the pending queue and wakes one worker. Never
    /// blocks beyond the brief queue lock.
    pub fn schedule(&self, task: TaskHandle) {
        log::trace!("task {} queued on the pool", task.id());
        let mut pending = self.core.has_pending.lock();
        pending.push_back(task);
        pending.release(1);
    }

    /// Blocks until every already-scheduled task has been picked up and
    /// finished, then stops and joins the workers.
    ///
    /// Scheduling concurrently with the shutdown is undefined; anything
    /// that still lands in the queue is picked up if the pool is started
    /// again.
    pub fn wait_and_die(&self) {
        let mut started = self.core.started.lock();
        if !*started {
            return;
        }

        self.core.has_pending.wait_for(0);
        self.core.has_pending.invalidate();

        let workers = std::mem::take(&mut *self.core.workers.lock());
        for worker in workers {
            worker.join();
        }

        *started = false;
        log::debug!("pool drained and stopped");
    }

    /// Number of live (non-retired) workers.
    pub fn worker_count(&self) -> usize {
        self.core.workers.lock().len()
    }
}

impl PoolCore {
    fn spawn_worker(core: &Arc<PoolCore>) -> Worker {
        let id = core.next_worker_id.fetch_add(1, Ordering::SeqCst);
        Worker::spawn(id, Arc::clone(core))
            .unwrap_or_else(|err| panic!("cannot start pool worker {id}: {err}"))
    }

    /// Consumer side of the hand-off. Blocks until a task is available and
    /// pops it; returns `None` once the pool is shutting down.
    fn wait_for_task(&self) -> Option<TaskHandle> {
        loop {
            let mut pending = self.has_pending.lock_when(1)?;
            let task = pending.pop_front();
            let value = if pending.is_empty() { 0 } else { 1 };
            pending.release(value);
            if let Some(task) = task {
                return Some(task);
            }
        }
    }

    /// Takes `id` out of the worker set and detaches its thread, inserting
    /// a replacement first so effective capacity never dips. An id that is
    /// no longer in the set (already retired, or from a dead pool
    /// generation) is ignored.
    fn retire_worker(core: &Arc<PoolCore>, id: WorkerId) {
        let mut workers = core.workers.lock();

        let Some(index) = workers.iter().position(|w| w.id() == id) else {
            log::debug!("worker {id} not found in the pool, nothing to retire");
            return;
        };

        let replacement = PoolCore::spawn_worker(core);
        workers.push(replacement);

        let victim = workers.swap_remove(index);
        victim.retire();
        log::debug!("worker {id} retired and replaced");
    }
}
