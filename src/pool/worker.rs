//! Pool worker threads.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use super::{PoolCore, PoolError, WorkerId, WorkerRef};
use crate::diag;

/// One native consumer thread of the pool.
pub(super) struct Worker {
    id: WorkerId,
    retired: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub(super) fn spawn(id: WorkerId, pool: Arc<PoolCore>) -> Result<Self, PoolError> {
        let retired = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&retired);

        let handle = thread::Builder::new()
            .name(format!("pool-worker-{id}"))
            .spawn(move || Self::run(id, pool, flag))?;

        Ok(Self {
            id,
            retired,
            handle: Some(handle),
        })
    }

    fn run(id: WorkerId, pool: Arc<PoolCore>, retired: Arc<AtomicBool>) {
        let index = diag::register_worker_thread();
        log::trace!("worker {id} up (dense index {index})");

        while let Some(task) = pool.wait_for_task() {
            log::trace!("worker {id} running task {}", task.id());
            task.execute(Some(WorkerRef::new(&pool, id)));

            if retired.load(Ordering::SeqCst) {
                break;
            }

            // Give sibling workers a chance at the gate; some schedulers
            // let the thread that just released a condvar reacquire it
            // endlessly.
            thread::yield_now();
        }

        log::trace!("worker {id} down");
    }

    pub(super) fn id(&self) -> WorkerId {
        self.id
    }

    /// Flags the worker to stop pulling tasks and detaches its thread. The
    /// thread finishes its current callback on its own schedule; nobody
    /// joins it.
    pub(super) fn retire(mut self) {
        self.retired.store(true, Ordering::SeqCst);
        drop(self.handle.take());
    }

    /// Waits for the worker thread to exit its loop.
    pub(super) fn join(mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::warn!("worker {} exited by panic", self.id);
            }
        }
    }
}
