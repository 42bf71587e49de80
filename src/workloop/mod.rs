//! Cooperative executor for the application's designated thread.
//!
//! The work loop owns a FIFO of tasks but no thread: nothing runs until the
//! owning thread calls [`WorkLoop::pump`], which drains whatever is queued
//! on the caller's own stack. This is how background work hops onto a
//! thread that owns non-shareable resources (a window, a graphics context).
//!
//! Which thread is "the" pumping thread is policy, not something the loop
//! enforces; callers pump from the thread they consider main.


use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::OnceLock;

use parking_lot::Mutex;

use crate::task::TaskHandle;

/// The main-thread work loop.
pub struct WorkLoop {
    pending: Mutex<VecDeque<TaskHandle>>,
    run: AtomicBool,
}

static WORK_LOOP: OnceLock<WorkLoop> = OnceLock::new();

impl WorkLoop {
    /// Returns the process-wide work loop.
    pub fn global() -> &'static WorkLoop {
        WORK_LOOP.get_or_init(WorkLoop::new)
    }

    fn new() -> Self {
        Self {
            pending: Mutex::new(VecDeque::new()),
            run: AtomicBool::new(true),
        }
    }

    /// Queues `task` for the owning thread's next [`WorkLoop::pump`].
    pub fn schedule(&self, task: TaskHandle) {
        log::trace!("task {} queued on the work loop", task.id());
        self.pending.lock().push_back(task);
    }

    /// Drains the queue on the calling thread, oldest task first, and
    /// returns whether the loop is still running. A stopped loop drains
    /// nothing and returns `false`, leaving queued tasks in place.
    ///
    /// The queue lock is held for the whole drain: scheduling from another
    /// thread blocks until the current batch finishes, and scheduling onto
    /// this loop from inside a pumped callback deadlocks. That recursion is
    /// on the caller, same as any other lock cycle through shared state.
    pub fn pump(&self) -> bool {
        let mut pending = self.pending.lock();

        while self.run.load(Ordering::SeqCst) {
            let Some(task) = pending.pop_front() else {
                break;
            };
            log::trace!("pumping task {}", task.id());
            task.execute(None);
        }

        self.run.load(Ordering::SeqCst)
    }

    /// Stops the loop: the current and all future pumps stop draining and
    /// return `false`. Safe to call from inside a pumped callback.
    pub fn stop(&self) {
        self.run.store(false, Ordering::SeqCst);
    }

    /// Re-arms a stopped loop. The next pump picks up whatever stayed
    /// queued while it was down.
    pub fn restart(&self) {
        self.run.store(true, Ordering::SeqCst);
    }
}
