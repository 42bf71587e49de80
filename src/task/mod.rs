//! Task objects: schedulable units of work with cancellation and
//! completion observability.
//!
//! A [`Task`] owns its callback and the state needed to observe it from the
//! outside: a cancellation flag, the identity of the thread that executed
//! it, and a `done` gate that latches from 0 to 1 exactly once when the
//! task finishes. Tasks are passed around as [`TaskHandle`]s; the queue an
//! executing side pops from retains one, so the callback always runs
//! against a live object.
//!
//! Tasks are created by the dispatch entry points ([`crate::async_call`],
//! [`crate::main_thread_call`]) and executed at most once, either by a pool
//! worker or by the work loop's pump.


use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

use crate::condition::Gate;
use crate::pool::WorkerRef;

/// Shared handle to a [`Task`]. Cheap to clone; the task lives as long as
/// its longest holder.
pub type TaskHandle = Arc<Task>;

type Callback = Box<dyn FnOnce(&Task) + Send + 'static>;

/// One schedulable unit of work.
pub struct Task {
    id: u64,
    callback: Mutex<Option<Callback>>,
    cancelled: AtomicBool,
    /// Set only while executing on a pool worker; routes aborts.
    owner: Mutex<Option<WorkerRef>>,
    /// Thread that executed (or is executing) the task; `None` until then.
    executor: Mutex<Option<ThreadId>>,
    /// 0 = not done, 1 = done. The single observable completion fence.
    done: Gate,
}

impl Task {
    pub(crate) fn new<F>(callback: F) -> Self
    where
        F: FnOnce(&Task) + Send + 'static,
    {
        static NEXT_ID: AtomicU64 = AtomicU64::new(1);

        Self {
            id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            callback: Mutex::new(Some(Box::new(callback))),
            cancelled: AtomicBool::new(false),
            owner: Mutex::new(None),
            executor: Mutex::new(None),
            done: Gate::new(0),
        }
    }

    /// Process-unique task id, for log lines.
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Marks the task as cancelled.
    ///
    /// Cancellation is cooperative: a callback that is already running must
    /// poll [`Task::is_cancelled`] and wind down on its own. A task
    /// cancelled before its executor reaches it is never invoked at all,
    /// though it still completes (see [`Task::is_over`]).
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Cancels the task and, if it is currently running on a pool worker,
    /// retires that worker so the pool is not held hostage by a callback
    /// that ignores cancellation. The pool replaces the worker immediately;
    /// the retired thread is left to finish (or never finish) on its own.
    ///
    /// For a task running on the work loop this degrades to [`Task::cancel`]
    /// since the loop has no preemption. Does not wait.
    pub fn abort(&self) {
        self.cancel();

        let owner = self.owner.lock().clone();
        if let Some(owner) = owner {
            log::debug!("task {}: abort is retiring its worker", self.id);
            owner.retire();
        }
    }

    /// Whether [`Task::cancel`] or [`Task::abort`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Whether the task has finished (callback returned, or was skipped
    /// because of cancellation).
    pub fn is_over(&self) -> bool {
        self.done.get() == 1
    }

    /// Blocks until the task has finished and returns `true`.
    ///
    /// Returns `false` immediately when called from the thread that
    /// executed the task itself; waiting there would never end.
    pub fn wait(&self) -> bool {
        if *self.executor.lock() == Some(thread::current().id()) {
            log::debug!("task {}: wait() on the executing thread, refusing", self.id);
            return false;
        }
        self.done.wait_for(1)
    }

    /// Runs the task on the calling thread. `owner` identifies the pool
    /// worker doing so, `None` when the work loop pumps the task.
    ///
    /// The completion fence fires regardless of cancellation, so waiters
    /// always make progress even for tasks that were never invoked.
    pub(crate) fn execute(&self, owner: Option<WorkerRef>) {
        *self.executor.lock() = Some(thread::current().id());
        *self.owner.lock() = owner;

        if !self.is_cancelled() {
            let callback = self.callback.lock().take();
            if let Some(callback) = callback {
                callback(self);
            }
        }

        // The abort window closes with the callback; a late abort must not
        // retire whatever the worker picks up next.
        *self.owner.lock() = None;
        self.done.set(1);
    }
}
