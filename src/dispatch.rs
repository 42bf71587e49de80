//! Entry points for dispatching work.
//!
//! These are the only supported ways for application code to create tasks:
//! wrap a closure, enqueue it on the pool or the work loop, hand back the
//! shared handle. The closure receives a reference to its own task so
//! in-callback cancellation checks are trivial:
//!
//! ```
//! let task = asyncwork::async_call(|me| {
//!     while !me.is_cancelled() {
//!         // chew on something, in slices
//!         break;
//!     }
//! });
//! task.wait();
//! asyncwork::ThreadPool::global().wait_and_die();
//! ```

use std::sync::Arc;

use crate::pool::ThreadPool;
use crate::task::{Task, TaskHandle};
use crate::workloop::WorkLoop;

/// Runs `f` on one of the pool's background workers. Returns the task
/// handle; drop it freely, the pool keeps the task alive until it ran.
pub fn async_call<F>(f: F) -> TaskHandle
where
    F: FnOnce(&Task) + Send + 'static,
{
    let task: TaskHandle = Arc::new(Task::new(f));
    ThreadPool::global().schedule(Arc::clone(&task));
    task
}

/// Runs `f` on the thread that pumps the work loop, at its next pump.
pub fn main_thread_call<F>(f: F) -> TaskHandle
where
    F: FnOnce(&Task) + Send + 'static,
{
    let task: TaskHandle = Arc::new(Task::new(f));
    WorkLoop::global().schedule(Arc::clone(&task));
    task
}

/// Like [`main_thread_call`], but blocks until the task has run, so code
/// after the call may rely on its effects.
///
/// Must not be called from the pumping thread itself: no one would be left
/// to pump the loop. Returns the [`Task::wait`] result.
pub fn main_thread_call_sync<F>(f: F) -> bool
where
    F: FnOnce(&Task) + Send + 'static,
{
    main_thread_call(f).wait()
}
