//! Asynchronous work library.
//!
//! Dispatch units of work ("tasks") either to a fixed pool of background
//! worker threads or to a cooperative work loop pumped by the application's
//! main thread, then observe, cancel, or wait on them. Typical use is an
//! interactive application pushing CPU-bound work off its main thread while
//! keeping a way to hop back for operations that are not thread-safe
//! (window handles, graphics contexts).
//!
//! The two schedulers never share a queue:
//!
//! - [`async_call`] hands a closure to the [`ThreadPool`], a process-wide
//!   set of worker threads consuming a shared FIFO.
//! - [`main_thread_call`] hands it to the [`WorkLoop`], which runs nothing
//!   until the owning thread calls [`WorkLoop::pump`].
//!
//! Both return a [`TaskHandle`] that can cancel the work or wait for it.
//! Before the process exits, drain the pool with
//! [`ThreadPool::wait_and_die`]; pump the loop to completion if main-thread
//! tasks are still outstanding.
//!
//! ```
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//!
//! use asyncwork::{async_call, main_thread_call, ThreadPool, WorkLoop};
//!
//! let counter = Arc::new(AtomicU32::new(0));
//!
//! let task = async_call({
//!     let counter = Arc::clone(&counter);
//!     move |_me| {
//!         counter.fetch_add(1, Ordering::SeqCst);
//!         // hop back for the non-thread-safe part
//!         main_thread_call(|_me| { /* touch the window here */ });
//!     }
//! });
//!
//! assert!(task.wait());
//! assert_eq!(counter.load(Ordering::SeqCst), 1);
//!
//! WorkLoop::global().pump();
//! ThreadPool::global().wait_and_die();
//! ```

pub mod condition;
pub mod diag;
pub mod dispatch;
pub mod pool;
pub mod task;
pub mod workloop;

pub use condition::{Gate, GateGuard};
pub use dispatch::{async_call, main_thread_call, main_thread_call_sync};
pub use pool::{PoolError, ThreadPool};
pub use task::{Task, TaskHandle};
pub use workloop::WorkLoop;
