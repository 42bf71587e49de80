//! Thread identity diagnostics.
//!
//! Worker threads register themselves in a process-wide table mapping their
//! OS thread id to a small dense index, and the first pool touch records
//! which thread counts as "main". Log lines use these to say "worker 3"
//! instead of an opaque thread id. Purely diagnostic; nothing in the
//! runtime keys off this table.


use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::OnceLock;
use std::thread::{self, ThreadId};

use parking_lot::Mutex;

/// Where a thread stands relative to the library's two schedulers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThreadOrigin {
    /// The thread that first touched the pool.
    Main,
    /// A pool worker, with its dense registration index.
    Worker(u64),
    /// Any other thread.
    Foreign,
}

static WORKER_TABLE: OnceLock<Mutex<HashMap<ThreadId, u64>>> = OnceLock::new();
static WORKER_COUNTER: AtomicU64 = AtomicU64::new(0);
static MAIN_THREAD: OnceLock<ThreadId> = OnceLock::new();

fn worker_table() -> &'static Mutex<HashMap<ThreadId, u64>> {
    WORKER_TABLE.get_or_init(|| Mutex::new(HashMap::new()))
}

/// Declares the calling thread as the application's main thread. Only the
/// first declaration sticks; later calls are ignored.
pub fn register_main_thread() {
    let _ = MAIN_THREAD.set(thread::current().id());
}

/// Registers the calling thread as a pool worker and returns its dense
/// index. Indices are never reused.
pub(crate) fn register_worker_thread() -> u64 {
    let index = WORKER_COUNTER.fetch_add(1, Ordering::SeqCst);
    worker_table().lock().insert(thread::current().id(), index);
    index
}

/// Classifies an arbitrary thread id.
pub fn thread_origin_of(id: ThreadId) -> ThreadOrigin {
    if let Some(index) = worker_table().lock().get(&id).copied() {
        return ThreadOrigin::Worker(index);
    }
    if MAIN_THREAD.get() == Some(&id) {
        return ThreadOrigin::Main;
    }
    ThreadOrigin::Foreign
}

/// Classifies the calling thread.
pub fn thread_origin() -> ThreadOrigin {
    thread_origin_of(thread::current().id())
}

/// Human-readable label for the calling thread, for log lines.
pub fn thread_label() -> String {
    match thread_origin() {
        ThreadOrigin::Main => "main thread".to_owned(),
        ThreadOrigin::Worker(index) => format!("worker {index}"),
        ThreadOrigin::Foreign => "foreign thread".to_owned(),
    }
}
