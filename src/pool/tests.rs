//! Unit tests for the worker pool.
//!
//! These build private pool instances instead of touching the process-wide
//! singleton, so they can pick worker counts that make ordering
//! deterministic (a single consumer preserves FIFO exactly).

use super::*;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::task::Task;

fn pool_with(size: usize) -> ThreadPool {
    let pool = ThreadPool::new(size);
    pool.start();
    pool
}

fn counting_task(counter: &Arc<AtomicUsize>) -> TaskHandle {
    let counter = Arc::clone(counter);
    Arc::new(Task::new(move |_: &Task| {
        counter.fetch_add(1, Ordering::SeqCst);
    }))
}

/// A scheduled task gets picked up and executed by a worker.
#[test]
fn schedule_executes_task() {
    let pool = pool_with(2);
    let counter = Arc::new(AtomicUsize::new(0));

    let task = counting_task(&counter);
    pool.schedule(Arc::clone(&task));

    assert!(task.wait());
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    pool.wait_and_die();
}

/// With a single consumer, submission order is execution order.
#[test]
fn single_worker_preserves_fifo() {
    let pool = pool_with(1);
    let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

    for seq in 0..50usize {
        let order = Arc::clone(&order);
        pool.schedule(Arc::new(Task::new(move |_: &Task| {
            order.lock().push(seq);
        })));
    }

    pool.wait_and_die();

    let order = order.lock();
    assert_eq!(*order, (0..50).collect::<Vec<_>>());
}

/// Shutdown blocks until everything already queued has finished.
#[test]
fn wait_and_die_drains_the_queue() {
    let pool = pool_with(2);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..4 {
        let counter = Arc::clone(&counter);
        pool.schedule(Arc::new(Task::new(move |_: &Task| {
            thread::sleep(Duration::from_millis(20));
            counter.fetch_add(1, Ordering::SeqCst);
        })));
    }

    pool.wait_and_die();
    assert_eq!(counter.load(Ordering::SeqCst), 4);
    assert_eq!(pool.worker_count(), 0);
}

/// A drained pool can be started again; tasks queued while it was down are
/// picked up by the new workers.
#[test]
fn pool_restarts_after_shutdown() {
    let pool = pool_with(2);
    let counter = Arc::new(AtomicUsize::new(0));

    let first = counting_task(&counter);
    pool.schedule(Arc::clone(&first));
    assert!(first.wait());

    pool.wait_and_die();

    let parked = counting_task(&counter);
    pool.schedule(Arc::clone(&parked));
    assert!(!parked.is_over());

    pool.start();
    assert!(parked.wait());
    assert_eq!(counter.load(Ordering::SeqCst), 2);

    pool.wait_and_die();
}

/// The worker set matches the configured size.
#[test]
fn worker_count_matches_configuration() {
    let pool = pool_with(4);
    assert_eq!(pool.worker_count(), 4);
    pool.wait_and_die();
}

/// Retiring an id that is not in the set is a logged no-op.
#[test]
fn retire_unknown_worker_is_ignored() {
    let pool = pool_with(2);

    PoolCore::retire_worker(&pool.core, 9999);
    assert_eq!(pool.worker_count(), 2);

    pool.wait_and_die();
}

/// A task aborting itself costs the pool nothing: the worker is replaced
/// on the spot and later work still completes.
#[test]
fn self_abort_keeps_capacity() {
    let pool = pool_with(2);

    let task = Arc::new(Task::new(|me: &Task| {
        me.abort();
    }));
    pool.schedule(Arc::clone(&task));

    assert!(task.wait());
    assert!(task.is_cancelled());
    assert_eq!(pool.worker_count(), 2);

    let counter = Arc::new(AtomicUsize::new(0));
    let follow_up = counting_task(&counter);
    pool.schedule(Arc::clone(&follow_up));
    assert!(follow_up.wait());
    assert_eq!(counter.load(Ordering::SeqCst), 1);

    pool.wait_and_die();
}

/// Shutting down a pool that never started, or twice in a row, is safe.
#[test]
fn redundant_shutdown_is_safe() {
    let pool = ThreadPool::new(2);
    pool.wait_and_die();

    pool.start();
    pool.wait_and_die();
    pool.wait_and_die();
}
