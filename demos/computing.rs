//! Fifty CPU-bound tasks on the pool, plus one hop back to the main
//! thread, which keeps pumping until the hop tells it to stop.
//!
//! Run with `cargo run --example computing`.

use std::thread;
use std::time::Duration;

use asyncwork::{async_call, main_thread_call, ThreadPool, WorkLoop};

fn main() {
    for _ in 0..50 {
        async_call(|_| {
            let mut a: u64 = 1;
            for i in 0..1_000_000u64 {
                a = a.wrapping_mul(a.wrapping_add(i));
            }
            std::hint::black_box(a);
        });
    }

    // From a worker, hop back to the thread pumping the loop (this one).
    async_call(|_| {
        main_thread_call(|_| {
            println!("hello from the main thread");
            WorkLoop::global().stop();
        });
    });

    ThreadPool::global().wait_and_die();

    while WorkLoop::global().pump() {
        thread::sleep(Duration::from_millis(1));
    }
}
