//! Multi-threaded properties: no lost updates, and release/acquire handoff.

use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};
use std::thread;

use lilos_sync::atomic::{AtomicArithExt, AtomicExt};
use lilos_sync::cas::helper::{CmpxchgHelper, HelperBackend};
use lilos_sync::cas::CasBackend;
use lilos_sync::sync::{__sync_add_and_fetch_4, __sync_fetch_and_add_4};
use lilos_sync::{acquire_cas, release_cas, Op};

const THREADS: usize = 8;
const ITERS: usize = 10_000;

/// Shares a cell between threads as a raw pointer, the way C callers do.
#[derive(Copy, Clone)]
struct Shared(*mut i32);

// SAFETY: the cell outlives every scoped thread and is only touched through
// the atomic routines.
unsafe impl Send for Shared {}

#[test]
fn fetch_and_add_loses_no_updates() {
    let cell = AtomicI32::new(0);
    let shared = Shared(cell.as_ptr());
    thread::scope(|s| {
        for _ in 0..THREADS {
            s.spawn(move || {
                let shared = shared;
                for _ in 0..ITERS {
                    unsafe { __sync_fetch_and_add_4(shared.0, 1) };
                }
            });
        }
    });
    assert_eq!(cell.load(Ordering::SeqCst), (THREADS * ITERS) as i32);
}

#[test]
fn add_and_fetch_results_are_distinct() {
    // If op-and-fetch ever returned a value computed from a read other than
    // the one its committing CAS used, two threads would see the same number.
    let cell = AtomicI32::new(0);
    let shared = Shared(cell.as_ptr());
    let mut seen: Vec<i32> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                s.spawn(move || {
                    let shared = shared;
                    (0..ITERS)
                        .map(|_| unsafe { __sync_add_and_fetch_4(shared.0, 1) })
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });
    seen.sort_unstable();
    let expected: Vec<i32> = (1..=(THREADS * ITERS) as i32).collect();
    assert_eq!(seen, expected);
}

#[test]
fn mixed_ops_through_extension_traits() {
    let counter = AtomicU32::new(0);
    let flags = AtomicU32::new(0);
    thread::scope(|s| {
        for t in 0..THREADS {
            let counter = &counter;
            let flags = &flags;
            s.spawn(move || {
                for _ in 0..ITERS {
                    counter.fetch_add_polyfill(3);
                    counter.fetch_op_polyfill(Op::Sub, 1);
                }
                flags.fetch_or_polyfill(1 << t);
            });
        }
    });
    assert_eq!(counter.load(Ordering::SeqCst), (THREADS * ITERS * 2) as u32);
    assert_eq!(flags.load(Ordering::SeqCst), (1 << THREADS) - 1);
}

#[test]
fn swap_hands_out_each_token_once() {
    let slot = AtomicI32::new(-1);
    let taken: Vec<i32> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS as i32)
            .map(|t| {
                let slot = &slot;
                s.spawn(move || slot.swap_polyfill(t))
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    let mut all = taken;
    all.push(slot.load(Ordering::SeqCst));
    all.sort_unstable();
    let expected: Vec<i32> = (-1..THREADS as i32).collect();
    assert_eq!(all, expected);
}

#[test]
fn release_acquire_handoff() {
    for run in 0..200 {
        let data = AtomicI32::new(0);
        let flag = AtomicI32::new(0);
        let flag_ptr = Shared(flag.as_ptr());
        let payload = 1000 + run;

        thread::scope(|s| {
            let data = &data;
            s.spawn(move || {
                let flag_ptr = flag_ptr;
                // Spin until the flag reads 1; a CAS from 1 to 1 is an
                // acquire-ordered read.
                while !unsafe { acquire_cas(1, 1, flag_ptr.0) } {
                    std::hint::spin_loop();
                }
                assert_eq!(data.load(Ordering::Relaxed), payload, "run {run}");
            });
            s.spawn(move || {
                let flag_ptr = flag_ptr;
                data.store(payload, Ordering::Relaxed);
                assert!(unsafe { release_cas(0, 1, flag_ptr.0) });
            });
        });
    }
}

#[test]
fn compare_swap_admits_one_winner() {
    let gate = AtomicI32::new(0);
    let winners = AtomicU32::new(0);
    thread::scope(|s| {
        for t in 1..=THREADS as i32 {
            let gate = &gate;
            let winners = &winners;
            s.spawn(move || {
                if gate.compare_swap_polyfill(0, t).is_ok() {
                    winners.fetch_add_polyfill(1);
                }
            });
        }
    });
    assert_eq!(winners.load(Ordering::SeqCst), 1);
    assert_ne!(gate.load(Ordering::SeqCst), 0);
}

static HELPER_CALLS: AtomicU32 = AtomicU32::new(0);
static HELPER_SPURIOUS: AtomicU32 = AtomicU32::new(0);

/// Thread-safe stand-in for the kernel helper. Every third call across all
/// threads fails without looking at the cell, like a preempted helper.
struct Interrupted;

unsafe impl CmpxchgHelper for Interrupted {
    unsafe fn cmpxchg(old: i32, new: i32, ptr: *mut i32) -> i32 {
        if HELPER_CALLS.fetch_add(1, Ordering::Relaxed) % 3 == 0 {
            HELPER_SPURIOUS.fetch_add(1, Ordering::Relaxed);
            return 1;
        }
        let cell = AtomicI32::from_ptr(ptr);
        match cell.compare_exchange(old, new, Ordering::SeqCst, Ordering::SeqCst) {
            Ok(_) => 0,
            Err(_) => 1,
        }
    }

    unsafe fn load(ptr: *mut i32) -> i32 {
        AtomicI32::from_ptr(ptr).load(Ordering::SeqCst)
    }
}

#[test]
fn helper_backend_loses_no_updates_under_contention() {
    type Backend = HelperBackend<Interrupted>;

    let cell = AtomicI32::new(0);
    let shared = Shared(cell.as_ptr());
    let mut seen: Vec<i32> = thread::scope(|s| {
        let handles: Vec<_> = (0..THREADS)
            .map(|t| {
                s.spawn(move || {
                    let shared = shared;
                    let mut news = Vec::with_capacity(ITERS / 2);
                    for i in 0..ITERS {
                        if (t + i) % 2 == 0 {
                            unsafe { Backend::fetch_and_op(Op::Add, shared.0, 1) };
                        } else {
                            news.push(unsafe { Backend::op_and_fetch(Op::Add, shared.0, 1) });
                        }
                    }
                    news
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect()
    });

    assert_eq!(cell.load(Ordering::SeqCst), (THREADS * ITERS) as i32);
    let before = seen.len();
    seen.sort_unstable();
    seen.dedup();
    assert_eq!(seen.len(), before, "two op-and-fetch calls saw the same value");
    assert!(HELPER_SPURIOUS.load(Ordering::Relaxed) > 0);
}
