//! Compare-and-swap, and the backends that provide it.
//!
//! Exactly one backend is compiled in, picked from the target when the crate
//! is built:
//!
//! | target                                | backend                      |
//! |---------------------------------------|------------------------------|
//! | ARMv7+, ARMv7-M, ARMv8-M mainline     | `LDREX`/`STREX`              |
//! | older ARM, Linux or Android           | kernel `__kuser_cmpxchg`     |
//! | older ARM, bare metal (ARMv6-M)       | interrupt-free critical section |
//! | anything else, or `portable-atomic`   | `portable-atomic`            |
//!
//! The selected backend is exported as [`Native`]. Nothing above this module
//! knows which one it got.

use crate::barrier::full_barrier;
use crate::rmw::Op;

pub mod helper;

cfg_if::cfg_if! {
    if #[cfg(any(feature = "portable-atomic", not(target_arch = "arm")))] {
        #[path = "cas/portable_atomic.rs"]
        mod impl_mod;
    } else if #[cfg(has_ldrex)] {
        #[path = "cas/ldrex.rs"]
        mod impl_mod;
    } else if #[cfg(any(target_os = "linux", target_os = "android"))] {
        #[path = "cas/kuser.rs"]
        mod impl_mod;
    } else if #[cfg(target_os = "none")] {
        #[path = "cas/interrupt_free.rs"]
        mod impl_mod;
    } else {
        compile_error!("no compare-and-swap backend for this ARM target");
    }
}

pub use impl_mod::Native;

/// A compare-and-swap implementation, plus the read-modify-write family built
/// on it.
///
/// The RMW methods have default bodies that derive everything from
/// [`cas_bool`](Self::cas_bool). Backends that can do better, such as an
/// exclusive-monitor loop that computes the new value between the load and
/// the store, override them. Overrides must keep the same results and the
/// same leading full barrier.
///
/// # Safety
///
/// Implementations must make `cas_bool` and `cas_val` atomic with respect to
/// every other access made through this trait to the same cell: the store
/// happens only if the cell equals `old` at that instant, and a spurious
/// failure of the underlying mechanism is retried rather than reported.
pub unsafe trait CasBackend {
    /// Reads the cell with a single-copy-atomic word load.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and 4-byte aligned.
    unsafe fn load(ptr: *mut i32) -> i32;

    /// Stores `new` into `*ptr` if it currently holds `old`.
    ///
    /// Returns `true` if the swap happened and `false` if the cell held some
    /// other value. Implies no barrier.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes and 4-byte aligned, and other
    /// threads may only access it atomically while this runs.
    unsafe fn cas_bool(old: i32, new: i32, ptr: *mut i32) -> bool;

    /// Stores `new` into `*ptr` if it currently holds `old`, and returns the
    /// value the cell held immediately before the attempt, whether or not the
    /// swap happened. Implies no barrier.
    ///
    /// # Safety
    ///
    /// Same as [`cas_bool`](Self::cas_bool).
    unsafe fn cas_val(old: i32, new: i32, ptr: *mut i32) -> i32;

    /// Applies `op` to the cell and returns the value from before.
    ///
    /// # Safety
    ///
    /// Same as [`cas_bool`](Self::cas_bool).
    #[inline(always)]
    unsafe fn fetch_and_op(op: Op, ptr: *mut i32, val: i32) -> i32 {
        full_barrier();
        loop {
            let prev = Self::load(ptr);
            if Self::cas_bool(prev, op.apply(prev, val), ptr) {
                return prev;
            }
        }
    }

    /// Applies `op` to the cell and returns the value it stored.
    ///
    /// # Safety
    ///
    /// Same as [`cas_bool`](Self::cas_bool).
    #[inline(always)]
    unsafe fn op_and_fetch(op: Op, ptr: *mut i32, val: i32) -> i32 {
        full_barrier();
        loop {
            let prev = Self::load(ptr);
            // Computed from this iteration's `prev`, so what we return is
            // exactly what the committing CAS wrote.
            let next = op.apply(prev, val);
            if Self::cas_bool(prev, next, ptr) {
                return next;
            }
        }
    }
}

/// Stores `new` into `*ptr` if it holds `old`. Returns `true` if the swap
/// happened.
///
/// No barrier; see [`acquire_cas`] and [`release_cas`].
///
/// # Safety
///
/// `ptr` must be valid for reads and writes, 4-byte aligned, and only
/// accessed atomically by other threads for the duration of the call.
#[inline(always)]
pub unsafe fn cas_bool(old: i32, new: i32, ptr: *mut i32) -> bool {
    Native::cas_bool(old, new, ptr)
}

/// Stores `new` into `*ptr` if it holds `old`. Returns the value that was in
/// the cell before the attempt; the swap happened iff that equals `old`.
///
/// # Safety
///
/// Same as [`cas_bool`].
#[inline(always)]
pub unsafe fn cas_val(old: i32, new: i32, ptr: *mut i32) -> i32 {
    Native::cas_val(old, new, ptr)
}

/// [`cas_bool`] followed by a full barrier.
///
/// Nothing this thread does after the call can be observed to happen before
/// the swap, so a successful acquire-CAS can safely read data published by
/// the thread that did the matching [`release_cas`].
///
/// # Safety
///
/// Same as [`cas_bool`].
#[inline(always)]
pub unsafe fn acquire_cas(old: i32, new: i32, ptr: *mut i32) -> bool {
    let swapped = Native::cas_bool(old, new, ptr);
    full_barrier();
    swapped
}

/// A full barrier followed by [`cas_bool`].
///
/// Everything this thread wrote before the call is visible to any thread that
/// observes the new value through an acquire-ordered access.
///
/// # Safety
///
/// Same as [`cas_bool`].
#[inline(always)]
pub unsafe fn release_cas(old: i32, new: i32, ptr: *mut i32) -> bool {
    full_barrier();
    Native::cas_bool(old, new, ptr)
}
