//! Host stand-in backend on `portable-atomic`.
//!
//! Used where there is no ARM instruction set to target, mostly so the crate
//! can be tested on a development machine. `compare_exchange_weak` is allowed
//! to fail spuriously just like `STREX`, so the retry loops here have the
//! same shape as the exclusive-monitor ones: try again if the cell still
//! holds what we expected, give up if it doesn't.

use portable_atomic::{AtomicI32, Ordering};

use super::CasBackend;

/// The backend selected for this target.
#[derive(Debug)]
pub struct Native;

// SAFETY: `compare_exchange_weak` is atomic; spurious failures loop.
unsafe impl CasBackend for Native {
    #[inline(always)]
    unsafe fn load(ptr: *mut i32) -> i32 {
        AtomicI32::from_ptr(ptr).load(Ordering::Relaxed)
    }

    #[inline(always)]
    unsafe fn cas_bool(old: i32, new: i32, ptr: *mut i32) -> bool {
        Self::cas_val(old, new, ptr) == old
    }

    #[inline(always)]
    unsafe fn cas_val(old: i32, new: i32, ptr: *mut i32) -> i32 {
        let cell = AtomicI32::from_ptr(ptr);
        loop {
            match cell.compare_exchange_weak(old, new, Ordering::Relaxed, Ordering::Relaxed) {
                Ok(prev) => return prev,
                Err(prev) if prev == old => continue,
                Err(prev) => return prev,
            }
        }
    }
}
