//! Compare-and-swap for bare-metal ARMv6-M, e.g. the Cortex-M0.
//!
//! These parts have no exclusive-access instructions at all. Masking
//! interrupts makes the compare and store indivisible, which is as good as it
//! gets on a single core. This means that:
//!
//! 1. It hurts interrupt latency a little. The M0 already has pretty poor
//!    latency because of uninterruptible multi-cycle instructions, so it's
//!    not a big loss.
//!
//! 2. It doesn't work in unprivileged mode, since `CPSID` is ignored there.

use super::helper::{CmpxchgHelper, HelperBackend};

/// Performs the compare-and-swap with interrupts masked.
#[derive(Debug)]
pub struct InterruptFree;

// SAFETY: with interrupts masked nothing else runs on this core between the
// read and the write.
unsafe impl CmpxchgHelper for InterruptFree {
    #[inline(always)]
    unsafe fn cmpxchg(old: i32, new: i32, ptr: *mut i32) -> i32 {
        cortex_m::interrupt::free(|_| {
            if core::ptr::read_volatile(ptr) == old {
                core::ptr::write_volatile(ptr, new);
                0
            } else {
                1
            }
        })
    }
}

/// The backend selected for this target.
pub type Native = HelperBackend<InterruptFree>;
