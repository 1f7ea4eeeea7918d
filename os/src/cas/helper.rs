//! Compare-and-swap through a privileged helper.
//!
//! Cores without LDREX/STREX can't build a CAS out of ordinary instructions.
//! Instead something with more authority than us does the compare and the
//! store as one step: the Linux kernel's user helper page, or a critical
//! section with interrupts masked. This module holds the retry discipline
//! around such a helper; the helpers themselves live in sibling modules.
//!
//! The helper may fail without the cell having changed (the kernel helper
//! does this when it is preempted mid-sequence). So after a failure we look
//! at the cell again: if it still holds the expected value the failure was
//! spurious and we retry, otherwise the comparison genuinely failed.

use core::marker::PhantomData;

use super::CasBackend;

/// A single attempt at compare-and-swap, performed atomically with respect to
/// all observers including interrupt handlers.
///
/// # Safety
///
/// `cmpxchg` must return 0 only if it stored `new` into a cell that held
/// `old`, and must leave the cell untouched when it returns anything else.
pub unsafe trait CmpxchgHelper {
    /// Attempts to replace `old` with `new` in `*ptr`. Returns 0 on success
    /// and nonzero on failure.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and writes and 4-byte aligned.
    unsafe fn cmpxchg(old: i32, new: i32, ptr: *mut i32) -> i32;

    /// Reads the cell when deciding whether a failure was spurious. A plain
    /// volatile word load, which is single-copy atomic on ARM.
    ///
    /// # Safety
    ///
    /// `ptr` must be valid for reads and 4-byte aligned.
    #[inline(always)]
    unsafe fn load(ptr: *mut i32) -> i32 {
        core::ptr::read_volatile(ptr)
    }
}

/// Compare-and-swap backend built on the helper `H`.
pub struct HelperBackend<H>(PhantomData<H>);

impl<H> core::fmt::Debug for HelperBackend<H> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("HelperBackend")
    }
}

// SAFETY: atomicity comes from `H`; spurious failures are retried below.
unsafe impl<H: CmpxchgHelper> CasBackend for HelperBackend<H> {
    #[inline(always)]
    unsafe fn load(ptr: *mut i32) -> i32 {
        H::load(ptr)
    }

    #[inline(always)]
    unsafe fn cas_bool(old: i32, new: i32, ptr: *mut i32) -> bool {
        loop {
            if H::cmpxchg(old, new, ptr) == 0 {
                return true;
            }
            if Self::load(ptr) != old {
                return false;
            }
        }
    }

    #[inline(always)]
    unsafe fn cas_val(old: i32, new: i32, ptr: *mut i32) -> i32 {
        loop {
            if H::cmpxchg(old, new, ptr) == 0 {
                return old;
            }
            let prev = Self::load(ptr);
            if prev != old {
                return prev;
            }
        }
    }
}
