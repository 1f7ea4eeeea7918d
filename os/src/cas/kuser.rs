//! Compare-and-swap via the Linux kernel user helpers.
//!
//! ARM Linux maps a page of helper routines at the top of every process's
//! address space. `__kuser_cmpxchg` sits at a fixed address and performs the
//! compare-and-swap in a way the kernel guarantees is atomic, restarting it
//! if the task is preempted. It returns 0 if the store happened.
//!
//! See `Documentation/arch/arm/kernel_user_helpers.rst` in the kernel tree.

use super::helper::{CmpxchgHelper, HelperBackend};

/// Address of `__kuser_cmpxchg`.
const KUSER_CMPXCHG: usize = 0xffff_0fc0;

type KuserCmpxchgFn = unsafe extern "C" fn(old: i32, new: i32, ptr: *mut i32) -> i32;

/// Trampoline into `__kuser_cmpxchg`.
#[derive(Debug)]
pub struct KuserCmpxchg;

// SAFETY: the kernel documents the helper as atomic with the 0-on-success
// convention.
unsafe impl CmpxchgHelper for KuserCmpxchg {
    #[inline(always)]
    unsafe fn cmpxchg(old: i32, new: i32, ptr: *mut i32) -> i32 {
        let helper: KuserCmpxchgFn = core::mem::transmute(KUSER_CMPXCHG);
        helper(old, new, ptr)
    }
}

/// The backend selected for this target.
pub type Native = HelperBackend<KuserCmpxchg>;
