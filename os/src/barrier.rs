//! Memory barriers.
//!
//! Cores with LDREX/STREX also have `DMB`, and get real hardware fences. Older
//! cores get a compiler-only fence: their CAS runs through a privileged
//! helper that already orders memory for us, and there is no cheaper
//! instruction to reach for anyway.

use core::sync::atomic::{compiler_fence, Ordering};

/// Keeps the compiler from moving memory accesses across this point. Emits no
/// instructions.
#[inline(always)]
pub fn compiler_barrier() {
    compiler_fence(Ordering::SeqCst);
}

cfg_if::cfg_if! {
    if #[cfg(all(target_arch = "arm", not(feature = "portable-atomic"), has_ldrex, target_os = "none"))] {
        // M-profile DMB only defines the SY option, so stores get the full
        // barrier too.

        /// Two-way hardware fence: no load or store crosses it in either
        /// direction.
        #[inline(always)]
        pub fn full_barrier() {
            cortex_m::asm::dmb();
        }

        /// Orders all earlier stores before all later stores.
        #[inline(always)]
        pub fn store_barrier() {
            cortex_m::asm::dmb();
        }
    } else if #[cfg(all(target_arch = "arm", not(feature = "portable-atomic"), has_ldrex))] {
        /// Two-way hardware fence: no load or store crosses it in either
        /// direction.
        #[inline(always)]
        pub fn full_barrier() {
            // SAFETY: DMB has no operands and only constrains ordering.
            unsafe {
                core::arch::asm!("dmb", options(nostack, preserves_flags));
            }
        }

        /// Orders all earlier stores before all later stores.
        #[inline(always)]
        pub fn store_barrier() {
            // SAFETY: as above.
            unsafe {
                core::arch::asm!("dmb st", options(nostack, preserves_flags));
            }
        }
    } else if #[cfg(all(target_arch = "arm", not(feature = "portable-atomic")))] {
        /// Two-way fence. This core has no barrier instruction, so this only
        /// stops the compiler; the helper-based CAS provides the ordering.
        #[inline(always)]
        pub fn full_barrier() {
            compiler_barrier();
        }

        /// Store fence. Compiler-only on this core, like [`full_barrier`].
        #[inline(always)]
        pub fn store_barrier() {
            compiler_barrier();
        }
    } else {
        /// Two-way fence: no load or store crosses it in either direction.
        #[inline(always)]
        pub fn full_barrier() {
            core::sync::atomic::fence(Ordering::SeqCst);
        }

        /// Orders all earlier stores before all later stores.
        #[inline(always)]
        pub fn store_barrier() {
            core::sync::atomic::fence(Ordering::Release);
        }
    }
}
