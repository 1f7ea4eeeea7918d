//! The GCC `__sync` builtin interface, 4-byte flavors.
//!
//! These are the routines a compiler calls when it decides not to inline an
//! atomic, under the names and signatures described in GCC's "Legacy
//! `__sync` Built-in Functions for Atomic Memory Access". Turn on the
//! `export-symbols` feature to give them unmangled names.
//!
//! Every routine here is a full barrier in front of the operation; that's
//! stronger than some callers need, but it's what the interface promises.
//! Other widths live in [`unsupported`](crate::unsupported).
//!
//! # Safety
//!
//! For every routine taking `ptr`: it must be valid for reads and writes,
//! 4-byte aligned, and only accessed atomically by other threads for the
//! duration of the call.

use crate::barrier::full_barrier;
use crate::cas::{CasBackend, Native};
use crate::rmw::Op;

/// Full memory barrier.
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub extern "C" fn __sync_synchronize() {
    full_barrier();
}

/// If `*ptr == oldval`, stores `newval`. Returns `true` if it did.
///
/// # Safety
///
/// See the [module docs](self).
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn __sync_bool_compare_and_swap_4(
    ptr: *mut i32,
    oldval: i32,
    newval: i32,
) -> bool {
    full_barrier();
    Native::cas_bool(oldval, newval, ptr)
}

/// If `*ptr == oldval`, stores `newval`. Returns what `*ptr` held before.
///
/// # Safety
///
/// See the [module docs](self).
#[cfg_attr(feature = "export-symbols", no_mangle)]
pub unsafe extern "C" fn __sync_val_compare_and_swap_4(
    ptr: *mut i32,
    oldval: i32,
    newval: i32,
) -> i32 {
    full_barrier();
    Native::cas_val(oldval, newval, ptr)
}

macro_rules! sync_rmw {
    ($($op:ident: $fetch_op:ident, $op_fetch:ident;)*) => {
        $(
            #[doc = concat!(
                "Applies `", stringify!($op), "` with `val` to `*ptr`, returning the old value.",
            )]
            ///
            /// # Safety
            ///
            /// See the [module docs](self).
            #[cfg_attr(feature = "export-symbols", no_mangle)]
            pub unsafe extern "C" fn $fetch_op(ptr: *mut i32, val: i32) -> i32 {
                Native::fetch_and_op(Op::$op, ptr, val)
            }

            #[doc = concat!(
                "Applies `", stringify!($op), "` with `val` to `*ptr`, returning the new value.",
            )]
            ///
            /// # Safety
            ///
            /// See the [module docs](self).
            #[cfg_attr(feature = "export-symbols", no_mangle)]
            pub unsafe extern "C" fn $op_fetch(ptr: *mut i32, val: i32) -> i32 {
                Native::op_and_fetch(Op::$op, ptr, val)
            }
        )*
    };
}

sync_rmw! {
    Add: __sync_fetch_and_add_4, __sync_add_and_fetch_4;
    Sub: __sync_fetch_and_sub_4, __sync_sub_and_fetch_4;
    And: __sync_fetch_and_and_4, __sync_and_and_fetch_4;
    Or: __sync_fetch_and_or_4, __sync_or_and_fetch_4;
    Xor: __sync_fetch_and_xor_4, __sync_xor_and_fetch_4;
    Nand: __sync_fetch_and_nand_4, __sync_nand_and_fetch_4;
}
