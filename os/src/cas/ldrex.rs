//! Compare-and-swap and RMW on the exclusive monitor (`LDREX`/`STREX`).
//!
//! `LDREX` loads a word and marks its address as exclusively ours. `STREX`
//! stores only if nobody has written the address (or taken an exception)
//! since, and reports in a status register whether it did. A nonzero status
//! never means the comparison failed, only that we lost the reservation, so
//! every loop here retries on it unconditionally.
//!
//! The RMW family gets its own sequences rather than going through the CAS:
//! computing the new value between the load and the store saves a compare
//! and, more importantly, a whole extra exclusive round trip when contended.

use core::arch::asm;

use super::CasBackend;
use crate::barrier::full_barrier;
use crate::rmw::Op;

/// The backend selected for this target.
#[derive(Debug)]
pub struct Native;

/// One exclusive compare-and-swap attempt.
///
/// Returns the value observed and the `STREX` status. The status is 0 both
/// when the store happened and when the comparison failed (no store is
/// attempted then).
#[inline(always)]
unsafe fn try_cas(old: i32, new: i32, ptr: *mut i32) -> (i32, u32) {
    let prev: i32;
    let status: u32;
    asm!(
        "ldrex {prev}, [{ptr}]",
        "mov {status}, #0",
        "cmp {prev}, {old}",
        "bne 1f",
        "strex {status}, {new}, [{ptr}]",
        "1:",
        prev = out(reg) prev,
        status = out(reg) status,
        ptr = in(reg) ptr,
        old = in(reg) old,
        new = in(reg) new,
        options(nostack),
    );
    (prev, status)
}

/// Expands to one exclusive load/compute/store attempt. The compute
/// instructions read `{prev}` and `{val}` and leave the result in `{next}`.
macro_rules! exclusive_rmw {
    ($ptr:expr, $val:expr, $($insn:literal),+ $(,)?) => {{
        let prev: i32;
        let next: i32;
        let status: u32;
        asm!(
            "ldrex {prev}, [{ptr}]",
            $($insn,)+
            "strex {status}, {next}, [{ptr}]",
            prev = out(reg) prev,
            next = out(reg) next,
            status = out(reg) status,
            ptr = in(reg) $ptr,
            val = in(reg) $val,
            options(nostack),
        );
        (prev, next, status)
    }};
}

/// One exclusive attempt at applying `op`. Returns `(prev, next, status)`.
#[inline(always)]
unsafe fn try_rmw(op: Op, ptr: *mut i32, val: i32) -> (i32, i32, u32) {
    match op {
        Op::Add => exclusive_rmw!(ptr, val, "add {next}, {prev}, {val}"),
        Op::Sub => exclusive_rmw!(ptr, val, "sub {next}, {prev}, {val}"),
        Op::And => exclusive_rmw!(ptr, val, "and {next}, {prev}, {val}"),
        Op::Or => exclusive_rmw!(ptr, val, "orr {next}, {prev}, {val}"),
        Op::Xor => exclusive_rmw!(ptr, val, "eor {next}, {prev}, {val}"),
        // No single instruction for this one.
        Op::Nand => exclusive_rmw!(
            ptr,
            val,
            "and {next}, {prev}, {val}",
            "mvn {next}, {next}",
        ),
    }
}

// SAFETY: the exclusive monitor makes each committed STREX atomic with the
// LDREX before it; lost reservations loop.
unsafe impl CasBackend for Native {
    #[inline(always)]
    unsafe fn load(ptr: *mut i32) -> i32 {
        core::ptr::read_volatile(ptr)
    }

    #[inline(always)]
    unsafe fn cas_bool(old: i32, new: i32, ptr: *mut i32) -> bool {
        loop {
            let (prev, status) = try_cas(old, new, ptr);
            if status == 0 {
                return prev == old;
            }
        }
    }

    #[inline(always)]
    unsafe fn cas_val(old: i32, new: i32, ptr: *mut i32) -> i32 {
        loop {
            let (prev, status) = try_cas(old, new, ptr);
            if status == 0 {
                return prev;
            }
        }
    }

    #[inline(always)]
    unsafe fn fetch_and_op(op: Op, ptr: *mut i32, val: i32) -> i32 {
        full_barrier();
        loop {
            let (prev, _, status) = try_rmw(op, ptr, val);
            if status == 0 {
                return prev;
            }
        }
    }

    #[inline(always)]
    unsafe fn op_and_fetch(op: Op, ptr: *mut i32, val: i32) -> i32 {
        full_barrier();
        loop {
            let (_, next, status) = try_rmw(op, ptr, val);
            if status == 0 {
                return next;
            }
        }
    }
}
