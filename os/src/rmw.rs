//! The read-modify-write family.
//!
//! Each operation comes in two flavors: fetch-and-op returns what the cell
//! held before, op-and-fetch returns what it holds after. Both issue a full
//! barrier and then retry until their update commits.

use crate::cas::{CasBackend, Native};

/// Operator applied by a read-modify-write.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Op {
    /// Two's-complement wrapping addition.
    Add,
    /// Two's-complement wrapping subtraction.
    Sub,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Bitwise XOR.
    Xor,
    /// `!(prev & val)`.
    Nand,
}

impl Op {
    #[cfg(test)]
    pub(crate) const ALL: [Op; 6] = [Op::Add, Op::Sub, Op::And, Op::Or, Op::Xor, Op::Nand];

    /// Computes the value a cell holding `prev` should hold after applying
    /// this operator with operand `val`.
    #[inline(always)]
    pub fn apply(self, prev: i32, val: i32) -> i32 {
        match self {
            Op::Add => prev.wrapping_add(val),
            Op::Sub => prev.wrapping_sub(val),
            Op::And => prev & val,
            Op::Or => prev | val,
            Op::Xor => prev ^ val,
            Op::Nand => !(prev & val),
        }
    }
}

/// Atomically applies `op` with `val` to `*ptr`, returning the previous
/// contents.
///
/// # Safety
///
/// `ptr` must be valid for reads and writes, 4-byte aligned, and only
/// accessed atomically by other threads for the duration of the call.
#[inline(always)]
pub unsafe fn fetch_and_op(op: Op, ptr: *mut i32, val: i32) -> i32 {
    Native::fetch_and_op(op, ptr, val)
}

/// Atomically applies `op` with `val` to `*ptr`, returning the new contents.
///
/// # Safety
///
/// Same as [`fetch_and_op`].
#[inline(always)]
pub unsafe fn op_and_fetch(op: Op, ptr: *mut i32, val: i32) -> i32 {
    Native::op_and_fetch(op, ptr, val)
}
