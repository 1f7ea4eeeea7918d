//! A collection of atomic "polyfill" routines, to use a term from JavaScript.
//!
//! Older ARM cores don't support the atomic read-modify-write operations that
//! `core::sync::atomic` types expose; on those targets the methods simply
//! aren't there. The traits in this module give the 32-bit atomic types the
//! same operations, routed through this crate's compare-and-swap backend, so
//! code can be written once for every core.
//!
//! Ordering is fixed rather than chosen per call: every operation here issues
//! a full barrier first, like the `__sync` routines.

use core::sync::atomic::{AtomicI32, AtomicU32};

use crate::barrier::full_barrier;
use crate::cas::{CasBackend, Native};
use crate::rmw::Op;

/// Basic atomic operations.
pub trait AtomicExt {
    /// Primitive type corresponding to this atomic type.
    type Value;

    /// Atomically exchange our current contents for `val`, returning the
    /// original contents.
    fn swap_polyfill(&self, val: Self::Value) -> Self::Value;

    /// If our contents equal `current`, atomically replace them with `new`.
    ///
    /// Returns `Ok(current)` on success, `Err(actual_value)` on failure.
    fn compare_swap_polyfill(
        &self,
        current: Self::Value,
        new: Self::Value,
    ) -> Result<Self::Value, Self::Value>;
}

/// Atomic operations that apply to arithmetic types.
pub trait AtomicArithExt: AtomicExt {
    /// Atomically apply `op` with `val`, returning the original value.
    fn fetch_op_polyfill(&self, op: Op, val: Self::Value) -> Self::Value;

    /// Atomically apply `op` with `val`, returning the new value.
    fn op_fetch_polyfill(&self, op: Op, val: Self::Value) -> Self::Value;

    /// Atomically add `val` to our contents, returning the original value.
    fn fetch_add_polyfill(&self, val: Self::Value) -> Self::Value {
        self.fetch_op_polyfill(Op::Add, val)
    }

    /// Atomically OR `val` into our contents, returning the original value.
    fn fetch_or_polyfill(&self, val: Self::Value) -> Self::Value {
        self.fetch_op_polyfill(Op::Or, val)
    }
}

macro_rules! impl_atomic_polyfills {
    ($t:ty, $v:ty) => {
        impl AtomicExt for $t {
            type Value = $v;

            fn swap_polyfill(&self, val: Self::Value) -> Self::Value {
                let ptr = self.as_ptr().cast::<i32>();
                let val = i32::from_ne_bytes(val.to_ne_bytes());
                full_barrier();
                // SAFETY: `ptr` comes from a live atomic of the same size and
                // alignment, and every access to it is atomic.
                let prev = unsafe {
                    loop {
                        let prev = Native::load(ptr);
                        if Native::cas_bool(prev, val, ptr) {
                            break prev;
                        }
                    }
                };
                <$v>::from_ne_bytes(prev.to_ne_bytes())
            }

            fn compare_swap_polyfill(
                &self,
                current: Self::Value,
                new: Self::Value,
            ) -> Result<Self::Value, Self::Value> {
                let ptr = self.as_ptr().cast::<i32>();
                let old = i32::from_ne_bytes(current.to_ne_bytes());
                let new = i32::from_ne_bytes(new.to_ne_bytes());
                full_barrier();
                // SAFETY: as in `swap_polyfill`.
                let prev = unsafe { Native::cas_val(old, new, ptr) };
                let prev = <$v>::from_ne_bytes(prev.to_ne_bytes());
                if prev == current {
                    Ok(prev)
                } else {
                    Err(prev)
                }
            }
        }

        impl AtomicArithExt for $t {
            fn fetch_op_polyfill(&self, op: Op, val: Self::Value) -> Self::Value {
                let ptr = self.as_ptr().cast::<i32>();
                let val = i32::from_ne_bytes(val.to_ne_bytes());
                // SAFETY: as in `swap_polyfill`.
                let prev = unsafe { Native::fetch_and_op(op, ptr, val) };
                <$v>::from_ne_bytes(prev.to_ne_bytes())
            }

            fn op_fetch_polyfill(&self, op: Op, val: Self::Value) -> Self::Value {
                let ptr = self.as_ptr().cast::<i32>();
                let val = i32::from_ne_bytes(val.to_ne_bytes());
                // SAFETY: as in `swap_polyfill`.
                let next = unsafe { Native::op_and_fetch(op, ptr, val) };
                <$v>::from_ne_bytes(next.to_ne_bytes())
            }
        }
    };
}

impl_atomic_polyfills!(AtomicI32, i32);
impl_atomic_polyfills!(AtomicU32, u32);
