//! Atomic read-modify-write routines and memory fences for 32-bit ARM.
//!
//! Compilers targeting older ARM cores (or told not to inline atomics) emit
//! calls to the GCC `__sync_*` family instead of instruction sequences. This
//! crate provides those routines for 4-byte cells, on top of one of two
//! compare-and-swap backends chosen when the crate is built:
//!
//! - On ARMv7 and later, an `LDREX`/`STREX` loop. The RMW family is hand
//!   written as exclusive-monitor sequences too.
//! - On older cores, a privileged helper that performs the compare-and-swap
//!   for us: the kernel user helper on Linux, or an interrupt-free critical
//!   section on bare metal. Everything else is derived from the CAS.
//!
//! Narrower and wider widths are deliberately not emulated. Their entry
//! points exist only to stop the program; see [`unsupported`].
//!
//! On targets that are not ARM at all, a `portable-atomic` backend stands in
//! so the crate can be tested on a development host.
//!
//! # Ordering
//!
//! Every fetch-and-op and op-and-fetch issues a full barrier before its retry
//! loop. [`acquire_cas`] and [`release_cas`] add a full barrier after or
//! before the swap respectively. Nothing here is sequentially consistent
//! across multiple cells unless you add the fences yourself.

#![cfg_attr(not(any(test, feature = "std")), no_std)]
#![warn(
    elided_lifetimes_in_paths,
    explicit_outlives_requirements,
    missing_debug_implementations,
    missing_docs,
    semicolon_in_expressions_from_macros,
    single_use_lifetimes,
    trivial_casts,
    trivial_numeric_casts,
    unreachable_pub,
    unused_qualifications,
)]

pub mod atomic;
pub mod barrier;
pub mod cas;
pub mod rmw;
pub mod sync;
pub mod unsupported;

pub use barrier::{compiler_barrier, full_barrier, store_barrier};
pub use cas::{acquire_cas, cas_bool, cas_val, release_cas, CasBackend, Native};
pub use rmw::{fetch_and_op, op_and_fetch, Op};
pub use unsupported::{set_fatal_hook, Unsupported};
