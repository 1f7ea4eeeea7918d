//! Entry points for widths we refuse to emulate.
//!
//! Compilers and `libgcc` expect `__sync_*` routines for 1-, 2- and 8-byte
//! cells as well. We only do 4-byte cells. Faking a narrower operation with a
//! word-sized one would clobber neighboring bytes, and an 8-byte one can't be
//! made atomic with a 4-byte CAS, so these symbols exist only to stop the
//! program loudly if anything ever calls them.
//!
//! Before stopping, the failure is handed to the hook installed with
//! [`set_fatal_hook`], so an embedding program can record it. With `std` it is
//! also logged through `tracing`, written to stderr, and the process aborts.
//! Without `std` we panic with the same message.

use core::fmt;
use core::sync::atomic::{AtomicPtr, Ordering};

/// An atomic operation this crate deliberately doesn't implement.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Unsupported {
    /// Symbol name of the entry point that was called.
    pub op: &'static str,
}

impl Unsupported {
    /// Describes a call to the entry point named `op`.
    pub const fn new(op: &'static str) -> Self {
        Self { op }
    }
}

impl fmt::Display for Unsupported {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unsupported atomic operation `{}`", self.op)
    }
}

#[cfg(any(test, feature = "std"))]
impl std::error::Error for Unsupported {}

/// Observer called with the failure just before the program stops.
pub type FatalHook = fn(&Unsupported);

static FATAL_HOOK: AtomicPtr<()> = AtomicPtr::new(core::ptr::null_mut());

/// Installs `hook` to be called when an unsupported entry point is hit,
/// replacing any previous hook.
///
/// The hook can't prevent termination. If it returns, the program stops as
/// usual.
pub fn set_fatal_hook(hook: FatalHook) {
    FATAL_HOOK.store(hook as *mut (), Ordering::Release);
}

fn fatal_hook() -> Option<FatalHook> {
    let p = FATAL_HOOK.load(Ordering::Acquire);
    if p.is_null() {
        None
    } else {
        // SAFETY: the only non-null values ever stored are `FatalHook`s.
        Some(unsafe { core::mem::transmute::<*mut (), FatalHook>(p) })
    }
}

/// Reports `err` and stops the program.
#[cold]
#[inline(never)]
pub fn fatal(err: Unsupported) -> ! {
    #[cfg(feature = "std")]
    tracing::error!(op = err.op, "unsupported atomic operation");
    if let Some(hook) = fatal_hook() {
        hook(&err);
    }
    terminate(err)
}

#[cfg(any(test, feature = "std"))]
fn terminate(err: Unsupported) -> ! {
    std::eprintln!("{err}");
    std::process::abort()
}

#[cfg(not(any(test, feature = "std")))]
fn terminate(err: Unsupported) -> ! {
    panic!("{err}")
}

/// Defines entry points that only report themselves and stop.
macro_rules! unsupported {
    ($($name:ident($($arg:ident: $ty:ty),*) -> $ret:ty;)*) => {
        $(
            /// Not implemented: stops the program. See the [module docs](self).
            ///
            /// # Safety
            ///
            /// Never returns, so there's nothing to uphold; `unsafe` only for
            /// signature compatibility with the real routines.
            #[cfg_attr(feature = "export-symbols", no_mangle)]
            pub unsafe extern "C" fn $name($(_: $ty),*) -> $ret {
                fatal(Unsupported::new(stringify!($name)))
            }
        )*
    };
}

unsupported! {
    __sync_fetch_and_add_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_add_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_add_8(ptr: *mut i64, val: i64) -> i64;

    __sync_fetch_and_sub_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_sub_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_sub_8(ptr: *mut i64, val: i64) -> i64;

    __sync_fetch_and_and_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_and_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_and_8(ptr: *mut i64, val: i64) -> i64;

    __sync_fetch_and_or_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_or_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_or_8(ptr: *mut i64, val: i64) -> i64;

    __sync_fetch_and_xor_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_xor_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_xor_8(ptr: *mut i64, val: i64) -> i64;

    __sync_fetch_and_nand_1(ptr: *mut i8, val: i8) -> i8;
    __sync_fetch_and_nand_2(ptr: *mut i16, val: i16) -> i16;
    __sync_fetch_and_nand_8(ptr: *mut i64, val: i64) -> i64;

    __sync_add_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_add_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_add_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_sub_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_sub_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_sub_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_and_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_and_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_and_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_or_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_or_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_or_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_xor_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_xor_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_xor_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_nand_and_fetch_1(ptr: *mut i8, val: i8) -> i8;
    __sync_nand_and_fetch_2(ptr: *mut i16, val: i16) -> i16;
    __sync_nand_and_fetch_8(ptr: *mut i64, val: i64) -> i64;

    __sync_bool_compare_and_swap_1(ptr: *mut i8, oldval: i8, newval: i8) -> bool;
    __sync_bool_compare_and_swap_2(ptr: *mut i16, oldval: i16, newval: i16) -> bool;
    __sync_bool_compare_and_swap_8(ptr: *mut i64, oldval: i64, newval: i64) -> bool;

    __sync_val_compare_and_swap_1(ptr: *mut i8, oldval: i8, newval: i8) -> i8;
    __sync_val_compare_and_swap_2(ptr: *mut i16, oldval: i16, newval: i16) -> i16;
    __sync_val_compare_and_swap_8(ptr: *mut i64, oldval: i64, newval: i64) -> i64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_names_the_operation() {
        let err = Unsupported::new("__sync_fetch_and_add_8");
        assert_eq!(
            err.to_string(),
            "unsupported atomic operation `__sync_fetch_and_add_8`"
        );
    }

    #[test]
    fn hook_round_trips_through_storage() {
        fn hook(_: &Unsupported) {}
        set_fatal_hook(hook);
        let got = fatal_hook().map(|h| h as usize);
        assert_eq!(got, Some(hook as FatalHook as usize));
    }
}
