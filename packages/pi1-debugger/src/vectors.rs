//! Exception vector-table relocation.
//!
//! The vector base address register (CP15 `c12`) moves the exception jump
//! table away from address 0. Clients installing a debug exception handler
//! do this first — it is also what keeps address 0 free to serve as the
//! never-executed bootstrap target for
//! [`MismatchStepper::start`](crate::MismatchStepper::start).

use pione_core::asm::prefetch_flush;

fn raw_get() -> u32 {
    let base: u32;
    unsafe {
        core::arch::asm!(
            "mrc p15, 0, {base}, c12, c0, 0",
            base = out(reg) base,
            options(nomem, nostack, preserves_flags),
        );
    }
    base
}

fn raw_set(base: u32) {
    unsafe {
        core::arch::asm!(
            "mcr p15, 0, {base}, c12, c0, 0",
            base = in(reg) base,
            options(nostack, preserves_flags),
        );
    }
    prefetch_flush();
}

/// The table must be 16-byte aligned and somewhere other than address 0.
fn is_legal(base: *const u32) -> bool {
    !base.is_null() && (base as u32) & 0xF == 0
}

/// The currently installed vector table base.
#[must_use]
pub fn vector_base() -> *const u32 {
    raw_get() as *const u32
}

/// Install the vector table at `base`.
///
/// A no-op when `base` is already installed, so independent bring-up code
/// can call it repeatedly.
///
/// # Panics
///
/// If `base` is null or misaligned, if a different table is already
/// installed (use [`vector_base_reset`] to replace one deliberately), or if
/// the register does not read back as `base`.
pub fn vector_base_set(base: *const u32) {
    assert!(is_legal(base), "illegal vector base {base:p}");

    let current = vector_base();
    if current == base {
        return;
    }
    assert!(
        current.is_null(),
        "vector base already installed at {current:p}"
    );

    raw_set(base as u32);
    assert_eq!(vector_base(), base, "vector base did not take");
}

/// Replace whatever vector table is installed with `base`, returning the old
/// base.
///
/// # Panics
///
/// If `base` is null or misaligned, or the register does not read back as
/// `base`.
pub fn vector_base_reset(base: *const u32) -> *const u32 {
    assert!(is_legal(base), "illegal vector base {base:p}");

    let old = vector_base();
    raw_set(base as u32);
    assert_eq!(vector_base(), base, "vector base did not take");

    old
}
