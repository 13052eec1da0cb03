//! CPU barrier and pipeline-flush primitives.
//!
//! The ARM1176 predates the dedicated `dsb`/`dmb`/`isb` instructions; on
//! ARMv6 the barriers are CP15 `c7` cache operations that take a
//! should-be-zero operand. Every helper here compiles to a no-op on non-ARM
//! hosts so that code built on top of them can run in unit tests.

/// A single `nop`.
#[inline]
pub fn nop() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!("nop", options(nomem, nostack, preserves_flags));
    }
}

/// Data synchronization barrier ("drain write buffer").
///
/// Completes all outstanding explicit memory accesses before any instruction
/// after the barrier executes.
#[inline]
pub fn dsb() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!(
            "mcr p15, 0, {sbz}, c7, c10, 4",
            sbz = in(reg) 0u32,
            options(nostack, preserves_flags),
        );
    }
}

/// Data memory barrier.
///
/// Orders explicit memory accesses on either side of the barrier without
/// waiting for them to complete.
#[inline]
pub fn dmb() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!(
            "mcr p15, 0, {sbz}, c7, c10, 5",
            sbz = in(reg) 0u32,
            options(nostack, preserves_flags),
        );
    }
}

/// Flush the instruction prefetch buffer.
///
/// Guarantees that instructions fetched after this call observe coprocessor
/// and system-control state committed before it. Required after every CP14
/// debug-register write; skipping it lets stale prefetched instructions run
/// against the old debug configuration.
#[inline]
pub fn prefetch_flush() {
    #[cfg(target_arch = "arm")]
    unsafe {
        core::arch::asm!(
            "mcr p15, 0, {sbz}, c7, c5, 4",
            sbz = in(reg) 0u32,
            options(nostack, preserves_flags),
        );
    }
}
