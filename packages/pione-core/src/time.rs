//! Time sources: the BCM2835 system timer and the ARM1176 cycle counter.
//!
//! The system timer is a free-running 1 MHz counter shared by the whole SoC;
//! it is the right clock for millisecond/microsecond waits. The cycle counter
//! runs at the 700 MHz core clock and is the only clock fine-grained enough
//! to pace bit-banged IO.

/// Free-running microsecond counter (system timer CLO).
#[cfg(target_arch = "arm")]
const SYSTEM_TIMER_CLO: u32 = 0x2000_3004;

/// The core clock the cycle counter ticks at.
pub const CPU_HZ: u32 = 700_000_000;

/// Current value of the free-running 1 MHz system timer.
///
/// Wraps roughly every 71 minutes; use [`u32::wrapping_sub`] on two readings
/// to get an interval.
#[inline]
#[must_use]
pub fn ticks_us() -> u32 {
    #[cfg(target_arch = "arm")]
    unsafe {
        crate::mmio::read32(SYSTEM_TIMER_CLO)
    }
    #[cfg(not(target_arch = "arm"))]
    {
        // Host builds have no system timer.
        0
    }
}

/// Busy-wait for `us` microseconds.
pub fn delay_us(us: u32) {
    let start = ticks_us();
    while ticks_us().wrapping_sub(start) < us {}
}

/// Busy-wait for `ms` milliseconds.
pub fn delay_ms(ms: u32) {
    delay_us(ms * 1000);
}

/// Reset and enable the CP15 performance counters, including the cycle
/// counter read by [`cycle_count`].
///
/// Must be called once before the first [`cycle_count`] read; the counter
/// powers up disabled.
pub fn cycle_counter_enable() {
    #[cfg(target_arch = "arm")]
    unsafe {
        // Performance monitor control: bit 0 enables the counters, bit 2
        // resets the cycle counter.
        core::arch::asm!(
            "mcr p15, 0, {ctrl}, c15, c12, 0",
            ctrl = in(reg) 0b101u32,
            options(nostack, preserves_flags),
        );
    }
}

/// Current value of the core-clock cycle counter.
///
/// Wraps every few seconds at 700 MHz; only interval arithmetic via
/// [`u32::wrapping_sub`] is meaningful.
#[inline]
#[must_use]
pub fn cycle_count() -> u32 {
    #[cfg(target_arch = "arm")]
    {
        let count: u32;
        unsafe {
            core::arch::asm!(
                "mrc p15, 0, {count}, c15, c12, 1",
                count = out(reg) count,
                options(nomem, nostack, preserves_flags),
            );
        }
        count
    }
    #[cfg(not(target_arch = "arm"))]
    {
        // Host builds have no cycle counter.
        0
    }
}
