//! Access to the ARM1176's debug registers.
//!
//! The debug unit lives behind coprocessor instructions, not memory-mapped
//! IO: CP14 carries the debug registers proper, and CP15 carries the fault
//! status/address registers a debug exception handler needs. Encodings are
//! from "Chapter 13: Debug" of the ARM1176JZF-S TRM.
//!
//! All access goes through the [`RegisterFile`] trait so that everything
//! above this layer is ordinary portable code. `Coprocessor` is the real
//! implementation; tests run the same logic against a simulated register
//! file.

#![allow(clippy::missing_const_for_fn)]

use arbitrary_int::{u2, u4};
use bitbybit::{bitenum, bitfield};

/// One of the registers the debug subsystem touches.
///
/// Only register pair 0 of the breakpoint and watchpoint banks is named;
/// this design never drives the others.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugRegister {
    /// DIDR: debug unit identification and capability counts.
    DebugId,
    /// DSCR: debug status and control.
    StatusControl,
    /// BVR0: instruction address compared by breakpoint pair 0.
    BreakpointValue,
    /// BCR0: control word for breakpoint pair 0.
    BreakpointControl,
    /// WVR0: data address compared by watchpoint pair 0.
    WatchpointValue,
    /// WCR0: control word for watchpoint pair 0.
    WatchpointControl,
    /// IFSR: cause of the most recent prefetch abort.
    InstructionFaultStatus,
    /// DFSR: cause of the most recent data abort.
    DataFaultStatus,
    /// FAR: data address of the most recent data abort.
    FaultAddress,
    /// WFAR: address associated with the most recent watchpoint hit.
    WatchpointFaultAddress,
    /// IFAR: instruction address of the most recent prefetch abort.
    InstructionFaultAddress,
}

/// Read and write access to the debug register file.
///
/// Implementations of [`write`](Self::write) must guarantee that
/// instructions fetched after the call returns observe the new value. On
/// hardware that means a prefetch flush after every write; reprogramming a
/// breakpoint without one races against instructions already in the
/// pipeline, causing missed or spurious debug exceptions.
pub trait RegisterFile {
    /// Read the current value of `reg`. No side effects beyond the read.
    fn read(&mut self, reg: DebugRegister) -> u32;

    /// Write `value` to `reg` and make it visible to subsequent instruction
    /// fetches before returning.
    fn write(&mut self, reg: DebugRegister, value: u32);
}

impl<R: RegisterFile + ?Sized> RegisterFile for &mut R {
    fn read(&mut self, reg: DebugRegister) -> u32 {
        (**self).read(reg)
    }

    fn write(&mut self, reg: DebugRegister, value: u32) {
        (**self).write(reg, value);
    }
}

/// FSR status code reported when an abort was raised by a debug event.
pub const FAULT_STATUS_DEBUG_EVENT: u4 = u4::new(0b0010);

/// The DIDR register.
#[bitfield(u32, debug)]
pub struct DebugId {
    /// Number of watchpoint register pairs, minus one.
    #[bits(28..=31, r)]
    pub watchpoint_pairs: u4,
    /// Number of breakpoint register pairs, minus one.
    #[bits(24..=27, r)]
    pub breakpoint_pairs: u4,
    /// Debug architecture version implemented by the core.
    #[bits(16..=19, r)]
    pub version: Option<DebugVersion>,
}

/// A version of the ARM debug architecture.
#[derive(Debug, PartialEq, Eq)]
#[bitenum(u4, exhaustive = false)]
pub enum DebugVersion {
    /// ARMv6, the architecture this crate drives.
    V6 = 0b0001,
    /// ARMv6.1.
    V6_1 = 0b0010,
}

/// The DSCR register.
///
/// One physical register serves two roles: the lifecycle bits that select
/// monitor debug mode, and the method-of-entry field a fault handler reads
/// to learn which debug event fired.
#[bitfield(u32, debug)]
pub struct StatusControl {
    /// Monitor debug mode enable.
    #[bit(15, rw)]
    pub monitor_debug_mode: bool,
    /// Halting debug mode select; while set, monitor mode is not in effect
    /// even if enabled.
    #[bit(14, rw)]
    pub halting_debug_mode: bool,
    /// Which debug event raised the current debug exception.
    #[bits(2..=5, r)]
    pub method_of_entry: Option<DebugEventReason>,
}

impl StatusControl {
    /// Whether the core takes debug events as monitor-mode exceptions:
    /// monitor mode must be both enabled and selected.
    #[must_use]
    pub fn monitor_enabled(&self) -> bool {
        self.monitor_debug_mode() && !self.halting_debug_mode()
    }
}

/// Why the debug unit raised the most recent debug exception.
#[derive(Debug, PartialEq, Eq)]
#[bitenum(u4, exhaustive = false)]
pub enum DebugEventReason {
    /// Halt request over the DBGTAP.
    HaltRequest = 0b0000,
    /// An instruction-address breakpoint (match or mismatch) fired.
    Breakpoint = 0b0001,
    /// A data-address watchpoint fired.
    Watchpoint = 0b0010,
    /// A `bkpt` instruction executed.
    BkptInstruction = 0b0011,
    /// External debug request (EDBGRQ).
    ExternalRequest = 0b0100,
    /// Vector catch.
    VectorCatch = 0b0101,
}

/// The BCR0 register.
#[bitfield(u32, debug)]
pub struct BreakpointControl {
    /// Comparison performed against BVR0.
    #[bits(21..=22, rw)]
    pub breakpoint_type: BreakpointType,
    /// Which byte addresses within the compared word participate.
    #[bits(5..=8, rw)]
    pub byte_address_select: u4,
    /// Privilege levels the comparison applies in.
    #[bits(1..=2, rw)]
    pub privilege: Option<PrivilegeFilter>,
    /// Breakpoint pair 0 enable.
    #[bit(0, rw)]
    pub enabled: bool,
}

impl BreakpointControl {
    /// Control word used to arm the single-step mismatch breakpoint:
    /// mismatch comparison over the full 4-byte instruction width, user and
    /// privileged execution, context matching off, enabled.
    ///
    /// This exact pattern is dictated by the ARM1176 breakpoint-register
    /// encoding; it is not tunable.
    #[must_use]
    pub fn mismatch_armed() -> Self {
        Self::new_with_raw_value(0)
            .with_breakpoint_type(BreakpointType::AddressMismatch)
            .with_byte_address_select(u4::new(0b1111))
            .with_privilege(PrivilegeFilter::Any)
            .with_enabled(true)
    }
}

/// Comparison mode of a breakpoint pair (BCR bits [22:21]).
#[derive(Debug, PartialEq, Eq)]
#[bitenum(u2, exhaustive = true)]
pub enum BreakpointType {
    /// Fire when the PC equals BVR0.
    AddressMatch = 0b00,
    /// Address match, linked with a context-ID pair.
    LinkedAddressMatch = 0b01,
    /// Fire on every instruction whose PC differs from BVR0 — the
    /// "anti-breakpoint" single-stepping is built on.
    AddressMismatch = 0b10,
    /// Address mismatch, linked with a context-ID pair.
    LinkedAddressMismatch = 0b11,
}

/// Privilege levels a breakpoint or watchpoint comparison applies in.
#[derive(Debug, PartialEq, Eq)]
#[bitenum(u2, exhaustive = false)]
pub enum PrivilegeFilter {
    /// Privileged execution only.
    Privileged = 0b01,
    /// User-mode execution only.
    User = 0b10,
    /// Both.
    Any = 0b11,
}

/// The WCR0 register.
#[bitfield(u32, debug)]
pub struct WatchpointControl {
    /// Which byte addresses within the compared word participate.
    #[bits(5..=8, rw)]
    pub byte_address_select: u4,
    /// Access kinds the watchpoint fires on.
    #[bits(3..=4, rw)]
    pub access: Option<WatchpointAccess>,
    /// Privilege levels the comparison applies in.
    #[bits(1..=2, rw)]
    pub privilege: Option<PrivilegeFilter>,
    /// Watchpoint pair 0 enable.
    #[bit(0, rw)]
    pub enabled: bool,
}

/// Access kinds a watchpoint comparison applies to (WCR bits [4:3]).
#[derive(Debug, PartialEq, Eq)]
#[bitenum(u2, exhaustive = false)]
pub enum WatchpointAccess {
    /// Loads only.
    Load = 0b01,
    /// Stores only.
    Store = 0b10,
    /// Both.
    Any = 0b11,
}

/// The IFSR register.
#[bitfield(u32, debug)]
pub struct InstructionFaultStatus {
    /// Fault status code for the most recent prefetch abort.
    #[bits(0..=3, r)]
    pub status: u4,
}

/// The DFSR register.
#[bitfield(u32, debug)]
pub struct DataFaultStatus {
    /// Set when the aborted access was a write, clear for a read. Only
    /// meaningful when the status code can be trusted.
    #[bit(11, r)]
    pub caused_by_write: bool,
    /// Status-code extension bit. When set, the low status bits cannot
    /// disambiguate the abort cause.
    #[bit(10, r)]
    pub status_extension: bool,
    /// Fault status code for the most recent data abort.
    #[bits(0..=3, r)]
    pub status: u4,
}

/// Direct `mrc`/`mcr` access to the physical register file.
///
/// This zero-sized handle is the only assembly boundary in the crate. Every
/// write is followed by a prefetch flush, per the ARM1176 requirement that
/// debug-register updates be flushed before dependent instructions fetch.
#[cfg(target_arch = "arm")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Coprocessor;

#[cfg(target_arch = "arm")]
mod hardware {
    use pione_core::asm::prefetch_flush;

    use super::{Coprocessor, DebugRegister, RegisterFile};

    macro_rules! mrc_p14 {
        ($crn:literal, $crm:literal, $opc2:literal) => {{
            let value: u32;
            unsafe {
                core::arch::asm!(
                    "mrc p14, 0, {value}, c{crn}, c{crm}, {opc2}",
                    value = out(reg) value,
                    crn = const $crn,
                    crm = const $crm,
                    opc2 = const $opc2,
                    options(nostack, preserves_flags),
                );
            }
            value
        }};
    }

    macro_rules! mcr_p14 {
        ($crn:literal, $crm:literal, $opc2:literal, $value:expr) => {{
            let value: u32 = $value;
            unsafe {
                core::arch::asm!(
                    "mcr p14, 0, {value}, c{crn}, c{crm}, {opc2}",
                    value = in(reg) value,
                    crn = const $crn,
                    crm = const $crm,
                    opc2 = const $opc2,
                    options(nostack, preserves_flags),
                );
            }
        }};
    }

    macro_rules! mrc_p15 {
        ($crn:literal, $crm:literal, $opc2:literal) => {{
            let value: u32;
            unsafe {
                core::arch::asm!(
                    "mrc p15, 0, {value}, c{crn}, c{crm}, {opc2}",
                    value = out(reg) value,
                    crn = const $crn,
                    crm = const $crm,
                    opc2 = const $opc2,
                    options(nostack, preserves_flags),
                );
            }
            value
        }};
    }

    macro_rules! mcr_p15 {
        ($crn:literal, $crm:literal, $opc2:literal, $value:expr) => {{
            let value: u32 = $value;
            unsafe {
                core::arch::asm!(
                    "mcr p15, 0, {value}, c{crn}, c{crm}, {opc2}",
                    value = in(reg) value,
                    crn = const $crn,
                    crm = const $crm,
                    opc2 = const $opc2,
                    options(nostack, preserves_flags),
                );
            }
        }};
    }

    impl RegisterFile for Coprocessor {
        fn read(&mut self, reg: DebugRegister) -> u32 {
            match reg {
                DebugRegister::DebugId => mrc_p14!(0, 0, 0),
                DebugRegister::StatusControl => mrc_p14!(0, 1, 0),
                DebugRegister::BreakpointValue => mrc_p14!(0, 0, 4),
                DebugRegister::BreakpointControl => mrc_p14!(0, 0, 5),
                DebugRegister::WatchpointValue => mrc_p14!(0, 0, 6),
                DebugRegister::WatchpointControl => mrc_p14!(0, 0, 7),
                DebugRegister::DataFaultStatus => mrc_p15!(5, 0, 0),
                DebugRegister::InstructionFaultStatus => mrc_p15!(5, 0, 1),
                DebugRegister::FaultAddress => mrc_p15!(6, 0, 0),
                DebugRegister::WatchpointFaultAddress => mrc_p15!(6, 0, 1),
                DebugRegister::InstructionFaultAddress => mrc_p15!(6, 0, 2),
            }
        }

        fn write(&mut self, reg: DebugRegister, value: u32) {
            match reg {
                DebugRegister::StatusControl => mcr_p14!(0, 1, 0, value),
                DebugRegister::BreakpointValue => mcr_p14!(0, 0, 4, value),
                DebugRegister::BreakpointControl => mcr_p14!(0, 0, 5, value),
                DebugRegister::WatchpointValue => mcr_p14!(0, 0, 6, value),
                DebugRegister::WatchpointControl => mcr_p14!(0, 0, 7, value),
                DebugRegister::WatchpointFaultAddress => mcr_p15!(6, 0, 1, value),
                DebugRegister::DebugId
                | DebugRegister::DataFaultStatus
                | DebugRegister::InstructionFaultStatus
                | DebugRegister::FaultAddress
                | DebugRegister::InstructionFaultAddress => {
                    panic!("register {reg:?} is not programmed by the debug unit")
                }
            }
            prefetch_flush();
        }
    }
}
