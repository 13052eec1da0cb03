//! The debug-unit handle and its lifecycle.
//!
//! For the core to deliver breakpoint and watchpoint hits as ordinary
//! prefetch/data aborts, monitor debug mode must be both enabled and
//! selected in DSCR. Writes to the debug unit are not synchronously
//! observable without the pipeline flush baked into the register layer, so
//! every state change here is verified by read-back at the point of change
//! rather than failing many instructions later.

use crate::regs::{DebugId, DebugRegister, RegisterFile, StatusControl};

/// The process-wide handle to the ARM1176 debug unit.
///
/// There is one CPU and one debug register file, so a program constructs
/// exactly one of these — over `regs::Coprocessor` on hardware — and passes
/// it to everything that manipulates debug state. Tests substitute a
/// simulated register file.
#[derive(Debug)]
pub struct DebugUnit<R: RegisterFile> {
    pub(crate) regs: R,
}

impl<R: RegisterFile> DebugUnit<R> {
    /// Wrap a register file in a debug-unit handle.
    pub const fn new(regs: R) -> Self {
        Self { regs }
    }

    /// Parsed contents of the debug id register.
    pub fn debug_id(&mut self) -> DebugId {
        DebugId::new_with_raw_value(self.regs.read(DebugRegister::DebugId))
    }

    pub(crate) fn status(&mut self) -> StatusControl {
        StatusControl::new_with_raw_value(self.regs.read(DebugRegister::StatusControl))
    }

    /// Whether debug events are taken as monitor-mode exceptions.
    pub fn is_enabled(&mut self) -> bool {
        self.status().monitor_enabled()
    }

    /// Enable monitor debug mode.
    ///
    /// A no-op when already enabled, so clients that share the debug unit
    /// can each call this without coordinating.
    ///
    /// # Panics
    ///
    /// If the unit does not read back as enabled afterwards. That means a
    /// hardware fault or a misprogrammed register, and no later debug
    /// behavior could be trusted.
    pub fn enable(&mut self) {
        if self.is_enabled() {
            pione_core::println!("debug unit: already enabled");
            return;
        }

        let status = self
            .status()
            .with_monitor_debug_mode(true)
            .with_halting_debug_mode(false);
        self.regs
            .write(DebugRegister::StatusControl, status.raw_value());

        assert!(self.is_enabled(), "debug unit failed to enable");
    }

    /// Disable monitor debug mode. A no-op when already disabled.
    ///
    /// # Panics
    ///
    /// If the unit still reads back as enabled afterwards.
    pub fn disable(&mut self) {
        if !self.is_enabled() {
            return;
        }

        // Deselecting monitor mode (bit 14 set) also stops delivery even if
        // some other agent re-enables bit 15 underneath us.
        let status = self
            .status()
            .with_monitor_debug_mode(false)
            .with_halting_debug_mode(true);
        self.regs
            .write(DebugRegister::StatusControl, status.raw_value());

        assert!(!self.is_enabled(), "debug unit failed to disable");
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockRegisterFile;

    #[test]
    fn enable_sets_monitor_and_clears_halting() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        assert!(!unit.is_enabled());
        unit.enable();
        assert!(unit.is_enabled());

        let status = StatusControl::new_with_raw_value(regs.get(DebugRegister::StatusControl));
        assert!(status.monitor_debug_mode());
        assert!(!status.halting_debug_mode());
    }

    #[test]
    fn enable_is_idempotent() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        unit.enable();
        let after_first = unit.regs.snapshot();
        let writes_after_first = unit.regs.writes.len();

        unit.enable();
        assert_eq!(unit.regs.snapshot(), after_first);
        // The second call must not even touch the hardware.
        assert_eq!(unit.regs.writes.len(), writes_after_first);
    }

    #[test]
    fn enable_preserves_unrelated_status_bits() {
        let mut regs = MockRegisterFile::new();
        regs.seed(DebugRegister::StatusControl, 1 << 2);
        let mut unit = DebugUnit::new(&mut regs);

        unit.enable();
        let raw = regs.get(DebugRegister::StatusControl);
        assert_eq!(raw & (1 << 2), 1 << 2);
    }

    #[test]
    fn disable_round_trip() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        unit.enable();
        unit.disable();
        assert!(!unit.is_enabled());

        // Disabling while already disabled changes nothing.
        let snapshot = unit.regs.snapshot();
        unit.disable();
        assert_eq!(unit.regs.snapshot(), snapshot);
    }

    #[test]
    fn debug_id_reports_pair_counts() {
        let mut regs = MockRegisterFile::new();
        // Two watchpoint pairs, six breakpoint pairs, ARMv6 debug.
        regs.seed(DebugRegister::DebugId, 0x1511_0000);
        let mut unit = DebugUnit::new(&mut regs);

        let id = unit.debug_id();
        assert_eq!(id.watchpoint_pairs().value(), 1);
        assert_eq!(id.breakpoint_pairs().value(), 5);
        assert_eq!(id.version(), Ok(crate::regs::DebugVersion::V6));
    }
}
