//! Control of breakpoint pair 0 and watchpoint pair 0.
//!
//! Enable and disable are read-modify-writes that touch only the enable bit,
//! so a client that has configured the rest of a control word keeps its
//! configuration across a disable/enable cycle. Arming for mismatch commits
//! the control word before the target address: the comparison mode and the
//! address are two registers, and programming them in the other order opens
//! a window where a stale comparison mode pairs with the new address.

use crate::regs::{BreakpointControl, DebugRegister, RegisterFile, WatchpointControl};
use crate::unit::DebugUnit;

impl<R: RegisterFile> DebugUnit<R> {
    fn breakpoint_control(&mut self) -> BreakpointControl {
        BreakpointControl::new_with_raw_value(self.regs.read(DebugRegister::BreakpointControl))
    }

    fn watchpoint_control(&mut self) -> WatchpointControl {
        WatchpointControl::new_with_raw_value(self.regs.read(DebugRegister::WatchpointControl))
    }

    /// Whether breakpoint pair 0 is enabled.
    pub fn breakpoint_is_enabled(&mut self) -> bool {
        self.breakpoint_control().enabled()
    }

    /// Set the enable bit of BCR0, leaving the rest of the control word as
    /// it is.
    pub fn breakpoint_enable(&mut self) {
        let ctrl = self.breakpoint_control().with_enabled(true);
        self.regs
            .write(DebugRegister::BreakpointControl, ctrl.raw_value());
    }

    /// Clear the enable bit of BCR0, leaving the rest of the control word as
    /// it is.
    pub fn breakpoint_disable(&mut self) {
        let ctrl = self.breakpoint_control().with_enabled(false);
        self.regs
            .write(DebugRegister::BreakpointControl, ctrl.raw_value());
    }

    /// Current BVR0 contents: the instruction address pair 0 compares
    /// against.
    pub fn breakpoint_value(&mut self) -> u32 {
        self.regs.read(DebugRegister::BreakpointValue)
    }

    /// Arm breakpoint pair 0 to fire on every instruction whose PC differs
    /// from `pc`.
    ///
    /// `pc` should be 4-byte aligned; the pair compares whole instruction
    /// words.
    ///
    /// # Panics
    ///
    /// If BVR0 does not read back as `pc` after the write, which would mean
    /// the debug unit is not accepting programming.
    pub fn arm_mismatch_breakpoint(&mut self, pc: u32) {
        self.regs.write(
            DebugRegister::BreakpointControl,
            BreakpointControl::mismatch_armed().raw_value(),
        );
        self.regs.write(DebugRegister::BreakpointValue, pc);

        assert_eq!(
            self.breakpoint_value(),
            pc,
            "BVR0 did not take the armed address"
        );
    }

    /// Whether watchpoint pair 0 is enabled.
    pub fn watchpoint_is_enabled(&mut self) -> bool {
        self.watchpoint_control().enabled()
    }

    /// Set the enable bit of WCR0, leaving the rest of the control word as
    /// it is.
    pub fn watchpoint_enable(&mut self) {
        let ctrl = self.watchpoint_control().with_enabled(true);
        self.regs
            .write(DebugRegister::WatchpointControl, ctrl.raw_value());
    }

    /// Clear the enable bit of WCR0, leaving the rest of the control word as
    /// it is.
    pub fn watchpoint_disable(&mut self) {
        let ctrl = self.watchpoint_control().with_enabled(false);
        self.regs
            .write(DebugRegister::WatchpointControl, ctrl.raw_value());
    }
}

#[cfg(test)]
mod test {
    use arbitrary_int::u4;

    use crate::mock::MockRegisterFile;
    use crate::regs::{BreakpointControl, BreakpointType, DebugRegister, PrivilegeFilter};
    use crate::unit::DebugUnit;

    #[test]
    fn breakpoint_enable_round_trip() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        assert!(!unit.breakpoint_is_enabled());
        unit.breakpoint_enable();
        assert!(unit.breakpoint_is_enabled());
        unit.breakpoint_disable();
        assert!(!unit.breakpoint_is_enabled());
    }

    #[test]
    fn watchpoint_enable_round_trip() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        assert!(!unit.watchpoint_is_enabled());
        unit.watchpoint_enable();
        assert!(unit.watchpoint_is_enabled());
        unit.watchpoint_disable();
        assert!(!unit.watchpoint_is_enabled());
    }

    #[test]
    fn enable_touches_only_the_enable_bit() {
        let mut regs = MockRegisterFile::new();
        regs.seed(
            DebugRegister::WatchpointControl,
            0b1111 << 5, // byte-address-select already configured
        );
        let mut unit = DebugUnit::new(&mut regs);

        unit.watchpoint_enable();
        assert_eq!(
            unit.regs.get(DebugRegister::WatchpointControl),
            (0b1111 << 5) | 1
        );
        unit.watchpoint_disable();
        assert_eq!(unit.regs.get(DebugRegister::WatchpointControl), 0b1111 << 5);
    }

    #[test]
    fn arm_mismatch_programs_value_and_control() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        unit.arm_mismatch_breakpoint(0x8000);
        assert_eq!(unit.breakpoint_value(), 0x8000);

        let ctrl =
            BreakpointControl::new_with_raw_value(regs.get(DebugRegister::BreakpointControl));
        assert!(ctrl.enabled());
        assert_eq!(ctrl.breakpoint_type(), BreakpointType::AddressMismatch);
        assert_eq!(ctrl.byte_address_select(), u4::new(0b1111));
        assert_eq!(ctrl.privilege(), Ok(PrivilegeFilter::Any));
    }

    #[test]
    fn arm_mismatch_commits_control_before_value() {
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);

        unit.arm_mismatch_breakpoint(0x1000);
        let writes: &[(DebugRegister, u32)] = &unit.regs.writes;
        assert_eq!(
            writes,
            &[
                (
                    DebugRegister::BreakpointControl,
                    BreakpointControl::mismatch_armed().raw_value(),
                ),
                (DebugRegister::BreakpointValue, 0x1000),
            ]
        );
    }

    #[test]
    fn armed_control_word_matches_the_architectural_pattern() {
        // mismatch | all four byte lanes | user and privileged | enabled
        assert_eq!(BreakpointControl::mismatch_armed().raw_value(), 0x004001E7);
    }
}
