//! Single-instruction stepping built from a mismatch breakpoint.
//!
//! The ARM1176 has no architectural single-step. What it does have is the
//! *mismatch* comparison mode: a breakpoint that fires on every instruction
//! whose PC differs from the stored address. Arm a mismatch on the
//! instruction being resumed and the very next instruction executed anywhere
//! else traps; the fault handler re-arms on the new PC and resumes, and the
//! program advances one instruction per debug exception.

use crate::{regs::RegisterFile, unit::DebugUnit};

/// Controller for mismatch single-stepping.
///
/// Two states: inactive (initial) and armed. At most one session may be
/// armed at a time — there is one breakpoint pair, and a second session
/// would silently clobber the first's target. The address being mismatched
/// lives in BVR0 itself; the controller adds only the session flag.
///
/// Misuse (starting twice, stepping without a session) panics: this is a
/// bring-up tool for trusted callers, and a protocol violation means a bug
/// to fix, not a condition to recover from.
#[derive(Debug)]
pub struct MismatchStepper<R: RegisterFile> {
    unit: DebugUnit<R>,
    active: bool,
}

impl<R: RegisterFile> MismatchStepper<R> {
    /// Wrap a debug unit in a stepping controller. No hardware is touched
    /// until [`start`](Self::start).
    pub const fn new(unit: DebugUnit<R>) -> Self {
        Self {
            unit,
            active: false,
        }
    }

    /// Whether a stepping session is armed.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.active
    }

    /// The underlying debug unit, for fault classification and any debug
    /// state the stepper itself does not manage.
    pub fn unit(&mut self) -> &mut DebugUnit<R> {
        &mut self.unit
    }

    /// Arm a stepping session.
    ///
    /// Enables the debug unit (a no-op when the client already did) and arms
    /// the mismatch at address 0, so the first instruction executed after
    /// returning to the stepped code — wherever it is — traps immediately.
    ///
    /// Address 0 works as the bootstrap target only because the stepped
    /// program never legitimately executes there; clients keep that true by
    /// relocating the vector table away from 0 (the `vectors` module).
    ///
    /// # Panics
    ///
    /// If a session is already armed.
    pub fn start(&mut self) {
        assert!(!self.active, "single-step session already armed");
        self.active = true;

        self.unit.enable();
        self.set_mismatch(0);
    }

    /// Re-arm the mismatch on `pc`, normally the address the fault handler
    /// is about to resume to.
    ///
    /// The previous target is in BVR0; callers that want it read
    /// [`current_target`](Self::current_target) before re-arming.
    ///
    /// # Panics
    ///
    /// If no session is armed, or if the breakpoint registers do not take
    /// the programming.
    pub fn set_mismatch(&mut self, pc: u32) {
        assert!(self.active, "no single-step session armed");
        self.unit.arm_mismatch_breakpoint(pc);
    }

    /// The address the session is currently mismatching on.
    pub fn current_target(&mut self) -> u32 {
        self.unit.breakpoint_value()
    }

    /// Disarm the session.
    ///
    /// Clears only the breakpoint enable bit. The debug unit's own enable —
    /// and anything else a client configured — is deliberately left alone so
    /// other users of the debug unit are unaffected.
    ///
    /// # Panics
    ///
    /// If no session is armed.
    pub fn stop(&mut self) {
        assert!(self.active, "no single-step session armed");
        self.active = false;

        self.unit.breakpoint_disable();
    }

    /// Whether the pending fault was raised by the breakpoint. Valid in any
    /// state; delegates to the fault classifier.
    pub fn is_breakpoint_fault(&mut self) -> bool {
        self.unit.is_breakpoint_fault()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::mock::MockRegisterFile;
    use crate::regs::{BreakpointControl, DebugRegister};

    fn stepper() -> MismatchStepper<MockRegisterFile> {
        MismatchStepper::new(DebugUnit::new(MockRegisterFile::new()))
    }

    #[test]
    fn start_arms_the_bootstrap_mismatch_at_zero() {
        let mut stepper = stepper();
        stepper.start();

        assert!(stepper.is_active());
        assert!(stepper.unit().is_enabled());
        assert!(stepper.unit().breakpoint_is_enabled());
        assert_eq!(stepper.current_target(), 0);
    }

    #[test]
    fn set_mismatch_reprograms_the_target() {
        let mut stepper = stepper();
        stepper.start();

        stepper.set_mismatch(0x1000);
        assert_eq!(stepper.current_target(), 0x1000);

        // Aligned addresses must read back exactly.
        for pc in [0x4u32, 0x8000, 0x0FFF_FFFC] {
            stepper.set_mismatch(pc);
            assert_eq!(stepper.current_target(), pc);
        }
    }

    #[test]
    fn stop_clears_only_the_breakpoint_enable() {
        let mut stepper = stepper();
        stepper.start();
        stepper.set_mismatch(0x1000);
        stepper.stop();

        assert!(!stepper.is_active());
        assert!(!stepper.unit().breakpoint_is_enabled());

        // The rest of the armed control word survives the disable.
        let ctrl = stepper.unit().regs.get(DebugRegister::BreakpointControl);
        assert_eq!(ctrl, BreakpointControl::mismatch_armed().raw_value() & !1);
    }

    #[test]
    fn stop_leaves_the_unit_enable_alone() {
        // A client that enabled the debug unit before stepping keeps it
        // enabled after the session ends.
        let mut regs = MockRegisterFile::new();
        let mut unit = DebugUnit::new(&mut regs);
        unit.enable();
        let status_before = unit.regs.get(DebugRegister::StatusControl);

        let mut stepper = MismatchStepper::new(unit);
        stepper.start();
        stepper.stop();

        assert_eq!(
            stepper.unit().regs.get(DebugRegister::StatusControl),
            status_before
        );
        assert!(stepper.unit().is_enabled());
    }

    #[test]
    #[should_panic(expected = "already armed")]
    fn starting_twice_is_fatal() {
        let mut stepper = stepper();
        stepper.start();
        stepper.start();
    }

    #[test]
    #[should_panic(expected = "no single-step session armed")]
    fn set_mismatch_without_a_session_is_fatal() {
        let mut stepper = stepper();
        stepper.set_mismatch(0x1000);
    }

    #[test]
    #[should_panic(expected = "no single-step session armed")]
    fn stop_without_a_session_is_fatal() {
        let mut stepper = stepper();
        stepper.stop();
    }

    #[test]
    fn restart_after_stop_is_allowed() {
        let mut stepper = stepper();
        stepper.start();
        stepper.stop();
        stepper.start();
        assert!(stepper.is_active());
    }

    #[test]
    fn fault_query_delegates_to_the_classifier() {
        let mut regs = MockRegisterFile::new();
        regs.seed(DebugRegister::InstructionFaultStatus, 0b0010);
        regs.seed(DebugRegister::StatusControl, 0b0001 << 2);

        let mut stepper = MismatchStepper::new(DebugUnit::new(regs));
        assert!(stepper.is_breakpoint_fault());
    }
}
