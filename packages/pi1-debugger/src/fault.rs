//! Classification of debug exceptions.
//!
//! By the time these queries run, the hardware has already delivered a
//! prefetch or data abort to the client's exception handler; the job here is
//! deciding what caused it. Two registers must agree before a fault is
//! attributed to the debug unit — the relevant fault-status register says
//! "debug event" and DSCR's method-of-entry names the event kind. Any
//! disagreement or ambiguity classifies as "not this kind of fault" and the
//! caller checks the other kinds; classification never errors.
//!
//! Every query reads the hardware fresh. The fault registers are rewritten
//! on each exception, so caching any of this would return answers about a
//! previous fault.

use crate::regs::{
    DataFaultStatus, DebugEventReason, DebugRegister, FAULT_STATUS_DEBUG_EVENT,
    InstructionFaultStatus, RegisterFile,
};
use crate::unit::DebugUnit;

/// WFAR reports the watchpointed instruction's address plus the pipeline
/// depth at the time the access was issued.
const WFAR_PIPELINE_OFFSET: u32 = 8;

impl<R: RegisterFile> DebugUnit<R> {
    fn data_fault_status(&mut self) -> DataFaultStatus {
        DataFaultStatus::new_with_raw_value(self.regs.read(DebugRegister::DataFaultStatus))
    }

    /// Whether the pending prefetch abort was raised by an instruction
    /// breakpoint.
    pub fn is_breakpoint_fault(&mut self) -> bool {
        let ifsr = InstructionFaultStatus::new_with_raw_value(
            self.regs.read(DebugRegister::InstructionFaultStatus),
        );

        ifsr.status() == FAULT_STATUS_DEBUG_EVENT
            && self.status().method_of_entry() == Ok(DebugEventReason::Breakpoint)
    }

    /// Whether the pending data abort was raised by a watchpoint.
    ///
    /// When DFSR's status-extension bit is set the status code cannot be
    /// trusted, and this conservatively answers `false`.
    pub fn is_watchpoint_fault(&mut self) -> bool {
        let dfsr = self.data_fault_status();
        if dfsr.status_extension() {
            return false;
        }

        dfsr.status() == FAULT_STATUS_DEBUG_EVENT
            && self.status().method_of_entry() == Ok(DebugEventReason::Watchpoint)
    }

    /// Whether the watchpointed access was a load.
    ///
    /// Only meaningful while [`is_watchpoint_fault`](Self::is_watchpoint_fault)
    /// holds; exactly one of this and
    /// [`watchpoint_caused_by_store`](Self::watchpoint_caused_by_store) is
    /// true for any watchpoint fault.
    pub fn watchpoint_caused_by_load(&mut self) -> bool {
        !self.data_fault_status().caused_by_write()
    }

    /// Whether the watchpointed access was a store.
    pub fn watchpoint_caused_by_store(&mut self) -> bool {
        !self.watchpoint_caused_by_load()
    }

    /// Address of the instruction whose access tripped the watchpoint,
    /// recovered from WFAR by backing out the pipeline offset.
    pub fn watchpoint_fault_pc(&mut self) -> u32 {
        self.regs
            .read(DebugRegister::WatchpointFaultAddress)
            .wrapping_sub(WFAR_PIPELINE_OFFSET)
    }
}

#[cfg(test)]
mod test {
    use crate::mock::MockRegisterFile;
    use crate::regs::DebugRegister;
    use crate::unit::DebugUnit;

    const IFSR_DEBUG_EVENT: u32 = 0b0010;
    const DFSR_DEBUG_EVENT: u32 = 0b0010;
    const DSCR_ENTRY_BREAKPOINT: u32 = 0b0001 << 2;
    const DSCR_ENTRY_WATCHPOINT: u32 = 0b0010 << 2;

    fn unit_with(seeds: &[(DebugRegister, u32)]) -> DebugUnit<MockRegisterFile> {
        let mut regs = MockRegisterFile::new();
        for &(reg, value) in seeds {
            regs.seed(reg, value);
        }
        DebugUnit::new(regs)
    }

    #[test]
    fn breakpoint_fault_needs_both_registers_to_agree() {
        let mut unit = unit_with(&[
            (DebugRegister::InstructionFaultStatus, IFSR_DEBUG_EVENT),
            (DebugRegister::StatusControl, DSCR_ENTRY_BREAKPOINT),
        ]);
        assert!(unit.is_breakpoint_fault());
        assert!(!unit.is_watchpoint_fault());

        // IFSR says debug event but DSCR blames a watchpoint: not ours.
        let mut unit = unit_with(&[
            (DebugRegister::InstructionFaultStatus, IFSR_DEBUG_EVENT),
            (DebugRegister::StatusControl, DSCR_ENTRY_WATCHPOINT),
        ]);
        assert!(!unit.is_breakpoint_fault());

        // DSCR blames a breakpoint but IFSR reports a translation fault.
        let mut unit = unit_with(&[
            (DebugRegister::InstructionFaultStatus, 0b0101),
            (DebugRegister::StatusControl, DSCR_ENTRY_BREAKPOINT),
        ]);
        assert!(!unit.is_breakpoint_fault());
    }

    #[test]
    fn watchpoint_fault_classification() {
        let mut unit = unit_with(&[
            (DebugRegister::DataFaultStatus, DFSR_DEBUG_EVENT),
            (DebugRegister::StatusControl, DSCR_ENTRY_WATCHPOINT),
        ]);
        assert!(unit.is_watchpoint_fault());
        assert!(!unit.is_breakpoint_fault());
    }

    #[test]
    fn status_extension_bit_blocks_watchpoint_classification() {
        // Everything else says watchpoint, but DFSR[10] makes the status
        // code untrustworthy.
        let mut unit = unit_with(&[
            (DebugRegister::DataFaultStatus, DFSR_DEBUG_EVENT | (1 << 10)),
            (DebugRegister::StatusControl, DSCR_ENTRY_WATCHPOINT),
        ]);
        assert!(!unit.is_watchpoint_fault());
    }

    #[test]
    fn fault_kinds_are_mutually_exclusive() {
        // DSCR holds a single method-of-entry code, so no snapshot can
        // satisfy both classifiers at once.
        for entry in [DSCR_ENTRY_BREAKPOINT, DSCR_ENTRY_WATCHPOINT] {
            let mut unit = unit_with(&[
                (DebugRegister::InstructionFaultStatus, IFSR_DEBUG_EVENT),
                (DebugRegister::DataFaultStatus, DFSR_DEBUG_EVENT),
                (DebugRegister::StatusControl, entry),
            ]);
            let both = unit.is_breakpoint_fault() && unit.is_watchpoint_fault();
            assert!(!both);
        }
    }

    #[test]
    fn load_and_store_are_complements() {
        let mut unit = unit_with(&[(DebugRegister::DataFaultStatus, DFSR_DEBUG_EVENT)]);
        assert!(unit.watchpoint_caused_by_load());
        assert!(!unit.watchpoint_caused_by_store());

        let mut unit = unit_with(&[(
            DebugRegister::DataFaultStatus,
            DFSR_DEBUG_EVENT | (1 << 11),
        )]);
        assert!(!unit.watchpoint_caused_by_load());
        assert!(unit.watchpoint_caused_by_store());
    }

    #[test]
    fn watchpoint_fault_pc_backs_out_the_pipeline_offset() {
        let mut unit = unit_with(&[(DebugRegister::WatchpointFaultAddress, 0x2004)]);
        assert_eq!(unit.watchpoint_fault_pc(), 0x1FFC);
    }
}
