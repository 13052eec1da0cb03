//! Hardware breakpoint, watchpoint, and single-step support for the
//! ARM1176's debug unit.
//!
//! # Overview
//!
//! The BCM2835's ARM1176 core carries one invasive debug facility a program
//! can drive from the inside: the CP14 debug unit. In monitor debug mode,
//! breakpoint and watchpoint hits arrive as ordinary prefetch/data aborts,
//! which means a bare-metal program can be its own debugger — including
//! single-stepping itself, which the hardware does not support natively but
//! which falls out of the unit's *mismatch* breakpoints
//! (see [`MismatchStepper`]).
//!
//! [`DebugUnit`] is the process-wide handle everything hangs off. On
//! hardware it wraps `regs::Coprocessor`, the raw `mrc`/`mcr` register
//! file; all the logic above that boundary is portable and is tested
//! off-target against a simulated register file.
//!
//! ```ignore
//! use pi1_debugger::{DebugUnit, MismatchStepper, regs::Coprocessor};
//!
//! let mut stepper = MismatchStepper::new(DebugUnit::new(Coprocessor));
//! stepper.start();
//! // ...in the prefetch-abort handler:
//! if stepper.is_breakpoint_fault() {
//!     stepper.set_mismatch(resume_pc);
//! }
//! ```
//!
//! State-changing operations verify themselves by read-back and panic on
//! divergence, and protocol misuse panics as well: on a single-author
//! bare-metal target those are bugs to fix, not conditions to handle.

#![no_std]

#[cfg(test)]
extern crate std;

mod breakpoint;
mod fault;
#[cfg(test)]
mod mock;
pub mod regs;
mod stepping;
mod unit;
#[cfg(target_arch = "arm")]
pub mod vectors;

pub use stepping::MismatchStepper;
pub use unit::DebugUnit;
