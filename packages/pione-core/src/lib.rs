//! Low level core functionality for the `pione` crates.
//!
//! Included in this crate:
//! - CPU barrier and pipeline-flush primitives: [`asm`]
//! - Raw memory-mapped register access: [`mmio`]
//! - Serial console printing: [`stdio`]
//! - System-timer and cycle-counter time sources: [`time`]
//!
//! Everything here is freestanding and allocation-free. The crate also
//! compiles for the host so that the driver and debugger logic built on top
//! of it can be unit tested off-target; on non-ARM builds the barrier and
//! counter primitives become no-ops.

#![no_std]

pub mod asm;
pub mod mmio;
pub mod stdio;
pub mod time;
