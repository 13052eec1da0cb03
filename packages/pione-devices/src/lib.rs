//! Peripheral drivers for BCM2835-based boards (Raspberry Pi 1 / Zero
//! class).
//!
//! # Overview
//!
//! This crate provides polled, allocation-free drivers for the peripherals
//! the rest of the `pione` stack needs:
//!
//! - GPIO function select and digital IO: [`gpio`]
//! - The mini UART on GPIO 14/15, the usual console transport: [`uart`]
//! - A bit-banged software UART for when the hardware UART's pins are
//!   otherwise occupied (or its driver is the thing being debugged):
//!   [`sw_uart`]
//!
//! All register traffic goes through `pione_core::mmio`, and every driver
//! honors the BCM2835 rule that switching between peripherals requires a
//! device barrier.

#![no_std]

pub mod gpio;
pub mod sw_uart;
pub mod uart;
