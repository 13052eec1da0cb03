//! Bit-banged software UART.
//!
//! # Hardware Description
//!
//! Any two GPIO pins can carry 8n1 serial if the CPU drives the frame
//! timing itself. The classic use is as a debugging aid while the hardware
//! UART is the thing being brought up: the software UART borrows two spare
//! pins and gives `print!` somewhere to go.
//!
//! Frames are paced off the cycle counter rather than the microsecond
//! timer — at 115200 baud a bit lasts ~6076 cycles but only ~8.7 µs, and
//! accumulated rounding from a 1 MHz clock is audible as framing errors at
//! higher rates. Every edge is scheduled at an absolute multiple of the bit
//! time from the frame's start, so per-bit error does not accumulate.

use pione_core::time::{self, CPU_HZ};

use crate::gpio::{Input, Output, Pin, PinError};

/// A software UART on a caller-chosen pin pair.
#[derive(Debug)]
pub struct SwUart {
    tx: Output,
    rx: Input,
    cycles_per_bit: u32,
}

/// Busy-wait until `cycles` have elapsed since `start`.
fn spin_until(start: u32, cycles: u32) {
    while time::cycle_count().wrapping_sub(start) < cycles {}
}

impl SwUart {
    /// The baud rate the stock console runs at.
    pub const DEFAULT_BAUD: u32 = 115_200;

    /// Claim `tx`/`rx` and prepare them for `baud` serial.
    ///
    /// Leaves the TX line idle-high and enables the cycle counter the bit
    /// timing runs off.
    ///
    /// # Errors
    ///
    /// [`PinError::NotWired`] if either pin is not wired on this board.
    pub fn open(tx: u8, rx: u8, baud: u32) -> Result<Self, PinError> {
        let mut tx = Output::new(Pin::new(tx)?);
        let rx = Input::new(Pin::new(rx)?);

        tx.set_high();
        time::cycle_counter_enable();

        Ok(Self {
            tx,
            rx,
            cycles_per_bit: CPU_HZ / baud,
        })
    }

    /// Transmit one byte: start bit, eight data bits LSB first, stop bit.
    pub fn write_byte(&mut self, byte: u8) {
        let bit = self.cycles_per_bit;
        let start = time::cycle_count();

        // Start bit.
        self.tx.set_low();
        spin_until(start, bit);

        for i in 0..8u32 {
            if byte >> i & 1 == 1 {
                self.tx.set_high();
            } else {
                self.tx.set_low();
            }
            spin_until(start, bit * (i + 2));
        }

        // Stop bit, which also leaves the line idle-high.
        self.tx.set_high();
        spin_until(start, bit * 10);
    }

    /// Transmit every byte of `bytes`.
    pub fn write_all(&mut self, bytes: &[u8]) {
        for &byte in bytes {
            self.write_byte(byte);
        }
    }

    /// Receive one byte, giving up if no start bit arrives within
    /// `timeout_us` microseconds.
    ///
    /// Returns `None` on timeout and on a framing error (a stop bit that
    /// does not read high). Each data bit is sampled at its midpoint.
    pub fn read_byte_timeout(&mut self, timeout_us: u32) -> Option<u8> {
        let wait_start = time::ticks_us();
        while self.rx.is_high() {
            if time::ticks_us().wrapping_sub(wait_start) >= timeout_us {
                return None;
            }
        }

        let bit = self.cycles_per_bit;
        let start = time::cycle_count();
        let mut byte = 0u8;

        for i in 0..8u32 {
            // Start bit spans [0, 1) bit times; data bit i spans [1+i, 2+i).
            spin_until(start, bit * (2 * i + 3) / 2);
            if self.rx.is_high() {
                byte |= 1 << i;
            }
        }

        // Sample the middle of the stop bit.
        spin_until(start, bit * 19 / 2);
        if self.rx.is_low() {
            return None;
        }

        Some(byte)
    }
}
