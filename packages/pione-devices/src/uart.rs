//! The mini UART.
//!
//! # Hardware Description
//!
//! The BCM2835's auxiliary block carries a 16550-ish "mini UART" that shares
//! its enable register with two SPI controllers. It reaches the outside
//! world through GPIO 14 (TX) and 15 (RX) on alternate function 5, runs off
//! the 250 MHz core clock, and buffers eight bytes in each direction. This
//! driver brings it up at 8n1 115200 with interrupts masked and does all IO
//! by polling the line-status register.
//!
//! Bring-up order matters twice over: the pins must be handed to the UART
//! before the UART is enabled (or it drives a glitch onto the TX line), and
//! every move between the GPIO block and the aux block needs a device
//! barrier.

use pione_core::mmio::{self, dev_barrier};

use crate::gpio::{Function, Pin};

const AUX_ENABLES: u32 = 0x2021_5004;
const AUX_MU_IO: u32 = 0x2021_5040;
const AUX_MU_IER: u32 = 0x2021_5044;
const AUX_MU_IIR: u32 = 0x2021_5048;
const AUX_MU_LCR: u32 = 0x2021_504C;
const AUX_MU_LSR: u32 = 0x2021_5054;
const AUX_MU_CNTL: u32 = 0x2021_5060;
const AUX_MU_BAUD: u32 = 0x2021_5068;

const ENABLES_MINI_UART: u32 = 1 << 0;
const CNTL_RX_ENABLE: u32 = 1 << 0;
const CNTL_TX_ENABLE: u32 = 1 << 1;
const IIR_CLEAR_FIFOS: u32 = 0b110;
const LCR_8BIT: u32 = 0b11;
const LSR_DATA_READY: u32 = 1 << 0;
const LSR_TX_HAS_SPACE: u32 = 1 << 5;
const LSR_TX_IDLE: u32 = 1 << 6;

/// The mini UART, configured for 8n1 at 115200 baud.
#[derive(Debug)]
pub struct MiniUart {
    _private: (),
}

impl MiniUart {
    /// GPIO pin carrying TX.
    pub const TX_PIN: u8 = 14;
    /// GPIO pin carrying RX.
    pub const RX_PIN: u8 = 15;
    /// The configured baud rate.
    pub const BAUD_RATE: u32 = 115_200;
    /// Divisor producing [`BAUD_RATE`](Self::BAUD_RATE) from the 250 MHz
    /// core clock: `250e6 / (8 * 115200) - 1`.
    const BAUD_DIVISOR: u32 = 270;

    /// Bring the mini UART up.
    ///
    /// The transmitter and receiver are disabled while the FIFOs are
    /// flushed, interrupts masked, and the frame format and baud divisor
    /// programmed, then re-enabled together.
    #[must_use]
    pub fn open() -> Self {
        // Hand the pins to the UART first.
        Pin::new(Self::TX_PIN).unwrap().set_function(Function::Alt5);
        Pin::new(Self::RX_PIN).unwrap().set_function(Function::Alt5);
        dev_barrier();

        unsafe {
            // The enable register is shared with the SPI controllers; only
            // flip the mini UART's bit.
            let enables = mmio::read32(AUX_ENABLES);
            mmio::write32(AUX_ENABLES, enables | ENABLES_MINI_UART);
            dev_barrier();

            let cntl = mmio::read32(AUX_MU_CNTL);
            mmio::write32(AUX_MU_CNTL, cntl & !(CNTL_RX_ENABLE | CNTL_TX_ENABLE));
            dev_barrier();

            mmio::write32(AUX_MU_IIR, IIR_CLEAR_FIFOS);
            dev_barrier();

            let ier = mmio::read32(AUX_MU_IER);
            mmio::write32(AUX_MU_IER, ier & !0b11);
            dev_barrier();

            mmio::write32(AUX_MU_LCR, LCR_8BIT);
            dev_barrier();

            mmio::write32(AUX_MU_BAUD, Self::BAUD_DIVISOR);
            dev_barrier();

            let cntl = mmio::read32(AUX_MU_CNTL);
            mmio::write32(AUX_MU_CNTL, cntl | CNTL_RX_ENABLE | CNTL_TX_ENABLE);
            dev_barrier();
        }

        Self { _private: () }
    }

    fn line_status() -> u32 {
        unsafe { mmio::read32(AUX_MU_LSR) }
    }

    /// Whether the TX FIFO can accept at least one byte.
    #[must_use]
    pub fn can_write(&self) -> bool {
        Self::line_status() & LSR_TX_HAS_SPACE != 0
    }

    /// Whether the RX FIFO holds at least one byte.
    #[must_use]
    pub fn has_data(&self) -> bool {
        Self::line_status() & LSR_DATA_READY != 0
    }

    /// Whether the TX FIFO is empty and the transmitter idle.
    #[must_use]
    pub fn tx_idle(&self) -> bool {
        Self::line_status() & LSR_TX_IDLE != 0
    }

    /// Queue one byte for transmission, waiting for FIFO space if needed.
    pub fn write_byte(&mut self, byte: u8) {
        while !self.can_write() {}
        unsafe {
            mmio::write32(AUX_MU_IO, u32::from(byte));
        }
    }

    /// Read one byte, waiting until one arrives.
    #[must_use]
    pub fn read_byte(&mut self) -> u8 {
        while !self.has_data() {}
        (unsafe { mmio::read32(AUX_MU_IO) } & 0xFF) as u8
    }

    /// Read one byte if the RX FIFO already holds one.
    pub fn try_read_byte(&mut self) -> Option<u8> {
        if self.has_data() {
            Some(self.read_byte())
        } else {
            None
        }
    }

    /// Wait until every queued byte has left the wire.
    ///
    /// Call before rebooting or disabling the UART; otherwise the tail of
    /// the output is truncated mid-frame.
    pub fn flush(&mut self) {
        while !self.tx_idle() {}
    }

    /// Flush, then hand the UART's enable bit back.
    pub fn disable(mut self) {
        self.flush();
        unsafe {
            let enables = mmio::read32(AUX_ENABLES);
            mmio::write32(AUX_ENABLES, enables & !ENABLES_MINI_UART);
        }
        dev_barrier();
    }

    /// Route `print!`/`println!` output through this UART.
    pub fn set_as_console(&self) {
        pione_core::stdio::set_output(console_putc);
    }
}

/// Blocking transmit of one byte, for the console sink.
fn console_putc(byte: u8) {
    while MiniUart::line_status() & LSR_TX_HAS_SPACE == 0 {}
    unsafe {
        mmio::write32(AUX_MU_IO, u32::from(byte));
    }
}
