//! Serial console printing.
//!
//! There is no hosted stdout on this board; program output is whatever byte
//! sink the running program installs, normally one of the UART drivers. The
//! [`print!`]/[`println!`] macros format into the installed sink one byte at
//! a time and silently drop output while no sink is installed, so early
//! code can log unconditionally.

use core::{
    fmt::{self, Write},
    ptr,
    sync::atomic::{AtomicPtr, Ordering},
};

/// A blocking byte sink: transmit one byte, returning once it is accepted.
pub type Putc = fn(u8);

static OUTPUT: AtomicPtr<()> = AtomicPtr::new(ptr::null_mut());

/// Install `putc` as the console sink used by [`print!`] and [`println!`].
///
/// Replaces any previously installed sink.
pub fn set_output(putc: Putc) {
    OUTPUT.store(putc as *mut (), Ordering::Relaxed);
}

/// The currently installed console sink, if any.
#[must_use]
pub fn output() -> Option<Putc> {
    let raw = OUTPUT.load(Ordering::Relaxed);
    if raw.is_null() {
        None
    } else {
        // A non-null value in OUTPUT is always a `Putc` stored by set_output.
        Some(unsafe { core::mem::transmute::<*mut (), Putc>(raw) })
    }
}

struct Console {
    putc: Putc,
}

impl Write for Console {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for byte in s.bytes() {
            // Serial terminals expect CRLF line endings.
            if byte == b'\n' {
                (self.putc)(b'\r');
            }
            (self.putc)(byte);
        }
        Ok(())
    }
}

#[doc(hidden)]
pub fn _print(args: fmt::Arguments<'_>) {
    if let Some(putc) = output() {
        // Formatting into a Putc sink cannot fail.
        let _ = Console { putc }.write_fmt(args);
    }
}

/// Print to the installed console sink.
#[macro_export]
macro_rules! print {
    ($($arg:tt)*) => {
        $crate::stdio::_print(format_args!($($arg)*))
    };
}

/// Print to the installed console sink, with a trailing newline.
#[macro_export]
macro_rules! println {
    () => ($crate::print!("\n"));
    ($($arg:tt)*) => ($crate::print!("{}\n", format_args!($($arg)*)));
}

#[cfg(test)]
mod test {
    extern crate std;

    use std::{sync::Mutex, vec::Vec};

    use super::*;

    static CAPTURED: Mutex<Vec<u8>> = Mutex::new(Vec::new());

    fn capture(byte: u8) {
        CAPTURED.lock().unwrap().push(byte);
    }

    #[test]
    fn newlines_become_crlf() {
        set_output(capture);
        crate::println!("uart {}", 0);
        assert_eq!(CAPTURED.lock().unwrap().as_slice(), b"uart 0\r\n");
    }
}
