//! Finding the board's USB serial adapter.
//!
//! Plugging the adapter in creates a device node whose name depends on the
//! OS and the adapter's chipset; this module scans `/dev` for the known
//! prefixes. With several adapters plugged in at once the modification time
//! of the node tells them apart — the node appears when the adapter is
//! plugged in, so newest means most recently connected.

use std::{fs, path::PathBuf, time::SystemTime};

use snafu::{ResultExt, Snafu};

/// Device-name prefixes the known USB serial adapters show up under.
pub const TTY_PREFIXES: &[&str] = &[
    // Linux
    "ttyUSB",
    "ttyACM",
    // macOS
    "cu.SLAB_USB",
    "cu.usbserial",
];

const DEV_DIR: &str = "/dev";

/// Errors from adapter discovery.
#[derive(Debug, Snafu)]
pub enum TtyError {
    /// No candidate device node exists.
    #[snafu(display("no USB serial adapter found in {DEV_DIR}"))]
    NoAdapter,
    /// More than one candidate exists where exactly one was expected.
    #[snafu(display("{count} USB serial adapters found in {DEV_DIR}; expected exactly one"))]
    Ambiguous {
        /// How many candidates were found.
        count: usize,
    },
    /// The device directory could not be scanned.
    #[snafu(display("could not scan {DEV_DIR}: {source}"))]
    Scan {
        /// The underlying IO failure.
        source: std::io::Error,
    },
}

fn is_usb_serial(name: &str) -> bool {
    TTY_PREFIXES.iter().any(|prefix| name.starts_with(prefix))
}

/// Every candidate adapter node, oldest first.
fn scan() -> Result<Vec<(PathBuf, SystemTime)>, TtyError> {
    let mut found = Vec::new();

    for entry in fs::read_dir(DEV_DIR).context(ScanSnafu)? {
        let entry = entry.context(ScanSnafu)?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if !is_usb_serial(name) {
            continue;
        }

        let modified = entry
            .metadata()
            .and_then(|metadata| metadata.modified())
            .context(ScanSnafu)?;
        found.push((entry.path(), modified));
    }

    found.sort_by_key(|&(_, modified)| modified);
    Ok(found)
}

/// The path of the board's USB serial adapter.
///
/// # Errors
///
/// [`TtyError::NoAdapter`] with nothing plugged in, and
/// [`TtyError::Ambiguous`] with more than one candidate — with several
/// adapters connected, say which one you mean via
/// [`find_ttyusb_first`]/[`find_ttyusb_last`].
pub fn find_ttyusb() -> Result<PathBuf, TtyError> {
    let found = scan()?;
    match found.as_slice() {
        [] => Err(TtyError::NoAdapter),
        [(path, _)] => Ok(path.clone()),
        _ => AmbiguousSnafu { count: found.len() }.fail(),
    }
}

/// The adapter that has been connected the longest.
///
/// # Errors
///
/// [`TtyError::NoAdapter`] with nothing plugged in.
pub fn find_ttyusb_first() -> Result<PathBuf, TtyError> {
    let found = scan()?;
    found
        .first()
        .map(|(path, _)| path.clone())
        .ok_or(TtyError::NoAdapter)
}

/// The most recently connected adapter.
///
/// # Errors
///
/// [`TtyError::NoAdapter`] with nothing plugged in.
pub fn find_ttyusb_last() -> Result<PathBuf, TtyError> {
    let found = scan()?;
    found
        .last()
        .map(|(path, _)| path.clone())
        .ok_or(TtyError::NoAdapter)
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn recognizes_known_adapter_names() {
        assert!(is_usb_serial("ttyUSB0"));
        assert!(is_usb_serial("ttyACM3"));
        assert!(is_usb_serial("cu.SLAB_USBtoUART"));
        assert!(is_usb_serial("cu.usbserial-0001"));
    }

    #[test]
    fn ignores_other_device_nodes() {
        assert!(!is_usb_serial("tty0"));
        assert!(!is_usb_serial("ttyS0"));
        assert!(!is_usb_serial("null"));
        assert!(!is_usb_serial("cu.Bluetooth-Incoming-Port"));
    }
}
