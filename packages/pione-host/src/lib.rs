//! Host-side helpers for working with a board over a USB serial adapter.
//!
//! Everything on-target in the `pione` workspace talks to the outside world
//! through a UART; on the host side of that wire sit these utilities:
//! finding which `/dev` node the USB serial adapter came up as ([`tty`]),
//! and loading boot payloads in the word-padded form the wire protocol
//! wants ([`file`]).

pub mod file;
pub mod tty;
