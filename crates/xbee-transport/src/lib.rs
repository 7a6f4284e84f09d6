//! Byte transports for XBee modules.
//!
//! The frame codec is pure; this crate is where bytes actually move. The
//! [`Transport`] trait is the seam: a generic adapter covers any
//! `Read + Write` stream, and [`SerialPort`] opens and configures a serial
//! device.

pub mod error;
pub mod serial;
pub mod stream;
pub mod traits;

pub use error::{Result, TransportError};
pub use serial::{
    DataBits, FlowControl, Parity, SerialConfig, SerialPort, StopBits, DEFAULT_BAUD_RATE,
    DEFAULT_TIMEOUT,
};
pub use stream::StreamTransport;
pub use traits::Transport;
