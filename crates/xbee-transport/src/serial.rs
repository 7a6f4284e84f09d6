//! Serial device transport.
//!
//! The device is opened through [`serialport`] in raw mode. Every read and
//! write waits at most [`SerialConfig::timeout`], and a read that times out
//! with nothing pending comes back empty.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use bytes::Bytes;
use serialport::ClearBuffer;
use tracing::debug;

use crate::error::{Result, TransportError};
use crate::stream::StreamTransport;
use crate::traits::Transport;

/// Line speed the modules ship with.
pub const DEFAULT_BAUD_RATE: u32 = 9600;

/// Pause after opening, before the first write.
pub const DEFAULT_SETTLE: Duration = Duration::from_millis(100);

/// Longest a single read or write waits on the line.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(10);

/// Line settings for a serial device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerialConfig {
    /// Baud rate. Default: 9600.
    pub baud_rate: u32,
    /// Default: eight.
    pub data_bits: DataBits,
    /// Default: none.
    pub parity: Parity,
    /// Default: one.
    pub stop_bits: StopBits,
    /// Default: none.
    pub flow_control: FlowControl,
    /// Per-call I/O timeout. Default: 10 ms.
    pub timeout: Duration,
    /// Time to wait after the line is configured. Default: 100 ms.
    pub settle: Duration,
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::Eight,
            parity: Parity::None,
            stop_bits: StopBits::One,
            flow_control: FlowControl::None,
            timeout: DEFAULT_TIMEOUT,
            settle: DEFAULT_SETTLE,
        }
    }
}

impl SerialConfig {
    /// Default line settings at `baud_rate`.
    pub fn with_baud_rate(baud_rate: u32) -> Self {
        Self {
            baud_rate,
            ..Self::default()
        }
    }

    /// Check the settings before touching the device.
    pub fn validate(&self) -> Result<()> {
        if self.baud_rate == 0 {
            return Err(TransportError::UnsupportedBaudRate(self.baud_rate));
        }
        Ok(())
    }
}

/// Number of data bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataBits {
    Five,
    Six,
    Seven,
    Eight,
}

impl TryFrom<u8> for DataBits {
    type Error = TransportError;

    fn try_from(bits: u8) -> Result<Self> {
        match bits {
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            7 => Ok(Self::Seven),
            8 => Ok(Self::Eight),
            other => Err(TransportError::InvalidConfig(format!(
                "data bits must be 5-8, got {other}"
            ))),
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(bits: DataBits) -> Self {
        match bits {
            DataBits::Five => Self::Five,
            DataBits::Six => Self::Six,
            DataBits::Seven => Self::Seven,
            DataBits::Eight => Self::Eight,
        }
    }
}

/// Parity checking mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Parity {
    None,
    Odd,
    Even,
}

impl From<Parity> for serialport::Parity {
    fn from(parity: Parity) -> Self {
        match parity {
            Parity::None => Self::None,
            Parity::Odd => Self::Odd,
            Parity::Even => Self::Even,
        }
    }
}

/// Number of stop bits per character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopBits {
    One,
    Two,
}

impl From<StopBits> for serialport::StopBits {
    fn from(bits: StopBits) -> Self {
        match bits {
            StopBits::One => Self::One,
            StopBits::Two => Self::Two,
        }
    }
}

/// Flow control mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    None,
    /// RTS/CTS.
    Hardware,
    /// XON/XOFF.
    Software,
}

impl From<FlowControl> for serialport::FlowControl {
    fn from(flow: FlowControl) -> Self {
        match flow {
            FlowControl::None => Self::None,
            FlowControl::Hardware => Self::Hardware,
            FlowControl::Software => Self::Software,
        }
    }
}

/// An open, configured serial device.
///
/// The device is closed when the port is dropped.
pub struct SerialPort {
    inner: StreamTransport<Box<dyn serialport::SerialPort>>,
    path: PathBuf,
    baud_rate: u32,
}

impl SerialPort {
    /// Open `path` with the default 9600 8N1 settings.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::open_with_config(path, &SerialConfig::default())
    }

    /// Open `path` and apply `config`.
    pub fn open_with_config(path: impl AsRef<Path>, config: &SerialConfig) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        config.validate()?;

        let port = serialport::new(path.to_string_lossy(), config.baud_rate)
            .data_bits(config.data_bits.into())
            .parity(config.parity.into())
            .stop_bits(config.stop_bits.into())
            .flow_control(config.flow_control.into())
            .timeout(config.timeout)
            .open()
            .map_err(|e| TransportError::Open {
                path: path.clone(),
                source: e.into(),
            })?;

        // Drop anything the driver buffered before the line was configured.
        port.clear(ClearBuffer::Input)
            .map_err(|e| TransportError::Configure {
                path: path.clone(),
                source: e.into(),
            })?;

        debug!(
            ?path,
            baud = config.baud_rate,
            parity = ?config.parity,
            flow_control = ?config.flow_control,
            "opened serial device"
        );
        if !config.settle.is_zero() {
            std::thread::sleep(config.settle);
        }

        Ok(Self {
            inner: StreamTransport::new(port),
            path,
            baud_rate: config.baud_rate,
        })
    }

    /// The device path this port was opened from.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn baud_rate(&self) -> u32 {
        self.baud_rate
    }
}

impl fmt::Debug for SerialPort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerialPort")
            .field("path", &self.path)
            .field("baud_rate", &self.baud_rate)
            .finish_non_exhaustive()
    }
}

impl Transport for SerialPort {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write(bytes)
    }

    fn read_available(&mut self) -> Result<Bytes> {
        self.inner.read_available()
    }
}
