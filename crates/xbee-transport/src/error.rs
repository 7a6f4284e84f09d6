use std::path::PathBuf;

/// Errors that can occur while moving bytes to or from a module.
#[derive(Debug, thiserror::Error)]
pub enum TransportError {
    /// Failed to open the device.
    #[error("failed to open {path}: {source}")]
    Open {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The device opened but its line settings could not be applied.
    #[error("failed to configure {path}: {source}")]
    Configure {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A baud rate the driver cannot apply.
    #[error("unsupported baud rate: {0}")]
    UnsupportedBaudRate(u32),

    /// A configuration value outside the accepted range.
    #[error("invalid transport configuration: {0}")]
    InvalidConfig(String),

    /// An I/O error occurred on the underlying stream.
    #[error("transport I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The peer closed the stream.
    #[error("transport closed")]
    Closed,
}

pub type Result<T> = std::result::Result<T, TransportError>;
