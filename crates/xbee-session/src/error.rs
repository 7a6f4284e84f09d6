/// Errors that can occur in session operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Transport-level error.
    #[error("transport error: {0}")]
    Transport(#[from] xbee_transport::TransportError),

    /// A command frame could not be built.
    #[error("frame error: {0}")]
    Frame(#[from] xbee_frame::FrameError),
}

pub type Result<T> = std::result::Result<T, SessionError>;
