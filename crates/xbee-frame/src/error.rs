use crate::api::ApiId;

/// Errors raised while building an outbound frame.
///
/// Every variant is a caller error. Nothing is retried and no partial frame
/// is returned.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FrameError {
    /// A hex string had an odd length or a non-hex character.
    #[error("malformed hex string: {0}")]
    MalformedHex(#[from] hex::FromHexError),

    /// The frame payload does not fit the 16-bit length field.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },

    /// AT command names are exactly two ASCII characters.
    #[error("invalid AT command name {0:?} (expected two ASCII characters)")]
    InvalidCommandName(String),

    /// A fixed-width field was given the wrong number of bytes.
    #[error("invalid {field} width ({actual} bytes, expected {expected})")]
    InvalidFieldWidth {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// The frame type is recognised but has no encoder.
    #[error("{} frames (api id 0x{:02x}) are not implemented", .0.name(), .0.as_u8())]
    NotImplemented(ApiId),
}

/// Errors raised while validating or decoding one candidate frame.
///
/// Decode errors are scoped to a single candidate. A stream decoder reports
/// the error and moves on to the next candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// The candidate is shorter than the smallest frame of its kind.
    #[error("frame too short ({actual} bytes, need at least {required})")]
    FrameTooShort { actual: usize, required: usize },

    /// The declared length does not match the payload between the length
    /// field and the checksum.
    #[error("length mismatch (declared {declared}, actual {actual})")]
    LengthMismatch { declared: u16, actual: usize },

    /// The trailing checksum byte does not match the payload.
    #[error("checksum mismatch (declared 0x{declared:02x}, computed 0x{computed:02x})")]
    ChecksumMismatch { declared: u8, computed: u8 },

    /// The frame's API identifier is not one this parser decodes.
    #[error("unknown or unsupported api id 0x{0:02x}")]
    UnknownApiId(u8),
}

pub type Result<T> = std::result::Result<T, FrameError>;
