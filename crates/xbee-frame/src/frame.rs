use std::fmt;
use std::str::FromStr;

use bytes::{BufMut, Bytes, BytesMut};

use crate::api::START_DELIMITER;
use crate::codec::{checksum, FRAMING_OVERHEAD};
use crate::error::{DecodeError, FrameError, Result};

/// Smallest candidate the parser looks at: length (2) + one payload byte + checksum (1).
pub const MIN_CANDIDATE_LEN: usize = 4;

/// Smallest payload that carries both an api id and a frame id.
pub const MIN_PAYLOAD_LEN: usize = 2;

/// A complete API frame as it appears on the wire.
///
/// The length and checksum are always derived from the payload, either by the
/// builder or by validation in [`Frame::decode`]. Instances are immutable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    raw: Bytes,
}

impl Frame {
    /// Wrap bytes that are already known to be a well-formed frame.
    pub(crate) fn from_wire(raw: Bytes) -> Self {
        debug_assert!(raw.len() >= FRAMING_OVERHEAD + MIN_PAYLOAD_LEN);
        Self { raw }
    }

    /// Validate one candidate span (the bytes after a start delimiter).
    ///
    /// Checks the declared length and checksum against the payload between
    /// them. On success the returned frame carries the full wire bytes,
    /// delimiter included.
    pub fn decode(candidate: &[u8]) -> std::result::Result<Self, DecodeError> {
        if candidate.len() < MIN_CANDIDATE_LEN {
            return Err(DecodeError::FrameTooShort {
                actual: candidate.len(),
                required: MIN_CANDIDATE_LEN,
            });
        }

        let declared_len = u16::from_be_bytes([candidate[0], candidate[1]]);
        let declared_sum = candidate[candidate.len() - 1];
        let payload = &candidate[2..candidate.len() - 1];

        if usize::from(declared_len) != payload.len() {
            return Err(DecodeError::LengthMismatch {
                declared: declared_len,
                actual: payload.len(),
            });
        }

        let computed = checksum(payload);
        if computed != declared_sum {
            return Err(DecodeError::ChecksumMismatch {
                declared: declared_sum,
                computed,
            });
        }

        if payload.len() < MIN_PAYLOAD_LEN {
            return Err(DecodeError::FrameTooShort {
                actual: candidate.len(),
                required: MIN_CANDIDATE_LEN + MIN_PAYLOAD_LEN - 1,
            });
        }

        let mut raw = BytesMut::with_capacity(candidate.len() + 1);
        raw.put_u8(START_DELIMITER);
        raw.put_slice(candidate);
        Ok(Self { raw: raw.freeze() })
    }

    /// The start delimiter this frame was written with.
    pub fn start_byte(&self) -> u8 {
        self.raw[0]
    }

    /// The declared length (api id through end of command data).
    pub fn length(&self) -> u16 {
        u16::from_be_bytes([self.raw[1], self.raw[2]])
    }

    /// The api id byte.
    pub fn api_id(&self) -> u8 {
        self.raw[3]
    }

    /// The frame id byte.
    pub fn frame_id(&self) -> u8 {
        self.raw[4]
    }

    /// Bytes covered by the length and checksum, starting with the api id.
    pub fn payload(&self) -> &[u8] {
        &self.raw[3..self.raw.len() - 1]
    }

    /// Command data after the api id and frame id.
    pub fn data(&self) -> &[u8] {
        &self.payload()[MIN_PAYLOAD_LEN..]
    }

    /// The trailing checksum byte.
    pub fn checksum(&self) -> u8 {
        self.raw[self.raw.len() - 1]
    }

    /// The complete wire frame.
    pub fn as_bytes(&self) -> &[u8] {
        &self.raw
    }

    /// The complete wire frame as a shared buffer.
    pub fn bytes(&self) -> &Bytes {
        &self.raw
    }

    /// Consume the frame and return its wire bytes.
    pub fn into_bytes(self) -> Bytes {
        self.raw
    }

    /// Error for a frame whose payload is shorter than `needed` bytes.
    pub(crate) fn too_short(&self, needed: usize) -> DecodeError {
        let candidate = self.raw.len() - 1;
        DecodeError::FrameTooShort {
            actual: candidate,
            required: candidate - self.payload().len() + needed,
        }
    }

    /// Lower-case hex rendering of the wire frame.
    pub fn to_hex(&self) -> String {
        crate::codec::bytes_to_hex(&self.raw)
    }
}

/// Accessors shared by every command and response type.
pub trait ApiFrame {
    /// The underlying wire frame.
    fn frame(&self) -> &Frame;

    fn api_id(&self) -> u8 {
        self.frame().api_id()
    }

    fn frame_id(&self) -> u8 {
        self.frame().frame_id()
    }

    /// Full wire bytes, delimiter through checksum.
    fn raw(&self) -> &[u8] {
        self.frame().as_bytes()
    }

    /// Bytes between the length field and the checksum.
    fn command_payload(&self) -> &[u8] {
        self.frame().payload()
    }
}

impl ApiFrame for Frame {
    fn frame(&self) -> &Frame {
        self
    }
}

/// A two-character AT command name such as `ND` or `D0`.
///
/// Names are carried on the wire as their two ASCII bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AtCommand([u8; 2]);

impl AtCommand {
    /// Validate a command name.
    pub fn new(name: &str) -> Result<Self> {
        match name.as_bytes() {
            &[a, b] if a.is_ascii() && b.is_ascii() => Ok(Self([a, b])),
            _ => Err(FrameError::InvalidCommandName(name.to_string())),
        }
    }

    /// Wrap the two command bytes of a decoded frame.
    pub fn from_bytes(bytes: [u8; 2]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 2] {
        &self.0
    }
}

impl FromStr for AtCommand {
    type Err = FrameError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl fmt::Display for AtCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &b in &self.0 {
            if b.is_ascii_graphic() {
                write!(f, "{}", char::from(b))?;
            } else {
                write!(f, "\\x{b:02x}")?;
            }
        }
        Ok(())
    }
}
