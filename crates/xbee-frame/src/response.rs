//! Inbound response frames.
//!
//! Field positions follow the byte layout the module puts on the wire, counted
//! from the api id:
//!
//! ```text
//! Local AT response (0x88):
//!   0 api id | 1 frame id | 2..4 command | 4 status | 5.. data
//!   ND reply data: 5..7 addr16 | 7..15 addr64 | 15 signal | 16.. node id, NUL
//!
//! Remote AT response (0x97):
//!   0 api id | 1 frame id | 2..10 addr64 | 10..12 addr16 | 12..14 command
//!   | 14 status | 15.. data (first byte read as signal strength)
//! ```

use std::fmt;

use crate::api::ApiId;
use crate::builder::{ADDRESS16_LEN, ADDRESS64_LEN};
use crate::error::DecodeError;
use crate::frame::{ApiFrame, AtCommand, Frame};

const LOCAL_STATUS: usize = 4;
const LOCAL_DATA: usize = LOCAL_STATUS + 1;
const LOCAL_ADDRESS16: usize = LOCAL_DATA;
const LOCAL_ADDRESS64: usize = LOCAL_ADDRESS16 + ADDRESS16_LEN;
const LOCAL_SIGNAL: usize = LOCAL_ADDRESS64 + ADDRESS64_LEN;
const LOCAL_NODE_ID: usize = LOCAL_SIGNAL + 1;

const NODE_DISCOVER: &[u8; 2] = b"ND";

const REMOTE_ADDRESS64: usize = 2;
const REMOTE_ADDRESS16: usize = REMOTE_ADDRESS64 + ADDRESS64_LEN;
const REMOTE_COMMAND: usize = REMOTE_ADDRESS16 + ADDRESS16_LEN;
const REMOTE_STATUS: usize = REMOTE_COMMAND + 2;
const REMOTE_DATA: usize = REMOTE_STATUS + 1;

/// Command status reported by the module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Error,
    InvalidCommand,
    InvalidParameter,
    NoResponse,
    /// A status byte outside the documented set. Not a decode failure.
    Unrecognized(u8),
}

impl Status {
    pub fn from_u8(value: u8) -> Self {
        match value {
            0x00 => Self::Ok,
            0x01 => Self::Error,
            0x02 => Self::InvalidCommand,
            0x03 => Self::InvalidParameter,
            0x04 => Self::NoResponse,
            other => Self::Unrecognized(other),
        }
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::Ok => 0x00,
            Self::Error => 0x01,
            Self::InvalidCommand => 0x02,
            Self::InvalidParameter => 0x03,
            Self::NoResponse => 0x04,
            Self::Unrecognized(other) => other,
        }
    }

    pub fn is_ok(self) -> bool {
        self == Self::Ok
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Error => f.write_str("Error"),
            Self::InvalidCommand => f.write_str("Invalid Command"),
            Self::InvalidParameter => f.write_str("Invalid Parameter"),
            Self::NoResponse => f.write_str("No Response"),
            Self::Unrecognized(other) => write!(f, "Unrecognized (0x{other:02x})"),
        }
    }
}

/// Response to a local AT command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAtResponse {
    frame: Frame,
    command: AtCommand,
    status: Status,
}

impl LocalAtResponse {
    fn from_frame(frame: Frame) -> Result<Self, DecodeError> {
        let payload = frame.payload();
        if payload.len() < LOCAL_DATA {
            return Err(frame.too_short(LOCAL_DATA));
        }
        let command = AtCommand::from_bytes([payload[2], payload[3]]);
        let status = Status::from_u8(payload[LOCAL_STATUS]);
        Ok(Self {
            frame,
            command,
            status,
        })
    }

    pub fn command(&self) -> AtCommand {
        self.command
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// Command data after the status byte.
    pub fn data(&self) -> &[u8] {
        &self.frame.payload()[LOCAL_DATA..]
    }

    /// Whether this answers a node discovery (`ND`) command. Only those
    /// replies carry the node fields below.
    pub fn is_node_discovery(&self) -> bool {
        self.command.as_bytes() == NODE_DISCOVER
    }

    /// 16-bit address of a discovered node.
    pub fn address16(&self) -> Option<[u8; ADDRESS16_LEN]> {
        field(self.discovery_payload()?, LOCAL_ADDRESS16)
    }

    /// 64-bit address of a discovered node.
    pub fn address64(&self) -> Option<[u8; ADDRESS64_LEN]> {
        field(self.discovery_payload()?, LOCAL_ADDRESS64)
    }

    /// Received signal strength of a discovered node, in -dBm.
    pub fn signal_strength(&self) -> Option<u8> {
        self.discovery_payload()?.get(LOCAL_SIGNAL).copied()
    }

    /// Node identifier (`NI`) of a discovered node, without its NUL terminator.
    pub fn node_id(&self) -> Option<String> {
        let raw = self.discovery_payload()?.get(LOCAL_NODE_ID..)?;
        let raw = raw.strip_suffix(&[0u8]).unwrap_or(raw);
        Some(String::from_utf8_lossy(raw).into_owned())
    }

    fn discovery_payload(&self) -> Option<&[u8]> {
        self.is_node_discovery().then(|| self.frame.payload())
    }
}

impl ApiFrame for LocalAtResponse {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// Response to a remote AT command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtResponse {
    frame: Frame,
    command: AtCommand,
    status: Status,
}

impl RemoteAtResponse {
    fn from_frame(frame: Frame) -> Result<Self, DecodeError> {
        let payload = frame.payload();
        if payload.len() < REMOTE_DATA {
            return Err(frame.too_short(REMOTE_DATA));
        }
        let command = AtCommand::from_bytes([payload[REMOTE_COMMAND], payload[REMOTE_COMMAND + 1]]);
        let status = Status::from_u8(payload[REMOTE_STATUS]);
        Ok(Self {
            frame,
            command,
            status,
        })
    }

    pub fn command(&self) -> AtCommand {
        self.command
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// 64-bit address of the responding module.
    pub fn address64(&self) -> [u8; ADDRESS64_LEN] {
        field(self.frame.payload(), REMOTE_ADDRESS64).unwrap_or_default()
    }

    /// 16-bit address of the responding module.
    pub fn address16(&self) -> [u8; ADDRESS16_LEN] {
        field(self.frame.payload(), REMOTE_ADDRESS16).unwrap_or_default()
    }

    /// Command data after the status byte.
    pub fn data(&self) -> &[u8] {
        &self.frame.payload()[REMOTE_DATA..]
    }

    /// First data byte, which carries signal strength for `DB` queries.
    pub fn signal_strength(&self) -> Option<u8> {
        self.data().first().copied()
    }
}

impl ApiFrame for RemoteAtResponse {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// A decoded response frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    LocalAt(LocalAtResponse),
    RemoteAt(RemoteAtResponse),
}

impl Response {
    /// Decode a validated frame into a typed response.
    pub fn from_frame(frame: Frame) -> Result<Self, DecodeError> {
        match ApiId::from_u8(frame.api_id()) {
            Some(ApiId::LocalAtResponse) => LocalAtResponse::from_frame(frame).map(Self::LocalAt),
            Some(ApiId::RemoteAtResponse) => {
                RemoteAtResponse::from_frame(frame).map(Self::RemoteAt)
            }
            _ => Err(DecodeError::UnknownApiId(frame.api_id())),
        }
    }

    pub fn command(&self) -> AtCommand {
        match self {
            Self::LocalAt(r) => r.command(),
            Self::RemoteAt(r) => r.command(),
        }
    }

    pub fn status(&self) -> Status {
        match self {
            Self::LocalAt(r) => r.status(),
            Self::RemoteAt(r) => r.status(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status().is_ok()
    }

    pub fn data(&self) -> &[u8] {
        match self {
            Self::LocalAt(r) => r.data(),
            Self::RemoteAt(r) => r.data(),
        }
    }

    pub fn address16(&self) -> Option<[u8; ADDRESS16_LEN]> {
        match self {
            Self::LocalAt(r) => r.address16(),
            Self::RemoteAt(r) => Some(r.address16()),
        }
    }

    pub fn address64(&self) -> Option<[u8; ADDRESS64_LEN]> {
        match self {
            Self::LocalAt(r) => r.address64(),
            Self::RemoteAt(r) => Some(r.address64()),
        }
    }

    pub fn signal_strength(&self) -> Option<u8> {
        match self {
            Self::LocalAt(r) => r.signal_strength(),
            Self::RemoteAt(r) => r.signal_strength(),
        }
    }

    /// Node identifier; only local node discovery responses carry one.
    pub fn node_id(&self) -> Option<String> {
        match self {
            Self::LocalAt(r) => r.node_id(),
            Self::RemoteAt(_) => None,
        }
    }
}

impl ApiFrame for Response {
    fn frame(&self) -> &Frame {
        match self {
            Self::LocalAt(r) => r.frame(),
            Self::RemoteAt(r) => r.frame(),
        }
    }
}

/// Validate and decode one candidate span into a response.
pub fn parse_response(candidate: &[u8]) -> Result<Response, DecodeError> {
    Response::from_frame(Frame::decode(candidate)?)
}

fn field<const N: usize>(payload: &[u8], start: usize) -> Option<[u8; N]> {
    payload.get(start..start + N)?.try_into().ok()
}
