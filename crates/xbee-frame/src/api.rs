//! API frame identifiers.
//!
//! The byte after the length field selects the frame type. Outbound command
//! frames use ids below `0x80`, inbound responses use ids at or above it.

/// Start delimiter that opens every API frame.
pub const START_DELIMITER: u8 = 0x7E;

/// Default frame id. Any non-zero id asks the module for a response.
pub const DEFAULT_FRAME_ID: u8 = 0x01;

/// Remote command option: apply changes immediately.
pub const APPLY_CHANGES: u8 = 0x02;

/// Frame types known to the codec.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiId {
    /// AT command for the directly attached module.
    LocalAtCommand,
    /// AT command whose parameter is queued until `AC` or another command applies it.
    QueuedAtCommand,
    /// Transmit request (64-bit or 16-bit addressing).
    TxRequest,
    /// Explicit addressing transmit request.
    TxExplicit,
    /// AT command for a module reached over the air.
    RemoteAtCommand,
    /// Response to a local AT command.
    LocalAtResponse,
    /// Response to a remote AT command.
    RemoteAtResponse,
}

impl ApiId {
    /// Map a raw api id byte to a known frame type.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0x08 => Some(Self::LocalAtCommand),
            0x09 => Some(Self::QueuedAtCommand),
            0x10 => Some(Self::TxRequest),
            0x11 => Some(Self::TxExplicit),
            0x17 => Some(Self::RemoteAtCommand),
            0x88 => Some(Self::LocalAtResponse),
            0x97 => Some(Self::RemoteAtResponse),
            _ => None,
        }
    }

    /// The wire value of this api id.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::LocalAtCommand => 0x08,
            Self::QueuedAtCommand => 0x09,
            Self::TxRequest => 0x10,
            Self::TxExplicit => 0x11,
            Self::RemoteAtCommand => 0x17,
            Self::LocalAtResponse => 0x88,
            Self::RemoteAtResponse => 0x97,
        }
    }

    /// Human-readable frame type name.
    pub fn name(self) -> &'static str {
        match self {
            Self::LocalAtCommand => "LOCAL_AT",
            Self::QueuedAtCommand => "QUEUED_AT",
            Self::TxRequest => "TX",
            Self::TxExplicit => "TX_EXPLICIT",
            Self::RemoteAtCommand => "REMOTE_AT",
            Self::LocalAtResponse => "LOCAL_AT_RESPONSE",
            Self::RemoteAtResponse => "REMOTE_AT_RESPONSE",
        }
    }

    /// Returns true for frames sent by the module rather than to it.
    pub fn is_response(self) -> bool {
        self.as_u8() >= 0x80
    }
}

/// Returns a human-readable name for a raw api id byte.
pub fn api_name(id: u8) -> &'static str {
    ApiId::from_u8(id).map_or("UNKNOWN", ApiId::name)
}
