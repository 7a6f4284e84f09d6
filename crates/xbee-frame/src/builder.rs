//! Outbound command frames.

use bytes::{BufMut, Bytes, BytesMut};
use tracing::debug;

use crate::api::{ApiId, APPLY_CHANGES, DEFAULT_FRAME_ID, START_DELIMITER};
use crate::codec::encode_frame;
use crate::error::{DecodeError, FrameError, Result};
use crate::frame::{ApiFrame, AtCommand, Frame};

/// Width of a 16-bit network address.
pub const ADDRESS16_LEN: usize = 2;

/// Width of a 64-bit serial address.
pub const ADDRESS64_LEN: usize = 8;

/// Width of the remote command options field.
pub const OPTIONS_LEN: usize = 1;

/// 64-bit address used when a remote command does not name one.
pub const UNKNOWN_ADDRESS64: [u8; ADDRESS64_LEN] = [0; ADDRESS64_LEN];

/// Api id, frame id and command name of a local AT command.
const LOCAL_HEADER_LEN: usize = 4;

/// Header of a remote AT command before the command name:
/// api id, frame id, 64-bit address, 16-bit address, options.
const REMOTE_HEADER_LEN: usize = 2 + ADDRESS64_LEN + ADDRESS16_LEN + OPTIONS_LEN;

/// Per-builder framing options.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameOptions {
    /// Delimiter written at the start of every frame. Default: `0x7E`.
    pub start_byte: u8,
    /// Frame id used to correlate commands with responses. Default: `0x01`.
    pub frame_id: u8,
}

impl Default for FrameOptions {
    fn default() -> Self {
        Self {
            start_byte: START_DELIMITER,
            frame_id: DEFAULT_FRAME_ID,
        }
    }
}

/// An AT command for the directly attached module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalAtCommand {
    frame: Frame,
    command: AtCommand,
}

impl LocalAtCommand {
    pub fn command(&self) -> AtCommand {
        self.command
    }

    /// Parameter value; empty for a query.
    pub fn value(&self) -> &[u8] {
        &self.frame.data()[2..]
    }

    pub(crate) fn from_frame(frame: Frame) -> std::result::Result<Self, DecodeError> {
        if frame.payload().len() < LOCAL_HEADER_LEN {
            return Err(frame.too_short(LOCAL_HEADER_LEN));
        }
        let data = frame.data();
        let command = AtCommand::from_bytes([data[0], data[1]]);
        Ok(Self { frame, command })
    }
}

impl ApiFrame for LocalAtCommand {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// An AT command for a module reached over the air.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteAtCommand {
    frame: Frame,
    command: AtCommand,
}

impl RemoteAtCommand {
    pub fn command(&self) -> AtCommand {
        self.command
    }

    pub fn address64(&self) -> [u8; ADDRESS64_LEN] {
        let mut out = [0u8; ADDRESS64_LEN];
        out.copy_from_slice(&self.frame.payload()[2..2 + ADDRESS64_LEN]);
        out
    }

    pub fn address16(&self) -> [u8; ADDRESS16_LEN] {
        let start = 2 + ADDRESS64_LEN;
        [self.frame.payload()[start], self.frame.payload()[start + 1]]
    }

    pub fn options(&self) -> u8 {
        self.frame.payload()[REMOTE_HEADER_LEN - 1]
    }

    /// Parameter value; empty for a query.
    pub fn value(&self) -> &[u8] {
        &self.frame.payload()[REMOTE_HEADER_LEN + 2..]
    }

    pub(crate) fn from_frame(frame: Frame) -> std::result::Result<Self, DecodeError> {
        if frame.payload().len() < REMOTE_HEADER_LEN + 2 {
            return Err(frame.too_short(REMOTE_HEADER_LEN + 2));
        }
        let payload = frame.payload();
        let command =
            AtCommand::from_bytes([payload[REMOTE_HEADER_LEN], payload[REMOTE_HEADER_LEN + 1]]);
        Ok(Self { frame, command })
    }
}

impl ApiFrame for RemoteAtCommand {
    fn frame(&self) -> &Frame {
        &self.frame
    }
}

/// An outbound command frame of any supported kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    LocalAt(LocalAtCommand),
    RemoteAt(RemoteAtCommand),
}

impl Command {
    pub fn command(&self) -> AtCommand {
        match self {
            Self::LocalAt(cmd) => cmd.command(),
            Self::RemoteAt(cmd) => cmd.command(),
        }
    }
}

impl ApiFrame for Command {
    fn frame(&self) -> &Frame {
        match self {
            Self::LocalAt(cmd) => cmd.frame(),
            Self::RemoteAt(cmd) => cmd.frame(),
        }
    }
}

impl From<LocalAtCommand> for Command {
    fn from(cmd: LocalAtCommand) -> Self {
        Self::LocalAt(cmd)
    }
}

impl From<RemoteAtCommand> for Command {
    fn from(cmd: RemoteAtCommand) -> Self {
        Self::RemoteAt(cmd)
    }
}

/// Assembles transmit-ready command frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameBuilder {
    options: FrameOptions,
}

impl FrameBuilder {
    /// Create a builder with the default start byte and frame id.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with explicit options.
    pub fn with_options(options: FrameOptions) -> Self {
        Self { options }
    }

    /// Use `frame_id` for frames built from now on.
    pub fn frame_id(mut self, frame_id: u8) -> Self {
        self.options.frame_id = frame_id;
        self
    }

    pub fn options(&self) -> &FrameOptions {
        &self.options
    }

    /// Build a local AT command. An empty `value` queries the parameter.
    pub fn local_at(&self, command: &str, value: &[u8]) -> Result<LocalAtCommand> {
        let command = AtCommand::new(command)?;

        let mut payload = BytesMut::with_capacity(LOCAL_HEADER_LEN + value.len());
        payload.put_u8(ApiId::LocalAtCommand.as_u8());
        payload.put_u8(self.options.frame_id);
        payload.put_slice(command.as_bytes());
        payload.put_slice(value);

        let frame = self.finish(&payload)?;
        debug!(
            %command,
            frame_id = self.options.frame_id,
            len = frame.as_bytes().len(),
            "built local AT command"
        );
        Ok(LocalAtCommand { frame, command })
    }

    /// Build a remote AT command with an unknown 64-bit address and
    /// [`APPLY_CHANGES`] options.
    pub fn remote_at(
        &self,
        address16: &[u8],
        command: &str,
        value: &[u8],
    ) -> Result<RemoteAtCommand> {
        self.remote_at_with(address16, command, value, &UNKNOWN_ADDRESS64, &[APPLY_CHANGES])
    }

    /// Build a remote AT command with explicit addressing and options.
    pub fn remote_at_with(
        &self,
        address16: &[u8],
        command: &str,
        value: &[u8],
        address64: &[u8],
        options: &[u8],
    ) -> Result<RemoteAtCommand> {
        check_width("address16", address16, ADDRESS16_LEN)?;
        check_width("address64", address64, ADDRESS64_LEN)?;
        check_width("options", options, OPTIONS_LEN)?;
        let command = AtCommand::new(command)?;

        let mut payload = BytesMut::with_capacity(REMOTE_HEADER_LEN + 2 + value.len());
        payload.put_u8(ApiId::RemoteAtCommand.as_u8());
        payload.put_u8(self.options.frame_id);
        payload.put_slice(address64);
        payload.put_slice(address16);
        payload.put_slice(options);
        payload.put_slice(command.as_bytes());
        payload.put_slice(value);

        let frame = self.finish(&payload)?;
        debug!(
            %command,
            frame_id = self.options.frame_id,
            address16 = %crate::codec::bytes_to_hex(address16),
            "built remote AT command"
        );
        Ok(RemoteAtCommand { frame, command })
    }

    /// Queued AT parameter frames have no encoder.
    pub fn queued_at(&self) -> Result<Frame> {
        Err(FrameError::NotImplemented(ApiId::QueuedAtCommand))
    }

    /// Transmit request frames have no encoder.
    pub fn tx_request(&self) -> Result<Frame> {
        Err(FrameError::NotImplemented(ApiId::TxRequest))
    }

    /// Explicit addressing transmit frames have no encoder.
    pub fn tx_explicit(&self) -> Result<Frame> {
        Err(FrameError::NotImplemented(ApiId::TxExplicit))
    }

    fn finish(&self, payload: &[u8]) -> Result<Frame> {
        let mut wire = BytesMut::new();
        encode_frame(self.options.start_byte, payload, &mut wire)?;
        Ok(Frame::from_wire(wire.freeze()))
    }
}

fn check_width(field: &'static str, value: &[u8], expected: usize) -> Result<()> {
    if value.len() != expected {
        return Err(FrameError::InvalidFieldWidth {
            field,
            expected,
            actual: value.len(),
        });
    }
    Ok(())
}

/// Encode a local AT command with default options.
pub fn encode_local_at(command: &str, value: &[u8]) -> Result<Bytes> {
    Ok(FrameBuilder::new().local_at(command, value)?.frame.into_bytes())
}

/// Encode a remote AT command with default options.
///
/// `address64` defaults to [`UNKNOWN_ADDRESS64`] and `options` to
/// [`APPLY_CHANGES`].
pub fn encode_remote_at(
    address16: &[u8],
    command: &str,
    value: &[u8],
    address64: Option<&[u8]>,
    options: Option<&[u8]>,
) -> Result<Bytes> {
    let frame = FrameBuilder::new().remote_at_with(
        address16,
        command,
        value,
        address64.unwrap_or(&UNKNOWN_ADDRESS64),
        options.unwrap_or(&[APPLY_CHANGES]),
    )?;
    Ok(frame.frame.into_bytes())
}
