//! Frame codec for XBee modules in API mode.
//!
//! Every frame on the wire has the same envelope:
//! - a `0x7E` start delimiter
//! - a 2-byte big-endian length covering the api id through the command data
//! - the api id, frame id and command data
//! - a 1-byte checksum over the same span
//!
//! [`FrameBuilder`] produces command frames; [`split_frames`] and
//! [`parse_response`] turn captured bytes back into typed responses. Nothing
//! here performs I/O.

pub mod api;
pub mod builder;
pub mod codec;
pub mod error;
pub mod frame;
pub mod kind;
pub mod response;
pub mod splitter;
pub mod stream;

pub use api::{api_name, ApiId, APPLY_CHANGES, DEFAULT_FRAME_ID, START_DELIMITER};
pub use builder::{
    encode_local_at, encode_remote_at, Command, FrameBuilder, FrameOptions, LocalAtCommand,
    RemoteAtCommand, ADDRESS16_LEN, ADDRESS64_LEN, UNKNOWN_ADDRESS64,
};
pub use codec::{bytes_to_hex, checksum, encode_frame, hex_to_bytes, length_field, MAX_PAYLOAD};
pub use error::{DecodeError, FrameError, Result};
pub use frame::{ApiFrame, AtCommand, Frame};
pub use kind::{parse_frame, FrameKind};
pub use response::{parse_response, LocalAtResponse, RemoteAtResponse, Response, Status};
pub use splitter::{decode_stream, split_frames, SplitFrames};
pub use stream::{StreamDecoder, MAX_FRAME_LEN};
