//! XBee API-mode frames, transports and sessions.
//!
//! # Crate Structure
//!
//! - [`frame`]: frame codec (builders, stream splitting, response parsing)
//! - [`transport`]: byte transports (serial devices, generic streams)
//! - [`session`]: command/response exchange (behind the `session` feature)
//!
//! ```
//! use xbee::frame::{decode_stream, encode_local_at};
//!
//! let wire = encode_local_at("ND", &[]).unwrap();
//! assert_eq!(wire.as_ref(), &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]);
//!
//! // A command frame is not a response, so parsing it as one fails.
//! assert!(decode_stream(&wire).all(|r| r.is_err()));
//! ```

/// Re-export frame types.
pub mod frame {
    pub use xbee_frame::*;
}

/// Re-export transport types.
pub mod transport {
    pub use xbee_transport::*;
}

/// Re-export session types (requires `session` feature).
#[cfg(feature = "session")]
pub mod session {
    pub use xbee_session::*;
}

pub use xbee_frame::{decode_stream, encode_local_at, encode_remote_at};
