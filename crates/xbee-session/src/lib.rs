//! Command/response sessions with an XBee module.
//!
//! A [`Session`] writes built frames to a [`Transport`](xbee_transport::Transport),
//! waits out a short reply window, and hands back one parse result per
//! candidate frame received.

pub mod error;
pub mod session;

pub use error::{Result, SessionError};
pub use session::{
    Reply, Session, SessionConfig, DEFAULT_POLL_INTERVAL, DEFAULT_REPLY_WAIT,
};
