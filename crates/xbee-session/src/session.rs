use std::time::{Duration, Instant};

use tracing::debug;
use xbee_frame::{ApiFrame, DecodeError, FrameBuilder, Response, StreamDecoder};
use xbee_transport::Transport;

use crate::error::Result;

/// How long to collect replies after sending a command.
pub const DEFAULT_REPLY_WAIT: Duration = Duration::from_millis(100);

/// Pause between reads while collecting replies.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Outcome of one candidate frame read from the module.
pub type Reply = std::result::Result<Response, DecodeError>;

/// Configuration for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time window for replies after a request. Default: 100 ms.
    pub reply_wait: Duration,
    /// Sleep between reads inside the reply window. Default: 10 ms.
    pub poll_interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            reply_wait: DEFAULT_REPLY_WAIT,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// A command/response exchange with one module.
///
/// The session owns its transport. Bytes that arrive split across reads are
/// reassembled before parsing.
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    decoder: StreamDecoder,
    builder: FrameBuilder,
    config: SessionConfig,
}

impl<T: Transport> Session<T> {
    /// Create a session with default configuration.
    pub fn new(transport: T) -> Self {
        Self::with_config(transport, SessionConfig::default())
    }

    /// Create a session with explicit configuration.
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        Self {
            transport,
            decoder: StreamDecoder::new(),
            builder: FrameBuilder::new(),
            config,
        }
    }

    /// Use `builder` for the [`at`](Self::at) and
    /// [`remote_at`](Self::remote_at) helpers.
    pub fn with_builder(mut self, builder: FrameBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn builder(&self) -> &FrameBuilder {
        &self.builder
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Write a built frame to the transport.
    pub fn send(&mut self, frame: &impl ApiFrame) -> Result<()> {
        self.transport.write(frame.raw())?;
        debug!(
            api_id = frame.api_id(),
            frame_id = frame.frame_id(),
            len = frame.raw().len(),
            "sent frame"
        );
        Ok(())
    }

    /// Read whatever is pending and parse every complete frame.
    ///
    /// A frame still arriving is kept for the next call.
    pub fn receive(&mut self) -> Result<Vec<Reply>> {
        let bytes = self.transport.read_available()?;
        if !bytes.is_empty() {
            self.decoder.push(&bytes);
        }
        let replies = self.decoder.decode();
        for reply in replies.iter().flatten() {
            debug!(
                api_id = reply.api_id(),
                frame_id = reply.frame_id(),
                command = %reply.command(),
                status = %reply.status(),
                "received response"
            );
        }
        Ok(replies)
    }

    /// Send `frame` and collect every reply that arrives within the reply
    /// window.
    ///
    /// An empty result means the module did not answer in time.
    pub fn request(&mut self, frame: &impl ApiFrame) -> Result<Vec<Reply>> {
        self.send(frame)?;
        self.collect(self.config.reply_wait)
    }

    /// Send a local AT command built with the session's builder.
    pub fn at(&mut self, command: &str, value: &[u8]) -> Result<Vec<Reply>> {
        let frame = self.builder.local_at(command, value)?;
        self.request(&frame)
    }

    /// Send a remote AT command built with the session's builder.
    pub fn remote_at(
        &mut self,
        address16: &[u8],
        command: &str,
        value: &[u8],
    ) -> Result<Vec<Reply>> {
        let frame = self.builder.remote_at(address16, command, value)?;
        self.request(&frame)
    }

    /// Poll the transport for `window`, collecting every reply.
    pub fn collect(&mut self, window: Duration) -> Result<Vec<Reply>> {
        let deadline = Instant::now() + window;
        let mut replies = Vec::new();
        loop {
            replies.extend(self.receive()?);
            let now = Instant::now();
            if now >= deadline {
                return Ok(replies);
            }
            std::thread::sleep(self.config.poll_interval.min(deadline - now));
        }
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &T {
        &self.transport
    }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Consume the session and return the transport.
    ///
    /// Any partially received frame is dropped.
    pub fn into_inner(self) -> T {
        self.transport
    }
}
