use bytes::{Buf, Bytes, BytesMut};
use tracing::{trace, warn};

use crate::codec::{FRAMING_OVERHEAD, MAX_PAYLOAD};
use crate::error::DecodeError;
use crate::response::{parse_response, Response};
use crate::splitter::find_delimiter;

const INITIAL_BUFFER_CAPACITY: usize = 1024;

/// Length field (2) + checksum (1): the candidate bytes around the payload.
const CANDIDATE_OVERHEAD: usize = FRAMING_OVERHEAD - 1;

/// Largest frame the length field can describe, delimiter included.
pub const MAX_FRAME_LEN: usize = FRAMING_OVERHEAD + MAX_PAYLOAD;

/// Incremental splitter for bytes that arrive across several reads.
///
/// Candidates are cut on the start delimiter exactly as [`split_frames`]
/// does. The last candidate in the buffer is held back while it is shorter
/// than its own declared length, so a frame split across two reads is
/// decoded once, whole.
///
/// [`split_frames`]: crate::splitter::split_frames
#[derive(Debug)]
pub struct StreamDecoder {
    buf: BytesMut,
    max_buffered: usize,
}

impl Default for StreamDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl StreamDecoder {
    pub fn new() -> Self {
        Self::with_max_buffered(MAX_FRAME_LEN)
    }

    /// Create a decoder that discards a held partial frame once it grows
    /// beyond `max_buffered` bytes.
    pub fn with_max_buffered(max_buffered: usize) -> Self {
        Self {
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            max_buffered,
        }
    }

    /// Append bytes received from the transport.
    pub fn push(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Bytes currently held.
    pub fn buffered(&self) -> usize {
        self.buf.len()
    }

    /// Drop everything held.
    pub fn clear(&mut self) {
        self.buf.clear();
    }

    /// Take the next complete candidate, without its delimiter.
    pub fn next_candidate(&mut self) -> Option<Bytes> {
        self.skip_noise();
        if self.buf.is_empty() {
            return None;
        }

        if let Some(end) = find_delimiter(&self.buf[1..]) {
            return Some(self.take(end + 1));
        }

        let tail = &self.buf[1..];
        if tail.len() >= 2 {
            let declared = usize::from(u16::from_be_bytes([tail[0], tail[1]]));
            if tail.len() >= declared + CANDIDATE_OVERHEAD {
                return Some(self.take(self.buf.len()));
            }
        }

        if self.buf.len() > self.max_buffered {
            warn!(
                buffered = self.buf.len(),
                max = self.max_buffered,
                "discarding oversized partial frame"
            );
            self.buf.clear();
        }
        None
    }

    /// Parse every complete candidate held so far.
    pub fn decode(&mut self) -> Vec<Result<Response, DecodeError>> {
        let mut out = Vec::new();
        while let Some(candidate) = self.next_candidate() {
            out.push(parse_logged(&candidate));
        }
        out
    }

    /// Parse everything held, including a trailing partial frame.
    ///
    /// Leaves the decoder empty.
    pub fn finish(&mut self) -> Vec<Result<Response, DecodeError>> {
        let mut out = self.decode();
        self.skip_noise();
        if !self.buf.is_empty() {
            let tail = self.take(self.buf.len());
            out.push(parse_logged(&tail));
        }
        out
    }

    /// Split off `len` bytes from the front and strip the delimiter.
    fn take(&mut self, len: usize) -> Bytes {
        let mut span = self.buf.split_to(len);
        span.advance(1);
        span.freeze()
    }

    fn skip_noise(&mut self) {
        match find_delimiter(&self.buf) {
            Some(0) => {}
            Some(pos) => {
                trace!(discarded = pos, "skipping bytes before start delimiter");
                self.buf.advance(pos);
            }
            None if self.buf.is_empty() => {}
            None => {
                trace!(discarded = self.buf.len(), "no start delimiter in buffer");
                self.buf.clear();
            }
        }
    }
}

fn parse_logged(candidate: &[u8]) -> Result<Response, DecodeError> {
    let result = parse_response(candidate);
    if let Err(err) = &result {
        warn!(error = %err, len = candidate.len(), "rejected candidate frame");
    }
    result
}
