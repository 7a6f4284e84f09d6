//! Splitting a captured byte stream into candidate frames.
//!
//! A candidate is the span after one start delimiter up to the next delimiter
//! or the end of the buffer. Escaped API mode is not interpreted, so a raw
//! `0x7E` inside a payload ends its candidate early; that frame then fails
//! validation on its own without affecting its neighbours.

use std::iter::FusedIterator;

use tracing::{trace, warn};

use crate::api::START_DELIMITER;
use crate::error::DecodeError;
use crate::response::{parse_response, Response};

/// Lazy iterator over the candidate spans of a buffer.
///
/// Created by [`split_frames`]. Empty candidates (two adjacent delimiters, or
/// a delimiter at the very end) are yielded as empty slices.
#[derive(Debug, Clone)]
pub struct SplitFrames<'a> {
    rest: Option<&'a [u8]>,
}

impl<'a> Iterator for SplitFrames<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        match find_delimiter(rest) {
            Some(pos) => {
                self.rest = Some(&rest[pos + 1..]);
                Some(&rest[..pos])
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

impl FusedIterator for SplitFrames<'_> {}

/// Split `buf` on the start delimiter.
///
/// Bytes before the first delimiter are discarded. A buffer with no
/// delimiter yields nothing.
pub fn split_frames(buf: &[u8]) -> SplitFrames<'_> {
    let rest = find_delimiter(buf).map(|pos| {
        if pos > 0 {
            trace!(discarded = pos, "skipping bytes before first start delimiter");
        }
        &buf[pos + 1..]
    });
    SplitFrames { rest }
}

/// Split `buf` and parse every candidate as a response.
///
/// Yields one result per candidate, in stream order. A rejected candidate is
/// logged and reported, and parsing continues with the next one.
pub fn decode_stream(buf: &[u8]) -> impl Iterator<Item = Result<Response, DecodeError>> + '_ {
    split_frames(buf).map(|candidate| {
        let result = parse_response(candidate);
        if let Err(err) = &result {
            warn!(error = %err, len = candidate.len(), "rejected candidate frame");
        }
        result
    })
}

pub(crate) fn find_delimiter(buf: &[u8]) -> Option<usize> {
    buf.iter().position(|&b| b == START_DELIMITER)
}
