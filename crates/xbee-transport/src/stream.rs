use std::io::{ErrorKind, Read, Write};

use bytes::{Bytes, BytesMut};
use tracing::trace;

use crate::error::{Result, TransportError};
use crate::traits::Transport;

const READ_CHUNK_SIZE: usize = 1024;

/// [`Transport`] over any `Read + Write` stream.
///
/// `read_available` must not block indefinitely, so the stream should be in
/// non-blocking mode or carry a read timeout. `WouldBlock` and `TimedOut`
/// are both reported as "nothing pending".
#[derive(Debug)]
pub struct StreamTransport<S> {
    inner: S,
}

impl<S: Read + Write> StreamTransport<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Consume the transport and return the inner stream.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
    }
}

impl<S: Read + Write> Transport for StreamTransport<S> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        let mut offset = 0usize;
        while offset < bytes.len() {
            match self.inner.write(&bytes[offset..]) {
                Ok(0) => return Err(TransportError::Closed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if err.kind() == ErrorKind::WouldBlock => continue,
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        trace!(len = bytes.len(), "wrote bytes");
        self.flush()
    }

    fn read_available(&mut self) -> Result<Bytes> {
        let mut out = BytesMut::new();
        let mut chunk = [0u8; READ_CHUNK_SIZE];
        loop {
            match self.inner.read(&mut chunk) {
                Ok(0) if out.is_empty() => return Err(TransportError::Closed),
                Ok(0) => break,
                Ok(n) => {
                    out.extend_from_slice(&chunk[..n]);
                    if n < chunk.len() {
                        break;
                    }
                }
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) if matches!(err.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {
                    break
                }
                Err(err) => return Err(TransportError::Io(err)),
            }
        }
        if !out.is_empty() {
            trace!(len = out.len(), "read bytes");
        }
        Ok(out.freeze())
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    /// Stream that fails with a fixed error kind a set number of times
    /// before each successful call.
    struct Flaky {
        data: Cursor<Vec<u8>>,
        written: Vec<u8>,
        failures: usize,
        kind: ErrorKind,
        max_write: usize,
    }

    impl Flaky {
        fn new(data: &[u8], failures: usize, kind: ErrorKind) -> Self {
            Self {
                data: Cursor::new(data.to_vec()),
                written: Vec::new(),
                failures,
                kind,
                max_write: usize::MAX,
            }
        }

        fn fail(&mut self) -> Option<std::io::Error> {
            if self.failures > 0 {
                self.failures -= 1;
                return Some(std::io::Error::from(self.kind));
            }
            None
        }
    }

    impl Read for Flaky {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            if let Some(err) = self.fail() {
                return Err(err);
            }
            let n = self.data.read(buf)?;
            if n == 0 && self.data.position() as usize == self.data.get_ref().len() {
                return Err(std::io::Error::from(ErrorKind::WouldBlock));
            }
            Ok(n)
        }
    }

    impl Write for Flaky {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if let Some(err) = self.fail() {
                return Err(err);
            }
            let n = buf.len().min(self.max_write);
            self.written.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn write_retries_interrupted_and_partial_writes() {
        let mut stream = Flaky::new(&[], 2, ErrorKind::Interrupted);
        stream.max_write = 3;
        let mut transport = StreamTransport::new(stream);

        let frame = [0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64];
        transport.write(&frame).unwrap();
        assert_eq!(transport.get_ref().written, frame);
    }

    #[test]
    fn write_to_closed_stream() {
        let mut stream = Flaky::new(&[], 0, ErrorKind::Other);
        stream.max_write = 0;
        let mut transport = StreamTransport::new(stream);
        assert!(matches!(
            transport.write(&[0x7E]),
            Err(TransportError::Closed)
        ));
    }

    #[test]
    fn write_surfaces_other_errors() {
        let stream = Flaky::new(&[], 1, ErrorKind::BrokenPipe);
        let mut transport = StreamTransport::new(stream);
        let err = transport.write(&[0x7E]).unwrap_err();
        assert!(matches!(err, TransportError::Io(ref e) if e.kind() == ErrorKind::BrokenPipe));
    }

    #[test]
    fn read_available_returns_pending_bytes() {
        let stream = Flaky::new(&[0x7E, 0x00, 0x02], 1, ErrorKind::Interrupted);
        let mut transport = StreamTransport::new(stream);
        assert_eq!(transport.read_available().unwrap().as_ref(), &[0x7E, 0x00, 0x02]);
        assert!(transport.read_available().unwrap().is_empty());
    }

    #[test]
    fn read_available_drains_more_than_one_chunk() {
        let data = vec![0xAB; READ_CHUNK_SIZE * 2 + 7];
        let mut transport = StreamTransport::new(Flaky::new(&data, 0, ErrorKind::Other));
        assert_eq!(transport.read_available().unwrap().len(), data.len());
    }

    #[test]
    fn read_available_with_nothing_pending() {
        let stream = Flaky::new(&[], 1, ErrorKind::TimedOut);
        let mut transport = StreamTransport::new(stream);
        assert!(transport.read_available().unwrap().is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn unix_socket_pair_round_trip() {
        use std::os::unix::net::UnixStream;

        let (left, right) = UnixStream::pair().unwrap();
        left.set_nonblocking(true).unwrap();
        right.set_nonblocking(true).unwrap();
        let mut left = StreamTransport::new(left);
        let mut right = StreamTransport::new(right);

        assert!(right.read_available().unwrap().is_empty());
        left.write(&[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64])
            .unwrap();
        assert_eq!(
            right.read_available().unwrap().as_ref(),
            &[0x7E, 0x00, 0x04, 0x08, 0x01, 0x4E, 0x44, 0x64]
        );
    }

    #[cfg(unix)]
    #[test]
    fn closed_peer_is_reported() {
        use std::os::unix::net::UnixStream;

        let (left, right) = UnixStream::pair().unwrap();
        right.set_nonblocking(true).unwrap();
        drop(left);
        let mut right = StreamTransport::new(right);
        assert!(matches!(
            right.read_available(),
            Err(TransportError::Closed)
        ));
    }
}
