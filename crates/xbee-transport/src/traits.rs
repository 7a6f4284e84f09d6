use bytes::Bytes;

use crate::error::Result;

/// Byte-level link to a module.
///
/// The frame codec never touches a device itself. Everything above this
/// trait works on whatever bytes `read_available` hands back, so a transport
/// may return a partial frame, several frames, or nothing at all.
pub trait Transport {
    /// Write every byte of `bytes` to the link.
    fn write(&mut self, bytes: &[u8]) -> Result<()>;

    /// Return whatever bytes have arrived since the last call.
    ///
    /// Does not wait for data; an empty buffer means nothing was pending.
    fn read_available(&mut self) -> Result<Bytes>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_available(&mut self) -> Result<Bytes> {
        (**self).read_available()
    }
}

impl<T: Transport + ?Sized> Transport for Box<T> {
    fn write(&mut self, bytes: &[u8]) -> Result<()> {
        (**self).write(bytes)
    }

    fn read_available(&mut self) -> Result<Bytes> {
        (**self).read_available()
    }
}
