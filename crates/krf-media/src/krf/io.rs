//! Bounds-checked fixed-width reads over a seekable byte stream.

use crate::{Error, Result};
use std::io::{Read, Seek, SeekFrom};

/// Byte stream with a known length.
///
/// Every read checks the remaining length first so a short stream surfaces as
/// [`Error::TruncatedInput`] instead of an opaque I/O error, and so a bogus
/// element count never drives a large allocation.
pub(crate) struct ByteReader<R> {
    inner: R,
    len: u64,
}

impl<R: Read + Seek> ByteReader<R> {
    /// Wrap a stream, measuring its length and rewinding to the start.
    pub fn new(mut inner: R) -> Result<Self> {
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(0))?;
        Ok(Self { inner, len })
    }

    /// Total stream length in bytes.
    pub fn len(&self) -> u64 {
        self.len
    }

    pub fn position(&mut self) -> Result<u64> {
        Ok(self.inner.stream_position()?)
    }

    pub fn remaining(&mut self) -> Result<u64> {
        Ok(self.len.saturating_sub(self.position()?))
    }

    pub fn is_eof(&mut self) -> Result<bool> {
        Ok(self.remaining()? == 0)
    }

    pub fn seek_to(&mut self, pos: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(pos))?;
        Ok(())
    }

    /// Skip `n` bytes, failing if that would run past the end of the stream.
    pub fn skip(&mut self, n: u64, context: &'static str) -> Result<()> {
        let pos = self.position()?;
        let have = self.len.saturating_sub(pos);
        if n > have {
            return Err(Error::TruncatedInput {
                context,
                need: n,
                have,
            });
        }
        self.seek_to(pos + n)
    }

    /// Fill `buf` entirely or fail with [`Error::TruncatedInput`].
    pub fn read_exact(&mut self, buf: &mut [u8], context: &'static str) -> Result<()> {
        let have = self.remaining()?;
        let need = buf.len() as u64;
        if need > have {
            return Err(Error::TruncatedInput { context, need, have });
        }
        self.inner.read_exact(buf)?;
        Ok(())
    }

    /// Read up to `buf.len()` bytes, returning how many were read.
    pub fn read_some(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut filled = 0;
        while filled < buf.len() {
            match self.inner.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
        Ok(filled)
    }

    fn read_array<const N: usize>(&mut self, context: &'static str) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.read_exact(&mut buf, context)?;
        Ok(buf)
    }

    pub fn read_u8(&mut self, context: &'static str) -> Result<u8> {
        Ok(self.read_array::<1>(context)?[0])
    }

    pub fn read_u16_le(&mut self, context: &'static str) -> Result<u16> {
        Ok(u16::from_le_bytes(self.read_array(context)?))
    }

    pub fn read_u24_be(&mut self, context: &'static str) -> Result<u32> {
        let [a, b, c] = self.read_array(context)?;
        Ok(u32::from_be_bytes([0, a, b, c]))
    }

    pub fn read_u32_le(&mut self, context: &'static str) -> Result<u32> {
        Ok(u32::from_le_bytes(self.read_array(context)?))
    }

    pub fn read_u32_be(&mut self, context: &'static str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array(context)?))
    }

    pub fn read_u64_le(&mut self, context: &'static str) -> Result<u64> {
        Ok(u64::from_le_bytes(self.read_array(context)?))
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}
