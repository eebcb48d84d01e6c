//! In-memory seekable streams.

use crate::error::{Error, Result};
use crate::stream::{SeekableStream, Stream};

/// A fixed-size stream over a borrowed mutable byte slice.
///
/// Writes past the end of the slice fail with `Capacity` and write nothing.
#[derive(Debug)]
pub struct MemoryStream<'a> {
    data: &'a mut [u8],
    pos: usize,
}

impl<'a> MemoryStream<'a> {
    pub fn new(data: &'a mut [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn as_slice(&self) -> &[u8] {
        self.data
    }

    /// Bytes between the current position and the end.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }
}

impl Stream for MemoryStream<'_> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.remaining() {
            return Err(Error::capacity(data.len(), self.remaining()));
        }
        self.data[self.pos..self.pos + data.len()].copy_from_slice(data);
        self.pos += data.len();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = buf.len().min(self.remaining());
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn end(&mut self) -> Result<bool> {
        self.end_by_position()
    }

    fn skip(&mut self, max: usize) -> Result<usize> {
        self.skip_by_position(max)
    }
}

impl SeekableStream for MemoryStream<'_> {
    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn position(&self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    fn set_position(&mut self, position: u64) -> Result<()> {
        if position > self.data.len() as u64 {
            return Err(Error::InvalidPosition {
                position: position as i64,
                size: self.data.len() as u64,
            });
        }
        self.pos = position as usize;
        Ok(())
    }
}

/// A growable in-memory stream backed by a `Vec<u8>`.
///
/// Writes overwrite at the current position and extend the buffer as needed.
#[derive(Debug, Default, Clone)]
pub struct VecStream {
    data: Vec<u8>,
    pos: usize,
}

impl VecStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
            pos: 0,
        }
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn into_inner(self) -> Vec<u8> {
        self.data
    }
}

impl From<Vec<u8>> for VecStream {
    /// Wraps existing bytes, positioned at the start.
    fn from(data: Vec<u8>) -> Self {
        Self { data, pos: 0 }
    }
}

impl From<&[u8]> for VecStream {
    fn from(data: &[u8]) -> Self {
        Self::from(data.to_vec())
    }
}

impl Stream for VecStream {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let end = self.pos + data.len();
        if end > self.data.len() {
            self.data.resize(end, 0);
        }
        self.data[self.pos..end].copy_from_slice(data);
        self.pos = end;
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let available = self.data.len().saturating_sub(self.pos);
        let n = buf.len().min(available);
        buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
        self.pos += n;
        Ok(n)
    }

    fn end(&mut self) -> Result<bool> {
        self.end_by_position()
    }

    fn skip(&mut self, max: usize) -> Result<usize> {
        self.skip_by_position(max)
    }
}

impl SeekableStream for VecStream {
    fn size(&self) -> Result<u64> {
        Ok(self.data.len() as u64)
    }

    fn position(&self) -> Result<u64> {
        Ok(self.pos as u64)
    }

    /// Any position is accepted; writing there zero-fills the gap.
    fn set_position(&mut self, position: u64) -> Result<()> {
        self.pos = usize::try_from(position).map_err(|_| Error::InvalidPosition {
            position: position as i64,
            size: self.data.len() as u64,
        })?;
        Ok(())
    }

    fn set_size(&mut self, size: u64) -> Result<()> {
        let size = usize::try_from(size)
            .map_err(|_| Error::capacity(usize::MAX, self.data.len()))?;
        self.data.resize(size, 0);
        Ok(())
    }
}
