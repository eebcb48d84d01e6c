//! Adapters between [`Stream`] and `std::io`.
//!
//! `std::io::Read` may return short counts at any time, while a short
//! `Stream::read` means end of data. `IoReader` therefore keeps reading until
//! the buffer is full or the reader reports EOF.

use crate::error::{Error, Result};
use crate::stream::Stream;
use std::io::{self, Read, Write};

/// A `std::io::Read` as a read-only stream.
pub struct IoReader<R: Read> {
    inner: R,
    peeked: Option<u8>,
}

impl<R: Read> IoReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            peeked: None,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    /// Returns the reader. A byte consumed by `end` is lost.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let mut done = 0;
        while done < buf.len() {
            match self.inner.read(&mut buf[done..]) {
                Ok(0) => break,
                Ok(n) => done += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }
        Ok(done)
    }
}

impl<R: Read> Stream for IoReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut start = 0;
        if let Some(byte) = self.peeked.take() {
            buf[0] = byte;
            start = 1;
        }
        Ok(start + self.fill(&mut buf[start..])?)
    }

    /// Reads one byte ahead to find out; it is handed out by the next `read`.
    fn end(&mut self) -> Result<bool> {
        if self.peeked.is_some() {
            return Ok(false);
        }
        let mut byte = [0u8; 1];
        if self.fill(&mut byte)? == 0 {
            return Ok(true);
        }
        self.peeked = Some(byte[0]);
        Ok(false)
    }
}

/// A `std::io::Write` as a write-only stream.
pub struct IoWriter<W: Write> {
    inner: W,
}

impl<W: Write> IoWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &W {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut W {
        &mut self.inner
    }

    pub fn into_inner(self) -> W {
        self.inner
    }
}

impl<W: Write> Stream for IoWriter<W> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write_all(data)?;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()?;
        Ok(())
    }
}

/// Any stream as `std::io::Read + std::io::Write`.
///
/// Stream errors other than `Error::Io` surface as `io::ErrorKind::Other`
/// carrying the original error.
pub struct StreamIo<S: Stream> {
    inner: S,
}

impl<S: Stream> StreamIo<S> {
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

fn to_io(err: Error) -> io::Error {
    match err {
        Error::Io(e) => e,
        other => io::Error::new(io::ErrorKind::Other, other),
    }
}

impl<S: Stream> Read for StreamIo<S> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.inner.read(buf).map_err(to_io)
    }
}

impl<S: Stream> Write for StreamIo<S> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.inner.write(buf).map_err(to_io)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush().map_err(to_io)
    }
}
