//! Byte-at-a-time buffered adapters over a `Stream`.
//!
//! `CharWriter` collects small writes and hands them to the wrapped stream
//! one block at a time; `CharReader` does the same for reads. Both are
//! transparent: the bytes that reach (or come from) the wrapped stream are
//! exactly the bytes an unbuffered caller would have seen, in the same order.

use crate::error::{Error, Result};
use crate::stream::{Stream, DEFAULT_BLOCK_SIZE};

/// Buffered writer. Dropping it delivers whatever is still buffered.
///
/// The drop-time flush cannot report failure; call [`flush`](Self::flush)
/// or [`into_inner`](Self::into_inner) first when errors matter.
pub struct CharWriter<S: Stream> {
    /// `None` only once the stream has been handed back by `take_inner`.
    inner: Option<S>,
    buf: Box<[u8]>,
    len: usize,
}

impl<S: Stream> CharWriter<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(DEFAULT_BLOCK_SIZE, inner)
    }

    /// Creates a writer with a `capacity`-byte buffer (at least one byte).
    pub fn with_capacity(capacity: usize, inner: S) -> Self {
        Self {
            inner: Some(inner),
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        if self.len == self.buf.len() {
            self.flush()?;
        }
        self.buf[self.len] = byte;
        self.len += 1;
        Ok(())
    }

    pub fn write_str(&mut self, s: &str) -> Result<()> {
        self.write_bytes(s.as_bytes())
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<()> {
        if data.len() <= self.buf.len() - self.len {
            self.buf[self.len..self.len + data.len()].copy_from_slice(data);
            self.len += data.len();
            return Ok(());
        }
        self.flush()?;
        if data.len() >= self.buf.len() {
            // Buffer is empty here, so a direct write keeps the byte order.
            return self.get_mut().write(data);
        }
        self.buf[..data.len()].copy_from_slice(data);
        self.len = data.len();
        Ok(())
    }

    /// Delivers the buffered bytes to the wrapped stream.
    ///
    /// Only the buffer is flushed; the wrapped stream's own `flush` is not called.
    /// On failure the bytes stay buffered, so a later flush retries them.
    pub fn flush(&mut self) -> Result<()> {
        if self.len > 0 {
            if let Some(inner) = self.inner.as_mut() {
                inner.write(&self.buf[..self.len])?;
            }
            self.len = 0;
        }
        Ok(())
    }

    /// Number of bytes waiting in the buffer.
    pub fn buffered(&self) -> usize {
        self.len
    }

    pub fn get_ref(&self) -> &S {
        match &self.inner {
            Some(inner) => inner,
            None => unreachable!("CharWriter used after its stream was taken"),
        }
    }

    /// Direct access to the wrapped stream. Writing through it while bytes
    /// are buffered reorders output.
    pub fn get_mut(&mut self) -> &mut S {
        match &mut self.inner {
            Some(inner) => inner,
            None => unreachable!("CharWriter used after its stream was taken"),
        }
    }

    /// Flushes the buffer and returns the wrapped stream.
    pub fn into_inner(mut self) -> Result<S> {
        self.take_inner()
    }

    /// Flushes the buffer and moves the wrapped stream out, leaving a writer
    /// whose drop does nothing. Owners that must hand the stream back from
    /// their own `into_inner` call this and then drop the writer.
    pub(crate) fn take_inner(&mut self) -> Result<S> {
        self.flush()?;
        self.inner
            .take()
            .ok_or_else(|| Error::unsupported("CharWriter", "take_inner"))
    }
}

impl<S: Stream> Drop for CharWriter<S> {
    fn drop(&mut self) {
        if self.inner.is_none() {
            return;
        }
        if let Err(e) = self.flush() {
            log::warn!("CharWriter: final flush on drop failed: {}", e);
        }
    }
}

/// Buffered reader with single-byte lookahead.
///
/// The wrapped stream is only read when the buffer is empty. A short read
/// from it is taken as end of data, matching the `Stream::read` contract.
pub struct CharReader<S: Stream> {
    inner: S,
    buf: Box<[u8]>,
    begin: usize,
    end: usize,
}

impl<S: Stream> CharReader<S> {
    pub fn new(inner: S) -> Self {
        Self::with_capacity(DEFAULT_BLOCK_SIZE, inner)
    }

    pub fn with_capacity(capacity: usize, inner: S) -> Self {
        Self {
            inner,
            buf: vec![0u8; capacity.max(1)].into_boxed_slice(),
            begin: 0,
            end: 0,
        }
    }

    /// Refills an empty buffer. Returns false when nothing more is available.
    fn fill(&mut self) -> Result<bool> {
        if self.begin < self.end {
            return Ok(true);
        }
        let n = self.inner.read(&mut self.buf)?;
        self.begin = 0;
        self.end = n;
        Ok(n > 0)
    }

    pub fn read_byte(&mut self) -> Result<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        let byte = self.buf[self.begin];
        self.begin += 1;
        Ok(Some(byte))
    }

    pub fn must_read_byte(&mut self) -> Result<u8> {
        self.read_byte()?.ok_or_else(|| Error::unexpected_end(1, 0))
    }

    /// Returns the next byte without consuming it.
    pub fn peek_byte(&mut self) -> Result<Option<u8>> {
        if !self.fill()? {
            return Ok(None);
        }
        Ok(Some(self.buf[self.begin]))
    }

    pub fn must_peek_byte(&mut self) -> Result<u8> {
        self.peek_byte()?.ok_or_else(|| Error::unexpected_end(1, 0))
    }

    /// Consumes one byte. Returns false at end of data.
    pub fn skip_byte(&mut self) -> Result<bool> {
        Ok(self.read_byte()?.is_some())
    }

    pub fn must_skip_byte(&mut self) -> Result<()> {
        self.must_read_byte().map(|_| ())
    }

    /// Reads up to `out.len()` bytes; fewer means end of data.
    pub fn read_bytes(&mut self, out: &mut [u8]) -> Result<usize> {
        let mut done = 0;
        while done < out.len() {
            if self.begin == self.end {
                let rest = &mut out[done..];
                if rest.len() >= self.buf.len() {
                    // Large request with an empty buffer: bypass it.
                    let n = self.inner.read(rest)?;
                    return Ok(done + n);
                }
                if !self.fill()? {
                    break;
                }
            }
            let n = (self.end - self.begin).min(out.len() - done);
            out[done..done + n].copy_from_slice(&self.buf[self.begin..self.begin + n]);
            self.begin += n;
            done += n;
            if self.begin == self.end && self.end < self.buf.len() {
                // The last refill was short, so the wrapped stream is exhausted.
                break;
            }
        }
        Ok(done)
    }

    pub fn read_exact_bytes(&mut self, out: &mut [u8]) -> Result<()> {
        let n = self.read_bytes(out)?;
        if n != out.len() {
            return Err(Error::unexpected_end(out.len(), n));
        }
        Ok(())
    }

    /// Reads exactly `len` bytes into a new vector.
    pub fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_exact_bytes(&mut out)?;
        Ok(out)
    }

    pub fn skip(&mut self, max: usize) -> Result<usize> {
        let buffered = (self.end - self.begin).min(max);
        self.begin += buffered;
        if buffered == max {
            return Ok(max);
        }
        Ok(buffered + self.inner.skip(max - buffered)?)
    }

    pub fn skip_exact(&mut self, len: usize) -> Result<()> {
        let n = self.skip(len)?;
        if n != len {
            return Err(Error::unexpected_end(len, n));
        }
        Ok(())
    }

    /// Reads one line into `line`, replacing its contents.
    ///
    /// `\n`, `\r` and `\r\n` all end a line and are not stored. Returns false
    /// only if the input was already exhausted.
    pub fn read_line(&mut self, line: &mut String) -> Result<bool> {
        line.clear();
        let mut bytes = Vec::new();
        let mut saw_eol = false;
        while let Some(byte) = self.read_byte()? {
            match byte {
                b'\r' => {
                    saw_eol = true;
                    if self.peek_byte()? == Some(b'\n') {
                        self.begin += 1;
                    }
                    break;
                }
                b'\n' => {
                    saw_eol = true;
                    break;
                }
                other => bytes.push(other),
            }
        }
        let text = String::from_utf8(bytes)
            .map_err(|e| Error::invalid_input(format!("line is not valid UTF-8: {e}")))?;
        line.push_str(&text);
        Ok(!line.is_empty() || saw_eol)
    }

    /// Like [`read_line`](Self::read_line), but end of input is an error.
    pub fn must_read_line(&mut self, line: &mut String) -> Result<()> {
        if !self.read_line(line)? {
            return Err(Error::unexpected_end(1, 0));
        }
        Ok(())
    }

    /// True when both the buffer and the wrapped stream are exhausted.
    pub fn end(&mut self) -> Result<bool> {
        Ok(!self.fill()?)
    }

    pub fn get_ref(&self) -> &S {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Returns the wrapped stream. Buffered bytes are lost.
    pub fn into_inner(self) -> S {
        self.inner
    }
}
