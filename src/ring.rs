//! Fixed-capacity circular byte buffer.

use crate::error::{Error, Result};
use crate::stream::Stream;

/// A bounded FIFO of bytes that never grows.
///
/// Writing more than [`free`](Self::free) bytes fails with `Capacity` and
/// leaves the buffer untouched, which gives producers back-pressure instead
/// of unbounded memory use. Reads return whatever is available.
#[derive(Debug, Clone)]
pub struct RingBuffer {
    data: Box<[u8]>,
    head: usize,
    len: usize,
}

impl RingBuffer {
    pub fn new(capacity: usize) -> Self {
        Self {
            data: vec![0u8; capacity].into_boxed_slice(),
            head: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.data.len()
    }

    /// Bytes that can be written before the buffer is full.
    pub fn free(&self) -> usize {
        self.data.len() - self.len
    }

    /// Drops all buffered bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.len = 0;
    }

    /// Copies out up to `buf.len()` bytes from the front without consuming them.
    pub fn peek(&self, buf: &mut [u8]) -> usize {
        let n = buf.len().min(self.len);
        if n == 0 {
            return 0;
        }
        let first = n.min(self.data.len() - self.head);
        buf[..first].copy_from_slice(&self.data[self.head..self.head + first]);
        buf[first..n].copy_from_slice(&self.data[..n - first]);
        n
    }

    fn consume(&mut self, n: usize) {
        self.len -= n;
        self.head = if self.len == 0 {
            0
        } else {
            (self.head + n) % self.data.len()
        };
    }
}

impl Stream for RingBuffer {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if data.len() > self.free() {
            log::trace!(
                "RingBuffer: rejecting {} bytes, {} free",
                data.len(),
                self.free()
            );
            return Err(Error::capacity(data.len(), self.free()));
        }
        if data.is_empty() {
            return Ok(());
        }
        let cap = self.data.len();
        let tail = (self.head + self.len) % cap;
        let first = data.len().min(cap - tail);
        self.data[tail..tail + first].copy_from_slice(&data[..first]);
        self.data[..data.len() - first].copy_from_slice(&data[first..]);
        self.len += data.len();
        Ok(())
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.peek(buf);
        self.consume(n);
        Ok(n)
    }

    /// Fails without consuming anything if fewer than `buf.len()` bytes are buffered.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.len() > self.len {
            return Err(Error::unexpected_end(buf.len(), self.len));
        }
        self.read(buf).map(|_| ())
    }

    fn end(&mut self) -> Result<bool> {
        Ok(self.is_empty())
    }

    fn skip(&mut self, max: usize) -> Result<usize> {
        let n = max.min(self.len);
        self.consume(n);
        Ok(n)
    }

    fn skip_exact(&mut self, len: usize) -> Result<()> {
        if len > self.len {
            return Err(Error::unexpected_end(len, self.len));
        }
        self.consume(len);
        Ok(())
    }
}
