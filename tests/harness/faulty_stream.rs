#![allow(dead_code)]

use layerstream::{Error, Result, Stream};
use std::io;

/// Wraps a stream and misbehaves in a controlled way.
pub struct FaultyStream<S: Stream> {
    inner: S,
    mode: FaultMode,
    read: usize,
    written: usize,
    write_calls: usize,
    /// Size of every write call that reached the inner stream.
    pub write_sizes: Vec<usize>,
}

pub enum FaultMode {
    /// Pass everything through, only recording write sizes.
    Transparent,
    /// Stop producing data after `n` bytes, as if the source ended there.
    PrematureEndAt(usize),
    /// Fail with an I/O error once `n` bytes have been read.
    FailReadAt(usize),
    /// Fail any write that would take the total past `n` bytes. Nothing of
    /// the failing write is passed on.
    FailWriteAt(usize),
    /// Fail the first `n` write calls, then pass everything through.
    FailFirstWrites(usize),
}

impl<S: Stream> FaultyStream<S> {
    pub fn new(inner: S, mode: FaultMode) -> Self {
        Self {
            inner,
            mode,
            read: 0,
            written: 0,
            write_calls: 0,
            write_sizes: Vec::new(),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for FaultyStream<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.write_calls += 1;
        let fail = match self.mode {
            FaultMode::FailWriteAt(n) => self.written + data.len() > n,
            FaultMode::FailFirstWrites(n) => self.write_calls <= n,
            _ => false,
        };
        if fail {
            return Err(Error::Io(io::Error::new(
                io::ErrorKind::BrokenPipe,
                "injected write failure",
            )));
        }
        self.inner.write(data)?;
        self.written += data.len();
        self.write_sizes.push(data.len());
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let window = match self.mode {
            FaultMode::PrematureEndAt(n) => n.saturating_sub(self.read).min(buf.len()),
            FaultMode::FailReadAt(n) if self.read >= n => {
                return Err(Error::Io(io::Error::new(
                    io::ErrorKind::ConnectionReset,
                    "injected read failure",
                )))
            }
            FaultMode::FailReadAt(n) => (n - self.read).min(buf.len()),
            _ => buf.len(),
        };
        let got = self.inner.read(&mut buf[..window])?;
        self.read += got;
        Ok(got)
    }

    fn end(&mut self) -> Result<bool> {
        match self.mode {
            FaultMode::PrematureEndAt(n) if self.read >= n => Ok(true),
            _ => self.inner.end(),
        }
    }
}
