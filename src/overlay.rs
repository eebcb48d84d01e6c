//! Overlay streams: decorators that wrap one inner stream.
//!
//! An overlay owns its inner stream by value. To keep ownership with the
//! caller, wrap `&mut inner` instead; the forwarding impls in
//! [`stream`](crate::stream) make a mutable reference a stream in its own
//! right. Chains are built inside-out, either with the constructors or with
//! the fluent methods on [`StreamExt`].

use crate::codec::{
    Base64Decoder, Base64Encoder, BinDecoder, BinEncoder, Case, HexDecoder, HexEncoder,
    Tolerance, XorCoder,
};
use crate::error::{Error, Result};
use crate::stream::Stream;

/// A stream that decorates exactly one inner stream.
pub trait Overlay: Stream {
    type Inner: Stream;

    fn get_ref(&self) -> &Self::Inner;

    /// Direct access to the inner stream. Bypassing a buffering overlay this
    /// way can reorder data.
    fn get_mut(&mut self) -> &mut Self::Inner;
}

/// Counts bytes moving through it in each direction.
///
/// Writes are counted after the inner stream accepted them; reads count the
/// bytes actually returned.
pub struct CounterStream<S: Stream> {
    inner: S,
    written: u64,
    read: u64,
}

impl<S: Stream> CounterStream<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            written: 0,
            read: 0,
        }
    }

    pub fn write_count(&self) -> u64 {
        self.written
    }

    pub fn read_count(&self) -> u64 {
        self.read
    }

    pub fn reset_write_count(&mut self) {
        self.written = 0;
    }

    pub fn reset_read_count(&mut self) {
        self.read = 0;
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for CounterStream<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.inner.write(data)?;
        self.written += data.len() as u64;
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.inner.read(buf)?;
        self.read += n as u64;
        Ok(n)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.inner.read_exact(buf)?;
        self.read += buf.len() as u64;
        Ok(())
    }

    fn end(&mut self) -> Result<bool> {
        self.inner.end()
    }
}

impl<S: Stream> Overlay for CounterStream<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        &self.inner
    }

    fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

/// Caps the bytes that may be written to and read from the inner stream.
///
/// # Partial writes
///
/// Unlike every other stream in this crate, a write that exceeds the
/// remaining budget is *not* all-or-nothing: the bytes that still fit are
/// written to the inner stream, the write budget drops to zero, and then the
/// call fails with [`Error::LimitExceeded`] reporting how many were written.
///
/// Reads past the read budget are not errors; they return 0 bytes, so the
/// limit looks like end of data.
pub struct LimitStream<S: Stream> {
    inner: S,
    write_left: u64,
    read_left: u64,
}

impl<S: Stream> LimitStream<S> {
    pub fn new(inner: S, write_limit: u64, read_limit: u64) -> Self {
        Self {
            inner,
            write_left: write_limit,
            read_left: read_limit,
        }
    }

    pub fn set_write_limit(&mut self, limit: u64) {
        self.write_left = limit;
    }

    pub fn set_read_limit(&mut self, limit: u64) {
        self.read_left = limit;
    }

    pub fn remaining_write(&self) -> u64 {
        self.write_left
    }

    pub fn remaining_read(&self) -> u64 {
        self.read_left
    }

    pub fn into_inner(self) -> S {
        self.inner
    }

    fn read_window(&self, requested: usize) -> usize {
        usize::try_from(self.read_left).map_or(requested, |left| left.min(requested))
    }
}

impl<S: Stream> Stream for LimitStream<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let requested = data.len();
        if (requested as u64) <= self.write_left {
            self.inner.write(data)?;
            self.write_left -= requested as u64;
            return Ok(());
        }
        let fits = self.write_left as usize;
        if fits > 0 {
            self.inner.write(&data[..fits])?;
            self.write_left = 0;
        }
        log::debug!(
            "LimitStream: truncated write of {} bytes to {}",
            requested,
            fits
        );
        Err(Error::LimitExceeded {
            requested,
            written: fits,
        })
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let window = self.read_window(buf.len());
        if window == 0 {
            return Ok(0);
        }
        let n = self.inner.read(&mut buf[..window])?;
        self.read_left -= n as u64;
        Ok(n)
    }

    fn end(&mut self) -> Result<bool> {
        Ok(self.read_left == 0 || self.inner.end()?)
    }

    fn skip(&mut self, max: usize) -> Result<usize> {
        let window = self.read_window(max);
        if window == 0 {
            return Ok(0);
        }
        let n = self.inner.skip(window)?;
        self.read_left -= n as u64;
        Ok(n)
    }
}

impl<S: Stream> Overlay for LimitStream<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        &self.inner
    }

    fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}

/// Fluent construction of overlays over any stream.
pub trait StreamExt: Stream + Sized {
    fn counted(self) -> CounterStream<Self> {
        CounterStream::new(self)
    }

    fn limited(self, write_limit: u64, read_limit: u64) -> LimitStream<Self> {
        LimitStream::new(self, write_limit, read_limit)
    }

    /// Fails if `key` is empty.
    fn xored(self, key: impl Into<Vec<u8>>) -> Result<XorCoder<Self>> {
        XorCoder::new(self, key)
    }

    fn hex_encoded(self, case: Case) -> HexEncoder<Self> {
        HexEncoder::new(self, case)
    }

    fn hex_decoded(self, tolerance: Tolerance) -> HexDecoder<Self> {
        HexDecoder::new(self, tolerance)
    }

    fn bin_encoded(self) -> BinEncoder<Self> {
        BinEncoder::new(self)
    }

    fn bin_decoded(self, tolerance: Tolerance) -> BinDecoder<Self> {
        BinDecoder::new(self, tolerance)
    }

    fn base64_encoded(self) -> Base64Encoder<Self> {
        Base64Encoder::new(self)
    }

    fn base64_decoded(self, tolerance: Tolerance) -> Base64Decoder<Self> {
        Base64Decoder::new(self, tolerance)
    }
}

impl<S: Stream> StreamExt for S {}
