//! The `Stream` and `SeekableStream` contracts.
//!
//! Every method a concrete stream cannot meaningfully implement keeps its
//! default, which fails with [`Error::Unsupported`] naming the concrete type.
//! Composed chains therefore detect capability mismatches at the point of use
//! instead of silently doing nothing.

use crate::error::{Error, Result};

/// Block size used by buffered adapters, generic skip and stream copies.
pub const DEFAULT_BLOCK_SIZE: usize = 4096;

/// A sequential byte stream.
///
/// `write` is all-or-nothing: it either accepts every byte or fails.
/// `read` may return fewer bytes than requested; that signals end of data,
/// not an error.
pub trait Stream {
    /// Name of the concrete stream type, used in `Unsupported` errors.
    fn kind(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Writes all of `data` or fails.
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let _ = data;
        Err(Error::unsupported(self.kind(), "write"))
    }

    /// Delivers any buffered output. No-op by default.
    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    /// Reads up to `buf.len()` bytes and returns how many were read.
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let _ = buf;
        Err(Error::unsupported(self.kind(), "read"))
    }

    /// Fills `buf` completely or fails with `UnexpectedEnd`.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        let n = self.read(buf)?;
        if n != buf.len() {
            return Err(Error::unexpected_end(buf.len(), n));
        }
        Ok(())
    }

    /// Returns true once no more bytes can be produced.
    fn end(&mut self) -> Result<bool> {
        Err(Error::unsupported(self.kind(), "end"))
    }

    /// Discards up to `max` bytes and returns how many were skipped.
    ///
    /// The generic version reads and discards in blocks so it also works for
    /// streams that cannot reposition.
    fn skip(&mut self, max: usize) -> Result<usize> {
        if max == 0 {
            return Ok(0);
        }
        let mut scratch = vec![0u8; max.min(DEFAULT_BLOCK_SIZE)];
        let mut remaining = max;
        let mut skipped = 0;
        while remaining > 0 {
            let block = remaining.min(scratch.len());
            let n = self.read(&mut scratch[..block])?;
            skipped += n;
            remaining -= n;
            if n < block {
                break;
            }
        }
        Ok(skipped)
    }

    /// Discards exactly `len` bytes or fails with `UnexpectedEnd`.
    fn skip_exact(&mut self, len: usize) -> Result<()> {
        let skipped = self.skip(len)?;
        if skipped != len {
            return Err(Error::unexpected_end(len, skipped));
        }
        Ok(())
    }

    //--- Primitive helpers ---

    /// Writes `data` preceded by its length as one byte.
    fn write_prefixed_u8(&mut self, data: &[u8]) -> Result<()> {
        let len = u8::try_from(data.len())
            .map_err(|_| Error::capacity(data.len(), u8::MAX as usize))?;
        self.write(&[len])?;
        self.write(data)
    }

    /// Writes `data` preceded by its length as a little-endian `u16`.
    fn write_prefixed_u16(&mut self, data: &[u8]) -> Result<()> {
        let len = u16::try_from(data.len())
            .map_err(|_| Error::capacity(data.len(), u16::MAX as usize))?;
        self.write(&len.to_le_bytes())?;
        self.write(data)
    }

    /// Writes `data` preceded by its length as a little-endian `u32`.
    fn write_prefixed_u32(&mut self, data: &[u8]) -> Result<()> {
        let len = u32::try_from(data.len())
            .map_err(|_| Error::capacity(data.len(), u32::MAX as usize))?;
        self.write(&len.to_le_bytes())?;
        self.write(data)
    }

    /// Writes a boolean as a single `0`/`1` byte.
    fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write(&[u8::from(value)])
    }

    /// Reads exactly `len` bytes into a new vector.
    fn read_vec(&mut self, len: usize) -> Result<Vec<u8>> {
        let mut out = vec![0u8; len];
        self.read_exact(&mut out)?;
        Ok(out)
    }

    /// Reads data written by `write_prefixed_u8`.
    fn read_prefixed_u8(&mut self) -> Result<Vec<u8>> {
        let mut len = [0u8; 1];
        self.read_exact(&mut len)?;
        self.read_vec(len[0] as usize)
    }

    /// Reads data written by `write_prefixed_u16`.
    fn read_prefixed_u16(&mut self) -> Result<Vec<u8>> {
        let mut len = [0u8; 2];
        self.read_exact(&mut len)?;
        self.read_vec(u16::from_le_bytes(len) as usize)
    }

    /// Reads data written by `write_prefixed_u32`.
    fn read_prefixed_u32(&mut self) -> Result<Vec<u8>> {
        let mut len = [0u8; 4];
        self.read_exact(&mut len)?;
        self.read_vec(u32::from_le_bytes(len) as usize)
    }

    /// Reads a boolean; any non-zero byte is `true`.
    fn read_bool(&mut self) -> Result<bool> {
        let mut byte = [0u8; 1];
        self.read_exact(&mut byte)?;
        Ok(byte[0] != 0)
    }

    /// Appends everything up to the end of the stream to `out`.
    fn read_to_end(&mut self, out: &mut Vec<u8>) -> Result<usize> {
        let mut block = vec![0u8; DEFAULT_BLOCK_SIZE];
        let mut total = 0;
        loop {
            let n = self.read(&mut block)?;
            out.extend_from_slice(&block[..n]);
            total += n;
            if n < block.len() {
                return Ok(total);
            }
        }
    }

    //--- Copying ---

    /// Moves up to `max` bytes from `src` into this stream.
    fn copy_from(&mut self, src: &mut dyn Stream, max: usize) -> Result<usize> {
        if max == 0 {
            return Ok(0);
        }
        let mut block = vec![0u8; max.min(DEFAULT_BLOCK_SIZE)];
        let mut remaining = max;
        let mut copied = 0;
        while remaining > 0 {
            let want = remaining.min(block.len());
            let n = src.read(&mut block[..want])?;
            if n > 0 {
                self.write(&block[..n])?;
                remaining -= n;
                copied += n;
            }
            if n < want {
                break;
            }
        }
        Ok(copied)
    }

    /// Moves exactly `len` bytes from `src`, failing with `UnexpectedEnd` if it runs dry.
    fn copy_exact_from(&mut self, src: &mut dyn Stream, len: usize) -> Result<()> {
        let mut block = vec![0u8; len.min(DEFAULT_BLOCK_SIZE)];
        let mut remaining = len;
        while remaining > 0 {
            let want = remaining.min(block.len());
            src.read_exact(&mut block[..want])?;
            self.write(&block[..want])?;
            remaining -= want;
        }
        Ok(())
    }

    /// Moves everything `src` still has into this stream.
    fn copy_to_end_from(&mut self, src: &mut dyn Stream) -> Result<u64> {
        let mut block = vec![0u8; DEFAULT_BLOCK_SIZE];
        let mut copied = 0u64;
        loop {
            let n = src.read(&mut block)?;
            if n > 0 {
                self.write(&block[..n])?;
                copied += n as u64;
            }
            if n < block.len() {
                return Ok(copied);
            }
        }
    }
}

/// Copies up to `max` bytes from `src` to `dst`.
pub fn copy(dst: &mut dyn Stream, src: &mut dyn Stream, max: usize) -> Result<usize> {
    dst.copy_from(src, max)
}

/// Copies exactly `len` bytes from `src` to `dst`.
pub fn copy_exact(dst: &mut dyn Stream, src: &mut dyn Stream, len: usize) -> Result<()> {
    dst.copy_exact_from(src, len)
}

/// Copies `src` to `dst` until `src` is exhausted.
pub fn copy_to_end(dst: &mut dyn Stream, src: &mut dyn Stream) -> Result<u64> {
    dst.copy_to_end_from(src)
}

/// A stream with a position and a size that can be repositioned.
///
/// Implementors typically route [`Stream::end`] and [`Stream::skip`] to
/// [`end_by_position`](SeekableStream::end_by_position) and
/// [`skip_by_position`](SeekableStream::skip_by_position).
pub trait SeekableStream: Stream {
    /// Total size in bytes.
    fn size(&self) -> Result<u64> {
        Err(Error::unsupported(self.kind(), "size"))
    }

    /// Current position in bytes from the start.
    fn position(&self) -> Result<u64> {
        Err(Error::unsupported(self.kind(), "position"))
    }

    /// Moves to an absolute position.
    fn set_position(&mut self, position: u64) -> Result<()> {
        let _ = position;
        Err(Error::unsupported(self.kind(), "set_position"))
    }

    /// Truncates or zero-extends to `size` bytes.
    ///
    /// After shrinking below the current position the position is unspecified.
    fn set_size(&mut self, size: u64) -> Result<()> {
        let _ = size;
        Err(Error::unsupported(self.kind(), "set_size"))
    }

    /// Moves by `delta` bytes relative to the current position.
    fn seek_relative(&mut self, delta: i64) -> Result<()> {
        let base = self.position()?;
        let target = offset(base, delta, self.size()?)?;
        self.set_position(target)
    }

    /// Moves to `delta` bytes relative to the end; `-1` is the last byte.
    fn seek_from_end(&mut self, delta: i64) -> Result<()> {
        let size = self.size()?;
        let target = offset(size, delta, size)?;
        self.set_position(target)
    }

    fn rewind(&mut self) -> Result<()> {
        self.set_position(0)
    }

    /// Cuts the stream at the current position.
    fn truncate(&mut self) -> Result<()> {
        let position = self.position()?;
        self.set_size(position)
    }

    fn clear(&mut self) -> Result<()> {
        self.set_size(0)
    }

    /// `end` in terms of position and size.
    fn end_by_position(&self) -> Result<bool> {
        Ok(self.position()? >= self.size()?)
    }

    /// O(1) `skip`, clamped to the bytes left before the end.
    fn skip_by_position(&mut self, max: usize) -> Result<usize> {
        let position = self.position()?;
        let left = self.size()?.saturating_sub(position);
        let n = (max as u64).min(left);
        self.set_position(position + n)?;
        Ok(n as usize)
    }
}

fn offset(base: u64, delta: i64, size: u64) -> Result<u64> {
    base.checked_add_signed(delta)
        .ok_or_else(|| Error::InvalidPosition {
            position: (base as i64).saturating_add(delta),
            size,
        })
}

//--- Forwarding impls ---
//
// Decorators own their inner stream by value; passing `&mut inner` keeps
// ownership with the caller, which is how a chain is assembled over streams
// that must outlive it.

macro_rules! forward_stream {
    () => {
        fn kind(&self) -> &'static str {
            (**self).kind()
        }
        fn write(&mut self, data: &[u8]) -> Result<()> {
            (**self).write(data)
        }
        fn flush(&mut self) -> Result<()> {
            (**self).flush()
        }
        fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
            (**self).read(buf)
        }
        fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
            (**self).read_exact(buf)
        }
        fn end(&mut self) -> Result<bool> {
            (**self).end()
        }
        fn skip(&mut self, max: usize) -> Result<usize> {
            (**self).skip(max)
        }
        fn skip_exact(&mut self, len: usize) -> Result<()> {
            (**self).skip_exact(len)
        }
    };
}

impl<S: Stream + ?Sized> Stream for &mut S {
    forward_stream!();
}

impl<S: Stream + ?Sized> Stream for Box<S> {
    forward_stream!();
}

macro_rules! forward_seekable {
    () => {
        fn size(&self) -> Result<u64> {
            (**self).size()
        }
        fn position(&self) -> Result<u64> {
            (**self).position()
        }
        fn set_position(&mut self, position: u64) -> Result<()> {
            (**self).set_position(position)
        }
        fn set_size(&mut self, size: u64) -> Result<()> {
            (**self).set_size(size)
        }
        fn seek_relative(&mut self, delta: i64) -> Result<()> {
            (**self).seek_relative(delta)
        }
        fn seek_from_end(&mut self, delta: i64) -> Result<()> {
            (**self).seek_from_end(delta)
        }
        fn rewind(&mut self) -> Result<()> {
            (**self).rewind()
        }
        fn truncate(&mut self) -> Result<()> {
            (**self).truncate()
        }
        fn clear(&mut self) -> Result<()> {
            (**self).clear()
        }
    };
}

impl<S: SeekableStream + ?Sized> SeekableStream for &mut S {
    forward_seekable!();
}

impl<S: SeekableStream + ?Sized> SeekableStream for Box<S> {
    forward_seekable!();
}
