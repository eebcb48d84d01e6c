//! Repeating-key XOR. Encoding and decoding are the same operation.

use crate::error::{Error, Result};
use crate::overlay::Overlay;
use crate::stream::{Stream, DEFAULT_BLOCK_SIZE};

/// XORs `data` in place against `key`, starting at key position `start`.
/// Returns the key position following the last byte.
fn apply(data: &mut [u8], key: &[u8], start: usize) -> usize {
    let mut k = start % key.len();
    for b in data {
        *b ^= key[k];
        k += 1;
        if k == key.len() {
            k = 0;
        }
    }
    k
}

fn check_key(key: &[u8]) -> Result<()> {
    if key.is_empty() {
        return Err(Error::invalid_input("XOR key must not be empty"));
    }
    Ok(())
}

/// Returns `data` XORed with the repeating `key`.
pub fn code(data: &[u8], key: &[u8]) -> Result<Vec<u8>> {
    let mut out = data.to_vec();
    code_in_place(&mut out, key)?;
    Ok(out)
}

pub fn code_in_place(data: &mut [u8], key: &[u8]) -> Result<()> {
    check_key(key)?;
    apply(data, key, 0);
    Ok(())
}

/// XOR overlay with independent key positions for reading and writing.
///
/// Both positions start at the first key byte. `reset_read` and
/// `reset_write` realign them, e.g. after rewinding the wrapped stream.
pub struct XorCoder<S: Stream> {
    inner: S,
    key: Vec<u8>,
    read_pos: usize,
    write_pos: usize,
    scratch: Vec<u8>,
}

impl<S: Stream> XorCoder<S> {
    /// Fails with `InvalidInput` if `key` is empty.
    pub fn new(inner: S, key: impl Into<Vec<u8>>) -> Result<Self> {
        let key = key.into();
        check_key(&key)?;
        Ok(Self {
            inner,
            key,
            read_pos: 0,
            write_pos: 0,
            scratch: Vec::new(),
        })
    }

    pub fn with_byte(inner: S, key: u8) -> Self {
        Self {
            inner,
            key: vec![key],
            read_pos: 0,
            write_pos: 0,
            scratch: Vec::new(),
        }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    pub fn reset(&mut self) {
        self.read_pos = 0;
        self.write_pos = 0;
    }

    pub fn reset_read(&mut self) {
        self.read_pos = 0;
    }

    pub fn reset_write(&mut self) {
        self.write_pos = 0;
    }

    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: Stream> Stream for XorCoder<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.scratch.is_empty() && !data.is_empty() {
            self.scratch = vec![0u8; DEFAULT_BLOCK_SIZE];
        }
        for block in data.chunks(DEFAULT_BLOCK_SIZE) {
            let out = &mut self.scratch[..block.len()];
            out.copy_from_slice(block);
            let next = apply(out, &self.key, self.write_pos);
            self.inner.write(out)?;
            self.write_pos = next;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.inner.flush()
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let n = self.inner.read(buf)?;
        self.read_pos = apply(&mut buf[..n], &self.key, self.read_pos);
        Ok(n)
    }

    fn end(&mut self) -> Result<bool> {
        self.inner.end()
    }

    /// Skipped bytes still consume key positions.
    fn skip(&mut self, max: usize) -> Result<usize> {
        let n = self.inner.skip(max)?;
        self.read_pos = (self.read_pos + n % self.key.len()) % self.key.len();
        Ok(n)
    }
}

impl<S: Stream> Overlay for XorCoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        &self.inner
    }

    fn get_mut(&mut self) -> &mut S {
        &mut self.inner
    }
}
