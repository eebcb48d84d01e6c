//! Binary-digit text codec: eight `'0'`/`'1'` characters per byte, most
//! significant bit first.

use super::{decode_groups, next_group, SliceSource, Tolerance};
use crate::buffered::{CharReader, CharWriter};
use crate::error::Result;
use crate::overlay::Overlay;
use crate::stream::Stream;

fn value_of(c: u8) -> Option<u8> {
    match c {
        b'0' => Some(0),
        b'1' => Some(1),
        _ => None,
    }
}

fn combine(bits: [u8; 8]) -> u8 {
    bits.iter().fold(0, |acc, &bit| (acc << 1) | bit)
}

fn digits(byte: u8) -> [u8; 8] {
    std::array::from_fn(|i| if byte & (0x80 >> i) != 0 { b'1' } else { b'0' })
}

pub fn encode_length(len: usize) -> Option<usize> {
    len.checked_mul(8)
}

/// Number of bytes `input` decodes to, or `None` if the digit count is not a
/// multiple of eight.
pub fn decode_length(input: &[u8], tolerance: Tolerance) -> Option<usize> {
    let digits = tolerance.digit_count(input, |b| value_of(b).is_some());
    (digits % 8 == 0).then_some(digits / 8)
}

pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(data.len() * 8);
    encode_into(data, &mut out);
    out
}

pub fn encode_into(data: &[u8], out: &mut String) {
    out.reserve(data.len() * 8);
    for &b in data {
        out.extend(digits(b).iter().map(|&d| d as char));
    }
}

pub fn decode(input: impl AsRef<[u8]>, tolerance: Tolerance) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.as_ref().len() / 8);
    decode_into(input.as_ref(), tolerance, &mut out)?;
    Ok(out)
}

/// Appends the decoded bytes to `out` and returns how many were added.
pub fn decode_into(input: &[u8], tolerance: Tolerance, out: &mut Vec<u8>) -> Result<usize> {
    let start = out.len();
    let mut src = SliceSource::new(input);
    while let Some(group) = next_group::<8>(&mut src, tolerance, "binary", value_of)? {
        out.push(combine(group));
    }
    Ok(out.len() - start)
}

/// Writes eight digit characters into `S` for every byte written to it.
pub struct BinEncoder<S: Stream> {
    writer: CharWriter<S>,
}

impl<S: Stream> BinEncoder<S> {
    pub fn new(inner: S) -> Self {
        Self {
            writer: CharWriter::new(inner),
        }
    }

    pub fn into_inner(self) -> Result<S> {
        self.writer.into_inner()
    }
}

impl<S: Stream> Stream for BinEncoder<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        for &b in data {
            self.writer.write_bytes(&digits(b))?;
        }
        Ok(())
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_mut().flush()
    }

    fn end(&mut self) -> Result<bool> {
        self.writer.get_mut().end()
    }
}

impl<S: Stream> Overlay for BinEncoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.writer.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.writer.get_mut()
    }
}

/// Reads binary-digit text from `S` and yields the decoded bytes.
pub struct BinDecoder<S: Stream> {
    reader: CharReader<S>,
    tolerance: Tolerance,
}

impl<S: Stream> BinDecoder<S> {
    pub fn new(inner: S, tolerance: Tolerance) -> Self {
        Self {
            reader: CharReader::new(inner),
            tolerance,
        }
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

impl<S: Stream> Stream for BinDecoder<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        decode_groups::<8>(&mut self.reader, self.tolerance, "binary", value_of, combine, buf)
    }

    fn end(&mut self) -> Result<bool> {
        self.reader.end()
    }
}

impl<S: Stream> Overlay for BinDecoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }
}
