//! Hexadecimal text codec: two digits per byte, high nibble first.

use super::{decode_groups, next_group, SliceSource, Tolerance};
use crate::buffered::{CharReader, CharWriter};
use crate::error::{Error, Result};
use crate::overlay::Overlay;
use crate::stream::Stream;

const UPPER: &[u8; 16] = b"0123456789ABCDEF";
const LOWER: &[u8; 16] = b"0123456789abcdef";

/// Letter case of encoded digits. Decoding accepts both.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Case {
    #[default]
    Upper,
    Lower,
}

impl Case {
    fn digits(self) -> &'static [u8; 16] {
        match self {
            Case::Upper => UPPER,
            Case::Lower => LOWER,
        }
    }
}

fn value_of(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

fn combine([high, low]: [u8; 2]) -> u8 {
    (high << 4) | low
}

/// Length of the hex text for `len` bytes.
pub fn encode_length(len: usize) -> Option<usize> {
    len.checked_mul(2)
}

/// Number of bytes `input` decodes to, or `None` if the digit count is odd.
pub fn decode_length(input: &[u8], tolerance: Tolerance) -> Option<usize> {
    let digits = tolerance.digit_count(input, |b| value_of(b).is_some());
    (digits % 2 == 0).then_some(digits / 2)
}

pub fn encode(data: &[u8], case: Case) -> String {
    let mut out = String::with_capacity(data.len() * 2);
    encode_into(data, case, &mut out);
    out
}

/// Appends the hex text for `data` to `out`.
pub fn encode_into(data: &[u8], case: Case, out: &mut String) {
    let digits = case.digits();
    out.reserve(data.len() * 2);
    for &b in data {
        out.push(digits[(b >> 4) as usize] as char);
        out.push(digits[(b & 0x0F) as usize] as char);
    }
}

pub fn decode(input: impl AsRef<[u8]>, tolerance: Tolerance) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.as_ref().len() / 2);
    decode_into(input.as_ref(), tolerance, &mut out)?;
    Ok(out)
}

/// Appends the decoded bytes to `out` and returns how many were added.
///
/// On error `out` may already hold the bytes decoded before the bad group.
pub fn decode_into(input: &[u8], tolerance: Tolerance, out: &mut Vec<u8>) -> Result<usize> {
    let start = out.len();
    let mut src = SliceSource::new(input);
    while let Some(group) = next_group::<2>(&mut src, tolerance, "hex", value_of)? {
        out.push(combine(group));
    }
    Ok(out.len() - start)
}

/// Writes the hex text of every byte written to it into `S`.
pub struct HexEncoder<S: Stream> {
    writer: CharWriter<S>,
    case: Case,
}

impl<S: Stream> HexEncoder<S> {
    pub fn new(inner: S, case: Case) -> Self {
        Self {
            writer: CharWriter::new(inner),
            case,
        }
    }

    pub fn case(&self) -> Case {
        self.case
    }

    /// Flushes pending text and returns the wrapped stream.
    pub fn into_inner(self) -> Result<S> {
        self.writer.into_inner()
    }
}

impl<S: Stream> Stream for HexEncoder<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        let digits = self.case.digits();
        for &b in data {
            self.writer.write_byte(digits[(b >> 4) as usize])?;
            self.writer.write_byte(digits[(b & 0x0F) as usize])?;
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

impl<S: Stream> Overlay for HexEncoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.writer.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.writer.get_mut()
    }
}

/// Reads hex text from `S` and yields the decoded bytes.
pub struct HexDecoder<S: Stream> {
    reader: CharReader<S>,
    tolerance: Tolerance,
}

impl<S: Stream> HexDecoder<S> {
    pub fn new(inner: S, tolerance: Tolerance) -> Self {
        Self {
            reader: CharReader::new(inner),
            tolerance,
        }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

impl<S: Stream> Stream for HexDecoder<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        decode_groups::<2>(&mut self.reader, self.tolerance, "hex", value_of, combine, buf)
    }

    fn end(&mut self) -> Result<bool> {
        self.reader.end()
    }
}

impl<S: Stream> Overlay for HexDecoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }
}

/// Parses text holding exactly `N` hex-encoded bytes.
pub(crate) fn parse_exact<const N: usize>(text: &str) -> Result<[u8; N]> {
    let bytes = decode(text.trim(), Tolerance::None)?;
    <[u8; N]>::try_from(bytes.as_slice()).map_err(|_| {
        Error::invalid_input(format!(
            "expected {N} hex-encoded bytes, got {}",
            bytes.len()
        ))
    })
}
