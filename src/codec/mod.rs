//! Transcoding overlays: XOR cipher and the binary, hex and base64 text codecs.
//!
//! Every codec comes in two shapes that produce identical output: a streaming
//! overlay (`*Encoder<S>` writes text into `S`, `*Decoder<S>` reads text from
//! `S`) and module-level one-shot functions over slices. Both decoders share the
//! same character loop through [`ByteSource`], so they cannot drift apart.

pub mod base64;
pub mod binary;
pub mod hex;
pub mod xor;

pub use self::base64::{Base64Decoder, Base64Encoder};
pub use self::binary::{BinDecoder, BinEncoder};
pub use self::hex::{Case, HexDecoder, HexEncoder};
pub use self::xor::XorCoder;

use crate::buffered::CharReader;
use crate::error::{Error, Result};
use crate::stream::Stream;

/// How a decoder treats characters outside its alphabet.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tolerance {
    /// Any foreign character is an `InvalidCharacter` error.
    #[default]
    None,
    /// ASCII whitespace is skipped; anything else is an error.
    Whitespace,
    /// Every foreign character is skipped.
    All,
}

impl Tolerance {
    /// Whether `byte`, already known not to be a digit, may be skipped.
    pub fn skips(self, byte: u8) -> bool {
        match self {
            Tolerance::None => false,
            Tolerance::Whitespace => byte.is_ascii_whitespace(),
            Tolerance::All => true,
        }
    }

    /// Counts the bytes of `input` a decoder would treat as digits.
    ///
    /// In `None` mode the whole input counts. Otherwise only bytes accepted
    /// by `is_digit` count.
    pub(crate) fn digit_count(self, input: &[u8], is_digit: impl Fn(u8) -> bool) -> usize {
        match self {
            Tolerance::None => input.len(),
            _ => input.iter().filter(|&&b| is_digit(b)).count(),
        }
    }
}

/// Where a decoder pulls its text from.
pub(crate) trait ByteSource {
    fn next_byte(&mut self) -> Result<Option<u8>>;
}

impl<S: Stream> ByteSource for CharReader<S> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        self.read_byte()
    }
}

pub(crate) struct SliceSource<'a> {
    data: &'a [u8],
}

impl<'a> SliceSource<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Self { data }
    }
}

impl ByteSource for SliceSource<'_> {
    fn next_byte(&mut self) -> Result<Option<u8>> {
        match self.data.split_first() {
            Some((&b, rest)) => {
                self.data = rest;
                Ok(Some(b))
            }
            None => Ok(None),
        }
    }
}

/// Returns the value of the next digit, skipping what `tolerance` allows.
/// `Ok(None)` means the source ran out.
pub(crate) fn next_digit(
    src: &mut impl ByteSource,
    tolerance: Tolerance,
    codec: &'static str,
    value_of: impl Fn(u8) -> Option<u8>,
) -> Result<Option<u8>> {
    while let Some(byte) = src.next_byte()? {
        if let Some(v) = value_of(byte) {
            return Ok(Some(v));
        }
        if !tolerance.skips(byte) {
            return Err(Error::invalid_character(codec, byte));
        }
    }
    Ok(None)
}

/// Reads a group of `N` digits. End of input before the first digit is a
/// clean end (`Ok(None)`); anywhere later it is `UnexpectedEnd`.
pub(crate) fn next_group<const N: usize>(
    src: &mut impl ByteSource,
    tolerance: Tolerance,
    codec: &'static str,
    value_of: impl Fn(u8) -> Option<u8>,
) -> Result<Option<[u8; N]>> {
    let mut group = [0u8; N];
    for i in 0..N {
        match next_digit(src, tolerance, codec, &value_of)? {
            Some(v) => group[i] = v,
            None if i == 0 => return Ok(None),
            None => return Err(Error::unexpected_end(N, i)),
        }
    }
    Ok(Some(group))
}

/// Runs a group decoder over `out`, filling it as far as the source allows.
pub(crate) fn decode_groups<const N: usize>(
    src: &mut impl ByteSource,
    tolerance: Tolerance,
    codec: &'static str,
    value_of: impl Fn(u8) -> Option<u8>,
    combine: impl Fn([u8; N]) -> u8,
    out: &mut [u8],
) -> Result<usize> {
    for (i, slot) in out.iter_mut().enumerate() {
        match next_group::<N>(src, tolerance, codec, &value_of)? {
            Some(group) => *slot = combine(group),
            None => return Ok(i),
        }
    }
    Ok(out.len())
}
