//! Base64 codec with the standard alphabet, `=` padding and no line wrapping.
//!
//! Both directions buffer across calls because the encoded unit (four
//! characters) never lines up with the caller's byte boundaries:
//! the encoder holds up to two input bytes until a group of three is
//! complete, and the decoder holds up to three decoded bytes until the
//! caller has read them.

use super::{next_group, ByteSource, SliceSource, Tolerance};
use crate::buffered::{CharReader, CharWriter};
use crate::error::{Error, Result};
use crate::overlay::Overlay;
use crate::stream::Stream;

const ALPHABET: &[u8; 64] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789+/";
const PAD: u8 = 64;
const CODEC: &str = "base64";

fn value_of(c: u8) -> Option<u8> {
    match c {
        b'A'..=b'Z' => Some(c - b'A'),
        b'a'..=b'z' => Some(c - b'a' + 26),
        b'0'..=b'9' => Some(c - b'0' + 52),
        b'+' => Some(62),
        b'/' => Some(63),
        b'=' => Some(PAD),
        _ => None,
    }
}

fn encode_group(input: &[u8]) -> [u8; 4] {
    let b0 = input[0];
    let b1 = input.get(1).copied().unwrap_or(0);
    let b2 = input.get(2).copied().unwrap_or(0);
    let mut out = [
        ALPHABET[(b0 >> 2) as usize],
        ALPHABET[(((b0 & 0x03) << 4) | (b1 >> 4)) as usize],
        ALPHABET[(((b1 & 0x0F) << 2) | (b2 >> 6)) as usize],
        ALPHABET[(b2 & 0x3F) as usize],
    ];
    if input.len() < 3 {
        out[3] = b'=';
    }
    if input.len() < 2 {
        out[2] = b'=';
    }
    out
}

/// A decoded group: up to three bytes, and whether it carried padding.
struct Group {
    bytes: [u8; 3],
    len: usize,
    padded: bool,
}

fn decode_group([c0, c1, c2, c3]: [u8; 4]) -> Result<Group> {
    if c0 == PAD || c1 == PAD || (c2 == PAD && c3 != PAD) {
        return Err(Error::invalid_character(CODEC, b'='));
    }
    let bytes = [
        (c0 << 2) | (c1 >> 4),
        ((c1 & 0x0F) << 4) | ((c2 & 0x3F) >> 2),
        ((c2 & 0x03) << 6) | (c3 & 0x3F),
    ];
    let (len, padded) = match (c2 == PAD, c3 == PAD) {
        (true, true) => (1, true),
        (false, true) => (2, true),
        _ => (3, false),
    };
    Ok(Group { bytes, len, padded })
}

fn read_group(src: &mut impl ByteSource, tolerance: Tolerance) -> Result<Option<Group>> {
    match next_group::<4>(src, tolerance, CODEC, value_of)? {
        Some(chars) => decode_group(chars).map(Some),
        None => Ok(None),
    }
}

/// Length of the Base64 text for `len` bytes, padding included.
pub fn encode_length(len: usize) -> Option<usize> {
    (len / 3 + usize::from(len % 3 != 0)).checked_mul(4)
}

/// Exact number of bytes `input` decodes to.
///
/// In `None` mode the input must be a whole number of groups. In lenient
/// modes only alphabet characters and `=` are counted, and at most two `=`
/// may appear.
pub fn decode_length(input: &[u8], tolerance: Tolerance) -> Option<usize> {
    match tolerance {
        Tolerance::None => {
            let len = input.len();
            if len == 0 {
                return Some(0);
            }
            if len % 4 != 0 {
                return None;
            }
            let pad = if input[len - 2] == b'=' {
                2
            } else {
                usize::from(input[len - 1] == b'=')
            };
            Some(len / 4 * 3 - pad)
        }
        _ => {
            let pads = input.iter().filter(|&&b| b == b'=').count();
            let total = tolerance.digit_count(input, |b| value_of(b).is_some());
            if total % 4 != 0 || pads > 2 {
                return None;
            }
            (total / 4 * 3).checked_sub(pads)
        }
    }
}

pub fn encode(data: &[u8]) -> String {
    let mut out = String::with_capacity(encode_length(data.len()).unwrap_or(0));
    encode_into(data, &mut out);
    out
}

/// Appends the padded Base64 text for `data` to `out`.
pub fn encode_into(data: &[u8], out: &mut String) {
    for chunk in data.chunks(3) {
        out.extend(encode_group(chunk).iter().map(|&c| c as char));
    }
}

pub fn decode(input: impl AsRef<[u8]>, tolerance: Tolerance) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.as_ref().len() / 4 * 3);
    decode_into(input.as_ref(), tolerance, &mut out)?;
    Ok(out)
}

/// Appends the decoded bytes to `out` and returns how many were added.
///
/// Decoding stops after the first padded group; anything after it is ignored.
pub fn decode_into(input: &[u8], tolerance: Tolerance, out: &mut Vec<u8>) -> Result<usize> {
    let start = out.len();
    let mut src = SliceSource::new(input);
    while let Some(group) = read_group(&mut src, tolerance)? {
        out.extend_from_slice(&group.bytes[..group.len]);
        if group.padded {
            break;
        }
    }
    Ok(out.len() - start)
}

/// Writes the Base64 text of everything written to it into `S`.
///
/// The final partial group is emitted by [`finish`](Self::finish), by
/// [`into_inner`](Self::into_inner), or on drop. Once finished the encoder
/// rejects further writes with `Finished`.
pub struct Base64Encoder<S: Stream> {
    writer: CharWriter<S>,
    pending: [u8; 2],
    pending_len: usize,
    finished: bool,
}

impl<S: Stream> Base64Encoder<S> {
    pub fn new(inner: S) -> Self {
        Self {
            writer: CharWriter::new(inner),
            pending: [0; 2],
            pending_len: 0,
            finished: false,
        }
    }

    /// Emits the padded final group and delivers all buffered text.
    /// Calling it again after success does nothing; after a failure it
    /// retries whatever was not delivered.
    pub fn finish(&mut self) -> Result<()> {
        if self.finished {
            return Ok(());
        }
        if self.pending_len > 0 {
            let group = encode_group(&self.pending[..self.pending_len]);
            self.writer.write_bytes(&group)?;
            self.pending_len = 0;
        }
        self.writer.flush()?;
        self.finished = true;
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Finishes the encoding and returns the wrapped stream.
    pub fn into_inner(mut self) -> Result<S> {
        self.finish()?;
        self.writer.take_inner()
    }
}

impl<S: Stream> Stream for Base64Encoder<S> {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.finished {
            return Err(Error::Finished { stream: self.kind() });
        }
        let mut rest = data;
        if self.pending_len > 0 {
            let take = (3 - self.pending_len).min(rest.len());
            let mut group = [0u8; 3];
            group[..self.pending_len].copy_from_slice(&self.pending[..self.pending_len]);
            group[self.pending_len..self.pending_len + take].copy_from_slice(&rest[..take]);
            rest = &rest[take..];
            if self.pending_len + take < 3 {
                self.pending[..self.pending_len + take]
                    .copy_from_slice(&group[..self.pending_len + take]);
                self.pending_len += take;
                return Ok(());
            }
            self.writer.write_bytes(&encode_group(&group))?;
            self.pending_len = 0;
        }
        let mut chunks = rest.chunks_exact(3);
        for chunk in &mut chunks {
            self.writer.write_bytes(&encode_group(chunk))?;
        }
        let tail = chunks.remainder();
        self.pending[..tail.len()].copy_from_slice(tail);
        self.pending_len = tail.len();
        Ok(())
    }

    /// Delivers complete groups. A trailing partial group stays pending.
    fn flush(&mut self) -> Result<()> {
        self.writer.flush()?;
        self.writer.get_mut().flush()
    }

    fn end(&mut self) -> Result<bool> {
        self.writer.get_mut().end()
    }
}

impl<S: Stream> Overlay for Base64Encoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.writer.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.writer.get_mut()
    }
}

impl<S: Stream> Drop for Base64Encoder<S> {
    fn drop(&mut self) {
        if let Err(e) = self.finish() {
            log::warn!("Base64Encoder: finish on drop failed: {}", e);
        }
    }
}

/// Reads Base64 text from `S` and yields the decoded bytes.
///
/// After a padded group the decoder is finished: it returns no more bytes
/// and does not look at the wrapped stream again.
pub struct Base64Decoder<S: Stream> {
    reader: CharReader<S>,
    tolerance: Tolerance,
    pending: [u8; 3],
    pos: usize,
    len: usize,
    finished: bool,
}

impl<S: Stream> Base64Decoder<S> {
    pub fn new(inner: S, tolerance: Tolerance) -> Self {
        Self {
            reader: CharReader::new(inner),
            tolerance,
            pending: [0; 3],
            pos: 0,
            len: 0,
            finished: false,
        }
    }

    /// True once a padded group has been decoded.
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn into_inner(self) -> S {
        self.reader.into_inner()
    }
}

impl<S: Stream> Stream for Base64Decoder<S> {
    fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        let mut done = 0;
        while done < buf.len() {
            if self.pos < self.len {
                let n = (self.len - self.pos).min(buf.len() - done);
                buf[done..done + n].copy_from_slice(&self.pending[self.pos..self.pos + n]);
                self.pos += n;
                done += n;
                continue;
            }
            if self.finished {
                break;
            }
            match read_group(&mut self.reader, self.tolerance)? {
                Some(group) => {
                    self.pending = group.bytes;
                    self.pos = 0;
                    self.len = group.len;
                    self.finished = group.padded;
                }
                None => break,
            }
        }
        Ok(done)
    }

    fn end(&mut self) -> Result<bool> {
        if self.pos < self.len {
            return Ok(false);
        }
        Ok(self.finished || self.reader.end()?)
    }
}

impl<S: Stream> Overlay for Base64Decoder<S> {
    type Inner = S;

    fn get_ref(&self) -> &S {
        self.reader.get_ref()
    }

    fn get_mut(&mut self) -> &mut S {
        self.reader.get_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::VecStream;

    #[test]
    fn test_rfc4648_vectors() {
        let cases: [(&str, &str); 7] = [
            ("", ""),
            ("f", "Zg=="),
            ("fo", "Zm8="),
            ("foo", "Zm9v"),
            ("foob", "Zm9vYg=="),
            ("fooba", "Zm9vYmE="),
            ("foobar", "Zm9vYmFy"),
        ];
        for (plain, text) in cases {
            assert_eq!(encode(plain.as_bytes()), text);
            assert_eq!(decode(text, Tolerance::None).unwrap(), plain.as_bytes());
            assert_eq!(decode_length(text.as_bytes(), Tolerance::None), Some(plain.len()));
            assert_eq!(encode_length(plain.len()), Some(text.len()));
        }
    }

    #[test]
    fn test_misplaced_padding() {
        for text in ["=AAA", "A=AA", "AA=A"] {
            assert!(
                matches!(
                    decode(text, Tolerance::None),
                    Err(Error::InvalidCharacter { byte: b'=', .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn test_truncated_input() {
        assert!(matches!(
            decode("Zm9", Tolerance::None),
            Err(Error::UnexpectedEnd { requested: 4, available: 3 })
        ));
        assert!(matches!(
            decode("Zm9v=", Tolerance::None),
            Err(Error::UnexpectedEnd { requested: 4, available: 1 })
        ));
    }

    #[test]
    fn test_tolerance_modes() {
        let text = "Zm9v\nYmFy";
        assert!(matches!(
            decode(text, Tolerance::None),
            Err(Error::InvalidCharacter { byte: b'\n', .. })
        ));
        assert_eq!(decode(text, Tolerance::Whitespace).unwrap(), b"foobar");
        assert!(decode("Zm9v*YmFy", Tolerance::Whitespace).is_err());
        assert_eq!(decode("Zm9v*YmFy", Tolerance::All).unwrap(), b"foobar");
    }

    #[test]
    fn test_decode_length_lenient() {
        assert_eq!(decode_length(b"Zm9v\nYg==\n", Tolerance::Whitespace), Some(4));
        assert_eq!(decode_length(b"Zm9vY", Tolerance::All), None);
        assert_eq!(decode_length(b"Zm9vY", Tolerance::None), None);
        assert_eq!(decode_length(b"Z===", Tolerance::All), None);
    }

    #[test]
    fn test_stops_after_padding() {
        assert_eq!(decode("Zg==Zm9v", Tolerance::None).unwrap(), b"f");

        let mut dec = Base64Decoder::new(VecStream::from(b"Zg==@@@@".to_vec()), Tolerance::None);
        let mut buf = [0u8; 8];
        assert_eq!(dec.read(&mut buf).unwrap(), 1);
        assert!(dec.is_finished());
        assert!(dec.end().unwrap());
        assert_eq!(dec.read(&mut buf).unwrap(), 0);
    }

    #[test]
    fn test_decoder_serves_partial_groups() {
        let mut dec = Base64Decoder::new(VecStream::from(b"Zm9vYmFy".to_vec()), Tolerance::None);
        let mut two = [0u8; 2];
        assert_eq!(dec.read(&mut two).unwrap(), 2);
        assert_eq!(&two, b"fo");
        assert!(!dec.end().unwrap());
        assert_eq!(dec.read(&mut two).unwrap(), 2);
        assert_eq!(&two, b"ob");
        assert_eq!(dec.read(&mut two).unwrap(), 2);
        assert_eq!(&two, b"ar");
        assert!(dec.end().unwrap());
        assert_eq!(dec.read(&mut two).unwrap(), 0);
    }

    #[test]
    fn test_encoder_pending_bytes_across_writes() {
        let mut sink = VecStream::new();
        let mut enc = Base64Encoder::new(&mut sink);
        for b in b"foobar!" {
            enc.write(std::slice::from_ref(b)).unwrap();
        }
        enc.finish().unwrap();
        assert!(matches!(enc.write(b"x"), Err(Error::Finished { .. })));
        drop(enc);
        assert_eq!(sink.as_slice(), b"Zm9vYmFyIQ==");
    }

    #[test]
    fn test_encoder_finishes_on_drop() {
        let mut sink = VecStream::new();
        {
            let mut enc = Base64Encoder::new(&mut sink);
            enc.write(b"fo").unwrap();
        }
        assert_eq!(sink.as_slice(), b"Zm8=");

        let mut enc = Base64Encoder::new(VecStream::new());
        enc.write(b"foob").unwrap();
        let inner = enc.into_inner().unwrap();
        assert_eq!(inner.as_slice(), b"Zm9vYg==");
    }
}
