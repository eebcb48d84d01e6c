//! Streaming digests and the `Checksum` trait.
//!
//! `JenkinsHash`, `Crc32` and `Md5` are write-only streams: each `write`
//! folds bytes into the running state and the result is extracted at the
//! end. Each also has a one-shot form through [`Checksum::calculate`].

use crate::error::{Error, Result};
use crate::stream::Stream;
use std::fmt;
use std::str::FromStr;

/// A trait for checksum algorithms.
pub trait Checksum {
    type Output: PartialEq + fmt::Display;

    /// Calculates the checksum for the given payload.
    fn calculate(payload: &[u8]) -> Self::Output;

    /// Verifies the checksum. Returns `Ok(())` if it matches.
    fn verify(expected: &Self::Output, payload: &[u8]) -> Result<()> {
        let calculated = Self::calculate(payload);
        if calculated == *expected {
            Ok(())
        } else {
            Err(Error::checksum_mismatch(expected, calculated))
        }
    }
}

//--- Jenkins one-at-a-time ---

/// Bob Jenkins' one-at-a-time hash.
///
/// `finish` mixes the final avalanche into the running state, so it is
/// meant to be called once per sequence; `reset` starts a new one.
#[derive(Debug, Default, Clone)]
pub struct JenkinsHash {
    state: u32,
}

impl JenkinsHash {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, data: &[u8]) {
        let mut h = self.state;
        for &b in data {
            h = h.wrapping_add(u32::from(b));
            h = h.wrapping_add(h << 10);
            h ^= h >> 6;
        }
        self.state = h;
    }

    pub fn finish(&mut self) -> u32 {
        let mut h = self.state;
        h = h.wrapping_add(h << 3);
        h ^= h >> 11;
        h = h.wrapping_add(h << 15);
        self.state = h;
        h
    }

    pub fn reset(&mut self) {
        self.state = 0;
    }
}

impl Stream for JenkinsHash {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.update(data);
        Ok(())
    }
}

impl Checksum for JenkinsHash {
    type Output = u32;

    fn calculate(payload: &[u8]) -> u32 {
        let mut hash = Self::new();
        hash.update(payload);
        hash.finish()
    }
}

//--- CRC-32 ---

const CRC32_TABLE: [u32; 256] = build_crc32_table();

const fn build_crc32_table() -> [u32; 256] {
    let mut table = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        let mut crc = i as u32;
        let mut bit = 0;
        while bit < 8 {
            crc = if crc & 1 != 0 {
                (crc >> 1) ^ 0xEDB8_8320
            } else {
                crc >> 1
            };
            bit += 1;
        }
        table[i] = crc;
        i += 1;
    }
    table
}

/// Reflected CRC-32 (IEEE 802.3, as used by zip and PNG).
///
/// `result` can be read at any point without disturbing accumulation.
#[derive(Debug, Clone)]
pub struct Crc32 {
    crc: u32,
}

impl Default for Crc32 {
    fn default() -> Self {
        Self { crc: 0xFFFF_FFFF }
    }
}

impl Crc32 {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, data: &[u8]) {
        let mut crc = self.crc;
        for &b in data {
            crc = CRC32_TABLE[((crc ^ u32::from(b)) & 0xFF) as usize] ^ (crc >> 8);
        }
        self.crc = crc;
    }

    pub fn result(&self) -> u32 {
        !self.crc
    }

    pub fn reset(&mut self) {
        self.crc = 0xFFFF_FFFF;
    }
}

impl Stream for Crc32 {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        self.update(data);
        Ok(())
    }
}

impl Checksum for Crc32 {
    type Output = u32;

    fn calculate(payload: &[u8]) -> u32 {
        let mut crc = Self::new();
        crc.update(payload);
        crc.result()
    }
}

//--- MD5 ---

/// A 128-bit MD5 digest.
///
/// Displays as 32 lowercase hex digits; `{:X}` gives upper case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Md5Sum([u8; 16]);

impl Md5Sum {
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl From<[u8; 16]> for Md5Sum {
    fn from(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }
}

impl From<Md5Sum> for [u8; 16] {
    fn from(sum: Md5Sum) -> Self {
        sum.0
    }
}

impl fmt::Display for Md5Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::LowerHex::fmt(self, f)
    }
}

impl fmt::LowerHex for Md5Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::hex::encode(&self.0, crate::codec::Case::Lower))
    }
}

impl fmt::UpperHex for Md5Sum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::codec::hex::encode(&self.0, crate::codec::Case::Upper))
    }
}

impl FromStr for Md5Sum {
    type Err = Error;

    /// Parses 32 hex digits in either case.
    fn from_str(s: &str) -> Result<Self> {
        crate::codec::hex::parse_exact::<16>(s).map(Self)
    }
}

const MD5_INIT: [u32; 4] = [0x6745_2301, 0xEFCD_AB89, 0x98BA_DCFE, 0x1032_5476];

/// Per-step left-rotation amounts, four per round.
const MD5_SHIFTS: [[u32; 4]; 4] = [[7, 12, 17, 22], [5, 9, 14, 20], [4, 11, 16, 23], [6, 10, 15, 21]];

/// `floor(abs(sin(i + 1)) * 2^32)`.
const MD5_K: [u32; 64] = [
    0xd76a_a478, 0xe8c7_b756, 0x2420_70db, 0xc1bd_ceee, 0xf57c_0faf, 0x4787_c62a, 0xa830_4613,
    0xfd46_9501, 0x6980_98d8, 0x8b44_f7af, 0xffff_5bb1, 0x895c_d7be, 0x6b90_1122, 0xfd98_7193,
    0xa679_438e, 0x49b4_0821, 0xf61e_2562, 0xc040_b340, 0x265e_5a51, 0xe9b6_c7aa, 0xd62f_105d,
    0x0244_1453, 0xd8a1_e681, 0xe7d3_fbc8, 0x21e1_cde6, 0xc337_07d6, 0xf4d5_0d87, 0x455a_14ed,
    0xa9e3_e905, 0xfcef_a3f8, 0x676f_02d9, 0x8d2a_4c8a, 0xfffa_3942, 0x8771_f681, 0x6d9d_6122,
    0xfde5_380c, 0xa4be_ea44, 0x4bde_cfa9, 0xf6bb_4b60, 0xbebf_bc70, 0x289b_7ec6, 0xeaa1_27fa,
    0xd4ef_3085, 0x0488_1d05, 0xd9d4_d039, 0xe6db_99e5, 0x1fa2_7cf8, 0xc4ac_5665, 0xf429_2244,
    0x432a_ff97, 0xab94_23a7, 0xfc93_a039, 0x655b_59c3, 0x8f0c_cc92, 0xffef_f47d, 0x8584_5dd1,
    0x6fa8_7e4f, 0xfe2c_e6e0, 0xa301_4314, 0x4e08_11a1, 0xf753_7e82, 0xbd3a_f235, 0x2ad7_d2bb,
    0xeb86_d391,
];

fn md5_compress(state: &mut [u32; 4], block: &[u8; 64]) {
    let mut m = [0u32; 16];
    for (word, bytes) in m.iter_mut().zip(block.chunks_exact(4)) {
        *word = u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]);
    }

    let [mut a, mut b, mut c, mut d] = *state;
    for i in 0..64 {
        let round = i / 16;
        let (f, g) = match round {
            0 => ((b & c) | (!b & d), i),
            1 => ((d & b) | (!d & c), (5 * i + 1) % 16),
            2 => (b ^ c ^ d, (3 * i + 5) % 16),
            _ => (c ^ (b | !d), (7 * i) % 16),
        };
        let rotated = a
            .wrapping_add(f)
            .wrapping_add(MD5_K[i])
            .wrapping_add(m[g])
            .rotate_left(MD5_SHIFTS[round][i % 4]);
        a = d;
        d = c;
        c = b;
        b = b.wrapping_add(rotated);
    }

    state[0] = state[0].wrapping_add(a);
    state[1] = state[1].wrapping_add(b);
    state[2] = state[2].wrapping_add(c);
    state[3] = state[3].wrapping_add(d);
}

/// RFC 1321 MD5.
///
/// `finish` pads and returns the digest; it can be called repeatedly and
/// returns the same value. After it, writes fail with `Finished` until
/// `reset`.
#[derive(Debug, Clone)]
pub struct Md5 {
    state: [u32; 4],
    buffer: [u8; 64],
    buffered: usize,
    total: u64,
    digest: Option<Md5Sum>,
}

impl Default for Md5 {
    fn default() -> Self {
        Self {
            state: MD5_INIT,
            buffer: [0; 64],
            buffered: 0,
            total: 0,
            digest: None,
        }
    }
}

impl Md5 {
    pub fn new() -> Self {
        Self::default()
    }

    fn update(&mut self, mut data: &[u8]) {
        self.total = self.total.wrapping_add(data.len() as u64);

        if self.buffered > 0 {
            let take = (64 - self.buffered).min(data.len());
            self.buffer[self.buffered..self.buffered + take].copy_from_slice(&data[..take]);
            self.buffered += take;
            data = &data[take..];
            if self.buffered < 64 {
                return;
            }
            let block = self.buffer;
            md5_compress(&mut self.state, &block);
            self.buffered = 0;
        }

        let mut blocks = data.chunks_exact(64);
        for block in &mut blocks {
            let mut full = [0u8; 64];
            full.copy_from_slice(block);
            md5_compress(&mut self.state, &full);
        }
        let rest = blocks.remainder();
        self.buffer[..rest.len()].copy_from_slice(rest);
        self.buffered = rest.len();
    }

    pub fn finish(&mut self) -> Md5Sum {
        if let Some(digest) = self.digest {
            return digest;
        }
        let bit_len = self.total.wrapping_mul(8);
        let pad_len = if self.buffered < 56 {
            56 - self.buffered
        } else {
            120 - self.buffered
        };
        let mut padding = [0u8; 72];
        padding[0] = 0x80;
        padding[pad_len..pad_len + 8].copy_from_slice(&bit_len.to_le_bytes());
        self.update(&padding[..pad_len + 8]);
        debug_assert_eq!(self.buffered, 0);

        let mut out = [0u8; 16];
        for (chunk, word) in out.chunks_exact_mut(4).zip(self.state) {
            chunk.copy_from_slice(&word.to_le_bytes());
        }
        let digest = Md5Sum(out);
        self.digest = Some(digest);
        digest
    }

    pub fn is_finished(&self) -> bool {
        self.digest.is_some()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Stream for Md5 {
    fn write(&mut self, data: &[u8]) -> Result<()> {
        if self.digest.is_some() {
            return Err(Error::Finished { stream: self.kind() });
        }
        self.update(data);
        Ok(())
    }
}

impl Checksum for Md5 {
    type Output = Md5Sum;

    fn calculate(payload: &[u8]) -> Md5Sum {
        let mut md5 = Self::new();
        md5.update(payload);
        md5.finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_jenkins_known_values() {
        assert_eq!(JenkinsHash::calculate(b""), 0);
        assert_eq!(JenkinsHash::calculate(b"a"), 0xca2e_9442);
        assert_eq!(
            JenkinsHash::calculate(b"The quick brown fox jumps over the lazy dog"),
            0x519e_91f5
        );
    }

    #[test]
    fn test_jenkins_incremental_matches_one_shot() {
        let mut hash = JenkinsHash::new();
        hash.write(b"The quick brown ").unwrap();
        hash.write(b"fox jumps over the lazy dog").unwrap();
        assert_eq!(hash.finish(), 0x519e_91f5);
        hash.reset();
        assert_eq!(hash.finish(), 0);
    }

    #[test]
    fn test_jenkins_reset_repeats_the_sequence() {
        let mut hash = JenkinsHash::new();
        hash.write(b"repeatable").unwrap();
        let first = hash.finish();
        hash.reset();
        hash.write(b"repeatable").unwrap();
        assert_eq!(hash.finish(), first);
        assert_eq!(first, JenkinsHash::calculate(b"repeatable"));
    }

    #[test]
    fn test_crc32_check_value() {
        assert_eq!(Crc32::calculate(b""), 0);
        assert_eq!(Crc32::calculate(b"123456789"), 0xCBF4_3926);
    }

    #[test]
    fn test_crc32_result_is_non_destructive() {
        let mut crc = Crc32::new();
        crc.write(b"1234").unwrap();
        let partial = crc.result();
        assert_eq!(partial, crc.result());
        crc.write(b"56789").unwrap();
        assert_eq!(crc.result(), 0xCBF4_3926);
        crc.reset();
        assert_eq!(crc.result(), 0);
    }

    #[test]
    fn test_crc32_reset_repeats_the_sequence() {
        let mut crc = Crc32::new();
        crc.write(b"repeatable").unwrap();
        let first = crc.result();
        crc.reset();
        crc.write(b"repeatable").unwrap();
        assert_eq!(crc.result(), first);
        assert_eq!(first, crc32fast::hash(b"repeatable"));
    }

    #[test]
    fn test_md5_rfc1321_suite() {
        let cases = [
            ("", "d41d8cd98f00b204e9800998ecf8427e"),
            ("a", "0cc175b9c0f1b6a831c399e269772661"),
            ("abc", "900150983cd24fb0d6963f7d28e17f72"),
            ("message digest", "f96b697d7cb7938d525a2f31aaf161d0"),
            ("abcdefghijklmnopqrstuvwxyz", "c3fcd3d76192e4007dfb496cca67e13b"),
            (
                "12345678901234567890123456789012345678901234567890123456789012345678901234567890",
                "57edf4a22be3c955ac49da2e2107b67a",
            ),
        ];
        for (input, expected) in cases {
            assert_eq!(Md5::calculate(input.as_bytes()).to_string(), expected, "{input:?}");
        }
    }

    #[test]
    fn test_md5_finish_locks_until_reset() {
        let mut md5 = Md5::new();
        md5.write(b"ab").unwrap();
        md5.write(b"c").unwrap();
        let first = md5.finish();
        assert_eq!(md5.finish(), first);
        assert!(matches!(md5.write(b"more"), Err(Error::Finished { .. })));

        md5.reset();
        md5.write(b"abc").unwrap();
        assert_eq!(md5.finish(), first);
    }

    #[test]
    fn test_md5_block_boundaries() {
        // Lengths around the 56-byte padding threshold and the 64-byte block size.
        let data = vec![0x61u8; 130];
        for len in [55, 56, 57, 63, 64, 65, 119, 120, 128] {
            let mut chunked = Md5::new();
            for piece in data[..len].chunks(7) {
                chunked.write(piece).unwrap();
            }
            assert_eq!(chunked.finish(), Md5::calculate(&data[..len]), "len {len}");
        }
    }

    #[test]
    fn test_md5_sum_text_forms() {
        let sum = Md5::calculate(b"abc");
        assert_eq!(format!("{sum:X}"), "900150983CD24FB0D6963F7D28E17F72");
        assert_eq!("900150983CD24FB0D6963F7D28E17F72".parse::<Md5Sum>().unwrap(), sum);
        assert!("9001".parse::<Md5Sum>().is_err());
        assert!("zz".parse::<Md5Sum>().is_err());
    }

    #[test]
    fn test_verify() {
        assert!(Crc32::verify(&0xCBF4_3926, b"123456789").is_ok());
        let err = Md5::verify(&Md5Sum::default(), b"abc").unwrap_err();
        assert!(matches!(err, Error::ChecksumMismatch { .. }));
    }

    #[test]
    fn test_digests_are_write_only() {
        let mut buf = [0u8; 1];
        assert!(matches!(JenkinsHash::new().read(&mut buf), Err(Error::Unsupported { .. })));
        assert!(matches!(Crc32::new().read(&mut buf), Err(Error::Unsupported { .. })));
        assert!(matches!(Md5::new().read(&mut buf), Err(Error::Unsupported { .. })));
    }
}
