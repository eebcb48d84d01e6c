//! # layerstream
//!
//! Composable byte streams: a small [`Stream`] trait, decorators that wrap one
//! stream in another, text codecs, streaming checksums and a bounded ring
//! buffer.
//!
//! ## Overview
//!
//! Every component speaks the same two-method contract. `write` either takes
//! all of the bytes or fails; `read` returns up to the requested number of
//! bytes, and a short count means the data has run out. Anything a concrete
//! stream cannot do fails with [`Error::Unsupported`] naming its type, so a
//! mis-assembled chain is caught on first use.
//!
//! Decorators own their inner stream. Wrap `&mut inner` to keep ownership
//! with the caller; `&mut S` and `Box<S>` are streams themselves.
//!
//! ## Quick Start
//!
//! ```rust
//! use layerstream::*;
//!
//! fn main() -> Result<()> {
//!     // Write base64 text into memory while counting the encoded bytes.
//!     let mut text = VecStream::new();
//!     {
//!         let mut encoder = (&mut text).counted().base64_encoded();
//!         encoder.write(b"hello, world")?;
//!         encoder.finish()?;
//!         assert_eq!(encoder.get_ref().write_count(), 16);
//!     }
//!     assert_eq!(text.as_slice(), b"aGVsbG8sIHdvcmxk");
//!
//!     // Decode it again, tolerating line breaks in the text.
//!     text.rewind()?;
//!     let mut decoder = (&mut text).base64_decoded(Tolerance::Whitespace);
//!     let mut plain = Vec::new();
//!     decoder.read_to_end(&mut plain)?;
//!     assert_eq!(plain, b"hello, world");
//!
//!     // Checksums are write-only streams.
//!     let mut md5 = Md5::new();
//!     md5.write(&plain)?;
//!     println!("md5 = {}", md5.finish());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! * **[`Stream`] / [`SeekableStream`]**: the contract, plus provided helpers
//!   (length-prefixed strings, booleans, copying between streams)
//! * **Buffered adapters**: [`CharWriter`] and [`CharReader`] for byte-at-a-time work
//! * **Overlays**: [`CounterStream`], [`LimitStream`], [`MultiWriter`] and the
//!   codecs in [`codec`], composed fluently through [`StreamExt`]
//! * **Digests**: [`JenkinsHash`], [`Crc32`], [`Md5`]
//! * **[`RingBuffer`]**: fixed-capacity FIFO with back-pressure
//! * **[`io`]**: bridges to and from `std::io`

pub mod buffered;
pub mod checksum;
pub mod codec;
pub mod error;
pub mod io;
pub mod memory;
pub mod multi;
pub mod overlay;
pub mod ring;
pub mod stream;

// Re-export the main public API for user convenience.
pub use buffered::{CharReader, CharWriter};
pub use checksum::{Checksum, Crc32, JenkinsHash, Md5, Md5Sum};
pub use codec::{
    Base64Decoder, Base64Encoder, BinDecoder, BinEncoder, Case, HexDecoder, HexEncoder,
    Tolerance, XorCoder,
};
pub use error::{Error, Result, ResultExt};
pub use io::{IoReader, IoWriter, StreamIo};
pub use memory::{MemoryStream, VecStream};
pub use multi::{MultiWriter, StreamId};
pub use overlay::{CounterStream, LimitStream, Overlay, StreamExt};
pub use ring::RingBuffer;
pub use stream::{copy, copy_exact, copy_to_end, SeekableStream, Stream, DEFAULT_BLOCK_SIZE};
