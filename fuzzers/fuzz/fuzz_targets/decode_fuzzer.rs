#![no_main]
use layerstream::codec::{base64, binary, hex};
use layerstream::{
    Base64Decoder, BinDecoder, HexDecoder, Result, Stream, Tolerance, VecStream,
};
use libfuzzer_sys::fuzz_target;

const TOLERANCES: [Tolerance; 3] = [Tolerance::None, Tolerance::Whitespace, Tolerance::All];

/// The streaming and one-shot decoders must accept and reject the same input.
fn agree(one_shot: Result<Vec<u8>>, stream: &mut dyn Stream) {
    let mut streamed = Vec::new();
    match (one_shot, stream.read_to_end(&mut streamed)) {
        (Ok(expected), Ok(_)) => assert_eq!(streamed, expected),
        (Err(a), Err(b)) => assert_eq!(a.to_string(), b.to_string()),
        (a, b) => panic!("one-shot {:?} vs stream {:?}", a, b),
    }
}

fuzz_target!(|data: &[u8]| {
    for tolerance in TOLERANCES {
        agree(
            base64::decode(data, tolerance),
            &mut Base64Decoder::new(VecStream::from(data), tolerance),
        );
        agree(
            hex::decode(data, tolerance),
            &mut HexDecoder::new(VecStream::from(data), tolerance),
        );
        agree(
            binary::decode(data, tolerance),
            &mut BinDecoder::new(VecStream::from(data), tolerance),
        );

        // Text after a padded group is ignored, so the length is an upper bound.
        if let (Some(len), Ok(decoded)) = (
            base64::decode_length(data, tolerance),
            base64::decode(data, tolerance),
        ) {
            assert!(decoded.len() <= len);
        }
    }
});
