// tests/integration_tests.rs

use layerstream::*;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Cursor, Read};
use tempfile::NamedTempFile;

#[test]
fn test_file_round_trip_through_base64_and_md5() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();
    let payload: Vec<u8> = (0..50_000u32).map(|i| (i * 31 % 256) as u8).collect();

    // Encode to the file while digesting the plain bytes.
    let expected = {
        let file = IoWriter::new(BufWriter::new(File::create(path).unwrap()));
        let mut encoder = Base64Encoder::new(file);
        let mut md5 = Md5::new();
        {
            let mut multi = MultiWriter::new();
            multi.add(&mut encoder);
            multi.add(&mut md5);
            for chunk in payload.chunks(997) {
                multi.write(chunk).unwrap();
            }
        }
        let mut file = encoder.into_inner().unwrap();
        file.flush().unwrap();
        md5.finish()
    };
    assert_eq!(expected, Md5::calculate(&payload));

    // Decode from the file, digesting what comes out.
    let reader = IoReader::new(BufReader::new(File::open(path).unwrap()));
    let mut decoder = reader.base64_decoded(Tolerance::None);
    let mut md5 = Md5::new();
    let copied = copy_to_end(&mut md5, &mut decoder).unwrap();
    assert_eq!(copied, payload.len() as u64);
    assert!(decoder.end().unwrap());
    assert_eq!(md5.finish(), expected);
}

#[test]
fn test_prefixed_records_in_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let mut out = IoWriter::new(BufWriter::new(File::create(path).unwrap()));
        for i in 0..3 {
            out.write_prefixed_u16(format!("message {}", i).as_bytes())
                .unwrap();
            out.write_bool(i % 2 == 0).unwrap();
        }
        out.flush().unwrap();
    }

    let mut input = IoReader::new(File::open(path).unwrap()).counted();
    let mut count = 0;
    while !input.end().unwrap() {
        let record = input.read_prefixed_u16().unwrap();
        let flag = input.read_bool().unwrap();
        assert_eq!(record, format!("message {}", count).as_bytes());
        assert_eq!(flag, count % 2 == 0);
        count += 1;
    }
    assert_eq!(count, 3);
    // Three records of 2 + 9 + 1 bytes.
    assert_eq!(input.read_count(), 36);
}

#[test]
fn test_limit_caps_a_file_read() {
    let temp_file = NamedTempFile::new().unwrap();
    std::fs::write(temp_file.path(), b"header|body that must not be touched").unwrap();

    let file = IoReader::new(File::open(temp_file.path()).unwrap());
    let mut header = file.limited(0, 7);
    let mut out = Vec::new();
    assert_eq!(header.read_to_end(&mut out).unwrap(), 7);
    assert_eq!(out, b"header|");
    assert!(header.end().unwrap());
    assert_eq!(header.remaining_read(), 0);
}

#[test]
fn test_std_copy_into_encoder_chain() {
    let mut text = VecStream::new();
    {
        let encoder = HexEncoder::new(&mut text, Case::Lower);
        let mut sink = StreamIo::new(encoder);
        let copied = io::copy(&mut Cursor::new(b"\x00\x10\xfe".to_vec()), &mut sink).unwrap();
        assert_eq!(copied, 3);
        sink.into_inner().into_inner().unwrap();
    }
    assert_eq!(text.as_slice(), b"0010fe");

    text.rewind().unwrap();
    let mut source = StreamIo::new(HexDecoder::new(&mut text, Tolerance::None));
    let mut plain = Vec::new();
    source.read_to_end(&mut plain).unwrap();
    assert_eq!(plain, b"\x00\x10\xfe");
}

#[test]
fn test_std_io_sees_stream_errors() {
    let mut storage = [0u8; 4];
    let mut sink = StreamIo::new(MemoryStream::new(&mut storage));
    let err = io::Write::write_all(&mut sink, b"too long").unwrap_err();
    assert_eq!(err.kind(), io::ErrorKind::Other);
    let inner = err.into_inner().unwrap();
    let inner = inner.downcast::<Error>().unwrap();
    assert!(matches!(*inner, Error::Capacity { requested: 8, available: 4 }));
}

#[test]
fn test_memory_stream_supports_in_place_rewrite() {
    let mut storage = [0u8; 12];
    let mut s = MemoryStream::new(&mut storage);
    s.write(b"length:?").unwrap();
    s.write_prefixed_u8(b"abc").unwrap();
    let size = s.size().unwrap();

    // Patch the placeholder, then return to the end.
    assert_eq!(s.remaining(), 0);
    s.seek_relative(-5).unwrap();
    s.write(b"4").unwrap();
    s.seek_from_end(0).unwrap();
    assert_eq!(s.position().unwrap(), size);
    assert_eq!(s.as_slice(), b"length:4\x03abc");

    s.rewind().unwrap();
    s.skip_exact(8).unwrap();
    assert_eq!(s.read_prefixed_u8().unwrap(), b"abc");
    assert!(s.end().unwrap());
}

#[test]
fn test_vec_stream_truncate_and_clear() {
    let mut s = VecStream::from(b"keep|drop".to_vec());
    s.set_position(4).unwrap();
    s.truncate().unwrap();
    assert_eq!(s.as_slice(), b"keep");
    assert!(s.end().unwrap());

    s.clear().unwrap();
    assert_eq!(s.size().unwrap(), 0);
    assert_eq!(s.position().unwrap(), 0);
}
