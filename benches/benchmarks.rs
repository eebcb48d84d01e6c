use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use layerstream::codec::{base64, hex};
use layerstream::*;

// Test data generation utilities
fn create_payload(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i.wrapping_mul(131) >> 3) as u8).collect()
}

const PAYLOAD_SIZES: [usize; 3] = [64, 4096, 65536];

// === BUFFERED ADAPTERS ===

fn bench_char_writer(c: &mut Criterion) {
    let mut group = c.benchmark_group("char_writer");
    let data = create_payload(65536);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("direct_byte_writes", |b| {
        b.iter(|| {
            let mut sink = VecStream::with_capacity(data.len());
            for &byte in &data {
                sink.write(&[byte]).unwrap();
            }
            black_box(sink);
        });
    });

    group.bench_function("buffered_byte_writes", |b| {
        b.iter(|| {
            let mut sink = VecStream::with_capacity(data.len());
            {
                let mut writer = CharWriter::new(&mut sink);
                for &byte in &data {
                    writer.write_byte(byte).unwrap();
                }
                writer.flush().unwrap();
            }
            black_box(sink);
        });
    });

    group.finish();
}

fn bench_char_reader(c: &mut Criterion) {
    let mut group = c.benchmark_group("char_reader");
    let data = create_payload(65536);
    group.throughput(Throughput::Bytes(data.len() as u64));

    group.bench_function("read_byte", |b| {
        b.iter(|| {
            let mut reader = CharReader::new(VecStream::from(data.as_slice()));
            let mut sum = 0u64;
            while let Some(byte) = reader.read_byte().unwrap() {
                sum += byte as u64;
            }
            black_box(sum);
        });
    });

    group.finish();
}

// === CODECS ===

fn bench_codecs(c: &mut Criterion) {
    let mut group = c.benchmark_group("codecs");

    for size in PAYLOAD_SIZES {
        let data = create_payload(size);
        let b64_text = base64::encode(&data);
        let hex_text = hex::encode(&data, Case::Upper);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("base64_stream_encode", size), &data, |b, data| {
            b.iter(|| {
                let mut out = VecStream::with_capacity(b64_text.len());
                let mut encoder = Base64Encoder::new(&mut out);
                encoder.write(data).unwrap();
                encoder.finish().unwrap();
                drop(encoder);
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("base64_stream_decode", size), &b64_text, |b, text| {
            b.iter(|| {
                let mut decoder =
                    Base64Decoder::new(VecStream::from(text.as_bytes()), Tolerance::None);
                let mut out = Vec::with_capacity(size);
                decoder.read_to_end(&mut out).unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("base64_static_decode", size), &b64_text, |b, text| {
            b.iter(|| black_box(base64::decode(text, Tolerance::None).unwrap()));
        });

        group.bench_with_input(BenchmarkId::new("hex_stream_decode", size), &hex_text, |b, text| {
            b.iter(|| {
                let mut decoder = HexDecoder::new(VecStream::from(text.as_bytes()), Tolerance::None);
                let mut out = Vec::with_capacity(size);
                decoder.read_to_end(&mut out).unwrap();
                black_box(out);
            });
        });

        group.bench_with_input(BenchmarkId::new("xor_stream", size), &data, |b, data| {
            b.iter(|| {
                let mut coder = XorCoder::new(VecStream::with_capacity(size), &b"secret"[..]).unwrap();
                coder.write(data).unwrap();
                black_box(coder.into_inner());
            });
        });
    }

    group.finish();
}

// === DIGESTS ===

fn bench_digests(c: &mut Criterion) {
    let mut group = c.benchmark_group("digests");

    for size in PAYLOAD_SIZES {
        let data = create_payload(size);
        group.throughput(Throughput::Bytes(size as u64));

        group.bench_with_input(BenchmarkId::new("jenkins", size), &data, |b, data| {
            b.iter(|| black_box(JenkinsHash::calculate(data)));
        });
        group.bench_with_input(BenchmarkId::new("crc32", size), &data, |b, data| {
            b.iter(|| black_box(Crc32::calculate(data)));
        });
        // Reference point for the table-driven CRC.
        group.bench_with_input(BenchmarkId::new("crc32fast", size), &data, |b, data| {
            b.iter(|| black_box(crc32fast::hash(data)));
        });
        group.bench_with_input(BenchmarkId::new("md5", size), &data, |b, data| {
            b.iter(|| black_box(Md5::calculate(data)));
        });
    }

    group.finish();
}

// === RING BUFFER ===

fn bench_ring_buffer(c: &mut Criterion) {
    let mut group = c.benchmark_group("ring_buffer");
    let data = create_payload(1 << 20);
    group.throughput(Throughput::Bytes(data.len() as u64));

    for chunk in [16usize, 256, 4096] {
        group.bench_with_input(BenchmarkId::new("write_read", chunk), &chunk, |b, &chunk| {
            let mut ring = RingBuffer::new(8192);
            let mut buf = vec![0u8; chunk];
            b.iter(|| {
                for piece in data.chunks(chunk) {
                    ring.write(piece).unwrap();
                    let n = ring.read(&mut buf).unwrap();
                    black_box(&buf[..n]);
                }
            });
        });
    }

    group.finish();
}

criterion_group!(
    benches,
    bench_char_writer,
    bench_char_reader,
    bench_codecs,
    bench_digests,
    bench_ring_buffer
);
criterion_main!(benches);
