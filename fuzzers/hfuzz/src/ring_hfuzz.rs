use honggfuzz::fuzz;
use layerstream::{RingBuffer, Stream};
use std::collections::VecDeque;

/// Each input byte is an operation on a small ring, checked against a deque.
fn run(data: &[u8]) {
    let mut ring = RingBuffer::new(13);
    let mut model = VecDeque::new();
    let mut buf = [0u8; 16];

    for (i, &op) in data.iter().enumerate() {
        let n = (op & 0x0F) as usize;
        match op >> 6 {
            0 | 1 => {
                let chunk: Vec<u8> = (0..n).map(|k| (i + k) as u8).collect();
                let fits = model.len() + n <= ring.capacity();
                assert_eq!(ring.write(&chunk).is_ok(), fits);
                if fits {
                    model.extend(chunk);
                }
            }
            2 => {
                let got = ring.read(&mut buf[..n]).unwrap_or(0);
                let expected: Vec<u8> = model.drain(..got).collect();
                assert_eq!(&buf[..got], &expected[..]);
                assert_eq!(got, n.min(got + model.len()));
            }
            _ => {
                let skipped = ring.skip(n).unwrap_or(0);
                model.drain(..skipped);
            }
        }
        assert_eq!(ring.len(), model.len());
    }
}

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            run(data);
        });
    }
}
