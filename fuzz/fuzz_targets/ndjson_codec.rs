#![no_main]

use adminscan_stream::NdjsonCodec;
use arbitrary::Arbitrary;
use bytes::BytesMut;
use libfuzzer_sys::fuzz_target;
use tokio_util::codec::Decoder;

#[derive(Debug, Arbitrary)]
struct Input {
    chunks: Vec<Vec<u8>>,
    max_length: u16,
}

fuzz_target!(|input: Input| {
    let mut codec = NdjsonCodec::with_max_length(usize::from(input.max_length).max(1));
    let mut buf = BytesMut::new();

    for chunk in &input.chunks {
        buf.extend_from_slice(chunk);
        loop {
            match codec.decode(&mut buf) {
                Ok(Some(_)) => continue,
                Ok(None) => break,
                Err(_) => return,
            }
        }
    }
    while let Ok(Some(_)) = codec.decode_eof(&mut buf) {}
});
