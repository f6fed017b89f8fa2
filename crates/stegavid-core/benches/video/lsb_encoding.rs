use criterion::{criterion_group, criterion_main, Criterion};
use stegavid_core::cursor::EmbeddingCursor;
use stegavid_core::media::payload::{EnvelopeFormat, Metadata, Payload};
use stegavid_core::media::video::{Frame, LsbFrameCodec};
use stegavid_core::media::ChannelSelection;

pub fn frame_lsb_encoding(c: &mut Criterion) {
    c.bench_function("Frame LSB Encoding", |b| {
        let (width, height) = (640, 360);
        let data = (0..Frame::byte_len(width, height))
            .map(|i| (i % 251) as u8)
            .collect();
        let frame = Frame::new(width, height, data).expect("Invalid frame");
        let secret = vec![0x5au8; 64 * 1024];
        let metadata = Metadata {
            filename: "secret.bin".to_string(),
            size: secret.len() as u64,
            extension: ".bin".to_string(),
        };
        let envelope = EnvelopeFormat::FileInFrames
            .encode(&Payload::from_file_data(secret, metadata))
            .expect("Cannot frame secret file");
        let codec = LsbFrameCodec::new(ChannelSelection::All);

        b.iter(|| {
            let mut cursor = EmbeddingCursor::new(envelope.clone());
            let mut frame = frame.clone();
            while !cursor.is_exhausted() {
                codec.embed_frame(&mut frame, &mut cursor);
            }
        })
    });
}

criterion_group!(benches, frame_lsb_encoding);
criterion_main!(benches);
