use criterion::{criterion_group, criterion_main, Criterion};
use stegavid_core::cursor::EmbeddingCursor;
use stegavid_core::media::audio::DctCodec;
use stegavid_core::media::payload::{EnvelopeFormat, Payload};
use stegavid_core::media::DctCodecOptions;
use stegavid_core::progress::ProgressTracker;

pub fn audio_dct_encoding(c: &mut Criterion) {
    c.bench_function("Audio DCT Encoding to memory", |b| {
        let samples = (0..44_100 * 5)
            .map(|i| ((i as f64 * 0.0627).sin() * 9000.0) as i16)
            .collect::<Vec<i16>>();
        let envelope = EnvelopeFormat::TerminatedText
            .encode(&Payload::from_text("Hello World!"))
            .expect("Cannot frame secret message");
        let codec = DctCodec::new(&DctCodecOptions::default()).expect("Invalid codec options");

        b.iter(|| {
            let mut samples = samples.clone();
            let mut cursor = EmbeddingCursor::new(envelope.clone());
            codec
                .embed(&mut samples, &mut cursor, &mut ProgressTracker::silent())
                .expect("Cannot embed secret message");
        })
    });
}

criterion_group!(benches, audio_dct_encoding);
criterion_main!(benches);
