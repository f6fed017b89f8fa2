#![allow(dead_code)]

use std::path::Path;

use hound::{SampleFormat, WavSpec, WavWriter};
use image::{Rgb, RgbImage};

/// writes `count` PNG frames with a deterministic texture into `dir`
pub fn write_frames(dir: &Path, count: usize, width: u32, height: u32) {
    std::fs::create_dir_all(dir).expect("Failed to create frame directory");
    for i in 0..count {
        let frame = RgbImage::from_fn(width, height, |x, y| {
            let v = (x as usize * 7 + y as usize * 13 + i * 31) % 251;
            Rgb([v as u8, (v * 3 % 256) as u8, (255 - v) as u8])
        });
        frame
            .save(dir.join(format!("{i:04}.png")))
            .expect("Failed to write frame");
    }
}

/// a 16 bit PCM WAV with two sines on every channel
pub fn write_wav(path: &Path, frames: usize, channels: u16) {
    let spec = WavSpec {
        channels,
        sample_rate: 44100,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut writer = WavWriter::create(path, spec).expect("Failed to create WAV");
    for i in 0..frames {
        let t = i as f64 / 44100.0;
        for channel in 0..channels {
            let sample = (2.0 * std::f64::consts::PI * 440.0 * t).sin() * 8000.0
                + (2.0 * std::f64::consts::PI * (900.0 + 300.0 * f64::from(channel)) * t).sin()
                    * 2500.0;
            writer
                .write_sample(sample as i16)
                .expect("Failed to write sample");
        }
    }
    writer.finalize().expect("Failed to finalize WAV");
}

pub fn read_wav_samples(path: &Path) -> Vec<i16> {
    hound::WavReader::open(path)
        .expect("Failed to open WAV")
        .samples::<i16>()
        .collect::<Result<_, _>>()
        .expect("Failed to read samples")
}
