use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::error;

use super::AudioGeometry;
use crate::error::StegError;
use crate::media::Persist;
use crate::result::Result;

/// 16 bit integer PCM audio, samples interleaved by channel
#[derive(Debug, Clone, PartialEq)]
pub struct WavAudio {
    spec: WavSpec,
    samples: Vec<i16>,
}

impl WavAudio {
    pub fn new(spec: WavSpec, samples: Vec<i16>) -> Result<Self> {
        ensure_16_bit_pcm(&spec)?;
        if spec.channels == 0 || samples.len() % spec.channels as usize != 0 {
            return Err(StegError::CarrierUnreadable(format!(
                "{} samples do not split into {} channels",
                samples.len(),
                spec.channels
            )));
        }

        Ok(Self { spec, samples })
    }

    pub fn open(path: &Path) -> Result<Self> {
        let reader = WavReader::open(path)
            .map_err(|e| StegError::CarrierUnreadable(format!("{path:?}: {e}")))?;

        Self::from_wav_reader(reader)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let reader = WavReader::new(reader)
            .map_err(|e| StegError::CarrierUnreadable(format!("invalid WAV data: {e}")))?;

        Self::from_wav_reader(reader)
    }

    fn from_wav_reader<R: Read>(mut reader: WavReader<R>) -> Result<Self> {
        let spec = reader.spec();
        ensure_16_bit_pcm(&spec)?;
        let samples = reader
            .samples::<i16>()
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| StegError::CarrierUnreadable(format!("invalid WAV samples: {e}")))?;

        Self::new(spec, samples)
    }

    pub fn spec(&self) -> WavSpec {
        self.spec
    }

    pub fn channels(&self) -> usize {
        self.spec.channels as usize
    }

    /// samples per channel
    pub fn frames(&self) -> usize {
        self.samples.len() / self.channels()
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn geometry(&self, block_size: usize) -> AudioGeometry {
        AudioGeometry {
            sample_count: self.frames(),
            channels: self.spec.channels,
            sample_rate: self.spec.sample_rate,
            block_size,
        }
    }

    /// the samples of one channel, de-interleaved
    pub fn channel(&self, index: usize) -> Vec<i16> {
        self.samples
            .iter()
            .skip(index)
            .step_by(self.channels())
            .copied()
            .collect()
    }

    /// writes a de-interleaved channel back, the other channels stay as they are
    pub fn set_channel(&mut self, index: usize, samples: &[i16]) {
        let channels = self.channels();
        for (target, sample) in self
            .samples
            .iter_mut()
            .skip(index)
            .step_by(channels)
            .zip(samples)
        {
            *target = *sample;
        }
    }

    pub fn save_to_writer<W: Write + Seek>(&self, writer: W) -> Result<()> {
        let mut wav_writer = WavWriter::new(writer, self.spec).map_err(|e| {
            error!("Error creating WAV writer: {e}");
            hound_write_error(e)
        })?;
        for sample in &self.samples {
            wav_writer.write_sample(*sample).map_err(hound_write_error)?;
        }
        wav_writer.finalize().map_err(hound_write_error)?;

        Ok(())
    }
}

impl Persist for WavAudio {
    fn save_as(&mut self, file: &Path) -> Result<()> {
        let f = File::create(file).map_err(|e| {
            error!("Error creating file {file:?}: {e}");
            StegError::WriteError { source: e }
        })?;
        self.save_to_writer(std::io::BufWriter::new(f))
    }
}

/// geometry from the WAV header alone, the samples are not read
pub fn probe_wav(path: &Path, block_size: usize) -> Result<AudioGeometry> {
    let reader = WavReader::new(BufReader::new(
        File::open(path).map_err(|e| StegError::CarrierUnreadable(format!("{path:?}: {e}")))?,
    ))
    .map_err(|e| StegError::CarrierUnreadable(format!("{path:?}: {e}")))?;
    let spec = reader.spec();
    ensure_16_bit_pcm(&spec)?;

    Ok(AudioGeometry {
        sample_count: reader.duration() as usize,
        channels: spec.channels,
        sample_rate: spec.sample_rate,
        block_size,
    })
}

fn ensure_16_bit_pcm(spec: &WavSpec) -> Result<()> {
    if spec.sample_format != SampleFormat::Int || spec.bits_per_sample != 16 {
        error!(
            "Unsupported WAV format: {:?} with {} bits per sample",
            spec.sample_format, spec.bits_per_sample
        );
        return Err(StegError::UnsupportedCarrier);
    }

    Ok(())
}

fn hound_write_error(e: hound::Error) -> StegError {
    match e {
        hound::Error::IoError(source) => StegError::WriteError { source },
        other => StegError::WriteError {
            source: std::io::Error::other(other),
        },
    }
}
