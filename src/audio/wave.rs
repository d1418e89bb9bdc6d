//! Mono waveform buffer and WAV serialization.

use std::io::Cursor;
use std::path::Path;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use super::AudioError;

/// A mono audio buffer at a fixed sample rate.
///
/// Waveforms come from the model client (decoded synthesis output) or
/// from [`Waveform::concat`]; they are never resampled in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Waveform {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl Waveform {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }

    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn duration_secs(&self) -> f32 {
        self.samples.len() as f32 / self.sample_rate as f32
    }

    /// Join segments along the time axis, in the order given.
    ///
    /// Returns `None` for an empty slice. The first segment's sample rate
    /// carries over; callers feed segments produced by the same model.
    pub fn concat(segments: &[Waveform]) -> Option<Waveform> {
        let first = segments.first()?;
        let total = segments.iter().map(Waveform::len).sum();

        let mut samples = Vec::with_capacity(total);
        for segment in segments {
            samples.extend_from_slice(&segment.samples);
        }

        Some(Waveform::new(samples, first.sample_rate))
    }

    /// Decode a WAV byte buffer, downmixing to mono.
    ///
    /// Accepts 16/24/32-bit integer and 32-bit float PCM, the formats the
    /// model server is known to return.
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self, AudioError> {
        let reader = WavReader::new(Cursor::new(bytes))?;
        let spec = reader.spec();
        let channels = spec.channels as usize;

        let interleaved: Vec<f32> = match (spec.sample_format, spec.bits_per_sample) {
            (SampleFormat::Float, 32) => reader
                .into_samples::<f32>()
                .collect::<Result<_, _>>()
                .map_err(AudioError::Wav)?,
            (SampleFormat::Int, bits) if bits <= 32 => {
                let scale = (1u64 << (bits - 1)) as f32;
                reader
                    .into_samples::<i32>()
                    .map(|s| s.map(|v| v as f32 / scale))
                    .collect::<Result<_, _>>()
                    .map_err(AudioError::Wav)?
            }
            (format, bits) => {
                return Err(AudioError::Decode(format!(
                    "unsupported WAV sample format: {format:?} {bits}-bit"
                )));
            }
        };

        let samples = if channels <= 1 {
            interleaved
        } else {
            interleaved
                .chunks(channels)
                .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                .collect()
        };

        Ok(Waveform::new(samples, spec.sample_rate))
    }

    /// Read a WAV file from disk.
    pub fn read_wav(path: &Path) -> Result<Self, AudioError> {
        let bytes = std::fs::read(path)?;
        Self::from_wav_bytes(&bytes)
    }

    /// Persist as a mono 32-bit float WAV file.
    pub fn write_wav(&self, path: &Path) -> Result<(), AudioError> {
        let spec = WavSpec {
            channels: 1,
            sample_rate: self.sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };

        let mut writer = WavWriter::create(path, spec)?;
        for &sample in &self.samples {
            writer.write_sample(sample)?;
        }
        writer.finalize()?;

        Ok(())
    }
}
