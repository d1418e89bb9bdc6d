//! Reference voice preparation for cloning.
//!
//! Turns an arbitrary audio file into the normalized form the model
//! expects: mono, silence-trimmed, duration-capped, at the model sample
//! rate, persisted as WAV at a collision-safe scratch path.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::conv::FromSample;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;

use super::{AudioError, Waveform, resample};

/// Sample rate the model expects for reference conditioning.
pub const MODEL_SAMPLE_RATE: u32 = 24_000;

/// Default cap on reference duration, in seconds.
pub const DEFAULT_MAX_REFERENCE_SECS: f32 = 10.0;

/// Silence threshold in dB below the loudest frame.
pub const TRIM_TOP_DB: f32 = 20.0;

/// Frame and hop sizes for the energy scan, in samples.
const TRIM_FRAME: usize = 2048;
const TRIM_HOP: usize = 512;

/// A normalized reference sample persisted for one run.
///
/// The file is owned by the run that created it; multi-sample batch runs
/// call [`PreparedReference::remove`] once the sample is finished.
#[derive(Debug)]
pub struct PreparedReference {
    path: PathBuf,
    duration_secs: f32,
}

impl PreparedReference {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn duration_secs(&self) -> f32 {
        self.duration_secs
    }

    /// Human-readable status line for run logs.
    pub fn status(&self) -> String {
        format!("Reference ready. Duration: {:.2}s", self.duration_secs)
    }

    /// Delete the persisted scratch file.
    pub fn remove(&self) -> std::io::Result<()> {
        fs::remove_file(&self.path)
    }
}

/// Prepare a reference audio file for voice cloning.
///
/// Fails with [`AudioError::NotFound`] if the path does not exist. The
/// source is decoded at its native rate, silence-trimmed, capped at
/// `max_duration_secs * source_rate` samples, resampled to
/// `target_sample_rate` when the rates differ, and written out as a mono
/// float WAV.
pub fn prepare_reference(
    path: &Path,
    target_sample_rate: u32,
    max_duration_secs: f32,
) -> Result<PreparedReference, AudioError> {
    if !path.exists() {
        return Err(AudioError::NotFound(path.display().to_string()));
    }

    let (samples, source_rate) = decode_mono(path)?;

    let mut trimmed = trim_silence(&samples, TRIM_TOP_DB).to_vec();

    let max_samples = (max_duration_secs * source_rate as f32) as usize;
    if trimmed.len() > max_samples {
        trimmed.truncate(max_samples);
    }

    let normalized = if source_rate != target_sample_rate {
        resample(&trimmed, source_rate, target_sample_rate)?
    } else {
        trimmed
    };

    let out_path = scratch_path(path);
    let wave = Waveform::new(normalized, target_sample_rate);
    wave.write_wav(&out_path)?;

    Ok(PreparedReference {
        path: out_path,
        duration_secs: wave.duration_secs(),
    })
}

static SCRATCH_SEQ: AtomicU64 = AtomicU64::new(0);

/// Scratch path keyed on the source stem, a millisecond timestamp, and a
/// process-wide sequence number, so sequential and concurrent invocations
/// never collide.
fn scratch_path(source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("reference");
    let stamp = Utc::now().format("%Y%m%d%H%M%S%3f");
    let seq = SCRATCH_SEQ.fetch_add(1, Ordering::Relaxed);

    std::env::temp_dir().join(format!("reference_processed_{stem}_{stamp}_{seq}.wav"))
}

/// Trim leading and trailing audio whose frame RMS sits more than
/// `top_db` below the loudest frame. All-silent input trims to empty.
pub(crate) fn trim_silence(samples: &[f32], top_db: f32) -> &[f32] {
    if samples.is_empty() {
        return samples;
    }

    let mut frame_rms = Vec::new();
    let mut start = 0;
    loop {
        let end = (start + TRIM_FRAME).min(samples.len());
        let frame = &samples[start..end];
        let mean_square = frame.iter().map(|s| s * s).sum::<f32>() / frame.len() as f32;
        frame_rms.push(mean_square.sqrt());

        if end == samples.len() {
            break;
        }
        start += TRIM_HOP;
    }

    let peak = frame_rms.iter().copied().fold(0.0f32, f32::max);
    if peak <= 0.0 {
        return &samples[..0];
    }
    let threshold = peak * 10f32.powf(-top_db / 20.0);

    let first = frame_rms.iter().position(|&rms| rms > threshold);
    let last = frame_rms.iter().rposition(|&rms| rms > threshold);

    match (first, last) {
        (Some(first), Some(last)) => {
            let begin = first * TRIM_HOP;
            let end = (last * TRIM_HOP + TRIM_FRAME).min(samples.len());
            &samples[begin..end]
        }
        _ => &samples[..0],
    }
}

/// Decode any supported container to mono f32 at the native rate.
fn decode_mono(path: &Path) -> Result<(Vec<f32>, u32), AudioError> {
    let file = fs::File::open(path)?;
    let stream = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| AudioError::Decode(e.to_string()))?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| AudioError::Decode("no decodable audio track".to_string()))?;
    let track_id = track.id;
    let source_rate = track
        .codec_params
        .sample_rate
        .ok_or_else(|| AudioError::Decode("source sample rate unknown".to_string()))?;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| AudioError::Decode(e.to_string()))?;

    let mut mono = Vec::new();
    while let Ok(packet) = format.next_packet() {
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = decoder
            .decode(&packet)
            .map_err(|e| AudioError::Decode(e.to_string()))?;
        append_mono(&mut mono, decoded);
    }

    Ok((mono, source_rate))
}

fn append_mono(out: &mut Vec<f32>, buffer: AudioBufferRef<'_>) {
    match buffer {
        AudioBufferRef::U8(buf) => downmix(out, &buf),
        AudioBufferRef::U16(buf) => downmix(out, &buf),
        AudioBufferRef::U24(buf) => downmix(out, &buf),
        AudioBufferRef::U32(buf) => downmix(out, &buf),
        AudioBufferRef::S8(buf) => downmix(out, &buf),
        AudioBufferRef::S16(buf) => downmix(out, &buf),
        AudioBufferRef::S24(buf) => downmix(out, &buf),
        AudioBufferRef::S32(buf) => downmix(out, &buf),
        AudioBufferRef::F32(buf) => downmix(out, &buf),
        AudioBufferRef::F64(buf) => downmix(out, &buf),
    }
}

/// Average all channels into mono.
fn downmix<T>(out: &mut Vec<f32>, buf: &AudioBuffer<T>)
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = buf.spec().channels.count();

    if channels <= 1 {
        out.extend(buf.chan(0).iter().map(|&v| f32::from_sample(v)));
        return;
    }

    for frame in 0..buf.frames() {
        let mut acc = 0.0f32;
        for ch in 0..channels {
            acc += f32::from_sample(buf.chan(ch)[frame]);
        }
        out.push(acc / channels as f32);
    }
}
