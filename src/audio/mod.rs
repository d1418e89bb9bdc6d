//! Audio primitives: waveforms, resampling, reference preparation.

mod reference;
mod resampler;
mod wave;

pub use reference::{
    DEFAULT_MAX_REFERENCE_SECS, MODEL_SAMPLE_RATE, PreparedReference, TRIM_TOP_DB,
    prepare_reference,
};
pub use resampler::resample;
pub use wave::Waveform;

use thiserror::Error;

/// Errors that can occur while processing audio.
#[derive(Error, Debug)]
pub enum AudioError {
    #[error("Audio file not found: {0}")]
    NotFound(String),

    #[error("Failed to decode audio: {0}")]
    Decode(String),

    #[error("Resampling failed: {0}")]
    Resample(String),

    #[error("WAV error: {0}")]
    Wav(#[from] hound::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
