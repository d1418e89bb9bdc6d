//! CLI argument definitions and parsing.

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::model::SynthesisParameters;

/// Batch article narration and voice cloning CLI.
#[derive(Parser, Debug)]
#[command(name = "article-tts-rs")]
#[command(about = "Narrate long-form text with a hosted TTS model, optionally cloning a voice")]
#[command(version)]
pub struct Args {
    /// Input text file (UTF-8 article or script)
    #[arg(short, long, default_value = "text_input.txt")]
    pub input: PathBuf,

    /// Reference audio for voice cloning; conventional filenames next to
    /// the input are probed when omitted
    #[arg(short, long)]
    pub reference: Option<PathBuf>,

    /// Directory of reference voices; enables multi-sample mode with one
    /// output subdirectory per voice
    #[arg(long)]
    pub samples_dir: Option<PathBuf>,

    /// Output root directory
    #[arg(short, long, default_value = "output")]
    pub output_root: PathBuf,

    /// Maximum sentences synthesized per run (1 to 50)
    #[arg(short = 'l', long, default_value = "25")]
    pub sentence_limit: usize,

    /// Device the model server should load on
    #[arg(short, long, value_enum, default_value = "auto")]
    pub device: DeviceChoice,

    /// Model server host address
    #[arg(long, default_value = "localhost")]
    pub host: String,

    /// Repetition penalty (0.8 to 2.0)
    #[arg(long, default_value = "1.1")]
    pub repetition_penalty: f32,

    /// Min-p sampling floor (0.0 to 0.2)
    #[arg(long, default_value = "0.02")]
    pub min_p: f32,

    /// Top-p nucleus sampling (0.5 to 1.0)
    #[arg(long, default_value = "0.95")]
    pub top_p: f32,

    /// Sampling temperature (0.1 to 1.5)
    #[arg(long, default_value = "0.7")]
    pub temperature: f32,

    /// Prosody exaggeration (0.0 to 1.0)
    #[arg(long, default_value = "0.3")]
    pub exaggeration: f32,

    /// Classifier-free guidance weight (0.0 to 2.0)
    #[arg(long, default_value = "0.7")]
    pub cfg_weight: f32,

    /// Cap on reference audio duration, in seconds
    #[arg(long, default_value = "10.0")]
    pub max_reference_secs: f32,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// The fixed parameter set for this run, without a reference; callers
    /// attach the prepared reference path separately.
    pub fn parameters(&self) -> SynthesisParameters {
        SynthesisParameters::new()
            .with_repetition_penalty(self.repetition_penalty)
            .with_min_p(self.min_p)
            .with_top_p(self.top_p)
            .with_temperature(self.temperature)
            .with_exaggeration(self.exaggeration)
            .with_cfg_weight(self.cfg_weight)
    }
}

/// Device the model server should load on.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DeviceChoice {
    /// Let the server pick CUDA when available
    #[default]
    #[value(name = "auto")]
    Auto,

    #[value(name = "cpu")]
    Cpu,

    #[value(name = "cuda")]
    Cuda,
}

impl DeviceChoice {
    /// The wire string sent in the load handshake.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeviceChoice::Auto => "auto",
            DeviceChoice::Cpu => "cpu",
            DeviceChoice::Cuda => "cuda",
        }
    }
}
