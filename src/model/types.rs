//! Model server request/response types.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when talking to the model server.
#[derive(Error, Debug)]
pub enum ModelError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Reference file not found: {0}")]
    ReferenceNotFound(String),

    #[error("Generation failed: {0}")]
    GenerationFailed(String),

    #[error("Failed to decode synthesized audio: {0}")]
    AudioDecode(String),
}

/// Fixed synthesis configuration, supplied once per run and reused for
/// every sentence in that run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParameters {
    pub repetition_penalty: f32,
    pub min_p: f32,
    pub top_p: f32,
    pub temperature: f32,
    pub exaggeration: f32,
    pub cfg_weight: f32,
    /// Local path of the prepared reference sample, when cloning a voice.
    /// The HTTP client uploads it and sends the server-side path instead.
    #[serde(skip)]
    pub audio_prompt_path: Option<PathBuf>,
}

impl Default for SynthesisParameters {
    fn default() -> Self {
        Self {
            repetition_penalty: 1.1,
            min_p: 0.02,
            top_p: 0.95,
            temperature: 0.7,
            exaggeration: 0.3,
            cfg_weight: 0.7,
            audio_prompt_path: None,
        }
    }
}

impl SynthesisParameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_repetition_penalty(mut self, value: f32) -> Self {
        self.repetition_penalty = value;
        self
    }

    pub fn with_min_p(mut self, value: f32) -> Self {
        self.min_p = value;
        self
    }

    pub fn with_top_p(mut self, value: f32) -> Self {
        self.top_p = value;
        self
    }

    pub fn with_temperature(mut self, value: f32) -> Self {
        self.temperature = value;
        self
    }

    pub fn with_exaggeration(mut self, value: f32) -> Self {
        self.exaggeration = value;
        self
    }

    pub fn with_cfg_weight(mut self, value: f32) -> Self {
        self.cfg_weight = value;
        self
    }

    /// Set the reference sample used for voice cloning.
    pub fn with_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.audio_prompt_path = Some(path.into());
        self
    }

    /// Human-readable parameter echo for run logs.
    pub fn describe(&self) -> Vec<String> {
        let mut lines = vec![
            format!("  repetition_penalty: {}", self.repetition_penalty),
            format!("  min_p: {}", self.min_p),
            format!("  top_p: {}", self.top_p),
            format!("  temperature: {}", self.temperature),
            format!("  exaggeration: {}", self.exaggeration),
            format!("  cfg_weight: {}", self.cfg_weight),
        ];
        if let Some(path) = &self.audio_prompt_path {
            lines.push(format!("  audio_prompt_path: {}", path.display()));
        }
        lines
    }
}

/// Request to load the model on a device.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadRequest {
    pub device: String,
}

/// Handshake response describing the loaded model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelInfo {
    pub status: String,
    pub model: String,
    pub device: String,
    pub sample_rate: u32,
}

/// Body of a per-sentence generate call.
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    pub text: String,
    #[serde(flatten)]
    pub params: SynthesisParameters,
    /// Server-side path of the uploaded reference sample, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_prompt_path: Option<String>,
}
