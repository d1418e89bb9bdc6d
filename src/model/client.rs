//! HTTP client for the model server.

use std::path::Path;

use crate::audio::Waveform;
use crate::cli::DeviceChoice;

use super::SpeechModel;
use super::types::{GenerateRequest, LoadRequest, ModelError, ModelInfo, SynthesisParameters};

/// Port the model server container listens on.
pub const DEFAULT_PORT: u16 = 9377;

/// HTTP-backed model handle.
///
/// Construction performs the load handshake, so a value of this type
/// always refers to a model that is resident on the server.
pub struct HttpModel {
    base_url: String,
    client: reqwest::blocking::Client,
    info: ModelInfo,
}

impl HttpModel {
    /// Load the model on the server, forwarding the device selector.
    pub fn load(device: DeviceChoice, host: &str) -> Result<Self, ModelError> {
        let base_url = format!("http://{host}:{DEFAULT_PORT}");
        let client = reqwest::blocking::Client::new();

        let response = client
            .post(format!("{base_url}/load"))
            .json(&LoadRequest {
                device: device.as_str().to_string(),
            })
            .send()
            .map_err(|e| ModelError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        let info: ModelInfo = response
            .json()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            info,
        })
    }

    /// Handshake details reported by the server.
    pub fn info(&self) -> &ModelInfo {
        &self.info
    }

    /// Upload a reference sample, returning the server-side path.
    fn upload_reference(&self, path: &Path) -> Result<String, ModelError> {
        let audio_data = std::fs::read(path)
            .map_err(|_| ModelError::ReferenceNotFound(path.display().to_string()))?;

        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("reference.wav");

        let file_part = reqwest::blocking::multipart::Part::bytes(audio_data)
            .file_name(file_name.to_string())
            .mime_str("audio/wav")
            .map_err(|e| ModelError::RequestFailed(e.to_string()))?;

        let form = reqwest::blocking::multipart::Form::new().part("files", file_part);

        let response = self
            .client
            .post(format!("{}/upload_reference", self.base_url))
            .multipart(form)
            .send()
            .map_err(|e| ModelError::ConnectionFailed(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ModelError::RequestFailed(format!(
                "Upload failed: {}",
                response.status()
            )));
        }

        let paths: Vec<String> = response
            .json()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        paths
            .into_iter()
            .next()
            .ok_or_else(|| ModelError::InvalidResponse("No path returned".to_string()))
    }
}

impl SpeechModel for HttpModel {
    fn generate(&self, text: &str, params: &SynthesisParameters) -> Result<Waveform, ModelError> {
        let server_reference = match &params.audio_prompt_path {
            Some(path) => Some(self.upload_reference(path)?),
            None => None,
        };

        let request = GenerateRequest {
            text: text.to_string(),
            params: params.clone(),
            audio_prompt_path: server_reference,
        };

        let response = self
            .client
            .post(format!("{}/generate", self.base_url))
            .json(&request)
            .send()
            .map_err(|e| ModelError::ConnectionFailed(e.to_string()))?;

        if response.status().is_server_error() {
            return Err(ModelError::GenerationFailed(format!(
                "Status: {}",
                response.status()
            )));
        }
        if !response.status().is_success() {
            return Err(ModelError::RequestFailed(format!(
                "Status: {}",
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        Waveform::from_wav_bytes(&bytes).map_err(|e| ModelError::AudioDecode(e.to_string()))
    }

    fn sample_rate(&self) -> u32 {
        self.info.sample_rate
    }
}
