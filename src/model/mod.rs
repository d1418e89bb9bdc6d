//! External model collaborator.
//!
//! The pretrained synthesis model lives behind the [`SpeechModel`] trait;
//! the heavy lifting happens on the model server, reached over HTTP by
//! [`HttpModel`]. Tests substitute a mock.

mod client;
mod types;

pub use client::{DEFAULT_PORT, HttpModel};
pub use types::{GenerateRequest, LoadRequest, ModelError, ModelInfo, SynthesisParameters};

use crate::audio::Waveform;

/// Contract with the pretrained text-to-speech model.
#[cfg_attr(test, mockall::automock)]
pub trait SpeechModel: Send + Sync {
    /// Synthesize one sentence with the fixed per-run parameters.
    fn generate(&self, text: &str, params: &SynthesisParameters) -> Result<Waveform, ModelError>;

    /// Output sample rate of generated waveforms.
    fn sample_rate(&self) -> u32;
}

#[cfg(test)]
mod tests {
    use super::*;

    // ===========================================
    // SpeechModel trait tests with mocks
    // ===========================================

    #[test]
    fn test_mock_model_generate_success() {
        let mut mock = MockSpeechModel::new();

        mock.expect_generate()
            .withf(|text, params| text == "Hello there, world." && params.temperature == 0.7)
            .times(1)
            .returning(|_, _| Ok(Waveform::new(vec![0.1; 200], 24_000)));

        let params = SynthesisParameters::default();
        let wave = mock.generate("Hello there, world.", &params).unwrap();

        assert_eq!(wave.len(), 200);
        assert_eq!(wave.sample_rate(), 24_000);
    }

    #[test]
    fn test_mock_model_generate_failure() {
        let mut mock = MockSpeechModel::new();

        mock.expect_generate()
            .times(1)
            .returning(|_, _| Err(ModelError::GenerationFailed("decoder overflow".to_string())));

        let params = SynthesisParameters::default();
        let result = mock.generate("A sentence that fails.", &params);

        assert!(matches!(result, Err(ModelError::GenerationFailed(_))));
    }

    #[test]
    fn test_mock_model_sample_rate() {
        let mut mock = MockSpeechModel::new();
        mock.expect_sample_rate().return_const(24_000u32);

        assert_eq!(mock.sample_rate(), 24_000);
    }

    // ===========================================
    // SynthesisParameters tests
    // ===========================================

    #[test]
    fn test_parameters_defaults() {
        let params = SynthesisParameters::default();

        assert_eq!(params.repetition_penalty, 1.1);
        assert_eq!(params.min_p, 0.02);
        assert_eq!(params.top_p, 0.95);
        assert_eq!(params.temperature, 0.7);
        assert_eq!(params.exaggeration, 0.3);
        assert_eq!(params.cfg_weight, 0.7);
        assert!(params.audio_prompt_path.is_none());
    }

    #[test]
    fn test_parameters_builder() {
        let params = SynthesisParameters::new()
            .with_temperature(0.9)
            .with_cfg_weight(1.2)
            .with_reference("/tmp/ref.wav");

        assert_eq!(params.temperature, 0.9);
        assert_eq!(params.cfg_weight, 1.2);
        assert_eq!(
            params.audio_prompt_path,
            Some(std::path::PathBuf::from("/tmp/ref.wav"))
        );
    }

    #[test]
    fn test_parameters_describe_includes_reference() {
        let params = SynthesisParameters::new().with_reference("/tmp/ref.wav");
        let lines = params.describe();

        assert_eq!(lines.len(), 7);
        assert!(lines.iter().any(|l| l.contains("/tmp/ref.wav")));
    }

    #[test]
    fn test_parameters_describe_skips_missing_reference() {
        let lines = SynthesisParameters::default().describe();
        assert_eq!(lines.len(), 6);
    }

    // ===========================================
    // Wire format tests
    // ===========================================

    #[test]
    fn test_generate_request_flattens_parameters() {
        let request = GenerateRequest {
            text: "Hello there, world.".to_string(),
            params: SynthesisParameters::default().with_reference("/local/ref.wav"),
            audio_prompt_path: Some("/srv/uploads/ref.wav".to_string()),
        };

        let json = serde_json::to_value(&request).unwrap();

        assert_eq!(json["text"], "Hello there, world.");
        assert!((json["temperature"].as_f64().unwrap() - 0.7).abs() < 1e-6);
        // The local path is skipped; only the uploaded server path goes out.
        assert_eq!(json["audio_prompt_path"], "/srv/uploads/ref.wav");
    }

    #[test]
    fn test_generate_request_omits_absent_reference() {
        let request = GenerateRequest {
            text: "Hello there, world.".to_string(),
            params: SynthesisParameters::default(),
            audio_prompt_path: None,
        };

        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("audio_prompt_path").is_none());
    }

    #[test]
    fn test_model_info_deserialize() {
        let json = r#"{
            "status": "loaded",
            "model": "chatterbox",
            "device": "cuda:0",
            "sample_rate": 24000
        }"#;

        let info: ModelInfo = serde_json::from_str(json).unwrap();
        assert_eq!(info.status, "loaded");
        assert_eq!(info.device, "cuda:0");
        assert_eq!(info.sample_rate, 24_000);
    }
}
