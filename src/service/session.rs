//! Request handling over a cached model handle.

use std::path::PathBuf;
use std::sync::Mutex;

use crate::audio::{DEFAULT_MAX_REFERENCE_SECS, MODEL_SAMPLE_RATE, prepare_reference};
use crate::cli::DeviceChoice;
use crate::engine::{DEFAULT_SENTENCE_LIMIT, RunLog, SynthesisRunner};
use crate::model::{ModelError, SpeechModel, SynthesisParameters};
use crate::output::{OutputWriter, RunDirectoryManager};
use crate::text::segment;

/// Requests with less trimmed text than this are rejected up front.
const MIN_TEXT_LEN: usize = 2;

/// One synthesis request from the interactive surface.
#[derive(Debug, Clone)]
pub struct SynthesisRequest {
    pub text: String,
    pub reference: Option<PathBuf>,
    pub params: SynthesisParameters,
    pub sentence_limit: usize,
    pub device: DeviceChoice,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            reference: None,
            params: SynthesisParameters::default(),
            sentence_limit: DEFAULT_SENTENCE_LIMIT,
            device: DeviceChoice::Auto,
        }
    }

    pub fn with_reference(mut self, path: impl Into<PathBuf>) -> Self {
        self.reference = Some(path.into());
        self
    }

    pub fn with_params(mut self, params: SynthesisParameters) -> Self {
        self.params = params;
        self
    }

    pub fn with_sentence_limit(mut self, limit: usize) -> Self {
        self.sentence_limit = limit;
        self
    }

    pub fn with_device(mut self, device: DeviceChoice) -> Self {
        self.device = device;
        self
    }
}

/// Response for one request: the combined artifact, the accumulated log,
/// and the files written for that run.
#[derive(Debug)]
pub struct SynthesisResponse {
    pub audio: Option<PathBuf>,
    pub log: String,
    pub files: Vec<PathBuf>,
}

impl SynthesisResponse {
    fn rejected(log: RunLog) -> Self {
        Self {
            audio: None,
            log: log.to_text(),
            files: Vec::new(),
        }
    }
}

/// Serves synthesis requests over one lazily loaded model handle.
///
/// The handle is created on first use with the requesting caller's device
/// choice and reused for every later request. The mutex serializes
/// requests, so the model only ever sees one caller at a time.
pub struct SynthesisService<M, L>
where
    M: SpeechModel,
    L: Fn(DeviceChoice) -> Result<M, ModelError>,
{
    loader: L,
    model: Mutex<Option<M>>,
    runs: RunDirectoryManager,
}

impl<M, L> SynthesisService<M, L>
where
    M: SpeechModel,
    L: Fn(DeviceChoice) -> Result<M, ModelError>,
{
    /// Create a service writing interactive runs under
    /// `<output_root>/ui_runs`.
    pub fn new(loader: L, output_root: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            model: Mutex::new(None),
            runs: RunDirectoryManager::new(output_root.into().join("ui_runs")),
        }
    }

    /// Handle one request start to finish.
    ///
    /// Failures never escape: they surface as log lines in the response,
    /// with `audio: None` when nothing was synthesized.
    pub fn handle(&self, request: &SynthesisRequest) -> SynthesisResponse {
        let mut log = RunLog::new();

        if request.text.trim().chars().count() < MIN_TEXT_LEN {
            log.push("Provide some input text.");
            return SynthesisResponse::rejected(log);
        }

        let mut guard = self
            .model
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        if guard.is_none() {
            match (self.loader)(request.device) {
                Ok(model) => *guard = Some(model),
                Err(e) => {
                    log.push(format!("Model load failed: {e}"));
                    return SynthesisResponse::rejected(log);
                }
            }
        }
        let Some(model) = guard.as_ref() else {
            log.push("Model unavailable.");
            return SynthesisResponse::rejected(log);
        };

        log.push(format!("Device: {}", request.device.as_str()));

        let sentences = segment(&request.text);
        log.push(format!("Sentences: {}", sentences.len()));

        // A broken reference degrades to the default voice, not an error.
        let mut params = request.params.clone();
        let prepared = match &request.reference {
            Some(path) => {
                match prepare_reference(path, MODEL_SAMPLE_RATE, DEFAULT_MAX_REFERENCE_SECS) {
                    Ok(prepared) => {
                        log.push(prepared.status());
                        Some(prepared)
                    }
                    Err(e) => {
                        log::warn!("reference preparation failed: {e}");
                        log.push(format!(
                            "Reference processing failed: {e}. Using default voice."
                        ));
                        None
                    }
                }
            }
            None => {
                log.push("Using default voice (no reference provided).");
                None
            }
        };
        if let Some(prepared) = &prepared {
            params = params.with_reference(prepared.path());
        }

        let run = match self.runs.create_run() {
            Ok(run) => run,
            Err(e) => {
                log.push(format!("Could not create run directory: {e}"));
                return SynthesisResponse::rejected(log);
            }
        };
        let writer = match OutputWriter::new(run.path()) {
            Ok(writer) => writer,
            Err(e) => {
                log.push(format!("Could not open run directory: {e}"));
                return SynthesisResponse::rejected(log);
            }
        };

        let runner = SynthesisRunner::new(model);
        let outcome = runner.run(&sentences, &params, request.sentence_limit, &writer);
        for line in outcome.log.lines() {
            log.push(line.clone());
        }

        let audio = outcome
            .combined
            .as_ref()
            .and_then(|wave| match writer.write_combined(wave) {
                Ok(path) => {
                    log.push(format!("Saved: {}", path.display()));
                    Some(path)
                }
                Err(e) => {
                    log.push(format!("Could not save combined audio: {e}"));
                    None
                }
            });

        let files = writer.list_audio().unwrap_or_default();

        SynthesisResponse {
            audio,
            log: log.to_text(),
            files,
        }
    }
}

/// Default output root for embedded use, under the user's home directory.
pub fn default_output_root() -> PathBuf {
    dirs::home_dir()
        .expect("Could not find home directory")
        .join(".article-tts-rs")
        .join("output")
}
