//! Per-sentence synthesis orchestration.

use crate::audio::Waveform;
use crate::model::{ModelError, SpeechModel, SynthesisParameters};
use crate::output::OutputWriter;
use crate::text::SentenceUnit;

/// Default cap on sentences synthesized per run.
pub const DEFAULT_SENTENCE_LIMIT: usize = 25;

/// Accumulated human-readable log for one run.
///
/// This is the record handed back to callers; live progress goes through
/// the `log` facade instead.
#[derive(Debug, Clone, Default)]
pub struct RunLog {
    lines: Vec<String>,
}

impl RunLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: impl Into<String>) {
        self.lines.push(line.into());
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn to_text(&self) -> String {
        self.lines.join("\n")
    }
}

/// Outcome of one sentence's synthesis attempt.
///
/// `index` is the zero-based position in the segmented input; log lines
/// use one-based numbering.
#[derive(Debug)]
pub struct SentenceRecord {
    pub index: usize,
    pub text: String,
    /// Sample count of the generated waveform, or the failure reason.
    pub outcome: Result<usize, ModelError>,
}

impl SentenceRecord {
    pub fn is_success(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Result of a full batch run over one sentence list.
#[derive(Debug)]
pub struct BatchOutcome {
    /// Successes concatenated in input order; `None` when nothing succeeded.
    pub combined: Option<Waveform>,
    pub records: Vec<SentenceRecord>,
    pub log: RunLog,
}

impl BatchOutcome {
    pub fn successes(&self) -> usize {
        self.records.iter().filter(|r| r.is_success()).count()
    }

    pub fn attempts(&self) -> usize {
        self.records.len()
    }

    /// True when no sentence produced audio.
    pub fn failed(&self) -> bool {
        self.combined.is_none()
    }
}

/// Drives the model over a sentence list with a fixed parameter set.
pub struct SynthesisRunner<'a, M: SpeechModel> {
    model: &'a M,
}

impl<'a, M: SpeechModel> SynthesisRunner<'a, M> {
    pub fn new(model: &'a M) -> Self {
        Self { model }
    }

    /// Synthesize up to `limit` sentences, persisting each success via
    /// `writer` and concatenating the results in input order.
    ///
    /// A failed sentence is recorded with its index and skipped; it never
    /// aborts the batch. Output order matches input order regardless of
    /// which sentences failed.
    pub fn run(
        &self,
        sentences: &[SentenceUnit],
        params: &SynthesisParameters,
        limit: usize,
        writer: &OutputWriter,
    ) -> BatchOutcome {
        let mut log = RunLog::new();
        let batch = &sentences[..sentences.len().min(limit)];
        let total = batch.len();

        let mut collected: Vec<Waveform> = Vec::new();
        let mut records = Vec::with_capacity(total);

        for (index, sentence) in batch.iter().enumerate() {
            log::info!(
                "Processing sentence {}/{}: {}",
                index + 1,
                total,
                sentence.preview()
            );

            match self.model.generate(sentence.as_str(), params) {
                Ok(wave) => {
                    if let Err(e) = writer.write_sentence(index, &wave) {
                        log::warn!("could not persist sentence {}: {e}", index + 1);
                    }

                    log.push(format!("[OK] {}: {}", index + 1, sentence.preview()));
                    records.push(SentenceRecord {
                        index,
                        text: sentence.as_str().to_string(),
                        outcome: Ok(wave.len()),
                    });
                    collected.push(wave);
                }
                Err(e) => {
                    log::warn!("sentence {} failed: {e}", index + 1);
                    log.push(format!("[ERR] {}: {e}", index + 1));
                    records.push(SentenceRecord {
                        index,
                        text: sentence.as_str().to_string(),
                        outcome: Err(e),
                    });
                }
            }
        }

        let combined = Waveform::concat(&collected);
        match &combined {
            Some(wave) => log.push(format!(
                "Successfully processed {}/{} sentences ({:.1}s of audio)",
                collected.len(),
                total,
                wave.duration_secs()
            )),
            None => log.push("No audio generated."),
        }

        BatchOutcome {
            combined,
            records,
            log,
        }
    }
}
