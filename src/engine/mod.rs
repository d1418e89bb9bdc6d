//! Batch synthesis engine.
//!
//! Coordinates the segmented text, the model collaborator, and the
//! output writer for one run.

mod runner;

pub use runner::{BatchOutcome, DEFAULT_SENTENCE_LIMIT, RunLog, SentenceRecord, SynthesisRunner};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::Waveform;
    use crate::model::{MockSpeechModel, ModelError, SynthesisParameters};
    use crate::output::OutputWriter;
    use crate::text::{SentenceUnit, segment};
    use tempfile::TempDir;

    const ARTICLE: &str = "The first sentence is right here. \
                           The second sentence is right here. \
                           The third sentence is right here. \
                           The fourth sentence is right here. \
                           The fifth sentence is right here.";

    /// Deterministic per-sentence waveform: sample count tracks text length.
    fn wave_for(text: &str) -> Waveform {
        Waveform::new(vec![0.5; text.len() * 10], 24_000)
    }

    fn sentences() -> Vec<SentenceUnit> {
        let units = segment(ARTICLE);
        assert_eq!(units.len(), 5);
        units
    }

    // ===========================================
    // SynthesisRunner tests
    // ===========================================

    #[test]
    fn test_run_all_sentences_succeed() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate()
            .times(5)
            .returning(|text, _| Ok(wave_for(text)));

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &SynthesisParameters::default(), 25, &writer);

        assert_eq!(outcome.attempts(), 5);
        assert_eq!(outcome.successes(), 5);
        assert!(!outcome.failed());

        let expected_len: usize = units.iter().map(|u| wave_for(u.as_str()).len()).sum();
        assert_eq!(outcome.combined.unwrap().len(), expected_len);
    }

    #[test]
    fn test_run_persists_each_sentence() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate()
            .returning(|text, _| Ok(wave_for(text)));

        let runner = SynthesisRunner::new(&mock);
        runner.run(&units, &SynthesisParameters::default(), 25, &writer);

        for i in 1..=5 {
            assert!(dir.path().join(format!("sentence_{i:03}.wav")).exists());
        }
    }

    #[test]
    fn test_run_skips_failed_sentence_and_keeps_order() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate().times(5).returning(|text, _| {
            if text.contains("second") {
                Err(ModelError::GenerationFailed("decoder overflow".to_string()))
            } else {
                Ok(wave_for(text))
            }
        });

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &SynthesisParameters::default(), 25, &writer);

        assert_eq!(outcome.attempts(), 5);
        assert_eq!(outcome.successes(), 4);

        // Combined equals the concatenation of sentences 1, 3, 4, 5 in order.
        let expected: Vec<Waveform> = units
            .iter()
            .filter(|u| !u.as_str().contains("second"))
            .map(|u| wave_for(u.as_str()))
            .collect();
        assert_eq!(
            outcome.combined.unwrap(),
            Waveform::concat(&expected).unwrap()
        );

        // Exactly one error entry, referencing sentence 2.
        let errors: Vec<&String> = outcome
            .log
            .lines()
            .iter()
            .filter(|l| l.starts_with("[ERR]"))
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("[ERR] 2:"));

        assert!(outcome.records[1].outcome.is_err());
        assert_eq!(outcome.records[1].index, 1);
        assert!(outcome.records[1].text.contains("second"));

        // The failed sentence leaves no file behind.
        assert!(!dir.path().join("sentence_002.wav").exists());
        assert!(dir.path().join("sentence_003.wav").exists());
    }

    #[test]
    fn test_run_all_sentences_fail() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate()
            .times(5)
            .returning(|_, _| Err(ModelError::GenerationFailed("out of memory".to_string())));

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &SynthesisParameters::default(), 25, &writer);

        assert!(outcome.failed());
        assert!(outcome.combined.is_none());
        assert_eq!(outcome.successes(), 0);
        assert_eq!(outcome.attempts(), 5);
        assert!(
            outcome
                .log
                .lines()
                .iter()
                .any(|l| l == "No audio generated.")
        );
    }

    #[test]
    fn test_run_respects_sentence_limit() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate()
            .times(2)
            .returning(|text, _| Ok(wave_for(text)));

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &SynthesisParameters::default(), 2, &writer);

        assert_eq!(outcome.attempts(), 2);
        assert_eq!(outcome.successes(), 2);
    }

    #[test]
    fn test_run_empty_sentence_list() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();

        let mock = MockSpeechModel::new();
        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&[], &SynthesisParameters::default(), 25, &writer);

        assert!(outcome.failed());
        assert_eq!(outcome.attempts(), 0);
    }

    #[test]
    fn test_run_forwards_fixed_parameters() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let params = SynthesisParameters::new()
            .with_temperature(0.9)
            .with_reference("/tmp/narrator.wav");

        let mut mock = MockSpeechModel::new();
        mock.expect_generate()
            .withf(|_, p| {
                p.temperature == 0.9
                    && p.audio_prompt_path.as_deref()
                        == Some(std::path::Path::new("/tmp/narrator.wav"))
            })
            .times(5)
            .returning(|text, _| Ok(wave_for(text)));

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &params, 25, &writer);

        assert_eq!(outcome.successes(), 5);
    }

    // ===========================================
    // RunLog tests
    // ===========================================

    #[test]
    fn test_run_log_accumulates_in_order() {
        let mut log = RunLog::new();
        assert!(log.is_empty());

        log.push("Device: cpu");
        log.push(format!("Sentences: {}", 2));

        assert_eq!(log.lines().len(), 2);
        assert_eq!(log.to_text(), "Device: cpu\nSentences: 2");
    }

    #[test]
    fn test_outcome_summary_line_reports_counts() {
        let dir = TempDir::new().unwrap();
        let writer = OutputWriter::new(dir.path()).unwrap();
        let units = sentences();

        let mut mock = MockSpeechModel::new();
        mock.expect_generate().returning(|text, _| {
            if text.contains("fifth") {
                Err(ModelError::GenerationFailed("timeout".to_string()))
            } else {
                Ok(wave_for(text))
            }
        });

        let runner = SynthesisRunner::new(&mock);
        let outcome = runner.run(&units, &SynthesisParameters::default(), 25, &writer);

        assert!(
            outcome
                .log
                .lines()
                .iter()
                .any(|l| l.contains("4/5 sentences"))
        );
    }
}
