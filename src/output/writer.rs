//! Artifact persistence for one run.

use std::fs;
use std::path::{Path, PathBuf};

use crate::audio::Waveform;

use super::OutputError;

/// File name of the concatenated article waveform.
pub const COMBINED_FILE_NAME: &str = "complete_article.wav";

/// Writes per-sentence and combined waveforms into one directory.
///
/// Plain serialize-to-file writes; a crash mid-write can leave a
/// truncated file, matching the underlying filesystem's semantics.
pub struct OutputWriter {
    dir: PathBuf,
}

impl OutputWriter {
    /// Create a writer, creating the directory if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, OutputError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Persist one sentence waveform. `index` is zero-based; file names
    /// are one-based and zero-padded for stable lexical ordering.
    pub fn write_sentence(&self, index: usize, wave: &Waveform) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(format!("sentence_{:03}.wav", index + 1));
        wave.write_wav(&path)?;
        Ok(path)
    }

    /// Persist the combined article waveform.
    pub fn write_combined(&self, wave: &Waveform) -> Result<PathBuf, OutputError> {
        let path = self.dir.join(COMBINED_FILE_NAME);
        wave.write_wav(&path)?;
        Ok(path)
    }

    /// List the WAV files in this directory, sorted by name.
    pub fn list_audio(&self) -> Result<Vec<PathBuf>, OutputError> {
        let mut files: Vec<PathBuf> = fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.extension().is_some_and(|ext| ext == "wav"))
            .collect();
        files.sort();
        Ok(files)
    }
}
