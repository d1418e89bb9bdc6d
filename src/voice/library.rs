//! Reference voice discovery on disk.

use std::path::{Path, PathBuf};

use thiserror::Error;

/// Extensions accepted when scanning a samples directory.
pub const AUDIO_EXTENSIONS: &[&str] = &["wav", "mp3", "flac", "m4a", "ogg", "aiff"];

/// Filenames probed for a default reference voice, in priority order.
pub const REFERENCE_CANDIDATES: &[&str] = &[
    "reference.wav",
    "reference.mp3",
    "reference.m4a",
    "reference_audio.wav",
    "voice_sample.wav",
];

/// Errors that can occur during sample discovery.
#[derive(Error, Debug)]
pub enum VoiceError {
    #[error("Samples directory not found: {0}")]
    DirNotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// One discovered reference voice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSample {
    /// The file stem; names the per-voice output subdirectory.
    pub name: String,
    pub path: PathBuf,
}

/// Scans a directory of reference voices for multi-sample runs.
pub struct SampleLibrary {
    dir: PathBuf,
}

impl SampleLibrary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Every allow-listed audio file in the directory, sorted by filename.
    pub fn discover(&self) -> Result<Vec<VoiceSample>, VoiceError> {
        if !self.dir.is_dir() {
            return Err(VoiceError::DirNotFound(self.dir.display().to_string()));
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|p| p.is_file() && has_audio_extension(p))
            .collect();
        paths.sort();

        Ok(paths
            .into_iter()
            .filter_map(|path| {
                let name = path.file_stem()?.to_str()?.to_string();
                Some(VoiceSample { name, path })
            })
            .collect())
    }
}

fn has_audio_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| AUDIO_EXTENSIONS.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Probe the workspace for a conventionally named reference file.
pub fn find_default_reference(workspace: &Path) -> Option<PathBuf> {
    REFERENCE_CANDIDATES
        .iter()
        .map(|name| workspace.join(name))
        .find(|path| path.exists())
}
