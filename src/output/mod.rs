//! Run-versioned output layout and artifact persistence.

mod run;
mod writer;

pub use run::{LATEST_LINK_NAME, LegacyAlias, RunDirectory, RunDirectoryManager};
pub use writer::{COMBINED_FILE_NAME, OutputWriter};

use thiserror::Error;

/// Errors that can occur while laying out or writing run output.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Audio write failed: {0}")]
    Audio(#[from] crate::audio::AudioError),
}
