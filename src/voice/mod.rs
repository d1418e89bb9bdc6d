//! Voice sample discovery for single- and multi-sample runs.

mod library;

pub use library::{
    AUDIO_EXTENSIONS, REFERENCE_CANDIDATES, SampleLibrary, VoiceError, VoiceSample,
    find_default_reference,
};
