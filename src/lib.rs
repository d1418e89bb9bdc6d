//! article-tts-rs: Batch article narration and voice cloning CLI.
//!
//! This crate drives a hosted text-to-speech model over long-form text:
//! it splits an article into sentence units, optionally conditions the
//! model on a reference voice sample, synthesizes each sentence, and
//! writes per-sentence and combined audio into run-versioned output
//! directories.

pub mod audio;
pub mod cli;
pub mod engine;
pub mod model;
pub mod output;
pub mod service;
pub mod text;
pub mod voice;
