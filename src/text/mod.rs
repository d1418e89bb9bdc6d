//! Text normalization and sentence splitting.

mod segmenter;

pub use segmenter::{SentenceUnit, segment};
