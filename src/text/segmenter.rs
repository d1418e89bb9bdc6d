//! Sentence segmentation for long-form text.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

/// Fragments at or below this trimmed length are dropped.
const MIN_FRAGMENT_LEN: usize = 10;

static HEADER_MARKS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#+\s*").expect("hard-coded pattern"));
static WHITESPACE_RUNS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("hard-coded pattern"));
static TERMINATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[.!?]+").expect("hard-coded pattern"));

/// One cleaned, period-terminated segment of the source text.
///
/// Units are created by [`segment`] and never mutated afterwards; the
/// original text order is preserved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentenceUnit(String);

impl SentenceUnit {
    /// The sentence text, including the trailing period.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// A shortened form for progress lines and logs.
    pub fn preview(&self) -> &str {
        let end = self
            .0
            .char_indices()
            .nth(60)
            .map_or(self.0.len(), |(i, _)| i);
        &self.0[..end]
    }
}

impl fmt::Display for SentenceUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Split raw article text into cleaned sentence units.
///
/// Markdown header markers are stripped line-by-line, whitespace runs are
/// collapsed to single spaces, and the text is split on runs of `.`, `!`
/// and `?`. Fragments whose trimmed length is 10 characters or fewer are
/// discarded; the survivors get a trailing period. Empty input yields an
/// empty vector.
pub fn segment(raw: &str) -> Vec<SentenceUnit> {
    let stripped = HEADER_MARKS.replace_all(raw, "");
    let collapsed = WHITESPACE_RUNS.replace_all(&stripped, " ");

    TERMINATORS
        .split(&collapsed)
        .filter_map(|fragment| {
            let trimmed = fragment.trim();
            (trimmed.chars().count() > MIN_FRAGMENT_LEN)
                .then(|| SentenceUnit(format!("{trimmed}.")))
        })
        .collect()
}
