//! Fuzzy matching utilities
//!
//! Edit-distance similarity for whole verses, the keyword-overlap booster,
//! and the per-word similarity used by the verifier.

use crate::core::text_normalizer::normalize_arabic;
use serde::{Deserialize, Serialize};
use strsim::levenshtein;

/// Words of this many characters or fewer are ignored by the keyword booster
pub const SHORT_WORD_LEN: usize = 2;

/// How two single words are compared
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WordMetric {
    /// Same-position character matches over the longer word
    #[default]
    Positional,
    /// Normalized Levenshtein distance
    EditDistance,
}

/// Levenshtein distance counted in characters (insert/delete/substitute, unit cost)
pub fn edit_distance(a: &str, b: &str) -> usize {
    levenshtein(a, b)
}

/// Similarity percentage (0-100) between two strings, normalizing both first
pub fn similarity(a: &str, b: &str) -> f64 {
    similarity_normalized(&normalize_arabic(a), &normalize_arabic(b))
}

/// Similarity percentage for text that is already normalized
///
/// Two empty strings are identical (100).
pub fn similarity_normalized(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    let distance = edit_distance(a, b);
    let score = (max_len.saturating_sub(distance) as f64 / max_len as f64) * 100.0;
    clamp_percent(score)
}

/// Keep only words long enough to discriminate between verses
pub fn keywords(normalized: &str) -> Vec<String> {
    normalized
        .split_whitespace()
        .filter(|w| w.chars().count() > SHORT_WORD_LEN)
        .map(str::to_string)
        .collect()
}

/// Check whether the recognized text shares at least `min_matches` content words
/// with the verse
///
/// A recognized word counts when it is contained in, or contains, any verse word.
pub fn has_keyword_overlap(recognized_text: &str, verse_text: &str, min_matches: usize) -> bool {
    let recognized = keywords(&normalize_arabic(recognized_text));
    let verse = keywords(&normalize_arabic(verse_text));
    count_keyword_matches(&recognized, &verse) >= min_matches
}

/// Count recognized keywords found in (or containing) some verse keyword
pub fn count_keyword_matches<R, V>(recognized: &[R], verse: &[V]) -> usize
where
    R: AsRef<str>,
    V: AsRef<str>,
{
    recognized
        .iter()
        .filter(|word| {
            let word = word.as_ref();
            verse.iter().any(|v| {
                let v = v.as_ref();
                v.contains(word) || word.contains(v)
            })
        })
        .count()
}

/// Similarity percentage between two normalized words
pub fn word_similarity(recited: &str, expected: &str, metric: WordMetric) -> f64 {
    if recited == expected {
        return 100.0;
    }

    match metric {
        WordMetric::Positional => positional_similarity(recited, expected),
        WordMetric::EditDistance => similarity_normalized(recited, expected),
    }
}

/// Count characters equal at the same index, divided by the longer length
fn positional_similarity(a: &str, b: &str) -> f64 {
    let max_len = a.chars().count().max(b.chars().count());
    if max_len == 0 {
        return 100.0;
    }

    let matches = a.chars().zip(b.chars()).filter(|(x, y)| x == y).count();
    clamp_percent(matches as f64 / max_len as f64 * 100.0)
}

/// Clamp a score into the 0-100 range
pub fn clamp_percent(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}
