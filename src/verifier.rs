//! Word Aligner / Verifier
//!
//! Word-by-word comparison of a recitation against one expected verse.
//! Alignment is purely positional: word `i` of the recitation is compared
//! with word `i` of the verse, so a skipped word shifts every later word.

use crate::config::Thresholds;
use crate::core::text_normalizer::{normalize_arabic, words};
use crate::utils::fuzzy::{clamp_percent, word_similarity, WordMetric};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of mistake at one aligned position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MistakeKind {
    /// Expected word not recited
    Missing,
    /// Recited word does not match the expected one
    Wrong,
    /// Recited word beyond the end of the verse
    Extra,
}

impl fmt::Display for MistakeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MistakeKind::Missing => write!(f, "missing"),
            MistakeKind::Wrong => write!(f, "wrong"),
            MistakeKind::Extra => write!(f, "extra"),
        }
    }
}

/// One aligned position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WordMatch {
    /// Recited word, empty when missing
    pub word: String,
    pub position: usize,
    pub is_correct: bool,
    /// 0-100
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expected_word: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Mistake {
    pub position: usize,
    pub expected: String,
    pub received: String,
    pub kind: MistakeKind,
}

/// Outcome of verifying one recitation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub is_correct: bool,
    /// Correct positions over expected word count, 0-100
    pub accuracy: f64,
    pub word_matches: Vec<WordMatch>,
    pub mistakes: Vec<Mistake>,
}

/// A word of the original (un-normalized) verse with its match status
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HighlightedWord {
    pub word: String,
    pub is_correct: bool,
    pub confidence: f64,
}

/// Single-verse verifier
#[derive(Debug, Clone, Copy, Default)]
pub struct Verifier {
    thresholds: Thresholds,
    metric: WordMetric,
}

impl Verifier {
    pub fn new(thresholds: Thresholds, metric: WordMetric) -> Self {
        Self {
            thresholds,
            metric,
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Verify a recitation against the expected verse text
    pub fn verify(&self, recited_text: &str, expected_text: &str) -> VerificationResult {
        let recited = normalize_arabic(recited_text);
        let expected = normalize_arabic(expected_text);

        if let Some(result) = self.contained_verse(&recited, &expected) {
            return result;
        }

        let recited_words = words(&recited);
        let expected_words = words(&expected);

        let mut word_matches = Vec::new();
        let mut mistakes = Vec::new();
        let mut correct_count = 0usize;

        let max_len = recited_words.len().max(expected_words.len());
        for position in 0..max_len {
            match (recited_words.get(position), expected_words.get(position)) {
                (Some(&received), None) => {
                    word_matches.push(WordMatch {
                        word: received.to_string(),
                        position,
                        is_correct: false,
                        confidence: 0.0,
                        expected_word: None,
                    });
                    mistakes.push(Mistake {
                        position,
                        expected: String::new(),
                        received: received.to_string(),
                        kind: MistakeKind::Extra,
                    });
                }
                (None, Some(&wanted)) => {
                    word_matches.push(WordMatch {
                        word: String::new(),
                        position,
                        is_correct: false,
                        confidence: 0.0,
                        expected_word: Some(wanted.to_string()),
                    });
                    mistakes.push(Mistake {
                        position,
                        expected: wanted.to_string(),
                        received: String::new(),
                        kind: MistakeKind::Missing,
                    });
                }
                (Some(&received), Some(&wanted)) => {
                    let confidence = word_similarity(received, wanted, self.metric);
                    let is_correct = confidence > self.thresholds.word_correct;

                    if is_correct {
                        correct_count += 1;
                    } else {
                        mistakes.push(Mistake {
                            position,
                            expected: wanted.to_string(),
                            received: received.to_string(),
                            kind: MistakeKind::Wrong,
                        });
                    }

                    word_matches.push(WordMatch {
                        word: received.to_string(),
                        position,
                        is_correct,
                        confidence,
                        expected_word: Some(wanted.to_string()),
                    });
                }
                (None, None) => unreachable!("position below the longer word count"),
            }
        }

        // extra recited words never dilute accuracy
        let accuracy = if expected_words.is_empty() {
            if recited_words.is_empty() {
                100.0
            } else {
                0.0
            }
        } else {
            clamp_percent(correct_count as f64 / expected_words.len() as f64 * 100.0)
        };

        VerificationResult {
            is_correct: accuracy >= self.thresholds.verse_correct,
            accuracy,
            word_matches,
            mistakes,
        }
    }

    /// Recognizer captured the whole verse plus surrounding noise
    ///
    /// The verse words come first, all correct. Recited words outside the
    /// verse follow as `extra` entries, so there are still
    /// `max(recited, expected)` positions.
    fn contained_verse(&self, recited: &str, expected: &str) -> Option<VerificationResult> {
        let min_len = self.thresholds.fast_path_min_len;
        if recited.chars().count() <= min_len || expected.chars().count() <= min_len {
            return None;
        }
        let start = recited.find(expected)?;

        let expected_words = words(expected);
        let extra_count = words(recited).len().saturating_sub(expected_words.len());
        let before = &recited[..start];
        let after = &recited[start + expected.len()..];

        let mut word_matches: Vec<WordMatch> = expected_words
            .iter()
            .enumerate()
            .map(|(position, &word)| WordMatch {
                word: word.to_string(),
                position,
                is_correct: true,
                confidence: 100.0,
                expected_word: Some(word.to_string()),
            })
            .collect();
        let mut mistakes = Vec::new();

        let noise = words(before).into_iter().chain(words(after));
        for (offset, received) in noise.take(extra_count).enumerate() {
            let position = expected_words.len() + offset;
            word_matches.push(WordMatch {
                word: received.to_string(),
                position,
                is_correct: false,
                confidence: 0.0,
                expected_word: None,
            });
            mistakes.push(Mistake {
                position,
                expected: String::new(),
                received: received.to_string(),
                kind: MistakeKind::Extra,
            });
        }

        Some(VerificationResult {
            is_correct: true,
            accuracy: 100.0,
            word_matches,
            mistakes,
        })
    }
}

/// Verify with default thresholds and the positional word metric
pub fn verify_recitation(recited_text: &str, expected_text: &str) -> VerificationResult {
    Verifier::default().verify(recited_text, expected_text)
}

/// Pair each word of the original verse text with its aligned match status
pub fn map_words_to_original(
    original_text: &str,
    word_matches: &[WordMatch],
) -> Vec<HighlightedWord> {
    original_text
        .split_whitespace()
        .enumerate()
        .map(|(index, word)| {
            let aligned = word_matches.get(index);
            HighlightedWord {
                word: word.to_string(),
                is_correct: aligned.map(|m| m.is_correct).unwrap_or(false),
                confidence: aligned.map(|m| m.confidence).unwrap_or(0.0),
            }
        })
        .collect()
}
