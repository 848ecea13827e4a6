//! Verse Matcher
//!
//! Scores every verse of the corpus against recognized text and returns the
//! best few candidates.

use crate::config::Thresholds;
use crate::core::text_normalizer::normalize_arabic;
use crate::quran::{Corpus, Verse};
use crate::utils::fuzzy::{clamp_percent, count_keyword_matches, keywords, similarity_normalized};
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

/// A verse with its confidence for one matching call
#[derive(Debug, Clone, Serialize)]
pub struct MatchCandidate {
    pub verse: Verse,
    /// 0-100
    pub confidence: f64,
}

/// Corpus-wide verse matcher
#[derive(Debug, Clone)]
pub struct VerseMatcher {
    corpus: Arc<Corpus>,
    thresholds: Thresholds,
}

impl VerseMatcher {
    pub fn new(corpus: Arc<Corpus>, thresholds: Thresholds) -> Self {
        Self { corpus, thresholds }
    }

    pub fn corpus(&self) -> &Arc<Corpus> {
        &self.corpus
    }

    /// Find the verses that best match the recognized text
    ///
    /// Returns at most `max_candidates` entries, sorted by descending
    /// confidence with corpus order kept for ties. Empty when nothing scores
    /// above the floor.
    pub fn match_verse(&self, recognized_text: &str) -> Vec<MatchCandidate> {
        let normalized = normalize_arabic(recognized_text);
        let recognized_keywords = keywords(&normalized);
        let t = &self.thresholds;

        let mut candidates: Vec<MatchCandidate> = self
            .corpus
            .indexed()
            .iter()
            .filter_map(|entry| {
                let similarity = similarity_normalized(&normalized, &entry.normalized);
                let shared = count_keyword_matches(&recognized_keywords, &entry.keywords);
                let confidence = if shared >= t.keyword_min_matches {
                    clamp_percent(similarity + t.keyword_boost)
                } else {
                    similarity
                };

                (confidence > t.match_floor).then(|| MatchCandidate {
                    verse: entry.verse.clone(),
                    confidence,
                })
            })
            .collect();

        // stable sort keeps corpus order among equal scores
        candidates.sort_by(|a, b| b.confidence.total_cmp(&a.confidence));
        candidates.truncate(t.max_candidates);

        debug!(
            "Matched '{}' -> {} candidate(s)",
            normalized,
            candidates.len()
        );
        candidates
    }

    /// Best candidate, if any
    pub fn best_match(&self, recognized_text: &str) -> Option<MatchCandidate> {
        self.match_verse(recognized_text).into_iter().next()
    }

    /// Find a verse by chapter and verse number
    pub fn get_by_reference(&self, chapter: u32, number_in_chapter: u32) -> Option<&Verse> {
        self.corpus.get_by_reference(chapter, number_in_chapter)
    }
}
