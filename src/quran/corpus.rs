//! Verse corpus
//!
//! The ordered, read-only list of verses, loaded once. Normalized text and
//! keywords are computed at load time so corpus-wide scans during live
//! recitation only normalize the incoming transcript.

use super::Verse;
use crate::core::text_normalizer::normalize_arabic;
use crate::error::{TilawahError, TilawahResult};
use crate::utils::fuzzy::keywords;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};
use tracing::{debug, info};

/// Process-wide corpus, loaded on first use
static SHARED_CORPUS: RwLock<Option<(PathBuf, Arc<Corpus>)>> = RwLock::new(None);

/// On-disk layout: `{"ayahs": [...]}`
#[derive(Debug, Deserialize)]
struct CorpusFile {
    ayahs: Vec<Verse>,
}

/// A verse with its comparison forms cached
#[derive(Debug, Clone)]
pub struct IndexedVerse {
    pub verse: Verse,
    pub normalized: String,
    pub keywords: Vec<String>,
}

impl IndexedVerse {
    fn new(verse: Verse) -> Self {
        let normalized = normalize_arabic(&verse.text);
        let keywords = keywords(&normalized);
        Self {
            verse,
            normalized,
            keywords,
        }
    }
}

/// Immutable, ordered verse corpus
#[derive(Debug, Clone, Default)]
pub struct Corpus {
    entries: Vec<IndexedVerse>,
    verses: Vec<Verse>,
}

impl Corpus {
    /// Build a corpus from verses already in canonical order
    pub fn from_verses(verses: Vec<Verse>) -> Self {
        let entries = verses.iter().cloned().map(IndexedVerse::new).collect();
        Self { entries, verses }
    }

    /// Load a corpus JSON file
    pub fn load(path: &Path) -> TilawahResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            TilawahError::Corpus(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_json(&content)
    }

    /// Parse the corpus JSON layout
    pub fn from_json(content: &str) -> TilawahResult<Self> {
        let file: CorpusFile = serde_json::from_str(content)
            .map_err(|e| TilawahError::Corpus(format!("Invalid corpus JSON: {}", e)))?;

        let corpus = Self::from_verses(file.ayahs);
        info!("📖 Loaded {} verses", corpus.len());
        Ok(corpus)
    }

    pub fn len(&self) -> usize {
        self.verses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verses.is_empty()
    }

    /// All verses in canonical order
    pub fn verses(&self) -> &[Verse] {
        &self.verses
    }

    /// Verses with cached normalized text
    pub fn indexed(&self) -> &[IndexedVerse] {
        &self.entries
    }

    /// Find a verse by chapter and verse number
    pub fn get_by_reference(&self, chapter: u32, number_in_chapter: u32) -> Option<&Verse> {
        self.verses
            .iter()
            .find(|v| v.chapter == chapter && v.number_in_chapter == number_in_chapter)
    }

    /// The contiguous run of verses belonging to a chapter
    pub fn chapter_verses(&self, chapter: u32) -> &[Verse] {
        let start = self.verses.iter().position(|v| v.chapter == chapter);
        match start {
            Some(start) => {
                let len = self.verses[start..]
                    .iter()
                    .take_while(|v| v.chapter == chapter)
                    .count();
                &self.verses[start..start + len]
            }
            None => &[],
        }
    }

    /// Number of practice sessions a chapter splits into
    pub fn session_count(&self, chapter: u32, per_session: usize) -> usize {
        let total = self.chapter_verses(chapter).len();
        if per_session == 0 {
            return 0;
        }
        total.div_ceil(per_session)
    }

    /// Verses of one practice session: `per_session` verses starting at
    /// `session_index * per_session`
    pub fn session_window(
        &self,
        chapter: u32,
        session_index: usize,
        per_session: usize,
    ) -> &[Verse] {
        let verses = self.chapter_verses(chapter);
        let start = session_index.saturating_mul(per_session);
        if start >= verses.len() {
            return &[];
        }
        let end = (start + per_session).min(verses.len());
        &verses[start..end]
    }
}

/// Get the process-wide corpus, loading it from `path` on first use
///
/// Later calls return the same corpus; the path of the first load wins.
pub fn shared(path: &Path) -> TilawahResult<Arc<Corpus>> {
    {
        let cache = SHARED_CORPUS.read()?;
        if let Some((loaded_from, corpus)) = cache.as_ref() {
            if loaded_from != path {
                debug!(
                    "Corpus already loaded from {}, ignoring {}",
                    loaded_from.display(),
                    path.display()
                );
            }
            return Ok(Arc::clone(corpus));
        }
    }

    let mut cache = SHARED_CORPUS.write()?;
    // another caller may have loaded it while we waited for the write lock
    if let Some((_, corpus)) = cache.as_ref() {
        return Ok(Arc::clone(corpus));
    }

    let corpus = Arc::new(Corpus::load(path)?);
    *cache = Some((path.to_path_buf(), Arc::clone(&corpus)));
    Ok(corpus)
}
