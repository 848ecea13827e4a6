//! Quran data model
//!
//! Immutable verse and chapter records, the chapter metadata table and the
//! in-memory verse corpus.

pub mod chapters;
pub mod corpus;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use chapters::{all_chapters, chapter};
pub use corpus::Corpus;

/// One verse of the corpus
///
/// Field names on disk follow the corpus download format (`numberInSurah`, `surah`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verse {
    /// Global sequence number (1..=6236)
    pub number: u32,
    /// Verse text with diacritics
    pub text: String,
    /// Position within its chapter (1-based)
    #[serde(rename = "numberInSurah")]
    pub number_in_chapter: u32,
    /// 30-part division index, display only
    #[serde(default)]
    pub juz: u32,
    /// Page index, display only
    #[serde(default)]
    pub page: u32,
    /// Chapter number
    #[serde(rename = "surah")]
    pub chapter: u32,
}

impl Verse {
    /// "chapter:verse" reference
    pub fn reference(&self) -> String {
        format!("{}:{}", self.chapter, self.number_in_chapter)
    }
}

/// Revelation context of a chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RevelationType {
    Meccan,
    Medinan,
}

impl fmt::Display for RevelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RevelationType::Meccan => write!(f, "Meccan"),
            RevelationType::Medinan => write!(f, "Medinan"),
        }
    }
}

/// Chapter metadata, used to decorate results
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chapter {
    pub number: u32,
    /// Native-script name
    pub name: String,
    /// Transliterated name
    pub english_name: String,
    pub english_name_translation: String,
    pub number_of_ayahs: u32,
    pub revelation_type: RevelationType,
}
