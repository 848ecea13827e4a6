//! Text Normalization
//!
//! Canonicalizes Arabic text before any comparison. Recognizer output and
//! the scripted verse text disagree mostly on short-vowel marks and
//! orthographic variants that do not change the word, so both sides go
//! through the same pipeline.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Harakat, tanween, shadda, sukun and the other combining marks
    /// (U+064B..U+065F) plus the superscript alef (U+0670)
    static ref DIACRITICS: Regex = Regex::new("[\u{064B}-\u{065F}\u{0670}]").unwrap();

    /// Alef with madda, hamza above, hamza below, and alef wasla
    static ref ALEF_VARIANTS: Regex = Regex::new("[\u{0622}\u{0623}\u{0625}\u{0671}]").unwrap();

    /// Hamza seated on waw / yaa
    static ref SEATED_HAMZA: Regex = Regex::new("[\u{0624}\u{0626}]").unwrap();

    static ref WHITESPACE: Regex = Regex::new(r"\s+").unwrap();
}

const ALEF: &str = "\u{0627}";
const ALEF_MAQSURA: char = '\u{0649}';
const YAA: &str = "\u{064A}";
const TAA_MARBUTA: char = '\u{0629}';
const HAA: &str = "\u{0647}";
const TATWEEL: char = '\u{0640}';

/// Normalize Arabic text for matching
///
/// Steps run in a fixed order:
/// 1. remove diacritics
/// 2. alef variants (أ إ آ ٱ) -> ا
/// 3. alef maqsura ى -> ي
/// 4. taa marbuta ة -> ه
/// 5. remove tatweel
/// 6. remove hamza on waw / yaa (ؤ ئ)
/// 7. collapse whitespace, trim, lowercase
///
/// Total over any input and idempotent.
pub fn normalize_arabic(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let result = DIACRITICS.replace_all(text, "");
    let result = ALEF_VARIANTS.replace_all(&result, ALEF);
    let result = result.replace(ALEF_MAQSURA, YAA);
    let result = result.replace(TAA_MARBUTA, HAA);
    let result = result.replace(TATWEEL, "");
    let result = SEATED_HAMZA.replace_all(&result, "");
    let result = WHITESPACE.replace_all(&result, " ");

    result.trim().to_lowercase()
}

/// Split normalized text into words
pub fn words(normalized: &str) -> Vec<&str> {
    normalized.split_whitespace().collect()
}
