//! Chapter metadata table
//!
//! The chapters the application ships practice material for.

use super::{Chapter, RevelationType};
use lazy_static::lazy_static;

lazy_static! {
    static ref CHAPTERS: Vec<Chapter> = {
        use RevelationType::{Meccan, Medinan};
        [
            (1, "الفاتحة", "Al-Fatihah", "The Opening", 7, Meccan),
            (2, "البقرة", "Al-Baqarah", "The Cow", 286, Medinan),
            (3, "آل عمران", "Ali Imran", "Family of Imran", 200, Medinan),
            (4, "النساء", "An-Nisa", "The Women", 176, Medinan),
            (5, "المائدة", "Al-Maidah", "The Table Spread", 120, Medinan),
            (6, "الأنعام", "Al-Anam", "The Cattle", 165, Meccan),
            (7, "الأعراف", "Al-Araf", "The Heights", 206, Meccan),
            (18, "الكهف", "Al-Kahf", "The Cave", 110, Meccan),
            (36, "يس", "Ya-Sin", "Ya Sin", 83, Meccan),
            (55, "الرحمن", "Ar-Rahman", "The Beneficent", 78, Medinan),
            (67, "الملك", "Al-Mulk", "The Sovereignty", 30, Meccan),
            (78, "النبأ", "An-Naba", "The Tidings", 40, Meccan),
            (112, "الإخلاص", "Al-Ikhlas", "The Sincerity", 4, Meccan),
            (113, "الفلق", "Al-Falaq", "The Daybreak", 5, Meccan),
            (114, "الناس", "An-Nas", "Mankind", 6, Meccan),
        ]
        .into_iter()
        .map(|(number, name, english, meaning, count, revelation)| Chapter {
            number,
            name: name.to_string(),
            english_name: english.to_string(),
            english_name_translation: meaning.to_string(),
            number_of_ayahs: count,
            revelation_type: revelation,
        })
        .collect()
    };
}

/// Look up chapter metadata by number
pub fn chapter(number: u32) -> Option<&'static Chapter> {
    CHAPTERS.iter().find(|c| c.number == number)
}

/// All known chapters, in order
pub fn all_chapters() -> &'static [Chapter] {
    &CHAPTERS
}

/// Display label: "Al-Fatihah (الفاتحة)", or "Chapter N" when unknown
pub fn display_name(number: u32) -> String {
    match chapter(number) {
        Some(c) => format!("{} ({})", c.english_name, c.name),
        None => format!("Chapter {}", number),
    }
}
