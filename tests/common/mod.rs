#![allow(dead_code)]

pub mod mock_source;

use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tilawah::quran::{Corpus, Verse};

fn verse(number: u32, chapter: u32, in_chapter: u32, text: &str) -> Verse {
    Verse {
        number,
        text: text.to_string(),
        number_in_chapter: in_chapter,
        juz: if chapter == 1 { 1 } else { 30 },
        page: if chapter == 1 { 1 } else { 604 },
        chapter,
    }
}

/// Al-Fatiha with full diacritics
pub fn fatiha() -> Vec<Verse> {
    vec![
        verse(1, 1, 1, "بِسْمِ ٱللَّهِ ٱلرَّحْمَٰنِ ٱلرَّحِيمِ"),
        verse(2, 1, 2, "ٱلْحَمْدُ لِلَّهِ رَبِّ ٱلْعَٰلَمِينَ"),
        verse(3, 1, 3, "ٱلرَّحْمَٰنِ ٱلرَّحِيمِ"),
        verse(4, 1, 4, "مَٰلِكِ يَوْمِ ٱلدِّينِ"),
        verse(5, 1, 5, "إِيَّاكَ نَعْبُدُ وَإِيَّاكَ نَسْتَعِينُ"),
        verse(6, 1, 6, "ٱهْدِنَا ٱلصِّرَٰطَ ٱلْمُسْتَقِيمَ"),
        verse(
            7,
            1,
            7,
            "صِرَٰطَ ٱلَّذِينَ أَنْعَمْتَ عَلَيْهِمْ غَيْرِ ٱلْمَغْضُوبِ عَلَيْهِمْ وَلَا ٱلضَّآلِّينَ",
        ),
    ]
}

/// Al-Ikhlas with full diacritics
pub fn ikhlas() -> Vec<Verse> {
    vec![
        verse(6222, 112, 1, "قُلْ هُوَ ٱللَّهُ أَحَدٌ"),
        verse(6223, 112, 2, "ٱللَّهُ ٱلصَّمَدُ"),
        verse(6224, 112, 3, "لَمْ يَلِدْ وَلَمْ يُولَدْ"),
        verse(6225, 112, 4, "وَلَمْ يَكُن لَّهُۥ كُفُوًا أَحَدٌۢ"),
    ]
}

/// Small corpus: Al-Fatiha followed by Al-Ikhlas
pub fn sample_verses() -> Vec<Verse> {
    let mut verses = fatiha();
    verses.extend(ikhlas());
    verses
}

pub fn sample_corpus() -> Arc<Corpus> {
    Arc::new(Corpus::from_verses(sample_verses()))
}

/// Write the sample corpus in the on-disk layout and return its path
pub fn write_corpus(dir: &Path) -> PathBuf {
    let path = dir.join("quran.json");
    let content = json!({ "ayahs": sample_verses() });
    std::fs::write(&path, content.to_string()).expect("Failed to write corpus");
    path
}
