//! Utility modules

pub mod fuzzy;

pub use fuzzy::{
    clamp_percent, edit_distance, has_keyword_overlap, similarity, similarity_normalized,
    word_similarity, WordMetric,
};
