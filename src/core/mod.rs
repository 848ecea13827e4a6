//! Core text processing
//!
//! Arabic normalization shared by the matcher and the verifier.

pub mod text_normalizer;

pub use text_normalizer::normalize_arabic;
