//! Tilawah Library
//!
//! Recitation checking for Quran practice: Arabic text normalization,
//! verse identification, word-level verification and streaming sessions
//! driven by an external speech recognizer.

pub mod asr;
pub mod config;
pub mod core;
pub mod error;
pub mod matcher;
pub mod quran;
pub mod session;
pub mod utils;
pub mod verifier;

pub use error::{TilawahError, TilawahResult};
