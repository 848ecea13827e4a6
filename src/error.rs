//! Tilawah Error Types
//!
//! Centralized error handling. The text-processing core is total and never
//! produces these; only loading, configuration and live sessions do.

use crate::asr::RecognitionErrorKind;
use thiserror::Error;

/// Central error type for Tilawah
#[derive(Error, Debug)]
pub enum TilawahError {
    #[error("Corpus error: {0}")]
    Corpus(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Speech recognition unsupported: {0}")]
    Unsupported(String),

    #[error("Speech recognition failed ({kind}): {message}")]
    Recognition {
        kind: RecognitionErrorKind,
        message: String,
    },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Lock poisoned: {0}")]
    Lock(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias for Tilawah operations
pub type TilawahResult<T> = Result<T, TilawahError>;

/// Helper to convert lock poison errors
impl<T> From<std::sync::PoisonError<T>> for TilawahError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        TilawahError::Lock(err.to_string())
    }
}

impl TilawahError {
    /// True when the error ends the session (as opposed to bad input on the CLI)
    pub fn is_fatal_recognition(&self) -> bool {
        matches!(
            self,
            TilawahError::Recognition { .. } | TilawahError::Unsupported(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognition_error_display() {
        let err = TilawahError::Recognition {
            kind: RecognitionErrorKind::NotAllowed,
            message: "microphone permission denied".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Speech recognition failed (not-allowed): microphone permission denied"
        );
        assert!(err.is_fatal_recognition());
    }

    #[test]
    fn test_poison_conversion() {
        let lock = std::sync::Mutex::new(0u8);
        let _ = std::panic::catch_unwind(|| {
            let _guard = lock.lock().unwrap();
            panic!("poison");
        });
        let err: TilawahError = lock.lock().unwrap_err().into();
        assert!(matches!(err, TilawahError::Lock(_)));
        assert!(!err.is_fatal_recognition());
    }
}
