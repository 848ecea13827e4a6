//! ASR (Automatic Speech Recognition) Module
//!
//! The recognizer itself is external. This module defines the capability
//! the session controller is constructed with, and the events it delivers:
//! - Channel: live recognizer feeding a tokio channel
//! - Scripted: pre-recorded events (replay files, tests)

pub mod channel;
pub mod scripted;

use crate::error::TilawahResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub use channel::{ChannelSource, StreamSource};
pub use scripted::ScriptedSource;

/// Error codes reported by the recognizer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RecognitionErrorKind {
    /// No speech heard before the recognizer timed out
    NoSpeech,
    /// Stream aborted by the recognizer
    Aborted,
    /// Microphone capture hiccup
    AudioCapture,
    /// Recognition service unreachable for a moment
    Network,
    /// Microphone permission denied
    NotAllowed,
    /// Recognition service refused the request
    ServiceNotAllowed,
    /// Recognition language not available
    LanguageNotSupported,
    BadGrammar,
}

impl RecognitionErrorKind {
    /// Transient errors are logged and the session keeps listening
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            RecognitionErrorKind::NoSpeech
                | RecognitionErrorKind::Aborted
                | RecognitionErrorKind::AudioCapture
                | RecognitionErrorKind::Network
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RecognitionErrorKind::NoSpeech => "no-speech",
            RecognitionErrorKind::Aborted => "aborted",
            RecognitionErrorKind::AudioCapture => "audio-capture",
            RecognitionErrorKind::Network => "network",
            RecognitionErrorKind::NotAllowed => "not-allowed",
            RecognitionErrorKind::ServiceNotAllowed => "service-not-allowed",
            RecognitionErrorKind::LanguageNotSupported => "language-not-supported",
            RecognitionErrorKind::BadGrammar => "bad-grammar",
        }
    }
}

impl fmt::Display for RecognitionErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecognitionErrorKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "no-speech" => Ok(RecognitionErrorKind::NoSpeech),
            "aborted" => Ok(RecognitionErrorKind::Aborted),
            "audio-capture" => Ok(RecognitionErrorKind::AudioCapture),
            "network" => Ok(RecognitionErrorKind::Network),
            "not-allowed" => Ok(RecognitionErrorKind::NotAllowed),
            "service-not-allowed" => Ok(RecognitionErrorKind::ServiceNotAllowed),
            "language-not-supported" => Ok(RecognitionErrorKind::LanguageNotSupported),
            "bad-grammar" => Ok(RecognitionErrorKind::BadGrammar),
            other => Err(format!("unknown recognition error: {}", other)),
        }
    }
}

/// One update from the recognizer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RecognitionEvent {
    /// Text that may still be revised; replaces the previous interim text
    Interim { text: String },
    /// Committed text; appended to the transcript
    Final { text: String },
    Error {
        kind: RecognitionErrorKind,
        #[serde(default)]
        message: String,
    },
    /// Recognizer stopped
    End,
}

impl RecognitionEvent {
    pub fn interim(text: &str) -> Self {
        RecognitionEvent::Interim {
            text: text.to_string(),
        }
    }

    pub fn final_text(text: &str) -> Self {
        RecognitionEvent::Final {
            text: text.to_string(),
        }
    }

    pub fn error(kind: RecognitionErrorKind) -> Self {
        RecognitionEvent::Error {
            kind,
            message: String::new(),
        }
    }
}

/// Capability object that delivers transcript updates
///
/// Injected into the session runner instead of looking up a global recognizer.
#[async_trait]
pub trait TranscriptSource: Send {
    /// Whether a recognizer is available at all
    fn is_supported(&self) -> bool {
        true
    }

    /// Begin (or resume) recognition
    async fn start(&mut self) -> TilawahResult<()>;

    /// Next update, `None` once the stream has ended
    async fn next_event(&mut self) -> Option<RecognitionEvent>;

    /// An update that is already waiting, without blocking
    fn try_next_event(&mut self) -> Option<RecognitionEvent> {
        None
    }

    /// Stop recognition
    fn stop(&mut self);
}
