//! Scripted transcript source
//!
//! Replays a fixed list of recognition events, one per pull, as if each had
//! just arrived from a live recognizer. Used for transcript replay files (one
//! JSON event per line) and for deterministic session tests.

use super::{RecognitionEvent, TranscriptSource};
use crate::error::{TilawahError, TilawahResult};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::path::Path;
use tracing::{debug, info};

/// Transcript source that plays back pre-recorded events
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    events: VecDeque<RecognitionEvent>,
    listening: bool,
    starts: usize,
}

impl ScriptedSource {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events: events.into(),
            listening: false,
            starts: 0,
        }
    }

    /// Parse JSON-lines; blank lines and `#` comments are skipped
    pub fn from_jsonl(content: &str) -> TilawahResult<Self> {
        let mut events = Vec::new();
        for (index, line) in content.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let event: RecognitionEvent = serde_json::from_str(line).map_err(|e| {
                TilawahError::Config(format!("transcript line {}: {}", index + 1, e))
            })?;
            events.push(event);
        }
        Ok(Self::new(events))
    }

    /// Load a JSON-lines transcript file
    pub fn load(path: &Path) -> TilawahResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let source = Self::from_jsonl(&content)?;
        info!(
            "📼 Loaded {} transcript event(s) from {}",
            source.remaining(),
            path.display()
        );
        Ok(source)
    }

    /// Events not yet delivered
    pub fn remaining(&self) -> usize {
        self.events.len()
    }

    /// How many times recognition was started
    pub fn start_count(&self) -> usize {
        self.starts
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

#[async_trait]
impl TranscriptSource for ScriptedSource {
    async fn start(&mut self) -> TilawahResult<()> {
        self.starts += 1;
        self.listening = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        if !self.listening {
            return None;
        }
        let event = self.events.pop_front();
        if event.is_none() {
            debug!("Scripted transcript exhausted");
        }
        event
    }

    fn stop(&mut self) {
        self.listening = false;
    }
}
