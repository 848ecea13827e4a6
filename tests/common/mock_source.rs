//! Mock transcript source for testing
//!
//! Provides controlled recognizer events for session tests.

use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use tilawah::asr::{RecognitionEvent, TranscriptSource};
use tilawah::error::TilawahResult;

/// Mock recognizer that delivers predetermined events, one per pull
pub struct MockSource {
    /// Queue of events to deliver
    pub events: Vec<RecognitionEvent>,
    /// Current index in events
    idx: usize,
    supported: bool,
    listening: bool,
    /// Deliver queued events through `try_next_event` as well
    burst: bool,
    /// Record every start/stop call (for verification)
    pub calls: Arc<Mutex<Vec<&'static str>>>,
}

impl MockSource {
    pub fn new(events: Vec<RecognitionEvent>) -> Self {
        Self {
            events,
            idx: 0,
            supported: true,
            listening: false,
            burst: false,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// A platform without speech recognition
    pub fn unsupported() -> Self {
        Self {
            supported: false,
            ..Self::new(Vec::new())
        }
    }

    /// All events are already waiting when the session first pulls
    pub fn burst(events: Vec<RecognitionEvent>) -> Self {
        Self {
            burst: true,
            ..Self::new(events)
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len() - self.idx
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    fn record(&self, call: &'static str) {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
    }

    fn pop(&mut self) -> Option<RecognitionEvent> {
        if !self.listening || self.idx >= self.events.len() {
            return None;
        }
        let event = self.events[self.idx].clone();
        self.idx += 1;
        Some(event)
    }
}

#[async_trait]
impl TranscriptSource for MockSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn start(&mut self) -> TilawahResult<()> {
        self.record("start");
        self.listening = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        self.pop()
    }

    fn try_next_event(&mut self) -> Option<RecognitionEvent> {
        if self.burst {
            self.pop()
        } else {
            None
        }
    }

    fn stop(&mut self) {
        self.record("stop");
        self.listening = false;
    }
}
