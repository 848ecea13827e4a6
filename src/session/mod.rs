//! Streaming Session Controller
//!
//! Re-evaluates a growing transcript as interim and final recognition
//! results arrive, and decides which verse of a practice window is being
//! recited. One session owns its transcript and results exclusively.

pub mod policy;
pub mod runner;

use crate::asr::RecognitionEvent;
use crate::config::Thresholds;
use crate::error::{TilawahError, TilawahResult};
use crate::matcher::{MatchCandidate, VerseMatcher};
use crate::quran::Verse;
use crate::verifier::{VerificationResult, Verifier};
use chrono::Local;
use rand::Rng;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, error, warn};

pub use policy::{Policy, PolicyKind};
pub use runner::SessionRunner;

/// Accumulated recognizer output
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    committed: String,
    interim: String,
}

impl Transcript {
    /// Append a final segment; the interim text it replaces is dropped
    pub fn commit(&mut self, text: &str) {
        let text = text.trim();
        if !text.is_empty() {
            if !self.committed.is_empty() {
                self.committed.push(' ');
            }
            self.committed.push_str(text);
        }
        self.interim.clear();
    }

    /// Replace the interim segment
    pub fn set_interim(&mut self, text: &str) {
        self.interim = text.trim().to_string();
    }

    pub fn committed(&self) -> &str {
        &self.committed
    }

    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Committed text when there is any, otherwise the interim text
    pub fn text_to_evaluate(&self) -> &str {
        if self.committed.is_empty() {
            &self.interim
        } else {
            &self.committed
        }
    }

    /// Committed and interim text together
    pub fn combined(&self) -> String {
        format!("{} {}", self.committed, self.interim)
            .trim()
            .to_string()
    }

    pub fn is_empty(&self) -> bool {
        self.committed.is_empty() && self.interim.is_empty()
    }

    pub fn clear(&mut self) {
        self.committed.clear();
        self.interim.clear();
    }
}

/// Lifecycle of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Accepting and evaluating updates
    Listening,
    /// A verse was detected; updates are ignored until `resume`
    Paused,
    /// Every verse of the window was detected
    Complete,
    /// The recognizer stream ended
    Ended,
    /// A fatal recognizer error discarded the session state
    Failed,
}

/// Why an update produced no evaluation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Fewer characters than the evaluation minimum
    TooShort,
    NotListening,
    /// Transient recognizer error or an event with nothing to evaluate
    Ignored,
    EmptyWindow,
}

/// A verse detected (or tracked) at a window position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Detection {
    pub position: usize,
    pub verse: Verse,
    pub result: VerificationResult,
    pub recognized_text: String,
    /// Produced by the end-of-stream evaluation
    pub is_final: bool,
}

/// Outcome of one evaluation
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionUpdate {
    Skipped(SkipReason),
    /// Sequential: next verse still below the detection threshold
    Pending { position: usize, accuracy: f64 },
    /// Sequential: next verse detected, session paused
    Detected(Detection),
    /// Best-match: verse currently recited
    Tracking {
        position: usize,
        accuracy: f64,
        stored: bool,
    },
    /// Best-match: nothing above the floor
    Unmatched { best_accuracy: f64 },
    /// Discovery: ranked corpus candidates
    Candidates {
        candidates: Vec<MatchCandidate>,
        is_complete: bool,
    },
    Complete,
}

/// A recorded attempt, handed to the storage collaborator
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attempt {
    pub session_id: String,
    pub chapter: u32,
    pub verse: u32,
    pub recognized_text: String,
    pub confidence_score: f64,
    /// RFC 3339 timestamp
    pub created_at: String,
}

/// Aggregate results of a session window
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub total: usize,
    pub detected: usize,
    /// Detected with accuracy at or above the verse threshold
    pub completed: usize,
    /// Mean accuracy over detected verses, 0 when none
    pub average_accuracy: f64,
}

/// Result of feeding one event to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// Transcript changed and needs evaluation
    Text,
    Ignored,
    End,
}

/// Session id: `<unix millis>-<9 base36 chars>`
pub fn generate_session_id() -> String {
    let mut rng = rand::thread_rng();
    let suffix: String = (0..9)
        .filter_map(|_| std::char::from_digit(rng.gen_range(0..36), 36))
        .collect();
    format!("{}-{}", Local::now().timestamp_millis(), suffix)
}

/// One streaming recitation session
#[derive(Debug, Clone)]
pub struct StreamingSession {
    id: String,
    window: Vec<Verse>,
    policy: Policy,
    verifier: Verifier,
    thresholds: Thresholds,
    transcript: Transcript,
    state: SessionState,
    dirty: bool,
    results: BTreeMap<usize, Detection>,
    attempts: Vec<Attempt>,
    /// Index into `attempts` of the attempt backing each stored result
    live: BTreeMap<usize, usize>,
}

impl StreamingSession {
    fn with_policy(window: Vec<Verse>, policy: Policy, verifier: Verifier) -> Self {
        let thresholds = *verifier.thresholds();
        Self {
            id: generate_session_id(),
            window,
            policy,
            verifier,
            thresholds,
            transcript: Transcript::default(),
            state: SessionState::Listening,
            dirty: false,
            results: BTreeMap::new(),
            attempts: Vec::new(),
            live: BTreeMap::new(),
        }
    }

    /// Guided session: listen for each verse of the window in order
    pub fn sequential(window: Vec<Verse>, verifier: Verifier) -> Self {
        Self::with_policy(window, Policy::Sequential { next: 0 }, verifier)
    }

    /// Free recitation within the window
    pub fn best_match(window: Vec<Verse>, verifier: Verifier) -> Self {
        Self::with_policy(window, Policy::BestMatch { current: None }, verifier)
    }

    /// Free recitation anywhere in the corpus
    pub fn discovery(matcher: VerseMatcher, verifier: Verifier) -> Self {
        Self::with_policy(Vec::new(), Policy::Discovery { matcher }, verifier)
    }

    /// Build the session for a configured policy
    pub fn for_policy(
        kind: PolicyKind,
        window: Vec<Verse>,
        matcher: VerseMatcher,
        verifier: Verifier,
    ) -> Self {
        match kind {
            PolicyKind::Sequential => Self::sequential(window, verifier),
            PolicyKind::BestMatch => Self::best_match(window, verifier),
            PolicyKind::Discovery => Self::discovery(matcher, verifier),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    pub fn window(&self) -> &[Verse] {
        &self.window
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Stored results keyed by window position
    pub fn results(&self) -> &BTreeMap<usize, Detection> {
        &self.results
    }

    pub fn attempts(&self) -> &[Attempt] {
        &self.attempts
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// True when text arrived since the last evaluation
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Feed one recognizer event without evaluating
    ///
    /// Transient errors are logged and ignored. A fatal error discards the
    /// transcript and results and is returned to the caller.
    pub fn apply(&mut self, event: RecognitionEvent) -> TilawahResult<Applied> {
        match event {
            RecognitionEvent::Interim { text } => Ok(self.accept_text(|t| t.set_interim(&text))),
            RecognitionEvent::Final { text } => Ok(self.accept_text(|t| t.commit(&text))),
            RecognitionEvent::Error { kind, message } if kind.is_transient() => {
                warn!("Recognition hiccup ({}), still listening: {}", kind, message);
                Ok(Applied::Ignored)
            }
            RecognitionEvent::Error { kind, message } => {
                error!("❌ Recognition failed ({}): {}", kind, message);
                self.discard();
                Err(TilawahError::Recognition { kind, message })
            }
            RecognitionEvent::End => Ok(Applied::End),
        }
    }

    fn accept_text(&mut self, update: impl FnOnce(&mut Transcript)) -> Applied {
        if self.state != SessionState::Listening {
            debug!("Ignoring transcript update while {:?}", self.state);
            return Applied::Ignored;
        }
        update(&mut self.transcript);
        self.dirty = true;
        Applied::Text
    }

    /// Feed one event and evaluate the transcript
    pub fn push(&mut self, event: RecognitionEvent) -> TilawahResult<SessionUpdate> {
        Ok(match self.apply(event)? {
            Applied::Text => self.evaluate(),
            Applied::Ignored => SessionUpdate::Skipped(SkipReason::Ignored),
            Applied::End => self.finish(),
        })
    }

    /// Evaluate the current transcript with the session's policy
    pub fn evaluate(&mut self) -> SessionUpdate {
        self.evaluate_inner(false)
    }

    /// Best-effort evaluation when the recognizer stream ends
    pub fn finish(&mut self) -> SessionUpdate {
        if self.state != SessionState::Listening {
            return SessionUpdate::Skipped(SkipReason::NotListening);
        }

        let update = self.evaluate_inner(true);
        if self.state == SessionState::Listening {
            self.state = SessionState::Ended;
        }
        update
    }

    fn evaluate_inner(&mut self, is_final: bool) -> SessionUpdate {
        if self.state != SessionState::Listening {
            return SessionUpdate::Skipped(SkipReason::NotListening);
        }
        self.dirty = false;

        // discovery looks at everything heard so far; the final pass only
        // at committed text
        let text = match (&self.policy, is_final) {
            (Policy::Discovery { .. }, false) => self.transcript.combined(),
            (Policy::Discovery { .. }, true) => self.transcript.committed().to_string(),
            _ => self.transcript.text_to_evaluate().to_string(),
        };

        let min_chars = match self.policy {
            Policy::Discovery { .. } => self.thresholds.discovery_min_chars,
            _ => self.thresholds.min_evaluation_chars,
        };
        let length = text.chars().count();
        if length < min_chars {
            debug!("⏭️ Skipping: text too short ({} chars)", length);
            return SessionUpdate::Skipped(SkipReason::TooShort);
        }

        match self.policy.kind() {
            PolicyKind::Sequential => self.evaluate_sequential(&text, is_final),
            PolicyKind::BestMatch => self.evaluate_best_match(&text, is_final),
            PolicyKind::Discovery => self.evaluate_discovery(&text, is_final),
        }
    }

    /// Continue after a detection (or a new recognizer run after the stream
    /// ended) with a fresh transcript
    pub fn resume(&mut self) {
        match self.state {
            SessionState::Paused | SessionState::Ended => {
                self.transcript.clear();
                self.dirty = false;
                self.state = if self.all_detected() {
                    SessionState::Complete
                } else {
                    SessionState::Listening
                };
            }
            SessionState::Failed => warn!("Session {} failed; reset it to retry", self.id),
            SessionState::Listening | SessionState::Complete => {}
        }
    }

    /// Retry the same window from the start
    ///
    /// Attempts already recorded are kept.
    pub fn reset(&mut self) {
        self.transcript.clear();
        self.results.clear();
        self.live.clear();
        self.dirty = false;
        self.policy.restart();
        self.state = SessionState::Listening;
    }

    fn all_detected(&self) -> bool {
        match self.policy {
            Policy::Sequential { next } => next >= self.window.len(),
            _ => false,
        }
    }

    fn discard(&mut self) {
        self.transcript.clear();
        self.results.clear();
        self.attempts.clear();
        self.live.clear();
        self.dirty = false;
        self.state = SessionState::Failed;
    }

    /// Store a result; a position that already has one replaces its attempt
    fn record(&mut self, detection: Detection) {
        let attempt = Attempt {
            session_id: self.id.clone(),
            chapter: detection.verse.chapter,
            verse: detection.verse.number_in_chapter,
            recognized_text: detection.recognized_text.clone(),
            confidence_score: detection.result.accuracy,
            created_at: Local::now().to_rfc3339(),
        };
        match self.live.get(&detection.position) {
            Some(&index) => self.attempts[index] = attempt,
            None => {
                self.live.insert(detection.position, self.attempts.len());
                self.attempts.push(attempt);
            }
        }
        self.results.insert(detection.position, detection);
    }

    /// Aggregate accuracy over the window
    pub fn summary(&self) -> SessionSummary {
        let detected = self.results.len();
        let completed = self
            .results
            .values()
            .filter(|d| d.result.accuracy >= self.thresholds.verse_correct)
            .count();
        let average_accuracy = if detected == 0 {
            0.0
        } else {
            self.results.values().map(|d| d.result.accuracy).sum::<f64>() / detected as f64
        };

        SessionSummary {
            total: self.window.len(),
            detected,
            completed,
            average_accuracy,
        }
    }
}
