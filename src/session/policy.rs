//! Streaming policies
//!
//! How a session decides which verse the growing transcript represents:
//! - Sequential: only the verse after the last confirmed one; pauses on detection
//! - BestMatch: every verse of the window, tracking the highest scorer
//! - Discovery: the whole corpus through the verse matcher

use super::{Detection, SessionState, SessionUpdate, SkipReason, StreamingSession};
use crate::matcher::VerseMatcher;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tracing::{debug, info};

/// Selectable streaming strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolicyKind {
    #[default]
    Sequential,
    BestMatch,
    Discovery,
}

impl fmt::Display for PolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PolicyKind::Sequential => write!(f, "sequential"),
            PolicyKind::BestMatch => write!(f, "best-match"),
            PolicyKind::Discovery => write!(f, "discovery"),
        }
    }
}

impl FromStr for PolicyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sequential" => Ok(PolicyKind::Sequential),
            "best-match" | "best_match" | "bestmatch" => Ok(PolicyKind::BestMatch),
            "discovery" => Ok(PolicyKind::Discovery),
            other => Err(format!(
                "unknown policy '{}' (expected sequential, best-match or discovery)",
                other
            )),
        }
    }
}

/// Strategy plus the state it carries between updates
#[derive(Debug, Clone)]
pub enum Policy {
    Sequential {
        /// Window position of the verse being listened for
        next: usize,
    },
    BestMatch {
        /// Position currently believed to be recited
        current: Option<usize>,
    },
    Discovery { matcher: VerseMatcher },
}

impl Policy {
    pub fn kind(&self) -> PolicyKind {
        match self {
            Policy::Sequential { .. } => PolicyKind::Sequential,
            Policy::BestMatch { .. } => PolicyKind::BestMatch,
            Policy::Discovery { .. } => PolicyKind::Discovery,
        }
    }

    pub(super) fn restart(&mut self) {
        match self {
            Policy::Sequential { next } => *next = 0,
            Policy::BestMatch { current } => *current = None,
            Policy::Discovery { .. } => {}
        }
    }
}

impl StreamingSession {
    /// Sequential: verify the transcript against the next expected verse only
    pub(super) fn evaluate_sequential(&mut self, text: &str, is_final: bool) -> SessionUpdate {
        let next = match self.policy {
            Policy::Sequential { next } => next,
            _ => return SessionUpdate::Skipped(SkipReason::NotListening),
        };

        let Some(verse) = self.window.get(next).cloned() else {
            info!("✅ Session complete, all {} verses detected", self.window.len());
            self.state = SessionState::Complete;
            return SessionUpdate::Complete;
        };

        let result = self.verifier.verify(text, &verse.text);
        debug!(
            "🔍 Checking verse {} ({}): {:.1}%",
            next + 1,
            verse.reference(),
            result.accuracy
        );

        if result.accuracy >= self.thresholds.detection {
            info!(
                "✅ Verse {} detected, score {:.1}%",
                verse.reference(),
                result.accuracy
            );
            let detection = Detection {
                position: next,
                verse,
                result,
                recognized_text: text.to_string(),
                is_final,
            };
            self.record(detection.clone());
            self.policy = Policy::Sequential { next: next + 1 };
            self.state = SessionState::Paused;
            return SessionUpdate::Detected(detection);
        }

        debug!(
            "⏸️ Keep reciting ({:.1}%, need {:.0}%)",
            result.accuracy, self.thresholds.detection
        );
        SessionUpdate::Pending {
            position: next,
            accuracy: result.accuracy,
        }
    }

    /// Best-match: verify against every verse of the window, keep the best
    pub(super) fn evaluate_best_match(&mut self, text: &str, is_final: bool) -> SessionUpdate {
        let current = match self.policy {
            Policy::BestMatch { current } => current,
            _ => return SessionUpdate::Skipped(SkipReason::NotListening),
        };

        let mut best: Option<(usize, crate::verifier::VerificationResult)> = None;
        for (position, verse) in self.window.iter().enumerate() {
            let result = self.verifier.verify(text, &verse.text);
            let better = best
                .as_ref()
                .map(|(_, b)| result.accuracy > b.accuracy)
                .unwrap_or(true);
            if better {
                best = Some((position, result));
            }
        }

        let Some((position, result)) = best else {
            return SessionUpdate::Skipped(SkipReason::EmptyWindow);
        };

        if result.accuracy <= self.thresholds.best_match_floor {
            debug!("No verse above floor (best {:.1}%)", result.accuracy);
            return SessionUpdate::Unmatched {
                best_accuracy: result.accuracy,
            };
        }

        let accuracy = result.accuracy;
        let expected_next = current.map(|c| c + 1).unwrap_or(0);
        let stored = match self.results.get(&position) {
            None => true,
            Some(previous) => {
                accuracy > previous.result.accuracy
                    || (position == expected_next && accuracy > self.thresholds.progression)
            }
        };

        if stored {
            debug!(
                "🎯 Verse {} now {:.1}%",
                self.window[position].reference(),
                accuracy
            );
            let detection = Detection {
                position,
                verse: self.window[position].clone(),
                result,
                recognized_text: text.to_string(),
                is_final,
            };
            self.record(detection);
        }

        self.policy = Policy::BestMatch {
            current: Some(position),
        };
        SessionUpdate::Tracking {
            position,
            accuracy,
            stored,
        }
    }

    /// Discovery: corpus-wide candidate ranking
    pub(super) fn evaluate_discovery(&mut self, text: &str, is_final: bool) -> SessionUpdate {
        let Policy::Discovery { matcher } = &self.policy else {
            return SessionUpdate::Skipped(SkipReason::NotListening);
        };

        let candidates = matcher.match_verse(text);
        if let Some(top) = candidates.first() {
            debug!(
                "Top candidate {} at {:.1}%",
                top.verse.reference(),
                top.confidence
            );
        }
        SessionUpdate::Candidates {
            candidates,
            is_complete: is_final,
        }
    }
}
