//! Drives a session from a transcript source
//!
//! Pulls events until the session detects a verse, completes its window, the
//! recognizer ends, or a fatal error arrives. Events that queued up while the
//! previous evaluation ran are applied together and evaluated once, so only
//! the latest transcript is ever scored.

use super::{Applied, SessionState, SessionUpdate, StreamingSession};
use crate::asr::{RecognitionEvent, TranscriptSource};
use crate::error::{TilawahError, TilawahResult};
use tracing::{debug, info};

pub struct SessionRunner<S> {
    source: S,
}

impl<S: TranscriptSource> SessionRunner<S> {
    pub fn new(source: S) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn into_source(self) -> S {
        self.source
    }

    /// Listen until the session reaches a stopping point
    ///
    /// Every evaluation is reported to `on_update`; the last one is returned.
    pub async fn run<F>(
        &mut self,
        session: &mut StreamingSession,
        mut on_update: F,
    ) -> TilawahResult<SessionUpdate>
    where
        F: FnMut(&SessionUpdate),
    {
        if !self.source.is_supported() {
            return Err(TilawahError::Unsupported(
                "speech recognition is not available".to_string(),
            ));
        }

        match session.state() {
            SessionState::Complete => return Ok(SessionUpdate::Complete),
            SessionState::Paused | SessionState::Ended => session.resume(),
            SessionState::Failed => session.reset(),
            SessionState::Listening => {}
        }
        if session.is_complete() {
            return Ok(SessionUpdate::Complete);
        }

        self.source.start().await?;
        info!("🎤 Listening (session {})", session.id());

        loop {
            let first = self.source.next_event().await;
            let ended = match first {
                Some(event) => self.apply_pending(session, event)?,
                None => true,
            };

            if ended {
                let update = session.finish();
                on_update(&update);
                self.source.stop();
                info!("🛑 Recognition ended");
                return Ok(update);
            }

            if !session.is_dirty() {
                continue;
            }

            let update = session.evaluate();
            on_update(&update);
            if matches!(update, SessionUpdate::Detected(_) | SessionUpdate::Complete) {
                self.source.stop();
                return Ok(update);
            }
        }
    }

    /// Apply an event plus everything already queued behind it
    ///
    /// Returns true once the recognizer reported the end of the stream.
    fn apply_pending(
        &mut self,
        session: &mut StreamingSession,
        event: RecognitionEvent,
    ) -> TilawahResult<bool> {
        let mut next = Some(event);
        let mut superseded = 0usize;

        while let Some(event) = next.take() {
            match session.apply(event) {
                Ok(Applied::End) => return Ok(true),
                Ok(Applied::Text) => superseded += 1,
                Ok(Applied::Ignored) => {}
                Err(e) => {
                    self.source.stop();
                    return Err(e);
                }
            }
            next = self.source.try_next_event();
        }

        if superseded > 1 {
            debug!("Coalesced {} transcript updates", superseded);
        }
        Ok(false)
    }
}
