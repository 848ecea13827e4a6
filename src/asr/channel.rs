//! Live transcript sources
//!
//! A recognizer running elsewhere (its own task or callback thread) pushes
//! events into a channel or stream; the session pulls them from here.

use super::{RecognitionEvent, TranscriptSource};
use crate::error::{TilawahError, TilawahResult};
use async_trait::async_trait;
use futures::{FutureExt, Stream, StreamExt};
use tokio::sync::mpsc;
use tracing::debug;

/// Transcript source backed by a tokio channel
pub struct ChannelSource {
    rx: mpsc::Receiver<RecognitionEvent>,
    listening: bool,
}

impl ChannelSource {
    pub fn new(rx: mpsc::Receiver<RecognitionEvent>) -> Self {
        Self {
            rx,
            listening: false,
        }
    }

    /// Create a source together with the sender the recognizer writes to
    pub fn pair(buffer: usize) -> (mpsc::Sender<RecognitionEvent>, Self) {
        let (tx, rx) = mpsc::channel(buffer.max(1));
        (tx, Self::new(rx))
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }
}

#[async_trait]
impl TranscriptSource for ChannelSource {
    async fn start(&mut self) -> TilawahResult<()> {
        if self.rx.is_closed() && self.rx.is_empty() {
            return Err(TilawahError::Unsupported(
                "recognizer channel is closed".to_string(),
            ));
        }
        self.listening = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        if !self.listening {
            return None;
        }
        self.rx.recv().await
    }

    fn try_next_event(&mut self) -> Option<RecognitionEvent> {
        if !self.listening {
            return None;
        }
        self.rx.try_recv().ok()
    }

    fn stop(&mut self) {
        debug!("Channel source stopped");
        self.listening = false;
    }
}

/// Transcript source backed by any event stream
pub struct StreamSource<S> {
    stream: S,
    listening: bool,
}

impl<S> StreamSource<S>
where
    S: Stream<Item = RecognitionEvent> + Unpin + Send,
{
    pub fn new(stream: S) -> Self {
        Self {
            stream,
            listening: false,
        }
    }
}

#[async_trait]
impl<S> TranscriptSource for StreamSource<S>
where
    S: Stream<Item = RecognitionEvent> + Unpin + Send,
{
    async fn start(&mut self) -> TilawahResult<()> {
        self.listening = true;
        Ok(())
    }

    async fn next_event(&mut self) -> Option<RecognitionEvent> {
        if !self.listening {
            return None;
        }
        self.stream.next().await
    }

    fn try_next_event(&mut self) -> Option<RecognitionEvent> {
        if !self.listening {
            return None;
        }
        self.stream.next().now_or_never().flatten()
    }

    fn stop(&mut self) {
        self.listening = false;
    }
}
