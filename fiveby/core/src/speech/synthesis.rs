//! Speech synthesis
//!
//! [`Narrator`] speaks one utterance at a time. Each call to
//! [`Narrator::speak`] cancels whatever was playing, then waits for the engine
//! to report that the new utterance started. If it has not started within the
//! start timeout the utterance is cancelled and the call fails.
//!
//! [`QuestionAnnouncer`] reads out each newly asked question once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;

use super::SpeechError;
use crate::config::SpeechConfig;
use crate::events::{interpret, EventKey, GameEvent, Interpretation};
use crate::schema::{EventType, SessionSnapshot};

/// A text-to-speech engine
#[async_trait]
pub trait SynthesisEngine: Send + Sync {
    /// Whether the engine can run at all
    fn is_supported(&self) -> bool;

    /// Queue `text`; resolves once playback has started
    async fn speak(&self, text: &str) -> Result<(), String>;

    /// Stop anything playing or queued
    fn cancel(&self);
}

/// Narrator status as shown to a player
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum TtsStatus {
    /// Ready
    #[default]
    Idle,
    /// Waiting for playback to start
    Queued,
    /// Playing
    Speaking,
    /// No engine
    Unavailable,
    /// The last utterance failed
    Failed,
}

impl TtsStatus {
    /// Fixed status line
    #[must_use]
    pub fn status_text(self) -> &'static str {
        match self {
            Self::Idle => "TTS ready.",
            Self::Queued => "TTS: queued",
            Self::Speaking => "TTS: speaking...",
            Self::Unavailable => "TTS unavailable; read the question on screen.",
            Self::Failed => "TTS failed; read the question on screen.",
        }
    }
}

/// Single-utterance speaker
pub struct Narrator {
    engine: Arc<dyn SynthesisEngine>,
    start_timeout: Duration,
    generation: AtomicU64,
    status_tx: watch::Sender<TtsStatus>,
}

impl Narrator {
    /// Create a narrator with the given start timeout
    pub fn new(engine: Arc<dyn SynthesisEngine>, start_timeout: Duration) -> Self {
        let initial = if engine.is_supported() {
            TtsStatus::Idle
        } else {
            TtsStatus::Unavailable
        };
        let (status_tx, _) = watch::channel(initial);
        Self {
            engine,
            start_timeout,
            generation: AtomicU64::new(0),
            status_tx,
        }
    }

    /// Create a narrator from speech configuration
    pub fn from_config(engine: Arc<dyn SynthesisEngine>, config: &SpeechConfig) -> Self {
        Self::new(engine, config.synthesis_start_timeout())
    }

    /// Current status
    #[must_use]
    pub fn status(&self) -> TtsStatus {
        *self.status_tx.borrow()
    }

    /// Receive every status change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<TtsStatus> {
        self.status_tx.subscribe()
    }

    fn set_status(&self, generation: u64, status: TtsStatus) {
        if self.generation.load(Ordering::SeqCst) == generation {
            self.status_tx.send_replace(status);
        }
    }

    /// Speak `text`, replacing any utterance in progress
    pub async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        if !self.engine.is_supported() {
            self.status_tx.send_replace(TtsStatus::Unavailable);
            return Err(SpeechError::SynthesisUnsupported);
        }
        let text = text.trim();
        if text.is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.engine.cancel();
        self.set_status(generation, TtsStatus::Queued);

        match tokio::time::timeout(self.start_timeout, self.engine.speak(text)).await {
            Ok(Ok(())) => {
                self.set_status(generation, TtsStatus::Speaking);
                Ok(())
            }
            Ok(Err(reason)) => {
                tracing::warn!(%reason, "speech synthesis failed to start");
                self.set_status(generation, TtsStatus::Failed);
                Err(SpeechError::StartFailed(reason))
            }
            Err(_) => {
                tracing::warn!(timeout = ?self.start_timeout, "speech synthesis did not start");
                if self.generation.load(Ordering::SeqCst) == generation {
                    self.engine.cancel();
                }
                self.set_status(generation, TtsStatus::Failed);
                Err(SpeechError::StartTimeout)
            }
        }
    }

    /// Cancel whatever is playing
    pub fn stop(&self) {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.engine.cancel();
        if self.engine.is_supported() {
            self.set_status(generation, TtsStatus::Idle);
        }
    }
}

// ============================================================================
// Question announcements
// ============================================================================

/// What [`QuestionAnnouncer::announce`] did
#[derive(Debug, PartialEq, Eq)]
pub enum Announcement {
    /// The last event is not a question
    Nothing,
    /// This question was already handled
    AlreadyAnnounced,
    /// The question was spoken
    Spoken,
    /// The question could not be spoken
    Failed(SpeechError),
    /// The question payload did not decode
    IncompatiblePayload,
}

/// Speaks each asked question once per `(session_id, created_at)`
#[derive(Debug, Default)]
pub struct QuestionAnnouncer {
    last: Option<EventKey>,
    question_text: Option<String>,
}

impl QuestionAnnouncer {
    /// Nothing announced yet
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Text of the most recent question seen
    #[must_use]
    pub fn latest_question(&self) -> Option<&str> {
        self.question_text.as_deref()
    }

    /// Speak the snapshot's question if it is new
    pub async fn announce(
        &mut self,
        narrator: &Narrator,
        snapshot: &SessionSnapshot,
    ) -> Announcement {
        let Some(event) = snapshot.last_event.as_ref() else {
            return Announcement::Nothing;
        };
        if event.event_type != EventType::QuestionAsked {
            return Announcement::Nothing;
        }
        let key = EventKey::of(snapshot);
        if key.is_some() && self.last == key {
            return Announcement::AlreadyAnnounced;
        }
        self.last = key;

        let text = match interpret(event) {
            Interpretation::Decoded(GameEvent::QuestionAsked(data)) => data.question_text,
            _ => return Announcement::IncompatiblePayload,
        };
        self.question_text = Some(text.clone());

        match narrator.speak(&text).await {
            Ok(()) => Announcement::Spoken,
            Err(err) => Announcement::Failed(err),
        }
    }

    /// Speak the latest question again
    pub async fn repeat(&self, narrator: &Narrator) -> Announcement {
        let Some(text) = self.question_text.as_deref() else {
            return Announcement::Nothing;
        };
        match narrator.speak(text).await {
            Ok(()) => Announcement::Spoken,
            Err(err) => Announcement::Failed(err),
        }
    }
}
