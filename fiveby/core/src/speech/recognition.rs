//! Speech recognition state machine
//!
//! ```text
//! idle ──start──► (engine started) ──► listening ──end──► stopped
//!                                          │
//!                                          └──error──► error
//! ```
//!
//! The engine reports progress through a [`RecognitionSink`] bound to one
//! session. Once a newer session starts, sinks of older sessions are inert,
//! so late callbacks from a stopped engine cannot disturb the current one.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

use super::SpeechError;
use crate::config::SpeechConfig;

// ============================================================================
// Errors
// ============================================================================

/// Normalized recognition error codes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SttErrorCode {
    /// Recognition was stopped
    Aborted,
    /// No microphone
    AudioCapture,
    /// Recognition service unreachable
    Network,
    /// Nothing was heard
    NoSpeech,
    /// Microphone permission denied
    NotAllowed,
    /// Recognition service not permitted
    ServiceNotAllowed,
    /// Anything else
    SttError,
    /// No recognition engine
    Unsupported,
}

impl SttErrorCode {
    /// Map an engine error string (`audio-capture`, `no-speech`, ...)
    #[must_use]
    pub fn from_engine(error: &str) -> Self {
        match error {
            "aborted" => Self::Aborted,
            "audio-capture" => Self::AudioCapture,
            "network" => Self::Network,
            "no-speech" => Self::NoSpeech,
            "not-allowed" => Self::NotAllowed,
            "service-not-allowed" => Self::ServiceNotAllowed,
            _ => Self::SttError,
        }
    }

    /// Code name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Aborted => "aborted",
            Self::AudioCapture => "audio_capture",
            Self::Network => "network",
            Self::NoSpeech => "no_speech",
            Self::NotAllowed => "not_allowed",
            Self::ServiceNotAllowed => "service_not_allowed",
            Self::SttError => "stt_error",
            Self::Unsupported => "unsupported",
        }
    }

    /// Fixed message for a player
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::NotAllowed | Self::ServiceNotAllowed => "Microphone permission denied.",
            Self::Network => "Speech recognition network error.",
            Self::NoSpeech => "No speech detected. Try again.",
            Self::AudioCapture => "No microphone available for speech recognition.",
            Self::Aborted => "Speech recognition stopped.",
            Self::Unsupported => "Speech-to-text is unavailable.",
            Self::SttError => "Speech recognition failed.",
        }
    }
}

/// A recognition failure
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SttError {
    /// Normalized code
    pub code: SttErrorCode,
    /// Message for a player
    pub message: String,
}

impl SttError {
    /// Error with the code's fixed message
    #[must_use]
    pub fn from_code(code: SttErrorCode) -> Self {
        Self {
            code,
            message: code.message().to_string(),
        }
    }

    fn with_message(code: SttErrorCode, message: &str) -> Self {
        Self {
            code,
            message: message.to_string(),
        }
    }
}

// ============================================================================
// Engine seam
// ============================================================================

/// Options passed to the engine on start
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecognitionOptions {
    /// BCP 47 language tag
    pub language: String,
    /// Whether interim results are wanted
    pub interim_results: bool,
}

impl From<&SpeechConfig> for RecognitionOptions {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            language: config.language.clone(),
            interim_results: config.interim_results,
        }
    }
}

impl Default for RecognitionOptions {
    fn default() -> Self {
        Self::from(&SpeechConfig::default())
    }
}

/// One recognized fragment
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranscriptPart {
    /// Recognized text
    pub text: String,
    /// Whether the engine has settled on it
    pub is_final: bool,
}

/// A running engine session
pub trait RecognitionSession: Send {
    /// Ask the engine to stop; it reports the end through its sink
    fn stop(&mut self);
}

/// A speech-to-text engine
pub trait RecognitionEngine: Send + Sync {
    /// Whether the engine can run at all
    fn is_supported(&self) -> bool;

    /// Begin recognizing, reporting through `sink`
    fn start(
        &self,
        options: &RecognitionOptions,
        sink: RecognitionSink,
    ) -> Result<Box<dyn RecognitionSession>, String>;
}

// ============================================================================
// State
// ============================================================================

/// Recognizer lifecycle
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum RecognitionState {
    /// Not started, or starting
    #[default]
    Idle,
    /// The engine is listening
    Listening,
    /// The session ended
    Stopped,
    /// The session failed
    Error(SttError),
}

/// Observable recognizer state
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RecognitionView {
    /// Lifecycle state
    pub state: RecognitionState,
    /// Latest interim text
    pub interim: String,
    /// Latest final text
    pub final_text: String,
}

struct Shared {
    current: u64,
    stopping: bool,
    session: Option<Box<dyn RecognitionSession>>,
    view: RecognitionView,
}

struct Channel {
    shared: Mutex<Shared>,
    view_tx: watch::Sender<RecognitionView>,
}

impl Channel {
    fn update(&self, id: u64, apply: impl FnOnce(&mut Shared)) {
        let mut shared = self.shared.lock();
        if shared.current != id {
            tracing::trace!(session = id, "ignoring event from superseded recognition");
            return;
        }
        apply(&mut shared);
        self.view_tx.send_replace(shared.view.clone());
    }
}

/// Reporting handle given to the engine for one session
#[derive(Clone)]
pub struct RecognitionSink {
    id: u64,
    channel: Arc<Channel>,
}

impl RecognitionSink {
    /// The engine began listening
    pub fn started(&self) {
        self.channel.update(self.id, |shared| {
            shared.view.state = RecognitionState::Listening;
        });
    }

    /// The engine's current result list
    ///
    /// Non-empty interim parts replace the interim text; non-empty final parts
    /// replace the final text.
    pub fn results(&self, parts: &[TranscriptPart]) {
        let join = |is_final: bool| {
            parts
                .iter()
                .filter(|part| part.is_final == is_final)
                .map(|part| part.text.trim())
                .filter(|text| !text.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        };
        let interim = join(false);
        let final_text = join(true);

        self.channel.update(self.id, |shared| {
            shared.view.interim = interim;
            if !final_text.is_empty() {
                shared.view.final_text = final_text;
                shared.view.interim.clear();
            }
        });
    }

    /// The engine reported an error string
    pub fn error(&self, engine_error: &str) {
        let code = SttErrorCode::from_engine(engine_error);
        self.channel.update(self.id, |shared| {
            if shared.stopping && code == SttErrorCode::Aborted {
                return;
            }
            tracing::warn!(code = code.as_str(), "speech recognition error");
            shared.view.state = RecognitionState::Error(SttError::from_code(code));
        });
    }

    /// The engine finished
    pub fn ended(&self) {
        self.channel.update(self.id, |shared| {
            shared.session = None;
            shared.stopping = false;
            if !matches!(shared.view.state, RecognitionState::Error(_)) {
                shared.view.state = RecognitionState::Stopped;
            }
        });
    }
}

// ============================================================================
// Recognizer
// ============================================================================

/// Owns the single recognition session
pub struct SpeechRecognizer {
    engine: Arc<dyn RecognitionEngine>,
    options: RecognitionOptions,
    channel: Arc<Channel>,
}

impl SpeechRecognizer {
    /// Create an idle recognizer
    pub fn new(engine: Arc<dyn RecognitionEngine>, options: RecognitionOptions) -> Self {
        let (view_tx, _) = watch::channel(RecognitionView::default());
        Self {
            engine,
            options,
            channel: Arc::new(Channel {
                shared: Mutex::new(Shared {
                    current: 0,
                    stopping: false,
                    session: None,
                    view: RecognitionView::default(),
                }),
                view_tx,
            }),
        }
    }

    /// Whether the engine can run
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.engine.is_supported()
    }

    /// Current state
    #[must_use]
    pub fn view(&self) -> RecognitionView {
        self.channel.shared.lock().view.clone()
    }

    /// Receive every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<RecognitionView> {
        self.channel.view_tx.subscribe()
    }

    fn fail(&self, id: u64, error: SttError) -> SpeechError {
        self.channel.update(id, |shared| {
            shared.session = None;
            shared.view.state = RecognitionState::Error(error.clone());
        });
        SpeechError::Recognition(error)
    }

    /// Start a new session, stopping any running one first
    pub fn start(&self) -> Result<(), SpeechError> {
        let (id, previous) = {
            let mut shared = self.channel.shared.lock();
            shared.current += 1;
            shared.stopping = false;
            shared.view = RecognitionView::default();
            self.channel.view_tx.send_replace(shared.view.clone());
            (shared.current, shared.session.take())
        };
        if let Some(mut previous) = previous {
            tracing::debug!("stopping previous recognition session");
            previous.stop();
        }

        if !self.engine.is_supported() {
            return Err(self.fail(id, SttError::from_code(SttErrorCode::Unsupported)));
        }

        let sink = RecognitionSink {
            id,
            channel: Arc::clone(&self.channel),
        };
        match self.engine.start(&self.options, sink) {
            Ok(mut session) => {
                let mut shared = self.channel.shared.lock();
                if shared.current == id {
                    shared.session = Some(session);
                } else {
                    drop(shared);
                    session.stop();
                }
                Ok(())
            }
            Err(reason) => {
                tracing::warn!(%reason, "speech recognition could not start");
                Err(self.fail(
                    id,
                    SttError::with_message(
                        SttErrorCode::SttError,
                        "Could not start speech recognition.",
                    ),
                ))
            }
        }
    }

    /// Stop the running session; an `aborted` error caused by this is swallowed
    pub fn stop(&self) {
        let session = {
            let mut shared = self.channel.shared.lock();
            if shared.session.is_some() {
                shared.stopping = true;
            }
            shared.session.take()
        };
        if let Some(mut session) = session {
            session.stop();
        }
    }
}
