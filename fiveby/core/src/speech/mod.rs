//! Speech Adapters
//!
//! State machines around external speech engines. The engines themselves
//! (a browser API, a platform service, a test double) sit behind the
//! [`RecognitionEngine`] and [`SynthesisEngine`] traits.
//!
//! Both adapters treat the engine as a single process-wide resource: starting
//! a new recognition session or utterance stops the previous one first. There
//! is no queueing; the last caller wins.

pub mod recognition;
pub mod synthesis;

pub use recognition::{
    RecognitionEngine, RecognitionOptions, RecognitionSession, RecognitionSink, RecognitionState,
    RecognitionView, SpeechRecognizer, SttError, SttErrorCode, TranscriptPart,
};
pub use synthesis::{Announcement, Narrator, QuestionAnnouncer, SynthesisEngine, TtsStatus};

use thiserror::Error;

/// Errors from the speech adapters
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SpeechError {
    /// No synthesis engine is available
    #[error("Text-to-speech is unavailable.")]
    SynthesisUnsupported,

    /// Nothing to say
    #[error("Question text is empty.")]
    EmptyText,

    /// The utterance did not start in time and was cancelled
    #[error("Speech synthesis did not start. Try again.")]
    StartTimeout,

    /// The engine refused the utterance
    #[error("Speech synthesis failed to start: {0}")]
    StartFailed(String),

    /// Recognition could not run
    #[error("{}", .0.message)]
    Recognition(SttError),
}
