//! Event Payload Interpreter
//!
//! Decodes the polymorphic `last_event.event_data` bag into a typed
//! [`GameEvent`] using a single dispatch on `last_event.type`. A payload that
//! does not match its type's schema becomes [`Interpretation::InvalidPayload`],
//! a non-fatal condition the caller reports as a warning.
//!
//! Also tracks event freshness: two snapshots whose `last_event.created_at`
//! match describe the same logical event, and consumers must not repeat side
//! effects (such as speaking a question) for it.

use serde_json::Value;

use crate::resolver::format_locks;
use crate::schema::{
    decode, EventType, LastEvent, LetterGuessedData, QuestionAnsweredData, QuestionAskedData,
    SessionId, SessionSnapshot, ValidationError, WordGuessedData,
};

// ============================================================================
// Decoding
// ============================================================================

/// A decoded event payload
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// A question was asked
    QuestionAsked(QuestionAskedData),
    /// The pending question was answered
    QuestionAnswered(QuestionAnsweredData),
    /// A letter was guessed
    LetterGuessed(LetterGuessedData),
    /// A word was guessed
    WordGuessed(WordGuessedData),
}

impl GameEvent {
    /// Kind of this event
    #[must_use]
    pub fn event_type(&self) -> EventType {
        match self {
            Self::QuestionAsked(_) => EventType::QuestionAsked,
            Self::QuestionAnswered(_) => EventType::QuestionAnswered,
            Self::LetterGuessed(_) => EventType::LetterGuessed,
            Self::WordGuessed(_) => EventType::WordGuessed,
        }
    }

    /// One-line outcome for a player
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::QuestionAsked(data) => format!(
                "Asked {} for row {}, col {}.",
                data.topic,
                data.row.get() + 1,
                data.col.get() + 1
            ),
            Self::QuestionAnswered(data) => match data.revealed_letter {
                Some(letter) if data.correct => {
                    let mut text = format!("Correct - revealed {letter}.");
                    if let Some(cleared) = data.lock_cleared_cell_index {
                        text.push_str(&format!(" Unlocked {}.", cleared.position_label()));
                    }
                    text
                }
                _ => "Incorrect.".to_string(),
            },
            Self::LetterGuessed(data) => match data.revealed_letter {
                Some(letter) if data.correct => format!("Correct! Revealed {letter}."),
                _ => format!(
                    "Wrong letter. {:+} to you, {:+} to opponent. Locked: {}.",
                    data.score_delta,
                    data.opponent_score_delta,
                    format_locks(&data.locks_enqueued)
                ),
            },
            Self::WordGuessed(data) if data.correct => {
                if data.auto_reveals.is_empty() {
                    "Correct! Word revealed.".to_string()
                } else {
                    format!(
                        "Correct! Word revealed. Auto-revealed {}.",
                        data.auto_reveals.len()
                    )
                }
            }
            Self::WordGuessed(data) => format!(
                "Wrong word. {:+}/{:+} and locked {} cells.",
                data.score_delta,
                data.opponent_score_delta,
                data.locks_enqueued.len()
            ),
        }
    }
}

/// Result of interpreting a `last_event`
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Interpretation {
    /// Payload matched its type's schema
    Decoded(GameEvent),
    /// Type is known but the payload does not match
    InvalidPayload {
        /// Declared event type
        event_type: EventType,
        /// What failed
        error: ValidationError,
    },
}

impl Interpretation {
    /// The decoded event, if any
    #[must_use]
    pub fn event(&self) -> Option<&GameEvent> {
        match self {
            Self::Decoded(event) => Some(event),
            Self::InvalidPayload { .. } => None,
        }
    }

    /// One-line outcome for a player
    #[must_use]
    pub fn summary(&self) -> String {
        match self {
            Self::Decoded(event) => event.summary(),
            Self::InvalidPayload { event_type, .. } => {
                format!("Received an incompatible {event_type} payload.")
            }
        }
    }
}

/// Decode `event.event_data` according to `event.type`
///
/// Deterministic: the same event always yields the same interpretation.
#[must_use]
pub fn interpret(event: &LastEvent) -> Interpretation {
    let data = Value::Object(event.event_data.clone());
    let decoded = match event.event_type {
        EventType::QuestionAsked => decode(data).map(GameEvent::QuestionAsked),
        EventType::QuestionAnswered => decode(data).map(GameEvent::QuestionAnswered),
        EventType::LetterGuessed => decode(data).map(GameEvent::LetterGuessed),
        EventType::WordGuessed => decode(data).map(GameEvent::WordGuessed),
    };
    match decoded {
        Ok(event) => Interpretation::Decoded(event),
        Err(error) => {
            tracing::warn!(
                event_type = %event.event_type,
                created_at = %event.created_at,
                error = %error,
                "incompatible event payload"
            );
            Interpretation::InvalidPayload {
                event_type: event.event_type,
                error,
            }
        }
    }
}

// ============================================================================
// Freshness
// ============================================================================

/// Identity of one logical event
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EventKey {
    /// Session the event belongs to
    pub session_id: SessionId,
    /// The event's `created_at`
    pub created_at: String,
}

impl EventKey {
    /// Key of the snapshot's last event, if it has one
    #[must_use]
    pub fn of(snapshot: &SessionSnapshot) -> Option<Self> {
        snapshot.last_event.as_ref().map(|event| Self {
            session_id: snapshot.session_id,
            created_at: event.created_at.clone(),
        })
    }
}

/// Scope for ephemeral per-turn state (selected cell, transcript, typed guess)
///
/// That state belongs to one `(session_id, last_event.created_at)` pair and is
/// discarded when the pair changes.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ScopeKey {
    /// Session in view
    pub session_id: Option<SessionId>,
    /// `created_at` of its last event
    pub created_at: Option<String>,
}

impl ScopeKey {
    /// Scope of a snapshot
    #[must_use]
    pub fn of(snapshot: &SessionSnapshot) -> Self {
        Self {
            session_id: Some(snapshot.session_id),
            created_at: snapshot
                .last_event
                .as_ref()
                .map(|event| event.created_at.clone()),
        }
    }
}

/// Whether per-turn state scoped to `previous` must be reset for `next`
#[must_use]
pub fn needs_reset(previous: &ScopeKey, next: &ScopeKey) -> bool {
    previous != next
}

/// What an observed snapshot says about its last event
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Observation {
    /// The snapshot has no last event
    NoEvent,
    /// Same event as the previous observation
    Repeat,
    /// An event not seen before
    Fresh(Interpretation),
}

/// Remembers the last event seen so each event is acted on once
#[derive(Clone, Debug, Default)]
pub struct EventTracker {
    last: Option<EventKey>,
}

impl EventTracker {
    /// Start with nothing seen
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Key of the last event seen
    #[must_use]
    pub fn last_key(&self) -> Option<&EventKey> {
        self.last.as_ref()
    }

    /// Classify a snapshot's last event and remember it
    pub fn observe(&mut self, snapshot: &SessionSnapshot) -> Observation {
        let (Some(event), Some(key)) = (snapshot.last_event.as_ref(), EventKey::of(snapshot)) else {
            return Observation::NoEvent;
        };
        if self.last.as_ref() == Some(&key) {
            return Observation::Repeat;
        }
        self.last = Some(key);
        Observation::Fresh(interpret(event))
    }

    /// Forget what was seen
    pub fn reset(&mut self) {
        self.last = None;
    }
}
