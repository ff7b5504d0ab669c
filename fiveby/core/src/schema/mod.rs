//! Schema and Validation Layer
//!
//! Typed contracts for every payload exchanged with the game backend.
//!
//! # Two-phase validation
//!
//! Decoding a payload happens in two steps:
//!
//! 1. **Structural**: serde checks types, ranges (via the range-checked
//!    newtypes in [`primitives`]), enum membership and unknown fields.
//! 2. **Relational**: [`Validate::validate`] checks cross-field rules such as
//!    "a revealed cell carries a letter" or "`correct` iff `revealed_letter`".
//!
//! Both phases report failures as a [`ValidationError`] listing every
//! offending path. Structural failures carry the path serde was at when it
//! gave up (`players[1].cells[4].index`). Nothing is coerced silently.

pub mod events;
pub mod health;
pub mod primitives;
pub mod requests;
pub mod snapshot;

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

pub use events::{
    LetterGuessedData, QuestionAnsweredData, QuestionAskedData, RevealedCell, WordGuessedData,
};
pub use health::{DbHealth, HealthResponse};
pub use primitives::{
    CellIndex, EventType, GuessDirection, Letter, LineIndex, PlayerNumber, QuestionGenerator,
    RevealedBy, SessionId, SessionStatus, Topic, Word,
};
pub use requests::{
    AnswerQuestionRequest, AskQuestionRequest, CreateSessionRequest, GuessLetterRequest,
    GuessWordRequest,
};
pub use snapshot::{CellSnapshot, LastEvent, PlayerSnapshot, SessionSnapshot};

// ============================================================================
// Validation errors
// ============================================================================

/// One failed rule, anchored at a JSON-ish path such as `players[1].cells[4].letter`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    /// Location of the offending value; `$` for the payload root
    pub path: String,
    /// What was wrong
    pub message: String,
}

impl ValidationIssue {
    /// Create an issue
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

/// A payload failed validation. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("validation failed: {}", join_issues(.issues))]
pub struct ValidationError {
    /// Every issue found, in discovery order
    pub issues: Vec<ValidationIssue>,
}

fn join_issues(issues: &[ValidationIssue]) -> String {
    issues
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Error with a single issue
    pub fn single(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            issues: vec![ValidationIssue::new(path, message)],
        }
    }

    /// Paths of every issue, for assertions and logs
    #[must_use]
    pub fn paths(&self) -> Vec<&str> {
        self.issues.iter().map(|issue| issue.path.as_str()).collect()
    }

    /// Issues rendered as a JSON array, used as error details
    #[must_use]
    pub fn to_details(&self) -> Value {
        serde_json::to_value(&self.issues).unwrap_or(Value::Null)
    }
}

impl From<serde_json::Error> for ValidationError {
    fn from(err: serde_json::Error) -> Self {
        Self::single("$", err.to_string())
    }
}

impl From<serde_path_to_error::Error<serde_json::Error>> for ValidationError {
    fn from(err: serde_path_to_error::Error<serde_json::Error>) -> Self {
        let path = err.path().to_string();
        let path = if path == "." { "$".to_string() } else { path };
        Self::single(path, err.into_inner().to_string())
    }
}

/// Collects issues while walking a payload
#[derive(Debug, Default)]
pub struct Issues(Vec<ValidationIssue>);

impl Issues {
    /// Start an empty collection
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an issue
    pub fn push(&mut self, path: impl Into<String>, message: impl Into<String>) {
        self.0.push(ValidationIssue::new(path, message));
    }

    /// Record an issue when `condition` is false
    pub fn check(&mut self, condition: bool, path: impl Into<String>, message: impl Into<String>) {
        if !condition {
            self.push(path, message);
        }
    }

    /// Absorb the issues of a nested value, prefixing their paths
    pub fn nest(&mut self, prefix: &str, result: Result<(), ValidationError>) {
        if let Err(err) = result {
            for issue in err.issues {
                let path = if issue.path == "$" {
                    prefix.to_string()
                } else {
                    format!("{prefix}.{}", issue.path)
                };
                self.0.push(ValidationIssue::new(path, issue.message));
            }
        }
    }

    /// Finish: `Ok` when nothing was recorded
    pub fn finish(self) -> Result<(), ValidationError> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { issues: self.0 })
        }
    }
}

// ============================================================================
// Validate trait
// ============================================================================

/// Relational checks that run after serde has accepted the structure
pub trait Validate {
    /// Check cross-field rules
    fn validate(&self) -> Result<(), ValidationError>;
}

/// Decode and validate a JSON value as `T`
pub fn decode<T>(value: Value) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let decoded: T = serde_path_to_error::deserialize(value)?;
    decoded.validate()?;
    Ok(decoded)
}

/// Decode and validate JSON text as `T`
pub fn decode_str<T>(text: &str) -> Result<T, ValidationError>
where
    T: DeserializeOwned + Validate,
{
    let value: Value = serde_json::from_str(text)?;
    decode(value)
}

/// Check that a row/col pair agrees with a cell index
pub(crate) fn check_coordinates(
    issues: &mut Issues,
    index: CellIndex,
    row: LineIndex,
    col: LineIndex,
) {
    issues.check(
        row.get() == index.row(),
        "row",
        format!("row {} does not match cell index {}", row, index),
    );
    issues.check(
        col.get() == index.col(),
        "col",
        format!("col {} does not match cell index {}", col, index),
    );
}

/// Check the "revealed letter present iff correct" rule shared by answer and letter events
pub(crate) fn check_revealed_letter(issues: &mut Issues, correct: bool, letter: Option<Letter>) {
    match (correct, letter) {
        (true, None) => issues.push(
            "revealed_letter",
            "revealed_letter is required when correct is true",
        ),
        (false, Some(_)) => issues.push(
            "revealed_letter",
            "revealed_letter must be null when correct is false",
        ),
        _ => {}
    }
}
