//! Client Error Taxonomy
//!
//! Every failure the API client can produce, normalized into one enum:
//!
//! - **Transport**: network failure, timeout, a body that is not JSON, or a
//!   non-2xx body that is not a valid error envelope
//! - **Schema**: a 2xx body that fails validation
//! - **Domain**: a structured `{error: {code, message, details?}}` envelope
//! - **Request**: the client refused to send (bad input or base URL)

use std::fmt;

use serde_json::Value;

use crate::schema::ValidationError;

/// Server error codes the client knows how to phrase
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    /// Action submitted by the wrong seat
    OutOfTurn,
    /// Answer submitted without a question
    NoPendingQuestion,
    /// Session already complete
    SessionNotInProgress,
    /// Unknown session id
    SessionNotFound,
    /// Cell has no topics left
    TopicsExhausted,
    /// Cell is locked
    CellLocked,
    /// Cell is already revealed
    CellAlreadyRevealed,
    /// Word has a locked hidden cell
    WordLocked,
    /// Word is fully revealed
    WordAlreadyRevealed,
    /// Server rejected the request body
    ValidationError,
    /// No grids to start a session with
    GridsUnavailable,
    /// Anything else the server sends
    Other(String),
}

impl ErrorCode {
    /// Parse a wire code; unknown codes are kept verbatim
    #[must_use]
    pub fn from_code(code: &str) -> Self {
        match code {
            "out_of_turn" => Self::OutOfTurn,
            "no_pending_question" => Self::NoPendingQuestion,
            "session_not_in_progress" => Self::SessionNotInProgress,
            "session_not_found" => Self::SessionNotFound,
            "topics_exhausted" => Self::TopicsExhausted,
            "cell_locked" => Self::CellLocked,
            "cell_already_revealed" => Self::CellAlreadyRevealed,
            "word_locked" => Self::WordLocked,
            "word_already_revealed" => Self::WordAlreadyRevealed,
            "validation_error" => Self::ValidationError,
            "grids_unavailable" => Self::GridsUnavailable,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire code
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::OutOfTurn => "out_of_turn",
            Self::NoPendingQuestion => "no_pending_question",
            Self::SessionNotInProgress => "session_not_in_progress",
            Self::SessionNotFound => "session_not_found",
            Self::TopicsExhausted => "topics_exhausted",
            Self::CellLocked => "cell_locked",
            Self::CellAlreadyRevealed => "cell_already_revealed",
            Self::WordLocked => "word_locked",
            Self::WordAlreadyRevealed => "word_already_revealed",
            Self::ValidationError => "validation_error",
            Self::GridsUnavailable => "grids_unavailable",
            Self::Other(code) => code,
        }
    }

    /// Fixed user-facing text, `None` for codes without one
    #[must_use]
    pub fn user_message(&self) -> Option<&'static str> {
        let text = match self {
            Self::OutOfTurn => "It's not your turn.",
            Self::NoPendingQuestion => "No pending question to answer.",
            Self::SessionNotInProgress => "Session is not in progress.",
            Self::SessionNotFound => "Session not found.",
            Self::TopicsExhausted => "No topics remaining for this cell.",
            Self::CellLocked => "That cell is locked.",
            Self::CellAlreadyRevealed => "That cell is already revealed.",
            Self::WordLocked => "That word contains locked cells.",
            Self::WordAlreadyRevealed => "That word is already fully revealed.",
            Self::ValidationError => "The request was rejected as invalid.",
            Self::GridsUnavailable => "No puzzle grids are available right now.",
            Self::Other(_) => return None,
        };
        Some(text)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Broad class of an [`ApiError`]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout or unreadable body
    Transport,
    /// Response body failed validation
    Schema,
    /// Structured error from the server
    Domain,
    /// Refused before sending
    Request,
}

/// Errors from the API client
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection failed or the body could not be read
    #[error("network error: {0}")]
    Network(#[source] reqwest::Error),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Body was not JSON
    #[error("Received invalid JSON from the server. (HTTP {status})")]
    InvalidJson {
        /// HTTP status
        status: u16,
    },

    /// Non-2xx body that is not an error envelope
    #[error("Error payload does not match the expected schema. (HTTP {status})")]
    InvalidErrorShape {
        /// HTTP status
        status: u16,
        /// The raw payload
        body: Value,
    },

    /// 2xx body that failed validation
    #[error("Response payload does not match the expected schema. (HTTP {status}): {source}")]
    InvalidResponseShape {
        /// HTTP status
        status: u16,
        /// What failed
        #[source]
        source: ValidationError,
    },

    /// Structured error from the server
    #[error("{message} ({code}, HTTP {status})")]
    Server {
        /// HTTP status
        status: u16,
        /// Error code
        code: ErrorCode,
        /// Server-provided message
        message: String,
        /// Optional extra detail
        details: Option<Value>,
    },

    /// Request body failed client-side validation
    #[error("invalid request: {0}")]
    InvalidRequest(#[from] ValidationError),

    /// Base URL missing a supported scheme
    #[error("invalid base URL {0:?} (expected http or https)")]
    InvalidBaseUrl(String),

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[source] reqwest::Error),
}

impl ApiError {
    /// Classify a transport-level reqwest failure
    pub(crate) fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout
        } else {
            Self::Network(err)
        }
    }

    /// HTTP status, when a response was received
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::InvalidJson { status }
            | Self::InvalidErrorShape { status, .. }
            | Self::InvalidResponseShape { status, .. }
            | Self::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable code
    #[must_use]
    pub fn code(&self) -> &str {
        match self {
            Self::Network(_) => "network_error",
            Self::Timeout => "timeout",
            Self::InvalidJson { .. } => "invalid_json",
            Self::InvalidErrorShape { .. } => "invalid_error_shape",
            Self::InvalidResponseShape { .. } => "invalid_response_shape",
            Self::Server { code, .. } => code.as_str(),
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidBaseUrl(_) => "invalid_base_url",
            Self::ClientBuild(_) => "client_error",
        }
    }

    /// Broad class of this error
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Network(_)
            | Self::Timeout
            | Self::InvalidJson { .. }
            | Self::InvalidErrorShape { .. } => ErrorKind::Transport,
            Self::InvalidResponseShape { .. } => ErrorKind::Schema,
            Self::Server { .. } => ErrorKind::Domain,
            Self::InvalidRequest(_) | Self::InvalidBaseUrl(_) | Self::ClientBuild(_) => {
                ErrorKind::Request
            }
        }
    }

    /// Structured detail, when there is any
    #[must_use]
    pub fn details(&self) -> Option<Value> {
        match self {
            Self::InvalidErrorShape { body, .. } => Some(body.clone()),
            Self::InvalidResponseShape { source, .. } | Self::InvalidRequest(source) => {
                Some(source.to_details())
            }
            Self::Server { details, .. } => details.clone(),
            _ => None,
        }
    }

    /// Text to show a player. Known server codes use fixed phrasing; unknown
    /// codes fall back to the server's own message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Server { code, message, .. } => code
                .user_message()
                .map_or_else(|| message.clone(), str::to_string),
            Self::Network(_) => "Could not reach the server.".to_string(),
            Self::Timeout => "The server took too long to respond.".to_string(),
            Self::InvalidJson { .. } => "Received invalid JSON from the server.".to_string(),
            Self::InvalidErrorShape { .. } => {
                "Error payload does not match the expected schema.".to_string()
            }
            Self::InvalidResponseShape { .. } => {
                "Response payload does not match the expected schema.".to_string()
            }
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_code_uses_fixed_text() {
        let err = ApiError::Server {
            status: 409,
            code: ErrorCode::from_code("out_of_turn"),
            message: "player 2 cannot act".to_string(),
            details: None,
        };
        assert_eq!(err.user_message(), "It's not your turn.");
        assert_eq!(err.code(), "out_of_turn");
        assert_eq!(err.kind(), ErrorKind::Domain);
    }

    #[test]
    fn test_unknown_code_falls_back_to_server_message() {
        let err = ApiError::Server {
            status: 418,
            code: ErrorCode::from_code("teapot"),
            message: "I am a teapot".to_string(),
            details: None,
        };
        assert_eq!(err.user_message(), "I am a teapot");
        assert_eq!(err.code(), "teapot");
    }

    #[test]
    fn test_every_known_code_round_trips() {
        let codes = [
            "out_of_turn",
            "no_pending_question",
            "session_not_in_progress",
            "session_not_found",
            "topics_exhausted",
            "cell_locked",
            "cell_already_revealed",
            "word_locked",
            "word_already_revealed",
            "validation_error",
            "grids_unavailable",
        ];
        for code in codes {
            let parsed = ErrorCode::from_code(code);
            assert_eq!(parsed.as_str(), code);
            assert!(parsed.user_message().is_some(), "{code} has no text");
        }
    }

    #[test]
    fn test_schema_error_carries_issue_details() {
        let err = ApiError::InvalidResponseShape {
            status: 200,
            source: ValidationError::single("players", "expected 2 players, got 1"),
        };
        assert_eq!(err.status(), Some(200));
        assert_eq!(err.kind(), ErrorKind::Schema);
        let details = err.details().unwrap();
        assert_eq!(details[0]["path"], "players");
    }
}
