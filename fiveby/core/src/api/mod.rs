//! Game Backend API
//!
//! Typed access to the Five-By backend through the [`SessionApi`] trait.
//!
//! # Endpoints
//!
//! - `POST /sessions` - create a session
//! - `GET /sessions/{id}` - fetch a snapshot
//! - `POST /sessions/{id}/ask` | `answer` | `guess-letter` | `guess-word` - actions
//! - `GET /health` - connectivity probe
//!
//! Every action returns the new [`SessionSnapshot`]. Action failures are
//! returned to the caller as-is and never retried: a retry after an ambiguous
//! failure could submit a scored guess twice.
//!
//! # Usage
//!
//! ```ignore
//! use fiveby_core::api::{FiveByClient, SessionApi};
//!
//! let client = FiveByClient::from_config(&config.api)?;
//! let snapshot = client.get_session(session_id).await?;
//! ```

mod client;
mod error;

use async_trait::async_trait;

pub use client::FiveByClient;
pub use error::{ApiError, ErrorCode, ErrorKind};

use crate::schema::{
    AnswerQuestionRequest, AskQuestionRequest, CreateSessionRequest, GuessLetterRequest,
    GuessWordRequest, HealthResponse, SessionId, SessionSnapshot,
};

/// Result alias for API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Operations the game backend exposes
///
/// Implemented by [`FiveByClient`] over HTTP; tests substitute scripted
/// implementations.
#[async_trait]
pub trait SessionApi: Send + Sync {
    /// Start a new session
    async fn create_session(&self, request: &CreateSessionRequest) -> ApiResult<SessionSnapshot>;

    /// Fetch the current snapshot
    async fn get_session(&self, session_id: SessionId) -> ApiResult<SessionSnapshot>;

    /// Ask a question for a cell
    async fn ask_question(
        &self,
        session_id: SessionId,
        request: &AskQuestionRequest,
    ) -> ApiResult<SessionSnapshot>;

    /// Answer the pending question
    async fn answer_question(
        &self,
        session_id: SessionId,
        request: &AnswerQuestionRequest,
    ) -> ApiResult<SessionSnapshot>;

    /// Guess one letter
    async fn guess_letter(
        &self,
        session_id: SessionId,
        request: &GuessLetterRequest,
    ) -> ApiResult<SessionSnapshot>;

    /// Guess a whole row or column
    async fn guess_word(
        &self,
        session_id: SessionId,
        request: &GuessWordRequest,
    ) -> ApiResult<SessionSnapshot>;

    /// Probe backend connectivity
    async fn health(&self) -> ApiResult<HealthResponse>;
}
