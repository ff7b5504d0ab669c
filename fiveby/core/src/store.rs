//! Session Snapshot Store
//!
//! The single owner of the current [`SessionSnapshot`]. Everything else reads
//! clones of [`StoreState`], either on demand via [`SessionStore::state`] or
//! as a stream of changes via [`SessionStore::subscribe`].
//!
//! # State Machine
//!
//! ```text
//! idle ──load──► loading ──► success
//!                   │            │
//!                   └──► error ◄─┘ (refresh)
//! any ──clear──► idle
//! ```
//!
//! # Last Request Wins
//!
//! Every load is a spawned task tagged with a monotonically increasing token.
//! Starting a load aborts the previous task and replaces the active token; a
//! task whose token is no longer active discards its result, success or
//! failure. Network completion order therefore never decides which snapshot
//! is kept.
//!
//! A caller that stops awaiting a load (timeout, `select!`, teardown) aborts
//! it: the load is released and the status it replaced is restored.
//!
//! # Foreground vs Silent
//!
//! - [`LoadMode::Foreground`] loads move the status to `loading` and record
//!   failures in the error slot.
//! - [`LoadMode::Silent`] loads (background polling) leave the status and
//!   error slot alone when they fail; failures are only logged. A silent load
//!   never supersedes a foreground load that is still in flight.

use std::sync::Arc;
use std::time::SystemTime;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::AbortHandle;

use crate::api::{ApiError, SessionApi};
use crate::schema::{
    AnswerQuestionRequest, AskQuestionRequest, CreateSessionRequest, GuessLetterRequest,
    GuessWordRequest, SessionId, SessionSnapshot, ValidationError,
};

// ============================================================================
// State
// ============================================================================

/// Load lifecycle status
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LoadStatus {
    /// Nothing loaded or requested
    #[default]
    Idle,
    /// A foreground load is in flight
    Loading,
    /// The last foreground load succeeded
    Success,
    /// The last foreground load failed
    Error,
}

/// A recorded load failure, detached from the transport error
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadFailure {
    /// HTTP status, when a response arrived
    pub status: Option<u16>,
    /// Error code
    pub code: String,
    /// Text to show the player
    pub message: String,
}

impl From<&ApiError> for LoadFailure {
    fn from(err: &ApiError) -> Self {
        Self {
            status: err.status(),
            code: err.code().to_string(),
            message: err.user_message(),
        }
    }
}

/// Observable store state
#[derive(Clone, Debug, Default, PartialEq)]
pub struct StoreState {
    /// Session being tracked
    pub session_id: Option<SessionId>,
    /// Last known-good snapshot
    pub snapshot: Option<SessionSnapshot>,
    /// Load lifecycle status
    pub status: LoadStatus,
    /// Last foreground failure
    pub error: Option<LoadFailure>,
    /// When the snapshot was last replaced
    pub loaded_at: Option<SystemTime>,
}

impl StoreState {
    /// Snapshot for `session_id`, if that is the one held
    #[must_use]
    pub fn snapshot_for(&self, session_id: SessionId) -> Option<&SessionSnapshot> {
        self.snapshot
            .as_ref()
            .filter(|snapshot| snapshot.session_id == session_id)
    }
}

/// How a load presents itself
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadMode {
    /// User-initiated: shows loading and error state
    Foreground,
    /// Background refresh: failures are only logged
    Silent,
}

/// What became of a load
#[derive(Debug)]
pub enum LoadOutcome {
    /// The fetched snapshot is now current
    Applied,
    /// A newer request, an action result or a clear took over; nothing was written
    Superseded,
    /// Nothing to do (no session held, or a foreground load is in flight)
    Skipped,
    /// The fetch failed
    Failed(ApiError),
}

impl LoadOutcome {
    /// Whether the snapshot was replaced
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Errors from store operations that are not plain loads
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No session is held
    #[error("no session is loaded")]
    NoSession,

    /// A snapshot for a different session was offered
    #[error("snapshot belongs to session {actual}, store holds {expected}")]
    SessionMismatch {
        /// Session the store holds
        expected: SessionId,
        /// Session the snapshot belongs to
        actual: SessionId,
    },

    /// The backend call failed
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// A player action to submit
#[derive(Clone, Debug)]
pub enum Action {
    /// Ask a question
    Ask(AskQuestionRequest),
    /// Answer the pending question
    Answer(AnswerQuestionRequest),
    /// Guess a letter
    GuessLetter(GuessLetterRequest),
    /// Guess a word
    GuessWord(GuessWordRequest),
}

impl Action {
    /// Short name for logs
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ask(_) => "ask",
            Self::Answer(_) => "answer",
            Self::GuessLetter(_) => "guess_letter",
            Self::GuessWord(_) => "guess_word",
        }
    }
}

// ============================================================================
// Store
// ============================================================================

struct ActiveRequest {
    token: u64,
    session_id: SessionId,
    mode: LoadMode,
    abort: AbortHandle,
    /// Status to fall back to if the load ends without a result
    prior_status: LoadStatus,
}

#[derive(Default)]
struct Inner {
    state: StoreState,
    active: Option<ActiveRequest>,
    next_token: u64,
}

impl Inner {
    fn cancel_active(&mut self) {
        if let Some(active) = self.active.take() {
            tracing::debug!(
                session_id = %active.session_id,
                token = active.token,
                "cancelled in-flight load"
            );
            self.end(active);
        }
    }

    /// Drop the active load if it is still `token`
    fn release(&mut self, token: u64) -> bool {
        match self.active.take() {
            Some(active) if active.token == token => {
                self.end(active);
                true
            }
            other => {
                self.active = other;
                false
            }
        }
    }

    /// Abort a load that ends without a result, restoring the status it replaced
    fn end(&mut self, active: ActiveRequest) {
        active.abort.abort();
        if self.state.status == LoadStatus::Loading {
            self.state.status = active.prior_status;
        }
    }

    fn replace_snapshot(&mut self, snapshot: SessionSnapshot) {
        self.state.session_id = Some(snapshot.session_id);
        self.state.snapshot = Some(snapshot);
        self.state.status = LoadStatus::Success;
        self.state.error = None;
        self.state.loaded_at = Some(SystemTime::now());
    }
}

/// Releases a load whose caller stopped waiting for it
///
/// Dropping the `load_session` future (timeout, `select!`, unmount) would
/// otherwise leave the load marked active forever.
struct AbandonGuard<'s> {
    store: &'s SessionStore,
    token: u64,
    armed: bool,
}

impl<'s> AbandonGuard<'s> {
    fn new(store: &'s SessionStore, token: u64) -> Self {
        Self {
            store,
            token,
            armed: true,
        }
    }

    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for AbandonGuard<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut inner = self.store.inner.lock();
        if inner.release(self.token) {
            tracing::debug!(token = self.token, "load abandoned by caller");
            self.store.publish(&inner);
        }
    }
}

/// Holds the current session snapshot and serializes loads
pub struct SessionStore {
    api: Arc<dyn SessionApi>,
    inner: Mutex<Inner>,
    state_tx: watch::Sender<StoreState>,
}

impl SessionStore {
    /// Create an idle store backed by `api`
    pub fn new(api: Arc<dyn SessionApi>) -> Self {
        let (state_tx, _) = watch::channel(StoreState::default());
        Self {
            api,
            inner: Mutex::new(Inner::default()),
            state_tx,
        }
    }

    /// The API this store loads through
    #[must_use]
    pub fn api(&self) -> &Arc<dyn SessionApi> {
        &self.api
    }

    /// Current state
    #[must_use]
    pub fn state(&self) -> StoreState {
        self.inner.lock().state.clone()
    }

    /// Current snapshot
    #[must_use]
    pub fn snapshot(&self) -> Option<SessionSnapshot> {
        self.inner.lock().state.snapshot.clone()
    }

    /// Session currently tracked
    #[must_use]
    pub fn session_id(&self) -> Option<SessionId> {
        self.inner.lock().state.session_id
    }

    /// Receive every state change
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<StoreState> {
        self.state_tx.subscribe()
    }

    /// Whether a foreground load is in flight
    #[must_use]
    pub fn is_foreground_loading(&self) -> bool {
        self.inner
            .lock()
            .active
            .as_ref()
            .is_some_and(|active| active.mode == LoadMode::Foreground)
    }

    fn publish(&self, inner: &Inner) {
        self.state_tx.send_replace(inner.state.clone());
    }

    /// Fetch `session_id` and make it current
    ///
    /// Cancels any in-flight load. Switching to a different session clears
    /// the previous snapshot immediately; a failed load of the same session
    /// keeps the last good one.
    pub async fn load_session(&self, session_id: SessionId, mode: LoadMode) -> LoadOutcome {
        let (token, handle) = {
            let mut inner = self.inner.lock();

            if mode == LoadMode::Silent
                && inner
                    .active
                    .as_ref()
                    .is_some_and(|active| active.mode == LoadMode::Foreground)
            {
                tracing::debug!(%session_id, "silent load skipped; foreground load in flight");
                return LoadOutcome::Skipped;
            }

            inner.cancel_active();
            inner.next_token += 1;
            let token = inner.next_token;

            if inner.state.session_id != Some(session_id) {
                inner.state = StoreState {
                    session_id: Some(session_id),
                    ..StoreState::default()
                };
            }

            let api = Arc::clone(&self.api);
            let handle = tokio::spawn(async move { api.get_session(session_id).await });
            inner.active = Some(ActiveRequest {
                token,
                session_id,
                mode,
                abort: handle.abort_handle(),
                prior_status: inner.state.status,
            });

            if mode == LoadMode::Foreground {
                inner.state.status = LoadStatus::Loading;
                inner.state.error = None;
            }
            self.publish(&inner);

            (token, handle)
        };

        let guard = AbandonGuard::new(self, token);
        let result = handle.await;
        guard.disarm();

        let mut inner = self.inner.lock();
        if inner.active.as_ref().map(|active| active.token) != Some(token) {
            tracing::debug!(%session_id, token, "discarding superseded load");
            return LoadOutcome::Superseded;
        }

        let outcome = match result {
            Ok(Ok(snapshot)) if snapshot.session_id == session_id => {
                inner.active = None;
                inner.replace_snapshot(snapshot);
                tracing::info!(%session_id, ?mode, "session loaded");
                LoadOutcome::Applied
            }
            Ok(Ok(snapshot)) => {
                inner.active = None;
                let err = ApiError::InvalidResponseShape {
                    status: 200,
                    source: ValidationError::single(
                        "session_id",
                        format!("expected session {session_id}, got {}", snapshot.session_id),
                    ),
                };
                self.record_failure(&mut inner, mode, &err);
                LoadOutcome::Failed(err)
            }
            Ok(Err(err)) => {
                inner.active = None;
                self.record_failure(&mut inner, mode, &err);
                LoadOutcome::Failed(err)
            }
            Err(join_err) => {
                if join_err.is_panic() {
                    tracing::error!(%session_id, error = %join_err, "load task panicked");
                }
                inner.release(token);
                LoadOutcome::Superseded
            }
        };
        self.publish(&inner);
        outcome
    }

    fn record_failure(&self, inner: &mut Inner, mode: LoadMode, err: &ApiError) {
        let failure = LoadFailure::from(err);
        match mode {
            LoadMode::Foreground => {
                tracing::warn!(
                    session_id = ?inner.state.session_id,
                    status = ?failure.status,
                    code = %failure.code,
                    "session load failed"
                );
                inner.state.status = LoadStatus::Error;
                inner.state.error = Some(failure);
            }
            LoadMode::Silent => {
                tracing::warn!(
                    session_id = ?inner.state.session_id,
                    status = ?failure.status,
                    code = %failure.code,
                    "background refresh failed"
                );
            }
        }
    }

    /// Reload the held session in the foreground; skipped when none is held
    pub async fn refresh(&self) -> LoadOutcome {
        match self.session_id() {
            Some(id) => self.load_session(id, LoadMode::Foreground).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Reload the held session silently; skipped when none is held
    pub async fn refresh_silent(&self) -> LoadOutcome {
        match self.session_id() {
            Some(id) => self.load_session(id, LoadMode::Silent).await,
            None => LoadOutcome::Skipped,
        }
    }

    /// Seed the store with a snapshot already in hand, without a fetch
    pub fn hydrate(&self, session_id: SessionId, snapshot: SessionSnapshot) -> Result<(), StoreError> {
        if snapshot.session_id != session_id {
            return Err(StoreError::SessionMismatch {
                expected: session_id,
                actual: snapshot.session_id,
            });
        }
        let mut inner = self.inner.lock();
        inner.cancel_active();
        inner.state = StoreState::default();
        inner.replace_snapshot(snapshot);
        tracing::info!(%session_id, "session hydrated");
        self.publish(&inner);
        Ok(())
    }

    /// Replace the held snapshot with a newer one for the same session
    ///
    /// Supersedes any in-flight load, so a poll issued before an action
    /// cannot overwrite the action's result.
    pub fn apply_snapshot(&self, snapshot: SessionSnapshot) -> Result<(), StoreError> {
        let mut inner = self.inner.lock();
        let expected = inner.state.session_id.ok_or(StoreError::NoSession)?;
        if snapshot.session_id != expected {
            return Err(StoreError::SessionMismatch {
                expected,
                actual: snapshot.session_id,
            });
        }
        inner.cancel_active();
        inner.replace_snapshot(snapshot);
        self.publish(&inner);
        Ok(())
    }

    /// Abort any in-flight load and return to idle
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.cancel_active();
        inner.state = StoreState::default();
        tracing::debug!("store cleared");
        self.publish(&inner);
    }

    /// Create a session and hydrate the store with it
    pub async fn create_session(
        &self,
        request: &CreateSessionRequest,
    ) -> Result<SessionSnapshot, StoreError> {
        let snapshot = self.api.create_session(request).await?;
        self.hydrate(snapshot.session_id, snapshot.clone())?;
        Ok(snapshot)
    }

    /// Submit an action for the held session and apply the resulting snapshot
    ///
    /// Failures are returned to the caller and never retried; the load error
    /// slot is left untouched.
    pub async fn submit(&self, action: Action) -> Result<SessionSnapshot, StoreError> {
        let session_id = self.session_id().ok_or(StoreError::NoSession)?;
        tracing::debug!(%session_id, action = action.name(), "submitting action");

        let result = match &action {
            Action::Ask(request) => self.api.ask_question(session_id, request).await,
            Action::Answer(request) => self.api.answer_question(session_id, request).await,
            Action::GuessLetter(request) => self.api.guess_letter(session_id, request).await,
            Action::GuessWord(request) => self.api.guess_word(session_id, request).await,
        };

        let snapshot = match result {
            Ok(snapshot) => snapshot,
            Err(err) => {
                tracing::warn!(
                    %session_id,
                    action = action.name(),
                    code = err.code(),
                    "action rejected"
                );
                return Err(err.into());
            }
        };

        if let Err(err) = self.apply_snapshot(snapshot.clone()) {
            tracing::debug!(%session_id, error = %err, "action result not applied");
        }
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::ApiResult;
    use crate::schema::snapshot::fixtures;
    use crate::schema::HealthResponse;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;

    #[derive(Clone, Copy)]
    enum Fetch {
        Snapshot,
        Fail,
        Panic,
    }

    /// Answers every fetch the same way
    struct FixedApi {
        fetch: Fetch,
    }

    #[async_trait]
    impl SessionApi for FixedApi {
        async fn create_session(&self, _: &CreateSessionRequest) -> ApiResult<SessionSnapshot> {
            Ok(fixtures::snapshot())
        }

        async fn get_session(&self, _: SessionId) -> ApiResult<SessionSnapshot> {
            match self.fetch {
                Fetch::Snapshot => Ok(fixtures::snapshot()),
                Fetch::Fail => Err(ApiError::Timeout),
                Fetch::Panic => panic!("backend blew up"),
            }
        }

        async fn ask_question(
            &self,
            _: SessionId,
            _: &AskQuestionRequest,
        ) -> ApiResult<SessionSnapshot> {
            Ok(fixtures::snapshot())
        }

        async fn answer_question(
            &self,
            _: SessionId,
            _: &AnswerQuestionRequest,
        ) -> ApiResult<SessionSnapshot> {
            Err(ApiError::Timeout)
        }

        async fn guess_letter(
            &self,
            _: SessionId,
            _: &GuessLetterRequest,
        ) -> ApiResult<SessionSnapshot> {
            Err(ApiError::Timeout)
        }

        async fn guess_word(
            &self,
            _: SessionId,
            _: &GuessWordRequest,
        ) -> ApiResult<SessionSnapshot> {
            Err(ApiError::Timeout)
        }

        async fn health(&self) -> ApiResult<HealthResponse> {
            Err(ApiError::Timeout)
        }
    }

    fn store(fail: bool) -> SessionStore {
        store_with(if fail { Fetch::Fail } else { Fetch::Snapshot })
    }

    fn store_with(fetch: Fetch) -> SessionStore {
        SessionStore::new(Arc::new(FixedApi { fetch }))
    }

    #[test]
    fn test_new_store_is_idle() {
        let state = store(false).state();
        assert_eq!(state, StoreState::default());
        assert_eq!(state.status, LoadStatus::Idle);
    }

    #[tokio::test]
    async fn test_foreground_load_success() {
        let store = store(false);
        let id = fixtures::snapshot().session_id;

        let outcome = store.load_session(id, LoadMode::Foreground).await;

        assert!(outcome.is_applied());
        let state = store.state();
        assert_eq!(state.status, LoadStatus::Success);
        assert!(state.loaded_at.is_some());
        assert!(state.snapshot_for(id).is_some());
    }

    #[tokio::test]
    async fn test_foreground_failure_records_error() {
        let store = store(true);
        let id = fixtures::snapshot().session_id;

        let outcome = store.load_session(id, LoadMode::Foreground).await;

        assert!(matches!(outcome, LoadOutcome::Failed(ApiError::Timeout)));
        let state = store.state();
        assert_eq!(state.status, LoadStatus::Error);
        assert_eq!(state.error.unwrap().code, "timeout");
    }

    #[tokio::test]
    async fn test_silent_failure_leaves_state_alone() {
        let store = store(true);
        let snapshot = fixtures::snapshot();
        let id = snapshot.session_id;
        store.hydrate(id, snapshot.clone()).unwrap();

        let outcome = store.refresh_silent().await;

        assert!(matches!(outcome, LoadOutcome::Failed(_)));
        let state = store.state();
        assert_eq!(state.status, LoadStatus::Success);
        assert!(state.error.is_none());
        assert_eq!(state.snapshot, Some(snapshot));
    }

    #[tokio::test]
    async fn test_panicking_fetch_restores_prior_state() {
        let store = store_with(Fetch::Panic);
        let snapshot = fixtures::snapshot();
        let id = snapshot.session_id;
        store.hydrate(id, snapshot.clone()).unwrap();
        let before = store.state();

        let outcome = store.load_session(id, LoadMode::Foreground).await;

        assert!(matches!(outcome, LoadOutcome::Superseded));
        assert_eq!(store.state(), before);
        assert!(!store.is_foreground_loading());
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_skipped() {
        let store = store(false);
        assert!(matches!(store.refresh().await, LoadOutcome::Skipped));
        assert_eq!(store.state().status, LoadStatus::Idle);
    }

    #[test]
    fn test_hydrate_rejects_mismatched_id() {
        let store = store(false);
        let snapshot = fixtures::snapshot();
        let other: SessionId = "11111111-1111-4111-8111-111111111111".parse().unwrap();
        assert!(matches!(
            store.hydrate(other, snapshot),
            Err(StoreError::SessionMismatch { .. })
        ));
    }

    #[test]
    fn test_apply_snapshot_requires_session() {
        let store = store(false);
        assert!(matches!(
            store.apply_snapshot(fixtures::snapshot()),
            Err(StoreError::NoSession)
        ));
    }

    #[test]
    fn test_clear_resets_to_idle() {
        let store = store(false);
        let snapshot = fixtures::snapshot();
        store.hydrate(snapshot.session_id, snapshot).unwrap();
        store.clear();
        assert_eq!(store.state(), StoreState::default());
    }

    #[tokio::test]
    async fn test_subscribers_see_hydrate() {
        let store = store(false);
        let mut rx = store.subscribe();
        let snapshot = fixtures::snapshot();
        store.hydrate(snapshot.session_id, snapshot).unwrap();
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow().status, LoadStatus::Success);
    }

    #[tokio::test]
    async fn test_rejected_action_leaves_error_slot_empty() {
        let store = store(false);
        let snapshot = fixtures::snapshot();
        store.hydrate(snapshot.session_id, snapshot).unwrap();

        let request = AnswerQuestionRequest::new(crate::schema::PlayerNumber::ONE, "Paris").unwrap();
        let result = store.submit(Action::Answer(request)).await;

        assert!(matches!(result, Err(StoreError::Api(ApiError::Timeout))));
        assert!(store.state().error.is_none());
    }

    #[tokio::test]
    async fn test_submit_without_session() {
        let store = store(false);
        let request = AnswerQuestionRequest::new(crate::schema::PlayerNumber::ONE, "Paris").unwrap();
        assert!(matches!(
            store.submit(Action::Answer(request)).await,
            Err(StoreError::NoSession)
        ));
    }
}
