//! Five-By Core - Client Protocol for Five-By
//!
//! Five-By is a two-player word game played on a pair of 5x5 letter grids.
//! The backend is authoritative: it owns the rules, scores and event log.
//! This crate is everything a client needs to sit on top of it, independent
//! of any UI.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         Surfaces                              │
//! │        ┌─────────┐   ┌─────────┐   ┌──────────────────┐       │
//! │        │   CLI   │   │   Web   │   │ Headless / Tests │       │
//! │        └────┬────┘   └────┬────┘   └────────┬─────────┘       │
//! │             └─────────────┴─────────────────┘                 │
//! └───────────────────────────┬──────────────────────────────────┘
//!                             │
//! ┌───────────────────────────┼──────────────────────────────────┐
//! │                      FIVE-BY CORE                             │
//! │  ┌──────────┐  ┌─────────┴──┐  ┌──────────┐  ┌────────────┐  │
//! │  │ Resolver │  │   Store    │◄─│  Poller  │  │   Speech   │  │
//! │  │ (legal   │  │ (snapshot, │  └──────────┘  │ (narrator, │  │
//! │  │ actions) │  │  load race)│                │ recognizer)│  │
//! │  └──────────┘  └─────┬──────┘                └────────────┘  │
//! │                      │ SessionApi                             │
//! │               ┌──────┴───────┐  ┌─────────────────────────┐   │
//! │               │ FiveByClient │─►│ Schema (validated wire) │   │
//! │               └──────────────┘  └─────────────────────────┘   │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Key Types
//!
//! - [`SessionSnapshot`]: Full, validated game state returned by the backend
//! - [`FiveByClient`]: HTTP client implementing [`SessionApi`]
//! - [`SessionStore`]: Holds the current snapshot and arbitrates racing loads
//! - [`TurnActionResolver`]: Which actions are legal for a player right now
//! - [`EventTracker`]: Decodes `last_event` and reports each event once
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use fiveby_core::{
//!     load_config, FiveByClient, LoadMode, SessionStore, SnapshotPoller, TurnActionResolver,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = load_config()?;
//!     let client = FiveByClient::from_config(&config.api)?;
//!     let store = Arc::new(SessionStore::new(Arc::new(client)));
//!
//!     store.load_session(session_id, LoadMode::Foreground).await;
//!     let _poller = SnapshotPoller::from_config(store.clone(), &config.polling);
//!
//!     if let Some(snapshot) = store.snapshot() {
//!         let resolver = TurnActionResolver::for_current_turn(&snapshot);
//!         // offer resolver.askable_cells(), resolver.word_targets(), ...
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`schema`]: Wire types and their validation
//! - [`api`]: HTTP client and error taxonomy
//! - [`config`]: Client configuration (file, environment, overrides)
//! - [`store`]: Snapshot store with last-writer-wins loading
//! - [`poller`]: Silent background refresh
//! - [`resolver`]: Turn action eligibility
//! - [`events`]: Event interpretation and freshness
//! - [`routing`]: Session links
//! - [`transcript`]: Spoken input mapping
//! - [`speech`]: Speech recognition and synthesis adapters

#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod config;
pub mod events;
pub mod poller;
pub mod resolver;
pub mod routing;
pub mod schema;
pub mod speech;
pub mod store;
pub mod transcript;

// Re-exports for convenience
pub use api::{ApiError, ApiResult, ErrorCode, ErrorKind, FiveByClient, SessionApi};
pub use config::{
    default_config_path, load_config, load_config_from_path, ApiConfig, ClientConfig,
    ConfigError, ConfigOverrides, ConfigSource, PollingConfig, SpeechConfig,
};
pub use events::{
    interpret, EventKey, EventTracker, GameEvent, Interpretation, Observation, ScopeKey,
};
pub use poller::SnapshotPoller;
pub use resolver::{Eligibility, IneligibleReason, TurnActionResolver, WordTarget};
pub use routing::{parse_session_id_input, session_over_route, session_route};
pub use schema::{
    CellIndex, CellSnapshot, GuessDirection, Letter, LineIndex, PlayerNumber, PlayerSnapshot,
    SessionId, SessionSnapshot, SessionStatus, Topic, ValidationError, Word,
};
pub use speech::SpeechError;
pub use store::{Action, LoadMode, LoadOutcome, LoadStatus, SessionStore, StoreError, StoreState};
pub use transcript::{Transcript, TranscriptField};
