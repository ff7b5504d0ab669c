//! Five-By CLI - play a session from the terminal
//!
//! # Usage
//!
//! ```bash
//! # Check the backend
//! fiveby health
//!
//! # Start a session
//! fiveby new --player1 Ada --player2 Grace
//!
//! # Show a session by id or share link
//! fiveby show https://five-by.example/s/0b6f9f0c-4a3e-4d8e-9c1f-2a3b4c5d6e7f
//!
//! # Take a turn (player defaults to whoever is to move)
//! fiveby ask <session> --cell r2c3 --topic Science
//! fiveby answer <session> "Marie Curie"
//! fiveby guess-letter <session> --cell r2c3 E
//! fiveby guess-word <session> --direction across --line 2 CRANE
//!
//! # Follow a session as it is played
//! fiveby watch <session>
//!
//! # Verbose logging
//! RUST_LOG=debug fiveby show <session>
//! ```

mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use tracing::{debug, info};

use fiveby_core::schema::{
    AnswerQuestionRequest, AskQuestionRequest, CreateSessionRequest, GuessLetterRequest,
    GuessWordRequest,
};
use fiveby_core::{
    default_config_path, load_config_from_path, parse_session_id_input, session_route, Action,
    CellIndex, ClientConfig, ConfigOverrides, EventTracker, FiveByClient, GuessDirection,
    LineIndex, LoadMode, LoadOutcome, Observation, PlayerNumber, SessionApi, SessionId,
    SessionSnapshot, SessionStore, SnapshotPoller, Topic, TurnActionResolver,
};

/// Five-By - command-line client for the two-player word game
#[derive(Parser, Debug)]
#[command(name = "fiveby")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short = 'c', long, env = "FIVEBY_CONFIG", value_name = "FILE")]
    config: Option<PathBuf>,

    /// Backend base URL (overrides config and environment)
    #[arg(long, value_name = "URL")]
    base_url: Option<String>,

    /// Per-request timeout in milliseconds
    #[arg(long, value_name = "MS")]
    timeout_ms: Option<u64>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, env = "FIVEBY_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Probe the backend
    Health,

    /// Create a session
    New {
        /// Name for player 1
        #[arg(long)]
        player1: Option<String>,
        /// Name for player 2
        #[arg(long)]
        player2: Option<String>,
    },

    /// Show a session and the moves available
    Show {
        /// Session id or link
        session: String,
        /// Print the raw snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// Ask a question for a cell
    Ask {
        /// Session id or link
        session: String,
        /// Target cell, `r2c3` or `0`-`24`
        #[arg(long, value_parser = render::parse_cell)]
        cell: CellIndex,
        /// Topic
        #[arg(long)]
        topic: Topic,
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Answer the pending question
    Answer {
        /// Session id or link
        session: String,
        /// The answer
        answer: String,
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Guess the letter in a cell
    GuessLetter {
        /// Session id or link
        session: String,
        /// Target cell, `r2c3` or `0`-`24`
        #[arg(long, value_parser = render::parse_cell)]
        cell: CellIndex,
        /// The letter
        letter: String,
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Guess a whole row or column
    GuessWord {
        /// `across` (row) or `down` (column)
        #[arg(long)]
        direction: GuessDirection,
        /// Row or column number, 1-5
        #[arg(long, value_parser = render::parse_line)]
        line: LineIndex,
        /// Session id or link
        session: String,
        /// The five-letter word
        word: String,
        #[command(flatten)]
        turn: TurnArgs,
    },

    /// Follow a session, printing each new event
    Watch {
        /// Session id or link
        session: String,
        /// Poll interval in milliseconds
        #[arg(long, value_name = "MS")]
        interval_ms: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct TurnArgs {
    /// Acting player (defaults to the player to move)
    #[arg(long, value_parser = parse_player)]
    player: Option<PlayerNumber>,

    /// Submit even if the move looks illegal
    #[arg(long)]
    force: bool,
}

fn parse_player(input: &str) -> Result<PlayerNumber, String> {
    let number: u8 = input
        .trim()
        .parse()
        .map_err(|_| format!("expected 1 or 2, got {input}"))?;
    PlayerNumber::try_from(number)
}

fn parse_session(input: &str) -> Result<SessionId> {
    parse_session_id_input(input)
        .with_context(|| format!("not a session id or link: {input}"))
}

/// Initialize logging with the specified level
fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("fiveby_core={level},fiveby={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn resolve_config(args: &Args) -> Result<ClientConfig> {
    let path = args.config.clone().or_else(default_config_path);
    let mut config = load_config_from_path(path).context("Failed to load configuration")?;

    let mut overrides = ConfigOverrides::new();
    if let Some(url) = &args.base_url {
        overrides = overrides.with_base_url(url.clone());
    }
    if let Some(ms) = args.timeout_ms {
        overrides = overrides.with_request_timeout_ms(ms);
    }
    if let Command::Watch {
        interval_ms: Some(ms),
        ..
    } = &args.command
    {
        overrides = overrides.with_poll_interval_ms(*ms).with_polling_enabled(true);
    }
    overrides
        .apply(&mut config)
        .context("Invalid command-line override")?;
    Ok(config)
}

/// Load a session in the foreground, failing with the player-facing message
async fn load(store: &SessionStore, session_id: SessionId) -> Result<SessionSnapshot> {
    match store.load_session(session_id, LoadMode::Foreground).await {
        LoadOutcome::Failed(err) => bail!("{}", err.user_message()),
        _ => store
            .state()
            .snapshot_for(session_id)
            .cloned()
            .context("Session did not load"),
    }
}

/// Load, pick the acting player, check the move locally, then submit it
async fn take_turn<F>(store: &SessionStore, session: &str, turn: &TurnArgs, build: F) -> Result<()>
where
    F: FnOnce(PlayerNumber) -> Result<Action>,
{
    let session_id = parse_session(session)?;
    let snapshot = load(store, session_id).await?;
    let player = turn.player.unwrap_or(snapshot.current_turn);
    let action = build(player)?;

    let eligibility = TurnActionResolver::check_action(&snapshot, &action);
    if let Err(reason) = eligibility.into_result() {
        if !turn.force {
            bail!("{} (use --force to submit anyway)", reason.message());
        }
        debug!(reason = reason.as_str(), "submitting despite failed preflight");
    }

    let updated = store
        .submit(action)
        .await
        .map_err(|err| match err {
            fiveby_core::StoreError::Api(api) => anyhow::anyhow!(api.user_message()),
            other => anyhow::Error::new(other),
        })?;

    if let Some(event) = &updated.last_event {
        println!("{}", fiveby_core::interpret(event).summary());
    }
    println!("{}", render::render_snapshot(&updated));
    Ok(())
}

async fn watch(store: Arc<SessionStore>, config: &ClientConfig, session: &str) -> Result<()> {
    let session_id = parse_session(session)?;
    let snapshot = load(&store, session_id).await?;
    println!("{}", render::render_snapshot(&snapshot));
    if !snapshot.is_in_progress() {
        return Ok(());
    }

    let mut tracker = EventTracker::new();
    tracker.observe(&snapshot);
    let mut updates = store.subscribe();
    let _poller = SnapshotPoller::spawn(Arc::clone(&store), config.polling.interval());
    info!(%session_id, interval_ms = config.polling.interval_ms, "watching session");

    loop {
        tokio::select! {
            changed = updates.changed() => {
                changed.context("Session store closed")?;
                let Some(snapshot) = updates.borrow_and_update().snapshot_for(session_id).cloned() else {
                    continue;
                };
                if let Observation::Fresh(interpretation) = tracker.observe(&snapshot) {
                    println!("{}", interpretation.summary());
                    println!("{}", render::render_snapshot(&snapshot));
                }
                if !snapshot.is_in_progress() {
                    break;
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }
    Ok(())
}

async fn run(args: Args) -> Result<()> {
    let config = resolve_config(&args)?;
    debug!(base_url = %config.api.base_url, source = ?config.source(), "configuration resolved");
    let client = FiveByClient::from_config(&config.api).context("Failed to build HTTP client")?;

    match args.command {
        Command::Health => {
            let health = client
                .health()
                .await
                .map_err(|err| anyhow::anyhow!(err.user_message()))?;
            println!("{}", render::render_health(&health));
        }
        Command::New { player1, player2 } => {
            let request = CreateSessionRequest::new(player1.as_deref(), player2.as_deref())?;
            let store = SessionStore::new(Arc::new(client));
            let snapshot = store
                .create_session(&request)
                .await
                .context("Failed to create session")?;
            println!("Created session {}", snapshot.session_id);
            println!("Share: {}", session_route(snapshot.session_id));
            println!("{}", render::render_snapshot(&snapshot));
        }
        Command::Show { session, json } => {
            let store = SessionStore::new(Arc::new(client));
            let snapshot = load(&store, parse_session(&session)?).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&snapshot)?);
            } else {
                println!("{}", render::render_snapshot(&snapshot));
                if snapshot.is_in_progress() {
                    let resolver = TurnActionResolver::for_current_turn(&snapshot);
                    println!("{}", render::render_actions(&resolver));
                }
            }
        }
        Command::Ask {
            session,
            cell,
            topic,
            turn,
        } => {
            let store = SessionStore::new(Arc::new(client));
            take_turn(&store, &session, &turn, |player| {
                Ok(Action::Ask(AskQuestionRequest::new(player, cell, topic)))
            })
            .await?;
        }
        Command::Answer {
            session,
            answer,
            turn,
        } => {
            let store = SessionStore::new(Arc::new(client));
            take_turn(&store, &session, &turn, |player| {
                Ok(Action::Answer(AnswerQuestionRequest::new(player, &answer)?))
            })
            .await?;
        }
        Command::GuessLetter {
            session,
            cell,
            letter,
            turn,
        } => {
            let store = SessionStore::new(Arc::new(client));
            take_turn(&store, &session, &turn, |player| {
                Ok(Action::GuessLetter(GuessLetterRequest::new(
                    player, cell, &letter,
                )?))
            })
            .await?;
        }
        Command::GuessWord {
            direction,
            line,
            session,
            word,
            turn,
        } => {
            let store = SessionStore::new(Arc::new(client));
            take_turn(&store, &session, &turn, |player| {
                Ok(Action::GuessWord(GuessWordRequest::new(
                    player, direction, line, &word,
                )?))
            })
            .await?;
        }
        Command::Watch { session, .. } => {
            let store = Arc::new(SessionStore::new(Arc::new(client)));
            watch(store, &config, &session).await?;
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(&args.log_level);
    debug!(version = env!("CARGO_PKG_VERSION"), "fiveby starting");
    run(args).await
}
