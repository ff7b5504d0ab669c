//! Session snapshot: the server-authoritative state of one game

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::primitives::{
    CellIndex, EventType, Letter, LineIndex, PlayerNumber, RevealedBy, SessionId, SessionStatus,
    Topic, GRID_CELLS,
};
use super::{check_coordinates, Issues, Validate, ValidationError};

// ============================================================================
// Cells
// ============================================================================

/// One of the 25 positions in a player's grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CellSnapshot {
    /// Row-major position, 0..=24
    pub index: CellIndex,
    /// 0-based row
    pub row: LineIndex,
    /// 0-based column
    pub col: LineIndex,
    /// Whether the letter is visible
    pub revealed: bool,
    /// Penalty lock; blocks guesses while the cell is hidden
    pub locked: bool,
    /// The letter, present exactly when revealed
    #[serde(default)]
    pub letter: Option<Letter>,
    /// Topics already asked for this cell
    pub topics_used: Vec<Topic>,
    /// How the cell was revealed, absent while hidden
    #[serde(default)]
    pub revealed_by: Option<RevealedBy>,
}

impl CellSnapshot {
    /// Hidden and not locked: the only state a letter guess may target
    #[must_use]
    pub fn is_guessable(&self) -> bool {
        !self.revealed && !self.locked
    }

    /// Locked and still hidden
    #[must_use]
    pub fn blocks_guess(&self) -> bool {
        self.locked && !self.revealed
    }

    /// Whether `topic` has already been asked here
    #[must_use]
    pub fn has_used(&self, topic: Topic) -> bool {
        self.topics_used.contains(&topic)
    }
}

impl Validate for CellSnapshot {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        check_coordinates(&mut issues, self.index, self.row, self.col);

        if self.revealed {
            issues.check(
                self.letter.is_some(),
                "letter",
                "revealed cells must include a letter",
            );
        } else {
            issues.check(
                self.letter.is_none(),
                "letter",
                "hidden cells must not include a letter",
            );
            issues.check(
                self.revealed_by.is_none(),
                "revealed_by",
                "hidden cells must not carry a reveal provenance",
            );
        }

        let unique: HashSet<Topic> = self.topics_used.iter().copied().collect();
        issues.check(
            unique.len() == self.topics_used.len(),
            "topics_used",
            "topics_used must not repeat a topic",
        );
        issues.check(
            self.topics_used.len() <= Topic::ALL.len(),
            "topics_used",
            "topics_used lists more topics than exist",
        );

        issues.finish()
    }
}

// ============================================================================
// Players
// ============================================================================

/// One player's seat: score and grid
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PlayerSnapshot {
    /// Seat number
    pub player_number: PlayerNumber,
    /// Optional display name; absent and null mean the same thing
    #[serde(default)]
    pub name: Option<String>,
    /// Score, negative after penalties
    pub score: i64,
    /// Grid instance assigned to this player
    pub grid_id: Uuid,
    /// True once every cell is revealed
    pub completed: bool,
    /// The 25 cells
    pub cells: Vec<CellSnapshot>,
}

impl PlayerSnapshot {
    /// Name for display, falling back to `Player N`
    #[must_use]
    pub fn display_name(&self) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Player {}", self.player_number),
        }
    }

    /// Look up a cell by index
    #[must_use]
    pub fn cell(&self, index: CellIndex) -> Option<&CellSnapshot> {
        self.cells
            .get(index.as_usize())
            .filter(|cell| cell.index == index)
            .or_else(|| self.cells.iter().find(|cell| cell.index == index))
    }

    /// Number of revealed cells
    #[must_use]
    pub fn revealed_count(&self) -> usize {
        self.cells.iter().filter(|cell| cell.revealed).count()
    }

    /// Indices of cells that are locked and hidden
    #[must_use]
    pub fn locked_cells(&self) -> Vec<CellIndex> {
        let mut locked: Vec<CellIndex> = self
            .cells
            .iter()
            .filter(|cell| cell.blocks_guess())
            .map(|cell| cell.index)
            .collect();
        locked.sort();
        locked
    }
}

impl Validate for PlayerSnapshot {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();

        issues.check(
            self.cells.len() == GRID_CELLS,
            "cells",
            format!("expected {GRID_CELLS} cells, got {}", self.cells.len()),
        );

        let mut seen = HashSet::new();
        for (position, cell) in self.cells.iter().enumerate() {
            if !seen.insert(cell.index) {
                issues.push(
                    format!("cells[{position}].index"),
                    format!("cell index {} appears more than once", cell.index),
                );
            }
            issues.nest(&format!("cells[{position}]"), cell.validate());
        }

        issues.finish()
    }
}

// ============================================================================
// Last event
// ============================================================================

/// The most recent action outcome. `event_data` is decoded per `type` by
/// [`crate::events::interpret`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LastEvent {
    /// Event kind
    #[serde(rename = "type")]
    pub event_type: EventType,
    /// Opaque change-detection key
    pub created_at: String,
    /// Payload whose shape depends on `event_type`
    #[serde(default)]
    pub event_data: Map<String, Value>,
}

// ============================================================================
// Session
// ============================================================================

/// Result of a completed session
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameResult {
    /// One player finished ahead
    Winner(PlayerNumber),
    /// Equal scores
    Tie,
}

/// Complete state of a session at one point in time
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SessionSnapshot {
    /// Session identifier
    pub session_id: SessionId,
    /// Lifecycle status
    pub status: SessionStatus,
    /// Seat whose turn it is
    pub current_turn: PlayerNumber,
    /// The canonical topics, in canonical order
    pub topics: Vec<Topic>,
    /// Both players
    pub players: Vec<PlayerSnapshot>,
    /// Most recent action outcome
    #[serde(default)]
    pub last_event: Option<LastEvent>,
}

impl SessionSnapshot {
    /// Player in the given seat
    #[must_use]
    pub fn player(&self, number: PlayerNumber) -> Option<&PlayerSnapshot> {
        self.players
            .iter()
            .find(|player| player.player_number == number)
    }

    /// Player whose turn it is
    #[must_use]
    pub fn active_player(&self) -> Option<&PlayerSnapshot> {
        self.player(self.current_turn)
    }

    /// The other player
    #[must_use]
    pub fn opponent_of(&self, number: PlayerNumber) -> Option<&PlayerSnapshot> {
        self.player(number.other())
    }

    /// Whether turns are still being played
    #[must_use]
    pub fn is_in_progress(&self) -> bool {
        self.status == SessionStatus::InProgress
    }

    /// Final outcome, only once the session is complete
    #[must_use]
    pub fn winner(&self) -> Option<GameResult> {
        if self.status != SessionStatus::Complete {
            return None;
        }
        let one = self.player(PlayerNumber::ONE)?;
        let two = self.player(PlayerNumber::TWO)?;
        Some(match one.score.cmp(&two.score) {
            std::cmp::Ordering::Greater => GameResult::Winner(PlayerNumber::ONE),
            std::cmp::Ordering::Less => GameResult::Winner(PlayerNumber::TWO),
            std::cmp::Ordering::Equal => GameResult::Tie,
        })
    }
}

impl Validate for SessionSnapshot {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();

        issues.check(
            self.topics.as_slice() == Topic::ALL.as_slice(),
            "topics",
            "topics must be exactly the canonical topics in canonical order",
        );

        issues.check(
            self.players.len() == 2,
            "players",
            format!("expected 2 players, got {}", self.players.len()),
        );
        let mut seats = HashSet::new();
        for (position, player) in self.players.iter().enumerate() {
            if !seats.insert(player.player_number) {
                issues.push(
                    format!("players[{position}].player_number"),
                    format!("player {} appears more than once", player.player_number),
                );
            }
            issues.nest(&format!("players[{position}]"), player.validate());
        }

        issues.check(
            self.player(self.current_turn).is_some(),
            "current_turn",
            format!("current_turn {} does not reference a player", self.current_turn),
        );

        if let Some(event) = &self.last_event {
            issues.check(
                !event.created_at.is_empty(),
                "last_event.created_at",
                "created_at must not be empty",
            );
        }

        issues.finish()
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    //! Snapshot builders shared by unit tests across the crate

    use serde_json::{json, Value};

    /// A valid cell as JSON
    pub fn cell_json(index: u8) -> Value {
        json!({
            "index": index,
            "row": index / 5,
            "col": index % 5,
            "revealed": false,
            "locked": false,
            "letter": null,
            "topics_used": [],
            "revealed_by": null
        })
    }

    /// A valid player as JSON
    pub fn player_json(number: u8) -> Value {
        json!({
            "player_number": number,
            "name": null,
            "score": 0,
            "grid_id": "6f1c2a9e-3b4d-4c5e-8f7a-1b2c3d4e5f60",
            "completed": false,
            "cells": (0..25).map(cell_json).collect::<Vec<_>>()
        })
    }

    /// A valid in-progress snapshot as JSON
    pub fn snapshot_json() -> Value {
        json!({
            "session_id": "0b6f9f0c-4a3e-4d8e-9c1f-2a3b4c5d6e7f",
            "status": "in_progress",
            "current_turn": 1,
            "topics": ["Politics", "Science", "History", "Art", "Current Affairs"],
            "players": [player_json(1), player_json(2)],
            "last_event": null
        })
    }

    /// A decoded valid snapshot
    pub fn snapshot() -> super::SessionSnapshot {
        crate::schema::decode(snapshot_json()).unwrap()
    }
}
