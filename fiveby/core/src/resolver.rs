//! Turn Action Resolver
//!
//! Pure functions over a [`SessionSnapshot`] deciding which actions are legal
//! right now and deriving the view data those actions need. Nothing here
//! mutates state or fails: an ineligible action is reported as data.
//!
//! # Rules
//!
//! - **Ask**: the cell is hidden and the topic has not been asked there yet.
//!   Locked cells stay askable; a lock only blocks guesses.
//! - **Answer**: a question is pending (`last_event` is `question_asked`).
//! - **Letter guess**: the cell is hidden and not locked.
//! - **Word guess**: not every cell of the line is revealed, and no cell of
//!   the line is locked while hidden. A locked cell that is already revealed
//!   does not block.
//!
//! Every action also requires an in-progress session and the caller's turn.
//! These checks spare a round trip; the server remains the authority.

use serde::Serialize;

use crate::events::{interpret, GameEvent, Interpretation};
use crate::schema::{
    CellIndex, CellSnapshot, EventType, GuessDirection, LineIndex, PlayerNumber, PlayerSnapshot,
    QuestionAskedData, SessionSnapshot, Topic,
};
use crate::store::Action;

/// Placeholder for hidden cells in a rendered word pattern
pub const HIDDEN_PLACEHOLDER: char = '_';

// ============================================================================
// Eligibility
// ============================================================================

/// Why an action is not currently legal
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibleReason {
    /// It is the other player's turn
    OutOfTurn,
    /// The session is complete
    SessionNotInProgress,
    /// The cell is already revealed
    CellAlreadyRevealed,
    /// The cell is locked
    CellLocked,
    /// This topic was already asked for the cell
    TopicAlreadyUsed,
    /// Every topic was already asked for the cell
    TopicsExhausted,
    /// Every cell of the word is revealed
    WordAlreadyRevealed,
    /// The word has a locked hidden cell
    WordLocked,
    /// There is no question to answer
    NoPendingQuestion,
    /// The cell does not exist in the player's grid
    CellMissing,
}

impl IneligibleReason {
    /// Wire-style name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::OutOfTurn => "out_of_turn",
            Self::SessionNotInProgress => "session_not_in_progress",
            Self::CellAlreadyRevealed => "cell_already_revealed",
            Self::CellLocked => "cell_locked",
            Self::TopicAlreadyUsed => "topic_already_used",
            Self::TopicsExhausted => "topics_exhausted",
            Self::WordAlreadyRevealed => "word_already_revealed",
            Self::WordLocked => "word_locked",
            Self::NoPendingQuestion => "no_pending_question",
            Self::CellMissing => "cell_missing",
        }
    }

    /// Short explanation for a player
    #[must_use]
    pub fn message(self) -> &'static str {
        match self {
            Self::OutOfTurn => "It's not your turn.",
            Self::SessionNotInProgress => "Session is not in progress.",
            Self::CellAlreadyRevealed => "That cell is already revealed.",
            Self::CellLocked => "That cell is locked.",
            Self::TopicAlreadyUsed => "That topic was already asked for this cell.",
            Self::TopicsExhausted => "No topics remaining for this cell.",
            Self::WordAlreadyRevealed => "That word is already fully revealed.",
            Self::WordLocked => "That word contains locked cells.",
            Self::NoPendingQuestion => "No pending question to answer.",
            Self::CellMissing => "That cell does not exist.",
        }
    }
}

/// Legality of one prospective action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Eligibility {
    /// Whether the action may be submitted
    pub eligible: bool,
    /// Why not, when it may not
    pub reason: Option<IneligibleReason>,
}

impl Eligibility {
    /// The action is legal
    pub const ELIGIBLE: Self = Self {
        eligible: true,
        reason: None,
    };

    /// The action is blocked for `reason`
    #[must_use]
    pub fn blocked(reason: IneligibleReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }

    /// `Err(reason)` when blocked
    pub fn into_result(self) -> Result<(), IneligibleReason> {
        match self.reason {
            Some(reason) if !self.eligible => Err(reason),
            _ => Ok(()),
        }
    }
}

// ============================================================================
// Grid rules
// ============================================================================

/// The five cells of a row (`across`) or column (`down`), in reading order
#[must_use]
pub fn word_cells(direction: GuessDirection, index: LineIndex) -> [CellIndex; 5] {
    let line = index;
    let mut cells = [CellIndex::from_row_col(line, line); 5];
    for (offset, other) in LineIndex::all().enumerate() {
        cells[offset] = match direction {
            GuessDirection::Across => CellIndex::from_row_col(line, other),
            GuessDirection::Down => CellIndex::from_row_col(other, line),
        };
    }
    cells
}

/// Whether `topic` may be asked for `cell`
#[must_use]
pub fn ask_eligibility(cell: &CellSnapshot, topic: Topic) -> Eligibility {
    if cell.revealed {
        Eligibility::blocked(IneligibleReason::CellAlreadyRevealed)
    } else if Topic::ALL.iter().all(|t| cell.has_used(*t)) {
        Eligibility::blocked(IneligibleReason::TopicsExhausted)
    } else if cell.has_used(topic) {
        Eligibility::blocked(IneligibleReason::TopicAlreadyUsed)
    } else {
        Eligibility::ELIGIBLE
    }
}

/// Whether a letter may be guessed for `cell`
#[must_use]
pub fn letter_guess_eligibility(cell: &CellSnapshot) -> Eligibility {
    if cell.revealed {
        Eligibility::blocked(IneligibleReason::CellAlreadyRevealed)
    } else if cell.locked {
        Eligibility::blocked(IneligibleReason::CellLocked)
    } else {
        Eligibility::ELIGIBLE
    }
}

/// Whether a word may be guessed along a line of `player`'s grid
#[must_use]
pub fn word_guess_eligibility(
    player: &PlayerSnapshot,
    direction: GuessDirection,
    index: LineIndex,
) -> Eligibility {
    let cells: Vec<Option<&CellSnapshot>> = word_cells(direction, index)
        .iter()
        .map(|&i| player.cell(i))
        .collect();
    if cells.iter().any(Option::is_none) {
        return Eligibility::blocked(IneligibleReason::CellMissing);
    }
    let cells = cells.into_iter().flatten();

    let mut all_revealed = true;
    let mut any_blocking = false;
    for cell in cells {
        all_revealed &= cell.revealed;
        any_blocking |= cell.blocks_guess();
    }

    if all_revealed {
        Eligibility::blocked(IneligibleReason::WordAlreadyRevealed)
    } else if any_blocking {
        Eligibility::blocked(IneligibleReason::WordLocked)
    } else {
        Eligibility::ELIGIBLE
    }
}

/// Render a line as its revealed letters with `placeholder` for hidden cells
#[must_use]
pub fn word_pattern(
    player: &PlayerSnapshot,
    direction: GuessDirection,
    index: LineIndex,
    placeholder: char,
) -> String {
    word_cells(direction, index)
        .iter()
        .map(|&i| {
            player
                .cell(i)
                .and_then(|cell| cell.letter)
                .map_or(placeholder, |letter| letter.as_char())
        })
        .collect()
}

/// Render cell positions as `r1c4, r3c2`, or `None` when empty
#[must_use]
pub fn format_locks(cells: &[CellIndex]) -> String {
    if cells.is_empty() {
        return "None".to_string();
    }
    cells
        .iter()
        .map(|cell| cell.position_label())
        .collect::<Vec<_>>()
        .join(", ")
}

// ============================================================================
// Resolver
// ============================================================================

/// A guessable row or column and how it currently looks
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WordTarget {
    /// Row or column
    pub direction: GuessDirection,
    /// Which one
    pub index: LineIndex,
    /// Whether a guess is legal
    pub eligibility: Eligibility,
    /// Revealed letters with placeholders
    pub pattern: String,
}

impl WordTarget {
    /// `Row 2` / `Col 4`
    #[must_use]
    pub fn label(&self) -> String {
        self.direction.line_label(self.index)
    }
}

/// Action legality for one seat against one snapshot
#[derive(Clone, Copy, Debug)]
pub struct TurnActionResolver<'a> {
    snapshot: &'a SessionSnapshot,
    player: PlayerNumber,
}

impl<'a> TurnActionResolver<'a> {
    /// Resolver for `player`
    #[must_use]
    pub fn new(snapshot: &'a SessionSnapshot, player: PlayerNumber) -> Self {
        Self { snapshot, player }
    }

    /// Resolver for whoever's turn it is
    #[must_use]
    pub fn for_current_turn(snapshot: &'a SessionSnapshot) -> Self {
        Self::new(snapshot, snapshot.current_turn)
    }

    /// Seat being resolved for
    #[must_use]
    pub fn player_number(&self) -> PlayerNumber {
        self.player
    }

    /// The seat's own grid
    #[must_use]
    pub fn grid(&self) -> Option<&'a PlayerSnapshot> {
        self.snapshot.player(self.player)
    }

    fn turn_gate(&self) -> Option<IneligibleReason> {
        if !self.snapshot.is_in_progress() {
            Some(IneligibleReason::SessionNotInProgress)
        } else if self.snapshot.current_turn != self.player {
            Some(IneligibleReason::OutOfTurn)
        } else {
            None
        }
    }

    fn with_cell(
        &self,
        cell_index: CellIndex,
        rule: impl FnOnce(&CellSnapshot) -> Eligibility,
    ) -> Eligibility {
        if let Some(reason) = self.turn_gate() {
            return Eligibility::blocked(reason);
        }
        match self.grid().and_then(|grid| grid.cell(cell_index)) {
            Some(cell) => rule(cell),
            None => Eligibility::blocked(IneligibleReason::CellMissing),
        }
    }

    /// Whether `topic` may be asked for `cell_index`
    #[must_use]
    pub fn can_ask(&self, cell_index: CellIndex, topic: Topic) -> Eligibility {
        self.with_cell(cell_index, |cell| ask_eligibility(cell, topic))
    }

    /// Whether a letter may be guessed for `cell_index`
    #[must_use]
    pub fn can_guess_letter(&self, cell_index: CellIndex) -> Eligibility {
        self.with_cell(cell_index, letter_guess_eligibility)
    }

    /// Whether a word may be guessed along a line
    #[must_use]
    pub fn can_guess_word(&self, direction: GuessDirection, index: LineIndex) -> Eligibility {
        if let Some(reason) = self.turn_gate() {
            return Eligibility::blocked(reason);
        }
        match self.grid() {
            Some(grid) => word_guess_eligibility(grid, direction, index),
            None => Eligibility::blocked(IneligibleReason::CellMissing),
        }
    }

    /// Whether the pending question may be answered
    #[must_use]
    pub fn can_answer(&self) -> Eligibility {
        if let Some(reason) = self.turn_gate() {
            return Eligibility::blocked(reason);
        }
        let pending = self
            .snapshot
            .last_event
            .as_ref()
            .is_some_and(|event| event.event_type == EventType::QuestionAsked);
        if pending {
            Eligibility::ELIGIBLE
        } else {
            Eligibility::blocked(IneligibleReason::NoPendingQuestion)
        }
    }

    /// The question awaiting an answer, when its payload decodes
    #[must_use]
    pub fn pending_question(&self) -> Option<QuestionAskedData> {
        let event = self.snapshot.last_event.as_ref()?;
        match interpret(event) {
            Interpretation::Decoded(GameEvent::QuestionAsked(data)) => Some(data),
            _ => None,
        }
    }

    /// Topics still askable for `cell_index`, in canonical order
    #[must_use]
    pub fn available_topics(&self, cell_index: CellIndex) -> Vec<Topic> {
        Topic::ALL
            .into_iter()
            .filter(|topic| self.can_ask(cell_index, *topic).eligible)
            .collect()
    }

    /// Cells with at least one askable topic
    #[must_use]
    pub fn askable_cells(&self) -> Vec<CellIndex> {
        CellIndex::all()
            .filter(|cell| !self.available_topics(*cell).is_empty())
            .collect()
    }

    /// Cells a letter may be guessed for
    #[must_use]
    pub fn guessable_cells(&self) -> Vec<CellIndex> {
        CellIndex::all()
            .filter(|cell| self.can_guess_letter(*cell).eligible)
            .collect()
    }

    /// Locked hidden cells in the seat's grid
    #[must_use]
    pub fn locked_cells(&self) -> Vec<CellIndex> {
        self.grid().map(PlayerSnapshot::locked_cells).unwrap_or_default()
    }

    /// Every row then every column, with eligibility and pattern
    #[must_use]
    pub fn word_targets(&self) -> Vec<WordTarget> {
        [GuessDirection::Across, GuessDirection::Down]
            .into_iter()
            .flat_map(|direction| LineIndex::all().map(move |index| (direction, index)))
            .map(|(direction, index)| WordTarget {
                direction,
                index,
                eligibility: self.can_guess_word(direction, index),
                pattern: self
                    .grid()
                    .map(|grid| word_pattern(grid, direction, index, HIDDEN_PLACEHOLDER))
                    .unwrap_or_default(),
            })
            .collect()
    }

    /// First line a word guess may target, rows before columns
    #[must_use]
    pub fn first_eligible_word_target(&self) -> Option<WordTarget> {
        self.word_targets()
            .into_iter()
            .find(|target| target.eligibility.eligible)
    }

    /// Check an action before submitting it
    ///
    /// The action's own player number decides whose turn is checked.
    #[must_use]
    pub fn check_action(snapshot: &SessionSnapshot, action: &Action) -> Eligibility {
        match action {
            Action::Ask(request) => TurnActionResolver::new(snapshot, request.player_number)
                .can_ask(request.cell_index, request.topic),
            Action::Answer(request) => {
                TurnActionResolver::new(snapshot, request.player_number).can_answer()
            }
            Action::GuessLetter(request) => {
                TurnActionResolver::new(snapshot, request.player_number)
                    .can_guess_letter(request.cell_index)
            }
            Action::GuessWord(request) => {
                TurnActionResolver::new(snapshot, request.player_number)
                    .can_guess_word(request.direction, request.index)
            }
        }
    }
}
