//! Primitive Wire Types
//!
//! Range-checked newtypes and closed enums shared by every payload. Each
//! newtype rejects out-of-range values during deserialization, so a decoded
//! payload never carries a cell index of 30 or a lowercase revealed letter.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Number of cells on a side of the grid
pub const GRID_SIDE: u8 = 5;

/// Number of cells in a player's grid
pub const GRID_CELLS: usize = 25;

// ============================================================================
// Identifiers
// ============================================================================

/// Session identifier (UUID assigned by the backend)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Wrap an existing UUID
    #[must_use]
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    /// Access the underlying UUID
    #[must_use]
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.hyphenated())
    }
}

impl FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

// ============================================================================
// Player numbers
// ============================================================================

/// Seat number of a player: always 1 or 2
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct PlayerNumber(u8);

impl PlayerNumber {
    /// Player one
    pub const ONE: Self = Self(1);
    /// Player two
    pub const TWO: Self = Self(2);

    /// Raw seat number
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The other seat
    #[must_use]
    pub fn other(self) -> Self {
        if self == Self::ONE {
            Self::TWO
        } else {
            Self::ONE
        }
    }
}

impl TryFrom<u8> for PlayerNumber {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 | 2 => Ok(Self(value)),
            other => Err(format!("player_number must be 1 or 2, got {other}")),
        }
    }
}

impl From<PlayerNumber> for u8 {
    fn from(value: PlayerNumber) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Grid coordinates
// ============================================================================

/// Index of a cell in a player's grid, 0 through 24 in row-major order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct CellIndex(u8);

impl CellIndex {
    /// Build from a 0-based row and column
    #[must_use]
    pub fn from_row_col(row: LineIndex, col: LineIndex) -> Self {
        Self(row.0 * GRID_SIDE + col.0)
    }

    /// Raw index
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// Position in the cells array
    #[must_use]
    pub fn as_usize(self) -> usize {
        usize::from(self.0)
    }

    /// 0-based row
    #[must_use]
    pub fn row(self) -> u8 {
        self.0 / GRID_SIDE
    }

    /// 0-based column
    #[must_use]
    pub fn col(self) -> u8 {
        self.0 % GRID_SIDE
    }

    /// Human-facing position, 1-based: `r2c4`
    #[must_use]
    pub fn position_label(self) -> String {
        format!("r{}c{}", self.row() + 1, self.col() + 1)
    }

    /// Every index in row-major order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_CELLS as u8).map(Self)
    }
}

impl TryFrom<u8> for CellIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if usize::from(value) < GRID_CELLS {
            Ok(Self(value))
        } else {
            Err(format!("cell index must be within 0..=24, got {value}"))
        }
    }
}

impl From<CellIndex> for u8 {
    fn from(value: CellIndex) -> Self {
        value.0
    }
}

impl fmt::Display for CellIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Index of a row or column, 0 through 4
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LineIndex(u8);

impl LineIndex {
    /// Raw index
    #[must_use]
    pub fn get(self) -> u8 {
        self.0
    }

    /// All five lines in order
    pub fn all() -> impl Iterator<Item = Self> {
        (0..GRID_SIDE).map(Self)
    }
}

impl TryFrom<u8> for LineIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if value < GRID_SIDE {
            Ok(Self(value))
        } else {
            Err(format!("row/col index must be within 0..=4, got {value}"))
        }
    }
}

impl From<LineIndex> for u8 {
    fn from(value: LineIndex) -> Self {
        value.0
    }
}

impl fmt::Display for LineIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation of a word guess
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GuessDirection {
    /// A row, left to right
    Across,
    /// A column, top to bottom
    Down,
}

impl GuessDirection {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Across => "across",
            Self::Down => "down",
        }
    }

    /// Label for a line in this direction: `Row 2` / `Col 3`
    #[must_use]
    pub fn line_label(self, index: LineIndex) -> String {
        match self {
            Self::Across => format!("Row {}", index.get() + 1),
            Self::Down => format!("Col {}", index.get() + 1),
        }
    }
}

impl FromStr for GuessDirection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "across" => Ok(Self::Across),
            "down" => Ok(Self::Down),
            other => Err(format!("direction must be across or down, got {other:?}")),
        }
    }
}

impl fmt::Display for GuessDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Letters and words
// ============================================================================

/// A single uppercase ASCII letter as it appears on the wire
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Letter(char);

impl Letter {
    /// The letter as a char
    #[must_use]
    pub fn as_char(self) -> char {
        self.0
    }

    /// Parse user input: exactly one ASCII letter in either case, uppercased
    pub fn from_input(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        let mut chars = trimmed.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_alphabetic() => Ok(Self(c.to_ascii_uppercase())),
            _ => Err(format!("expected a single letter A-Z, got {trimmed:?}")),
        }
    }
}

impl TryFrom<String> for Letter {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let mut chars = value.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) if c.is_ascii_uppercase() => Ok(Self(c)),
            _ => Err(format!("expected a single uppercase letter A-Z, got {value:?}")),
        }
    }
}

impl TryFrom<char> for Letter {
    type Error = String;

    fn try_from(value: char) -> Result<Self, Self::Error> {
        if value.is_ascii_uppercase() {
            Ok(Self(value))
        } else {
            Err(format!("expected an uppercase letter A-Z, got {value:?}"))
        }
    }
}

impl From<Letter> for String {
    fn from(value: Letter) -> Self {
        value.0.to_string()
    }
}

impl fmt::Display for Letter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A five-letter uppercase word as it appears on the wire
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Word(String);

impl Word {
    /// Word length for every guess
    pub const LEN: usize = GRID_SIDE as usize;

    /// Borrow as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Parse user input: exactly five ASCII letters in either case, uppercased
    pub fn from_input(input: &str) -> Result<Self, String> {
        let trimmed = input.trim();
        if trimmed.len() == Self::LEN && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self(trimmed.to_ascii_uppercase()))
        } else {
            Err(format!("expected exactly five letters A-Z, got {trimmed:?}"))
        }
    }
}

impl TryFrom<String> for Word {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value.len() == Self::LEN && value.chars().all(|c| c.is_ascii_uppercase()) {
            Ok(Self(value))
        } else {
            Err(format!("expected exactly five uppercase letters, got {value:?}"))
        }
    }
}

impl From<Word> for String {
    fn from(value: Word) -> Self {
        value.0
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ============================================================================
// Closed enums
// ============================================================================

/// Question topics. The order of [`Topic::ALL`] is the canonical order every
/// snapshot must report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Topic {
    /// Politics
    Politics,
    /// Science
    Science,
    /// History
    History,
    /// Art
    Art,
    /// Current affairs
    #[serde(rename = "Current Affairs")]
    CurrentAffairs,
}

impl Topic {
    /// Canonical topic order
    pub const ALL: [Self; 5] = [
        Self::Politics,
        Self::Science,
        Self::History,
        Self::Art,
        Self::CurrentAffairs,
    ];

    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Politics => "Politics",
            Self::Science => "Science",
            Self::History => "History",
            Self::Art => "Art",
            Self::CurrentAffairs => "Current Affairs",
        }
    }
}

impl FromStr for Topic {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::ALL
            .into_iter()
            .find(|topic| topic.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| format!("unknown topic {wanted:?}"))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Session lifecycle status
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Turns are still being played
    InProgress,
    /// Terminal: no further actions are accepted
    Complete,
}

/// How a cell became revealed
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevealedBy {
    /// A correctly answered question
    Question,
    /// A correct letter or word guess
    Guess,
    /// Side effect of another reveal
    Auto,
}

/// Kind of the most recent session event
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    /// A question was generated for a cell
    QuestionAsked,
    /// The pending question was answered
    QuestionAnswered,
    /// A single letter was guessed
    LetterGuessed,
    /// A full row or column was guessed
    WordGuessed,
}

impl EventType {
    /// Wire name
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuestionAsked => "question_asked",
            Self::QuestionAnswered => "question_answered",
            Self::LetterGuessed => "letter_guessed",
            Self::WordGuessed => "word_guessed",
        }
    }
}

impl fmt::Display for EventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Backend question generator identifiers
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionGenerator {
    /// Deterministic stub generator
    StubV1,
    /// Model-backed generator
    OpenaiResponsesV1,
}
