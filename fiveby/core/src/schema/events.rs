//! Event payload schemas, one per `last_event.type`

use serde::{Deserialize, Serialize};

use super::primitives::{
    CellIndex, GuessDirection, Letter, LineIndex, QuestionGenerator, Topic, Word,
};
use super::{check_coordinates, check_revealed_letter, Issues, Validate, ValidationError};

const QUESTION_TEXT_MAX: usize = 500;

/// A cell revealed by a word guess, directly or as a side effect
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RevealedCell {
    /// Cell index
    pub cell_index: CellIndex,
    /// 0-based row
    pub row: LineIndex,
    /// 0-based column
    pub col: LineIndex,
    /// Revealed letter
    pub letter: Letter,
}

impl Validate for RevealedCell {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        check_coordinates(&mut issues, self.cell_index, self.row, self.col);
        issues.finish()
    }
}

/// `question_asked`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionAskedData {
    /// Target cell
    pub cell_index: CellIndex,
    /// 0-based row
    pub row: LineIndex,
    /// 0-based column
    pub col: LineIndex,
    /// Topic asked
    pub topic: Topic,
    /// The question to read out
    pub question_text: String,
    /// Expected answer
    pub answer: String,
    /// Accepted spellings
    pub acceptable_variants: Vec<String>,
    /// Which generator produced the question
    pub generator: QuestionGenerator,
}

impl Validate for QuestionAskedData {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        check_coordinates(&mut issues, self.cell_index, self.row, self.col);

        let text_len = self.question_text.chars().count();
        issues.check(
            (1..=QUESTION_TEXT_MAX).contains(&text_len),
            "question_text",
            format!("question_text must be 1-{QUESTION_TEXT_MAX} characters"),
        );
        issues.check(!self.answer.is_empty(), "answer", "answer must not be empty");
        issues.check(
            !self.acceptable_variants.is_empty(),
            "acceptable_variants",
            "acceptable_variants must list at least one variant",
        );
        for (position, variant) in self.acceptable_variants.iter().enumerate() {
            issues.check(
                !variant.is_empty(),
                format!("acceptable_variants[{position}]"),
                "variants must not be empty",
            );
        }

        issues.finish()
    }
}

/// `question_answered`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QuestionAnsweredData {
    /// Cell the question targeted
    pub cell_index: CellIndex,
    /// 0-based row
    pub row: LineIndex,
    /// 0-based column
    pub col: LineIndex,
    /// Topic of the question
    pub topic: Topic,
    /// The answer given
    pub answer: String,
    /// Whether it was accepted
    pub correct: bool,
    /// Letter revealed, present iff correct
    pub revealed_letter: Option<Letter>,
    /// Cell whose lock this answer released
    pub lock_cleared_cell_index: Option<CellIndex>,
}

impl Validate for QuestionAnsweredData {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        check_coordinates(&mut issues, self.cell_index, self.row, self.col);
        issues.check(!self.answer.is_empty(), "answer", "answer must not be empty");
        check_revealed_letter(&mut issues, self.correct, self.revealed_letter);
        issues.finish()
    }
}

/// `letter_guessed`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LetterGuessedData {
    /// Target cell
    pub cell_index: CellIndex,
    /// 0-based row
    pub row: LineIndex,
    /// 0-based column
    pub col: LineIndex,
    /// Letter guessed
    pub guess: Letter,
    /// Whether the guess matched
    pub correct: bool,
    /// Letter revealed, present iff correct
    pub revealed_letter: Option<Letter>,
    /// Change to the guesser's score
    pub score_delta: i64,
    /// Change to the opponent's score
    pub opponent_score_delta: i64,
    /// Cells newly locked as a penalty
    pub locks_enqueued: Vec<CellIndex>,
}

impl Validate for LetterGuessedData {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        check_coordinates(&mut issues, self.cell_index, self.row, self.col);
        check_revealed_letter(&mut issues, self.correct, self.revealed_letter);
        issues.finish()
    }
}

/// `word_guessed`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WordGuessedData {
    /// Row or column
    pub direction: GuessDirection,
    /// Which row or column
    pub index: LineIndex,
    /// Word guessed
    pub guess: Word,
    /// Whether the guess matched
    pub correct: bool,
    /// Change to the guesser's score
    pub score_delta: i64,
    /// Change to the opponent's score
    pub opponent_score_delta: i64,
    /// Cells of the guessed word that became visible
    pub revealed_cells: Vec<RevealedCell>,
    /// Cells revealed as a side effect
    pub auto_reveals: Vec<RevealedCell>,
    /// Cells newly locked as a penalty
    pub locks_enqueued: Vec<CellIndex>,
}

impl Validate for WordGuessedData {
    fn validate(&self) -> Result<(), ValidationError> {
        let mut issues = Issues::new();
        for (position, cell) in self.revealed_cells.iter().enumerate() {
            issues.nest(&format!("revealed_cells[{position}]"), cell.validate());
        }
        for (position, cell) in self.auto_reveals.iter().enumerate() {
            issues.nest(&format!("auto_reveals[{position}]"), cell.validate());
        }
        issues.finish()
    }
}
