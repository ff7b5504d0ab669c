//! Request bodies. Construction is the validation point: a value of one of
//! these types is always acceptable to send.

use serde::{Deserialize, Serialize};

use super::primitives::{CellIndex, GuessDirection, Letter, LineIndex, PlayerNumber, Topic, Word};
use super::ValidationError;

/// Longest accepted player name
pub const PLAYER_NAME_MAX: usize = 30;

/// Longest accepted answer, after trimming
pub const ANSWER_MAX: usize = 100;

/// `POST /sessions`
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateSessionRequest {
    /// Optional name for seat 1
    pub player_1_name: Option<String>,
    /// Optional name for seat 2
    pub player_2_name: Option<String>,
}

impl CreateSessionRequest {
    /// Trim both names; blank becomes `None`
    pub fn new(
        player_1_name: Option<&str>,
        player_2_name: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let player_1_name = normalize_name("player_1_name", player_1_name);
        let player_2_name = normalize_name("player_2_name", player_2_name);
        match (player_1_name, player_2_name) {
            (Ok(player_1_name), Ok(player_2_name)) => Ok(Self {
                player_1_name,
                player_2_name,
            }),
            (Err(first), Err(second)) => Err(ValidationError {
                issues: first.issues.into_iter().chain(second.issues).collect(),
            }),
            (Err(err), _) | (_, Err(err)) => Err(err),
        }
    }
}

fn normalize_name(field: &str, name: Option<&str>) -> Result<Option<String>, ValidationError> {
    let Some(trimmed) = name.map(str::trim).filter(|name| !name.is_empty()) else {
        return Ok(None);
    };
    if trimmed.chars().count() > PLAYER_NAME_MAX {
        return Err(ValidationError::single(
            field,
            format!("name must be at most {PLAYER_NAME_MAX} characters"),
        ));
    }
    Ok(Some(trimmed.to_string()))
}

/// `POST /sessions/{id}/ask`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AskQuestionRequest {
    /// Asking seat
    pub player_number: PlayerNumber,
    /// Target cell
    pub cell_index: CellIndex,
    /// Topic to ask
    pub topic: Topic,
}

impl AskQuestionRequest {
    /// All fields are range-checked by their types
    #[must_use]
    pub fn new(player_number: PlayerNumber, cell_index: CellIndex, topic: Topic) -> Self {
        Self {
            player_number,
            cell_index,
            topic,
        }
    }
}

/// `POST /sessions/{id}/answer`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnswerQuestionRequest {
    /// Answering seat
    pub player_number: PlayerNumber,
    /// Trimmed answer text
    pub answer: String,
}

impl AnswerQuestionRequest {
    /// Trim the answer and check its length
    pub fn new(player_number: PlayerNumber, answer: &str) -> Result<Self, ValidationError> {
        let answer = answer.trim();
        let len = answer.chars().count();
        if !(1..=ANSWER_MAX).contains(&len) {
            return Err(ValidationError::single(
                "answer",
                format!("answer must be 1-{ANSWER_MAX} characters"),
            ));
        }
        Ok(Self {
            player_number,
            answer: answer.to_string(),
        })
    }
}

/// `POST /sessions/{id}/guess-letter`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuessLetterRequest {
    /// Guessing seat
    pub player_number: PlayerNumber,
    /// Target cell
    pub cell_index: CellIndex,
    /// Uppercased letter
    pub letter: Letter,
}

impl GuessLetterRequest {
    /// Accepts a letter in either case
    pub fn new(
        player_number: PlayerNumber,
        cell_index: CellIndex,
        letter: &str,
    ) -> Result<Self, ValidationError> {
        let letter =
            Letter::from_input(letter).map_err(|msg| ValidationError::single("letter", msg))?;
        Ok(Self {
            player_number,
            cell_index,
            letter,
        })
    }
}

/// `POST /sessions/{id}/guess-word`
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GuessWordRequest {
    /// Guessing seat
    pub player_number: PlayerNumber,
    /// Row or column
    pub direction: GuessDirection,
    /// Which row or column
    pub index: LineIndex,
    /// Uppercased five-letter word
    pub word: Word,
}

impl GuessWordRequest {
    /// Accepts a word in either case
    pub fn new(
        player_number: PlayerNumber,
        direction: GuessDirection,
        index: LineIndex,
        word: &str,
    ) -> Result<Self, ValidationError> {
        let word = Word::from_input(word).map_err(|msg| ValidationError::single("word", msg))?;
        Ok(Self {
            player_number,
            direction,
            index,
            word,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_create_request_blank_names_become_null() {
        let request = CreateSessionRequest::new(Some("  Ada "), Some("   ")).unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"player_1_name": "Ada", "player_2_name": null})
        );
    }

    #[test]
    fn test_create_request_long_names_name_both_fields() {
        let long = "x".repeat(31);
        let err = CreateSessionRequest::new(Some(&long), Some(&long)).unwrap_err();
        assert_eq!(err.paths(), vec!["player_1_name", "player_2_name"]);
    }

    #[test]
    fn test_answer_is_trimmed_and_bounded() {
        let request = AnswerQuestionRequest::new(PlayerNumber::ONE, "  Paris ").unwrap();
        assert_eq!(request.answer, "Paris");
        assert!(AnswerQuestionRequest::new(PlayerNumber::ONE, "   ").is_err());
        assert!(AnswerQuestionRequest::new(PlayerNumber::ONE, &"a".repeat(101)).is_err());
    }

    #[test]
    fn test_letter_guess_serializes_uppercase() {
        let cell = CellIndex::try_from(4).unwrap();
        let request = GuessLetterRequest::new(PlayerNumber::TWO, cell, "k").unwrap();
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"player_number": 2, "cell_index": 4, "letter": "K"})
        );
    }

    #[test]
    fn test_word_guess_rejects_wrong_length() {
        let index = LineIndex::try_from(0).unwrap();
        let err =
            GuessWordRequest::new(PlayerNumber::ONE, GuessDirection::Down, index, "cat").unwrap_err();
        assert_eq!(err.paths(), vec!["word"]);
    }

    #[test]
    fn test_ask_request_wire_shape() {
        let request = AskQuestionRequest::new(
            PlayerNumber::ONE,
            CellIndex::try_from(0).unwrap(),
            Topic::CurrentAffairs,
        );
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            json!({"player_number": 1, "cell_index": 0, "topic": "Current Affairs"})
        );
    }
}
