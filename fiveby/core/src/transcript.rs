//! Spoken transcript capture and mapping into input fields

/// Which input a transcript is destined for
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TranscriptField {
    /// Free-text answer to a question
    Answer,
    /// Single-letter guess
    Letter,
    /// Five-letter word guess
    Word,
}

/// The transcript to use: the final one when present, else the interim one, trimmed
#[must_use]
pub fn captured_transcript(final_text: &str, interim: &str) -> String {
    let source = if final_text.is_empty() {
        interim
    } else {
        final_text
    };
    source.trim().to_string()
}

/// Shape `text` for `field`
///
/// Answers and letters are trimmed; validation happens when the request is
/// built. Words keep only ASCII letters, so "crane." and "c r a n e" both
/// become "crane".
#[must_use]
pub fn map_transcript(field: TranscriptField, text: &str) -> String {
    match field {
        TranscriptField::Answer | TranscriptField::Letter => text.trim().to_string(),
        TranscriptField::Word => text.chars().filter(char::is_ascii_alphabetic).collect(),
    }
}

/// Interim and final transcript for one capture scope
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Transcript {
    interim: String,
    final_text: String,
}

impl Transcript {
    /// Empty transcript
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the live interim text
    pub fn set_interim(&mut self, text: &str) {
        self.interim = text.to_string();
    }

    /// Record a final result; the interim text is cleared
    pub fn set_final(&mut self, text: &str) {
        self.final_text = text.to_string();
        self.interim.clear();
    }

    /// Replace the transcript with a manual correction
    pub fn correct(&mut self, text: &str) {
        self.set_final(text.trim());
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.interim.clear();
        self.final_text.clear();
    }

    /// Live interim text
    #[must_use]
    pub fn interim(&self) -> &str {
        &self.interim
    }

    /// Final text
    #[must_use]
    pub fn final_text(&self) -> &str {
        &self.final_text
    }

    /// See [`captured_transcript`]; `None` when nothing usable was heard
    #[must_use]
    pub fn captured(&self) -> Option<String> {
        let text = captured_transcript(&self.final_text, &self.interim);
        (!text.is_empty()).then_some(text)
    }

    /// Captured text shaped for `field`
    #[must_use]
    pub fn for_field(&self, field: TranscriptField) -> Option<String> {
        self.captured().map(|text| map_transcript(field, &text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_final_preferred_over_interim() {
        assert_eq!(captured_transcript("  Paris ", "Par"), "Paris");
        assert_eq!(captured_transcript("", " Par "), "Par");
        assert_eq!(captured_transcript("", ""), "");
    }

    #[test]
    fn test_word_mapping_strips_non_letters() {
        assert_eq!(map_transcript(TranscriptField::Word, "c r-a n e."), "crane");
        assert_eq!(map_transcript(TranscriptField::Letter, " b "), "b");
        assert_eq!(map_transcript(TranscriptField::Answer, " New York "), "New York");
    }

    #[test]
    fn test_final_clears_interim() {
        let mut transcript = Transcript::new();
        transcript.set_interim("mon");
        assert_eq!(transcript.captured().as_deref(), Some("mon"));
        transcript.set_final("Monet");
        assert_eq!(transcript.interim(), "");
        assert_eq!(transcript.for_field(TranscriptField::Word).as_deref(), Some("Monet"));
    }

    #[test]
    fn test_correction_and_clear() {
        let mut transcript = Transcript::new();
        transcript.set_final("Money");
        transcript.correct(" Monet ");
        assert_eq!(transcript.final_text(), "Monet");
        transcript.clear();
        assert!(transcript.captured().is_none());
    }
}
