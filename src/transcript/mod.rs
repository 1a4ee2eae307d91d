pub mod source;

pub use source::{parse_transcript, JsonTranscript, WordSource};

use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};

/// Hesitation tokens dropped by [`remove_fillers`].
const FILLERS: &[&str] = &["um", "uh", "er", "erm", "hmm", "ah"];

/// Characters dropped from caption text because ASS reads them as markup.
pub const MARKUP_CHARS: &[char] = &['{', '}', '\\'];

/// Whether `text` has anything left to show once whitespace and markup
/// characters are removed.
pub fn has_display_text(text: &str) -> bool {
    text.chars()
        .any(|c| !c.is_whitespace() && !MARKUP_CHARS.contains(&c))
}

/// A single recognized word with its timing in seconds.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Word {
    text: String,
    start: f64,
    end: f64,
    confidence: f32,
}

impl Word {
    /// Build a word, trimming its text and checking the timing invariants.
    pub fn new(text: impl AsRef<str>, start: f64, end: f64, confidence: f32) -> Result<Self> {
        let text = text.as_ref().trim();

        if !has_display_text(text) {
            return Err(CaptionError::InvalidInput(format!(
                "word at {:.2}s has no displayable text",
                start
            )));
        }
        if !start.is_finite() || !end.is_finite() || start < 0.0 {
            return Err(CaptionError::InvalidInput(format!(
                "word '{}' has invalid timing {}..{}",
                text, start, end
            )));
        }
        if end < start {
            return Err(CaptionError::InvalidInput(format!(
                "word '{}' ends ({:.3}s) before it starts ({:.3}s)",
                text, end, start
            )));
        }
        if !(0.0..=1.0).contains(&confidence) {
            return Err(CaptionError::InvalidInput(format!(
                "word '{}' has confidence {} outside [0, 1]",
                text, confidence
            )));
        }

        Ok(Self {
            text: text.to_string(),
            start,
            end,
            confidence,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Number of characters (not bytes) in the word.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Whether the word is a hesitation token such as "um" or "uh,".
    pub fn is_filler(&self) -> bool {
        let bare = self
            .text
            .trim_end_matches(|c: char| c.is_ascii_punctuation())
            .to_lowercase();
        FILLERS.contains(&bare.as_str())
    }
}

/// Raw record shape accepted from transcript files.
#[derive(Debug, Deserialize)]
pub(crate) struct WordRecord {
    #[serde(alias = "word")]
    pub(crate) text: String,
    pub(crate) start: f64,
    pub(crate) end: f64,
    #[serde(default = "default_confidence", alias = "probability")]
    pub(crate) confidence: f32,
}

fn default_confidence() -> f32 {
    1.0
}

impl<'de> Deserialize<'de> for Word {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let record = WordRecord::deserialize(deserializer)?;
        Word::new(record.text, record.start, record.end, record.confidence)
            .map_err(serde::de::Error::custom)
    }
}

/// Reject streams that cannot be segmented.
///
/// Per-word timing is checked by [`Word::new`], so only the stream as a
/// whole is inspected here. Neighbouring words may overlap, but neither start
/// nor end times may go backwards; otherwise a word could be highlighted
/// outside the segment that contains it.
pub fn validate_words(words: &[Word]) -> Result<()> {
    if words.is_empty() {
        return Err(CaptionError::InvalidInput(
            "word stream is empty".to_string(),
        ));
    }

    for (i, pair) in words.windows(2).enumerate() {
        let (prev, next) = (&pair[0], &pair[1]);
        if next.start() < prev.start() || next.end() < prev.end() {
            return Err(CaptionError::InvalidInput(format!(
                "word {} '{}' ({:.3}s-{:.3}s) is out of order after '{}' ({:.3}s-{:.3}s)",
                i + 1,
                next.text(),
                next.start(),
                next.end(),
                prev.text(),
                prev.start(),
                prev.end()
            )));
        }
    }

    Ok(())
}

/// Drop hesitation tokens from the stream.
pub fn remove_fillers(words: Vec<Word>) -> Vec<Word> {
    words.into_iter().filter(|w| !w.is_filler()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_word_trims_text() {
        let word = Word::new("  Hello ", 0.0, 0.5, 0.9).unwrap();
        assert_eq!(word.text(), "Hello");
        assert_eq!(word.char_len(), 5);
    }

    #[test]
    fn test_word_rejects_blank_text() {
        assert!(Word::new("   ", 0.0, 0.5, 0.9).is_err());
    }

    #[test]
    fn test_word_rejects_end_before_start() {
        let err = Word::new("late", 1.0, 0.5, 0.9).unwrap_err();
        assert!(matches!(err, CaptionError::InvalidInput(_)));
    }

    #[test]
    fn test_word_rejects_negative_start_and_bad_confidence() {
        assert!(Word::new("a", -0.1, 0.5, 0.9).is_err());
        assert!(Word::new("a", 0.0, f64::NAN, 0.9).is_err());
        assert!(Word::new("a", 0.0, 0.5, 1.5).is_err());
    }

    #[test]
    fn test_char_len_counts_characters() {
        let word = Word::new("héllo", 0.0, 0.5, 1.0).unwrap();
        assert_eq!(word.char_len(), 5);
    }

    #[test]
    fn test_deserialize_reference_shape() {
        let word: Word =
            serde_json::from_str(r#"{"word": " Hi", "start": 0.1, "end": 0.4, "probability": 0.8}"#)
                .unwrap();
        assert_eq!(word.text(), "Hi");
        assert_eq!(word.confidence(), 0.8);
    }

    #[test]
    fn test_deserialize_defaults_confidence() {
        let word: Word =
            serde_json::from_str(r#"{"text": "Hi", "start": 0.1, "end": 0.4}"#).unwrap();
        assert_eq!(word.confidence(), 1.0);
    }

    #[test]
    fn test_deserialize_rejects_bad_timing() {
        let result: std::result::Result<Word, _> =
            serde_json::from_str(r#"{"text": "Hi", "start": 0.5, "end": 0.4}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_validate_empty_stream() {
        assert!(matches!(
            validate_words(&[]),
            Err(CaptionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_word_rejects_markup_only_text() {
        assert!(matches!(
            Word::new("{}", 0.0, 0.5, 1.0),
            Err(CaptionError::InvalidInput(_))
        ));
        assert!(Word::new(" {\\} ", 0.0, 0.5, 1.0).is_err());
        assert!(Word::new("{ok}", 0.0, 0.5, 1.0).is_ok());
    }

    #[test]
    fn test_validate_allows_overlap_but_not_reordering() {
        let overlapping = vec![
            Word::new("a", 0.0, 0.6, 1.0).unwrap(),
            Word::new("b", 0.5, 1.0, 1.0).unwrap(),
        ];
        assert!(validate_words(&overlapping).is_ok());

        // "a" would stay highlighted after the segment ending with "b" is gone.
        let swallowing = vec![
            Word::new("a", 0.0, 5.0, 1.0).unwrap(),
            Word::new("b", 1.0, 2.0, 1.0).unwrap(),
        ];
        assert!(matches!(
            validate_words(&swallowing),
            Err(CaptionError::InvalidInput(_))
        ));

        let backwards = vec![
            Word::new("a", 1.0, 1.5, 1.0).unwrap(),
            Word::new("b", 0.5, 1.5, 1.0).unwrap(),
        ];
        assert!(validate_words(&backwards).is_err());
    }

    #[test]
    fn test_remove_fillers() {
        let words = vec![
            Word::new("So", 0.0, 0.2, 1.0).unwrap(),
            Word::new("um,", 0.2, 0.4, 1.0).unwrap(),
            Word::new("Uh", 0.4, 0.6, 1.0).unwrap(),
            Word::new("thinking", 0.6, 1.0, 1.0).unwrap(),
            Word::new("umbrella", 1.0, 1.4, 1.0).unwrap(),
        ];

        let kept: Vec<String> = remove_fillers(words)
            .iter()
            .map(|w| w.text().to_string())
            .collect();

        assert_eq!(kept, vec!["So", "thinking", "umbrella"]);
    }
}
