pub mod segmenter;

pub use segmenter::{ends_with_punctuation, segment};

use crate::error::{CaptionError, Result};
use crate::transcript::Word;

/// A contiguous run of words shown together as one caption line.
///
/// `start`, `end` and `text` are derived from `words` and refreshed by every
/// mutator, so they can never drift from the word list.
#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    words: Vec<Word>,
    start: f64,
    end: f64,
    text: String,
}

impl Segment {
    pub fn new(words: Vec<Word>) -> Result<Self> {
        if words.is_empty() {
            return Err(CaptionError::InvalidInput(
                "a segment needs at least one word".to_string(),
            ));
        }

        let mut segment = Self {
            words,
            start: 0.0,
            end: 0.0,
            text: String::new(),
        };
        segment.update();
        Ok(segment)
    }

    /// Replace the word list, keeping the segment non-empty.
    pub fn set_words(&mut self, words: Vec<Word>) -> Result<()> {
        if words.is_empty() {
            return Err(CaptionError::InvalidInput(
                "a segment needs at least one word".to_string(),
            ));
        }
        self.words = words;
        self.update();
        Ok(())
    }

    pub fn push(&mut self, word: Word) {
        self.words.push(word);
        self.update();
    }

    fn update(&mut self) {
        self.start = self.words.first().map(Word::start).unwrap_or(0.0);
        self.end = self.words.last().map(Word::end).unwrap_or(0.0);
        self.text = self
            .words
            .iter()
            .map(Word::text)
            .collect::<Vec<_>>()
            .join(" ");
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn start(&self) -> f64 {
        self.start
    }

    pub fn end(&self) -> f64 {
        self.end
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// Character count of the space-joined text.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn into_words(self) -> Vec<Word> {
        self.words
    }
}
