use super::Segment;
use crate::error::Result;
use crate::style::ChunkingConfig;
use crate::transcript::{validate_words, Word};

/// Characters that mark a natural break after a word.
const BREAK_PUNCTUATION: &[char] = &['.', '?', '!', ',', ';', ':'];

/// A lone word this short never closes a segment on punctuation alone.
const MIN_PUNCTUATION_SPLIT_CHARS: usize = 5;

pub fn ends_with_punctuation(text: &str) -> bool {
    text.chars()
        .last()
        .map(|c| BREAK_PUNCTUATION.contains(&c))
        .unwrap_or(false)
}

/// Group words into caption segments in a single greedy pass.
///
/// After each word is appended the split rules are checked in order, and
/// the first that holds closes the segment:
/// 1. `char_count >= max_chars`
/// 2. `word_count >= max_words`
/// 3. the pause before the next word is longer than `gap_threshold_seconds`
/// 4. the word ends in punctuation and the segment has more than one word or
///    more than five characters
///
/// The final word always closes the segment it belongs to. An empty stream is
/// rejected with `InvalidInput`.
pub fn segment(words: &[Word], config: &ChunkingConfig) -> Result<Vec<Segment>> {
    config.validate()?;
    validate_words(words)?;

    let mut segments = Vec::new();
    let mut current: Vec<Word> = Vec::new();
    // Length of the space-joined accumulator text, tracked incrementally.
    let mut char_count = 0usize;

    for (i, word) in words.iter().enumerate() {
        if !current.is_empty() {
            char_count += 1;
        }
        char_count += word.char_len();
        current.push(word.clone());

        let word_count = current.len();
        let is_last = i + 1 == words.len();
        let time_gap = words
            .get(i + 1)
            .map(|next| next.start() - word.end())
            .unwrap_or(0.0);

        // Hard limits first, then the pause, then punctuation.
        let should_split = char_count >= config.max_chars
            || word_count >= config.max_words
            || time_gap > config.gap_threshold_seconds
            || (ends_with_punctuation(word.text())
                && (word_count > 1 || char_count > MIN_PUNCTUATION_SPLIT_CHARS));

        if should_split || is_last {
            segments.push(Segment::new(std::mem::take(&mut current))?);
            char_count = 0;
        }
    }

    Ok(segments)
}
