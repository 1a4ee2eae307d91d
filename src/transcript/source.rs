use super::{has_display_text, Word, WordRecord};
use crate::error::{CaptionError, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, warn};

/// Anything that can hand over an ordered, timed word stream.
#[async_trait]
pub trait WordSource: Send + Sync {
    async fn words(&self) -> Result<Vec<Word>>;
    fn name(&self) -> &'static str;
}

/// Accepted transcript layouts: a bare array or an object with a `words` array.
#[derive(Deserialize)]
#[serde(untagged)]
enum TranscriptFile {
    Bare(Vec<WordRecord>),
    Wrapped { words: Vec<WordRecord> },
}

/// Parse transcript JSON into validated words.
///
/// Blank tokens (which recognizers occasionally emit for pauses) and tokens
/// made only of ASS markup characters are skipped;
/// any other malformed word fails the whole transcript.
pub fn parse_transcript(contents: &str) -> Result<Vec<Word>> {
    let records = match serde_json::from_str::<TranscriptFile>(contents)? {
        TranscriptFile::Bare(records) => records,
        TranscriptFile::Wrapped { words } => words,
    };

    let mut words = Vec::with_capacity(records.len());
    let mut skipped = 0usize;

    for (i, record) in records.into_iter().enumerate() {
        if !has_display_text(&record.text) {
            skipped += 1;
            continue;
        }
        let word = Word::new(&record.text, record.start, record.end, record.confidence)
            .map_err(|e| CaptionError::InvalidInput(format!("transcript word {}: {}", i, e)))?;
        words.push(word);
    }

    if skipped > 0 {
        warn!("Skipped {} blank tokens in transcript", skipped);
    }

    Ok(words)
}

/// Word stream read from a transcript JSON file on disk.
pub struct JsonTranscript {
    path: PathBuf,
}

impl JsonTranscript {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl WordSource for JsonTranscript {
    async fn words(&self) -> Result<Vec<Word>> {
        debug!("Reading transcript from {:?}", self.path);
        let contents = fs::read_to_string(&self.path).await?;
        parse_transcript(&contents)
    }

    fn name(&self) -> &'static str {
        "JSON transcript"
    }
}

#[async_trait]
impl WordSource for Vec<Word> {
    async fn words(&self) -> Result<Vec<Word>> {
        Ok(self.clone())
    }

    fn name(&self) -> &'static str {
        "in-memory"
    }
}
