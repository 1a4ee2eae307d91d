pub mod preset;

pub use preset::{builtin_preset, load_preset, Preset, StyleOverrides, BUILTIN_PRESETS};

use crate::error::{CaptionError, Result};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

/// An ASS color code such as `&H00FFFFFF`, kept verbatim.
///
/// Only the shape is checked; channel order (`AABBGGRR`) is never interpreted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AssColor(String);

fn color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^&H([0-9A-Fa-f]{6}|[0-9A-Fa-f]{8})&?$").expect("Invalid regex")
    })
}

impl AssColor {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::str::FromStr for AssColor {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        if color_pattern().is_match(s) {
            Ok(AssColor(s.to_string()))
        } else {
            Err(format!(
                "Invalid color '{}'. Use ASS notation like &H00FFFFFF",
                s
            ))
        }
    }
}

impl TryFrom<String> for AssColor {
    type Error = String;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<AssColor> for String {
    fn from(color: AssColor) -> Self {
        color.0
    }
}

impl std::fmt::Display for AssColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Build a color from a literal known to be valid.
fn color(code: &str) -> AssColor {
    AssColor(code.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AnimationKind {
    None,
    #[default]
    Pop,
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnimationKind::None => write!(f, "none"),
            AnimationKind::Pop => write!(f, "pop"),
        }
    }
}

impl std::str::FromStr for AnimationKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "none" => Ok(AnimationKind::None),
            "pop" => Ok(AnimationKind::Pop),
            _ => Err(format!("Unknown animation: {}. Use 'none' or 'pop'", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerticalPosition {
    Top,
    Middle,
    #[default]
    Bottom,
}

impl std::fmt::Display for VerticalPosition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerticalPosition::Top => write!(f, "top"),
            VerticalPosition::Middle => write!(f, "middle"),
            VerticalPosition::Bottom => write!(f, "bottom"),
        }
    }
}

impl std::str::FromStr for VerticalPosition {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "top" => Ok(VerticalPosition::Top),
            "middle" | "center" => Ok(VerticalPosition::Middle),
            "bottom" => Ok(VerticalPosition::Bottom),
            _ => Err(format!(
                "Unknown position: {}. Use 'top', 'middle', or 'bottom'",
                s
            )),
        }
    }
}

/// Base glyph styling shared by all three ASS styles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontStyle {
    #[serde(alias = "name")]
    pub family: String,
    /// Font size in canvas pixels.
    pub size: u32,
    #[serde(alias = "color")]
    pub primary_color: AssColor,
    pub outline_color: AssColor,
    pub outline_width: f64,
    pub shadow_depth: f64,
}

impl Default for FontStyle {
    fn default() -> Self {
        Self {
            family: "Arial".to_string(),
            size: 60,
            primary_color: color("&H00FFFFFF"),
            outline_color: color("&H00000000"),
            outline_width: 2.0,
            shadow_depth: 0.0,
        }
    }
}

/// Active-word emphasis: an opaque box with the word redrawn on top.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HighlightStyle {
    pub enabled: bool,
    #[serde(alias = "color")]
    pub box_color: AssColor,
    pub text_color: AssColor,
    pub outline_color: AssColor,
    pub outline_width: f64,
    #[serde(alias = "animation")]
    pub animation_kind: AnimationKind,
    /// Border thickness of the opaque box around the active word.
    pub padding: f64,
}

impl Default for HighlightStyle {
    fn default() -> Self {
        Self {
            enabled: true,
            box_color: color("&H0000FFFF"),
            text_color: color("&H00FFFFFF"),
            outline_color: color("&H0000FFFF"),
            outline_width: 40.0,
            animation_kind: AnimationKind::Pop,
            padding: 15.0,
        }
    }
}

/// Thresholds driving the segmenter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub max_chars: usize,
    pub max_words: usize,
    pub max_lines: usize,
    /// Pause (seconds) that forces a new segment when strictly exceeded.
    #[serde(alias = "gap_threshold")]
    pub gap_threshold_seconds: f64,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 20,
            max_words: 5,
            max_lines: 2,
            gap_threshold_seconds: 0.5,
        }
    }
}

impl ChunkingConfig {
    /// Reject thresholds under which the segmenter cannot make progress.
    pub fn validate(&self) -> Result<()> {
        if self.max_chars == 0 {
            return Err(CaptionError::config(
                "chunking.max_chars",
                "must be greater than 0",
            ));
        }
        if self.max_words == 0 {
            return Err(CaptionError::config(
                "chunking.max_words",
                "must be greater than 0",
            ));
        }
        if self.max_lines == 0 {
            return Err(CaptionError::config(
                "chunking.max_lines",
                "must be greater than 0",
            ));
        }
        if !self.gap_threshold_seconds.is_finite() || self.gap_threshold_seconds < 0.0 {
            return Err(CaptionError::config(
                "chunking.gap_threshold_seconds",
                format!(
                    "must be a non-negative number of seconds, got {}",
                    self.gap_threshold_seconds
                ),
            ));
        }
        Ok(())
    }
}

/// Largest accepted font size in pixels.
pub const MAX_FONT_SIZE: u32 = 1_000;

/// Finalized caption styling. Built once per run and never mutated while
/// rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StyleConfig {
    pub font: FontStyle,
    pub highlight: HighlightStyle,
    pub chunking: ChunkingConfig,
    #[serde(alias = "margin_bottom")]
    pub margin_bottom_px: u32,
    #[serde(alias = "position")]
    pub vertical_position: VerticalPosition,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            font: FontStyle::default(),
            highlight: HighlightStyle::default(),
            chunking: ChunkingConfig::default(),
            margin_bottom_px: 150,
            vertical_position: VerticalPosition::default(),
        }
    }
}

impl StyleConfig {
    pub fn validate(&self) -> Result<()> {
        self.chunking.validate()?;

        if self.font.family.trim().is_empty() {
            return Err(CaptionError::config("font.family", "must not be empty"));
        }
        // The family is written into comma-separated style lines.
        if self.font.family.contains([',', '\n', '\r']) {
            return Err(CaptionError::config(
                "font.family",
                format!(
                    "must not contain commas or line breaks, got {:?}",
                    self.font.family
                ),
            ));
        }
        if self.font.size == 0 || self.font.size > MAX_FONT_SIZE {
            return Err(CaptionError::config(
                "font.size",
                format!("must be between 1 and {}, got {}", MAX_FONT_SIZE, self.font.size),
            ));
        }

        let widths = [
            ("font.outline_width", self.font.outline_width),
            ("font.shadow_depth", self.font.shadow_depth),
            ("highlight.outline_width", self.highlight.outline_width),
            ("highlight.padding", self.highlight.padding),
        ];
        for (field, value) in widths {
            if !value.is_finite() || value < 0.0 {
                return Err(CaptionError::config(
                    field,
                    format!("must be a non-negative number, got {}", value),
                ));
            }
        }

        Ok(())
    }
}
