use super::{AnimationKind, AssColor, StyleConfig, VerticalPosition};
use crate::error::{CaptionError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Names accepted by [`builtin_preset`].
pub const BUILTIN_PRESETS: &[&str] = &["tiktok", "minimal", "center"];

/// A named bundle of caption styling plus preprocessing switches.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Preset {
    #[serde(flatten)]
    pub style: StyleConfig,
    /// Drop hesitation tokens before segmenting.
    #[serde(default)]
    pub clean_fillers: bool,
}

/// Look up one of the presets compiled into the binary.
pub fn builtin_preset(name: &str) -> Option<Preset> {
    match name.to_lowercase().as_str() {
        "tiktok" => Some(Preset::default()),
        "minimal" => {
            let mut preset = Preset::default();
            preset.style.font.size = 48;
            preset.style.font.outline_width = 3.0;
            preset.style.highlight.enabled = false;
            preset.style.highlight.animation_kind = AnimationKind::None;
            preset.style.chunking.max_chars = 32;
            preset.style.chunking.max_words = 7;
            Some(preset)
        }
        "center" => {
            let mut preset = Preset::default();
            preset.style.font.size = 72;
            preset.style.vertical_position = VerticalPosition::Middle;
            preset.style.highlight.animation_kind = AnimationKind::None;
            preset.style.chunking.max_chars = 14;
            preset.style.chunking.max_words = 3;
            Some(preset)
        }
        _ => None,
    }
}

/// Resolve a preset by file path or name.
///
/// Lookup order: the literal path, `<presets_dir>/<name>.json` then
/// `<presets_dir>/<name>.toml`, the name with a `.json` suffix in the working
/// directory, and finally the built-in presets.
pub fn load_preset(name_or_path: &str, presets_dir: Option<&Path>) -> Result<Preset> {
    for candidate in candidate_paths(name_or_path, presets_dir) {
        if candidate.is_file() {
            debug!("Loading preset from {:?}", candidate);
            return read_preset_file(&candidate);
        }
    }

    builtin_preset(name_or_path).ok_or_else(|| {
        CaptionError::PresetNotFound(format!(
            "'{}' (built-in presets: {})",
            name_or_path,
            BUILTIN_PRESETS.join(", ")
        ))
    })
}

fn candidate_paths(name_or_path: &str, presets_dir: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates = vec![PathBuf::from(name_or_path)];

    if let Some(dir) = presets_dir {
        candidates.push(dir.join(format!("{}.json", name_or_path)));
        candidates.push(dir.join(format!("{}.toml", name_or_path)));
    }

    let path = Path::new(name_or_path);
    if path.extension().is_none() {
        candidates.push(path.with_extension("json"));
    }

    candidates
}

fn read_preset_file(path: &Path) -> Result<Preset> {
    let contents = std::fs::read_to_string(path)?;

    let preset: Preset = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&contents)?,
        _ => serde_json::from_str(&contents)?,
    };

    preset.style.validate()?;
    Ok(preset)
}

/// Per-run tweaks layered over a preset before rendering starts.
#[derive(Debug, Clone, Default)]
pub struct StyleOverrides {
    pub font_name: Option<String>,
    pub font_size: Option<u32>,
    pub color: Option<AssColor>,
    /// Applied to both the base text outline and the highlight outline.
    pub outline_color: Option<AssColor>,
    pub highlight_color: Option<AssColor>,
    pub highlight_text_color: Option<AssColor>,
    pub position: Option<VerticalPosition>,
    pub highlight: Option<bool>,
    pub animation: Option<AnimationKind>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self.font_name.is_none()
            && self.font_size.is_none()
            && self.color.is_none()
            && self.outline_color.is_none()
            && self.highlight_color.is_none()
            && self.highlight_text_color.is_none()
            && self.position.is_none()
            && self.highlight.is_none()
            && self.animation.is_none()
    }

    /// Produce the finalized style. The result is validated, so an override
    /// such as a zero font size is reported rather than clamped.
    pub fn apply(&self, mut style: StyleConfig) -> Result<StyleConfig> {
        if let Some(name) = self.font_name.as_ref().filter(|n| !n.trim().is_empty()) {
            style.font.family = name.trim().to_string();
        }
        if let Some(size) = self.font_size {
            style.font.size = size;
        }
        if let Some(color) = &self.color {
            style.font.primary_color = color.clone();
        }
        if let Some(color) = &self.outline_color {
            style.font.outline_color = color.clone();
            style.highlight.outline_color = color.clone();
        }
        if let Some(color) = &self.highlight_color {
            style.highlight.box_color = color.clone();
        }
        if let Some(color) = &self.highlight_text_color {
            style.highlight.text_color = color.clone();
        }
        if let Some(position) = self.position {
            style.vertical_position = position;
        }
        if let Some(enabled) = self.highlight {
            style.highlight.enabled = enabled;
        }
        if let Some(animation) = self.animation {
            style.highlight.animation_kind = animation;
        }

        style.validate()?;
        Ok(style)
    }
}
