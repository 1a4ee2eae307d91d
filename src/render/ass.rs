// Advanced SubStation Alpha output
use super::layout::{Canvas, SegmentLayout};
use crate::caption::Segment;
use crate::error::{CaptionError, Result};
use crate::style::{AnimationKind, StyleConfig};
use crate::transcript::MARKUP_CHARS;

/// Override tags for the pop animation: scale the active word to 115%.
const POP_TAGS: &str = "\\fscx115\\fscy115";

/// Fully transparent primary fill, so only the box of `HighlightBox` shows.
const TRANSPARENT_FILL: &str = "\\1a&HFF&";

const STYLE_FORMAT: &str = "Format: Name, Fontname, Fontsize, PrimaryColour, SecondaryColour, \
OutlineColour, BackColour, Bold, Italic, Underline, StrikeOut, ScaleX, ScaleY, Spacing, Angle, \
BorderStyle, Outline, Shadow, Alignment, MarginL, MarginR, MarginV, Encoding";

const EVENT_FORMAT: &str =
    "Format: Layer, Start, End, Style, Name, MarginL, MarginR, MarginV, Effect, Text";

/// Draw order of the three event kinds; higher layers render on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Base = 0,
    Box = 1,
    Text = 2,
}

/// A rendered subtitle document: header plus one line per event.
#[derive(Debug, Clone, PartialEq)]
pub struct AssDocument {
    header: String,
    events: Vec<String>,
}

impl AssDocument {
    pub fn header(&self) -> &str {
        &self.header
    }

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn event_count(&self) -> usize {
        self.events.len()
    }

    pub fn into_text(self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for AssDocument {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.header)?;
        f.write_str(&self.events.join("\n"))
    }
}

/// Format seconds as an ASS timestamp `H:MM:SS.CC`.
///
/// Centiseconds are truncated, not rounded. A tolerance of 1e-6 centiseconds
/// absorbs binary representation error so that `2.3` is `2.30` and not `2.29`.
///
/// This differs from renderers that truncate the raw float product, which
/// print `2.3` as `0:00:02.29` and `0.58` as `0:00:00.57`. Timestamps that sit
/// exactly on a centisecond can therefore come out one centisecond later than
/// in those renderers; all other values are identical.
pub fn format_time(seconds: f64) -> String {
    let total_cs = (seconds.max(0.0) * 100.0 + 1e-6).floor() as u64;
    let hours = total_cs / 360_000;
    let minutes = (total_cs % 360_000) / 6_000;
    let secs = (total_cs % 6_000) / 100;
    let centis = total_cs % 100;
    format!("{}:{:02}:{:02}.{:02}", hours, minutes, secs, centis)
}

/// Render a style number the way the preset files write it: integral values
/// keep one decimal (`2.0`).
fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{:.1}", value)
    } else {
        format!("{}", value)
    }
}

/// Strip characters that would open override blocks or escapes.
pub fn escape_text(text: &str) -> String {
    text.chars()
        .filter(|c| !MARKUP_CHARS.contains(c))
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect()
}

fn build_header(style: &StyleConfig, canvas: &Canvas) -> String {
    let font = &style.font;
    let hl = &style.highlight;
    let margin = style.margin_bottom_px;

    let mut header = String::new();
    header.push_str("[Script Info]\n");
    header.push_str("ScriptType: v4.00+\n");
    header.push_str(&format!("PlayResX: {}\n", canvas.width));
    header.push_str(&format!("PlayResY: {}\n", canvas.height));
    header.push_str("WrapStyle: 0\n");
    header.push_str("ScaledBorderAndShadow: yes\n");
    header.push('\n');

    header.push_str("[V4+ Styles]\n");
    header.push_str(STYLE_FORMAT);
    header.push('\n');
    header.push_str(&format!(
        "Style: Default,{},{},{},&H000000FF,{},&H00000000,-1,0,0,0,100,100,0,0,1,{},{},2,10,10,{},1\n",
        font.family,
        font.size,
        font.primary_color,
        font.outline_color,
        format_number(font.outline_width),
        format_number(font.shadow_depth),
        margin
    ));
    // BorderStyle 3 draws an opaque box whose thickness is the Outline value.
    header.push_str(&format!(
        "Style: HighlightBox,{},{},{},&H000000FF,{},&H00000000,-1,0,0,0,100,100,0,0,3,{},0,2,10,10,{},1\n",
        font.family,
        font.size,
        hl.text_color,
        hl.box_color,
        format_number(hl.padding),
        margin
    ));
    header.push_str(&format!(
        "Style: HighlightText,{},{},{},&H000000FF,{},&H00000000,-1,0,0,0,100,100,0,0,1,{},0,2,10,10,{},1\n",
        font.family,
        font.size,
        hl.text_color,
        hl.outline_color,
        format_number(hl.outline_width),
        margin
    ));
    header.push('\n');

    header.push_str("[Events]\n");
    header.push_str(EVENT_FORMAT);
    header.push('\n');
    header
}

fn dialogue(layer: Layer, start: &str, end: &str, style: &str, tags: &str, text: &str) -> String {
    format!(
        "Dialogue: {},{},{},{},,0,0,0,,{{{}}}{}",
        layer as u8, start, end, style, tags, text
    )
}

/// Check that `layouts` was computed for exactly these segments.
fn check_parallel(segments: &[Segment], layouts: &[SegmentLayout]) -> Result<()> {
    if segments.len() != layouts.len() {
        return Err(CaptionError::Layout(format!(
            "{} segments but {} layouts",
            segments.len(),
            layouts.len()
        )));
    }

    for (i, (segment, layout)) in segments.iter().zip(layouts).enumerate() {
        if segment.len() != layout.words.len() {
            return Err(CaptionError::Layout(format!(
                "segment {} has {} words but its layout has {}",
                i,
                segment.len(),
                layout.words.len()
            )));
        }
        if let Some((pos, _)) = layout
            .words
            .iter()
            .enumerate()
            .find(|(pos, w)| w.word_index != *pos)
        {
            return Err(CaptionError::Layout(format!(
                "segment {} layout is out of order at word {}",
                i, pos
            )));
        }
    }

    Ok(())
}

/// Serialize laid-out segments into an ASS document.
///
/// Every word gets a `Default` event for its segment's whole time range. With
/// highlighting on, it also gets a `HighlightBox` and a `HighlightText` event
/// covering only the word's own time range, drawn above the base text.
///
/// Nothing is produced unless the whole document can be built.
pub fn emit(
    segments: &[Segment],
    layouts: &[SegmentLayout],
    style: &StyleConfig,
    canvas: &Canvas,
) -> Result<AssDocument> {
    style.validate()?;
    check_parallel(segments, layouts)?;

    let highlight = &style.highlight;
    let anim_tags = match highlight.animation_kind {
        AnimationKind::Pop => POP_TAGS,
        AnimationKind::None => "",
    };

    let per_word = if highlight.enabled { 3 } else { 1 };
    let word_total: usize = segments.iter().map(Segment::len).sum();
    let mut events = Vec::with_capacity(word_total * per_word);

    for (segment, layout) in segments.iter().zip(layouts) {
        let seg_start = format_time(segment.start());
        let seg_end = format_time(segment.end());

        for (word, placed) in segment.words().iter().zip(&layout.words) {
            let pos = format!("\\pos({},{})", placed.center_x, layout.y);
            let text = escape_text(word.text());

            events.push(dialogue(Layer::Base, &seg_start, &seg_end, "Default", &pos, &text));

            if highlight.enabled {
                let w_start = format_time(word.start());
                let w_end = format_time(word.end());

                events.push(dialogue(
                    Layer::Box,
                    &w_start,
                    &w_end,
                    "HighlightBox",
                    &format!("{}{}{}", pos, TRANSPARENT_FILL, anim_tags),
                    &text,
                ));
                events.push(dialogue(
                    Layer::Text,
                    &w_start,
                    &w_end,
                    "HighlightText",
                    &format!("{}{}", pos, anim_tags),
                    &text,
                ));
            }
        }
    }

    Ok(AssDocument {
        header: build_header(style, canvas),
        events,
    })
}
