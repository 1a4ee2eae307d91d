use super::ass::escape_text;
use super::metrics::{estimate_width, TextMeasurer};
use crate::caption::Segment;
use crate::error::{CaptionError, Result};
use crate::style::{StyleConfig, VerticalPosition};
use serde::{Deserialize, Serialize};

/// Fixed-resolution coordinate space all positions are computed against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl Default for Canvas {
    /// Portrait 1080×1920.
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

impl Canvas {
    pub fn center_x(&self) -> i32 {
        (self.width / 2) as i32
    }
}

impl std::fmt::Display for Canvas {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl std::str::FromStr for Canvas {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (w, h) = s
            .to_lowercase()
            .split_once('x')
            .map(|(w, h)| (w.trim().to_string(), h.trim().to_string()))
            .ok_or_else(|| format!("Invalid canvas '{}'. Use WIDTHxHEIGHT, e.g. 1080x1920", s))?;

        let width: u32 = w
            .parse()
            .map_err(|_| format!("Invalid canvas width '{}'", w))?;
        let height: u32 = h
            .parse()
            .map_err(|_| format!("Invalid canvas height '{}'", h))?;

        if width == 0 || height == 0 {
            return Err(format!("Canvas dimensions must be non-zero, got {}", s));
        }

        Ok(Canvas { width, height })
    }
}

/// Horizontal placement of one word within its segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordLayout {
    /// Index of the word inside its segment.
    pub word_index: usize,
    pub center_x: i32,
    pub width: i32,
}

/// Placement of every word in a segment on a single centered line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentLayout {
    pub words: Vec<WordLayout>,
    pub y: i32,
    pub space_width: i32,
    pub total_width: i32,
    pub line_left_x: i32,
    /// Widths came from the fallback estimate, so positions are approximate.
    pub degraded: bool,
}

/// Vertical anchor shared by every word of a segment.
pub fn vertical_position(style: &StyleConfig, canvas: &Canvas) -> i32 {
    let margin = i64::from(style.margin_bottom_px);
    let height = i64::from(canvas.height);
    let y = match style.vertical_position {
        // The bottom margin doubles as the top margin.
        VerticalPosition::Top => margin,
        VerticalPosition::Middle => height / 2,
        VerticalPosition::Bottom => height - margin,
    };
    y.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

/// Measure with `measurer`, falling back to the estimate when the font is
/// unknown. Returns the width and whether the fallback was used.
fn measure_or_estimate(
    measurer: &dyn TextMeasurer,
    text: &str,
    family: &str,
    size: u32,
) -> Result<(i64, bool)> {
    match measurer.measure(text, family, size) {
        Ok(width) => Ok((i64::from(width), false)),
        Err(CaptionError::MeasurementUnavailable { .. }) => {
            Ok((i64::from(estimate_width(text, size)), true))
        }
        Err(e) => Err(e),
    }
}

fn to_coord(value: i64, what: &str) -> Result<i32> {
    i32::try_from(value).map_err(|_| {
        CaptionError::Layout(format!("{} {} does not fit the canvas coordinate range", what, value))
    })
}

/// Lay the words of `segment` out left to right on one line centered on the
/// canvas.
///
/// Words are measured as they will be emitted, with markup characters
/// removed. Arithmetic is done in 64 bits; a result that does not fit an
/// `i32` coordinate is a `Layout` error.
pub fn layout(
    segment: &Segment,
    style: &StyleConfig,
    canvas: &Canvas,
    measurer: &dyn TextMeasurer,
) -> Result<SegmentLayout> {
    let family = style.font.family.as_str();
    let size = style.font.size;

    let (space_width, mut degraded) = measure_or_estimate(measurer, " ", family, size)?;

    let mut widths = Vec::with_capacity(segment.len());
    for word in segment.words() {
        let shown = escape_text(word.text());
        let (width, estimated) = measure_or_estimate(measurer, &shown, family, size)?;
        degraded |= estimated;
        widths.push(width);
    }

    let gaps = widths.len().saturating_sub(1) as i64;
    let total_width: i64 = widths.iter().sum::<i64>() + space_width * gaps;
    let line_left_x = i64::from(canvas.center_x()) - total_width / 2;

    let mut current_x = line_left_x;
    let mut words = Vec::with_capacity(widths.len());
    for (word_index, &width) in widths.iter().enumerate() {
        words.push(WordLayout {
            word_index,
            center_x: to_coord(current_x + width / 2, "word center")?,
            width: to_coord(width, "word width")?,
        });
        current_x += width + space_width;
    }

    Ok(SegmentLayout {
        words,
        y: vertical_position(style, canvas),
        space_width: to_coord(space_width, "space width")?,
        total_width: to_coord(total_width, "line width")?,
        line_left_x: to_coord(line_left_x, "line start")?,
        degraded,
    })
}
