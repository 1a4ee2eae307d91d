//! Text measurement for caption layout.
//!
//! Widths come from an injected [`TextMeasurer`]. The bundled
//! [`MetricTableMeasurer`] carries static advance-width tables so layout is
//! deterministic without any font rendering stack; families it does not know
//! report [`CaptionError::MeasurementUnavailable`] and the layout engine falls
//! back to [`estimate_width`].
//!
//! All tables cover ASCII 0x20..=0x7E (95 printable characters), in AFM units
//! (1/1000 em). Index = (char as usize) - 32.

use crate::error::{CaptionError, Result};
use std::collections::HashMap;
use std::sync::Mutex;

/// Fallback glyph width as a fraction of the font size.
pub const FALLBACK_WIDTH_FACTOR: f64 = 0.5;

/// Capability to measure rendered text width in pixels.
pub trait TextMeasurer: Send + Sync {
    fn measure(&self, text: &str, family: &str, size: u32) -> Result<u32>;
    fn name(&self) -> &'static str;
}

/// Deterministic width estimate: `floor(chars × size × 0.5)`.
///
/// Layout computed from this is advisory only; real glyphs are narrower or
/// wider depending on the font.
pub fn estimate_width(text: &str, size: u32) -> u32 {
    let chars = text.chars().count() as f64;
    (chars * size as f64 * FALLBACK_WIDTH_FACTOR).floor() as u32
}

/// Measurer that always answers with [`estimate_width`].
#[derive(Debug, Default, Clone, Copy)]
pub struct EstimateMeasurer;

impl TextMeasurer for EstimateMeasurer {
    fn measure(&self, text: &str, _family: &str, size: u32) -> Result<u32> {
        Ok(estimate_width(text, size))
    }

    fn name(&self) -> &'static str {
        "estimate"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Static metric tables
// ────────────────────────────────────────────────────────────────────────────

/// Per-glyph advance widths for one face.
pub struct FontMetricTable {
    pub face: &'static str,
    widths: [u16; 95],
    /// Used for anything outside printable ASCII.
    pub fallback_width: u16,
}

impl FontMetricTable {
    /// Width of `text` in AFM units.
    pub fn units(&self, text: &str) -> u64 {
        text.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] as u64
                } else {
                    self.fallback_width as u64
                }
            })
            .sum()
    }

    /// Width of `text` in pixels at `size`, rounded to the nearest pixel.
    pub fn measure_px(&self, text: &str, size: u32) -> u32 {
        (self.units(text) as f64 * size as f64 / 1000.0).round() as u32
    }
}

/// Helvetica / Arial regular.
static SANS_TABLE: FontMetricTable = FontMetricTable {
    face: "sans",
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        278, 278, 584, 584, 584, 556, 1015,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        278, 278, 278, 469, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        556, 556, 556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500,
        // {    |    }    ~
        334, 260, 334, 584,
    ],
    fallback_width: 556,
};

/// Helvetica / Arial bold.
static SANS_BOLD_TABLE: FontMetricTable = FontMetricTable {
    face: "sans-bold",
    #[rustfmt::skip]
    widths: [
        // sp   !    "    #    $    %    &    '    (    )    *    +    ,    -    .    /
        278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
        // 0-9
        556, 556, 556, 556, 556, 556, 556, 556, 556, 556,
        // :    ;    <    =    >    ?    @
        333, 333, 584, 584, 584, 611, 975,
        // A    B    C    D    E    F    G    H    I    J    K    L    M
        722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833,
        // N    O    P    Q    R    S    T    U    V    W    X    Y    Z
        722, 778, 667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611,
        // [    \    ]    ^    _    `
        333, 278, 333, 584, 556, 333,
        // a    b    c    d    e    f    g    h    i    j    k    l    m
        556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889,
        // n    o    p    q    r    s    t    u    v    w    x    y    z
        611, 611, 611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500,
        // {    |    }    ~
        389, 280, 389, 584,
    ],
    fallback_width: 556,
};

/// Courier: every glyph advances by 600 units.
static MONO_TABLE: FontMetricTable = FontMetricTable {
    face: "mono",
    widths: [600; 95],
    fallback_width: 600,
};

/// Map a font family name onto a bundled table.
pub fn lookup_table(family: &str) -> Option<&'static FontMetricTable> {
    let normalized = family.trim().to_lowercase();
    let (base, bold) = match normalized.strip_suffix(" bold") {
        Some(base) => (base.trim_end(), true),
        None => (normalized.as_str(), false),
    };

    match base {
        "arial" | "helvetica" | "liberation sans" | "arimo" | "sans-serif" => Some(if bold {
            &SANS_BOLD_TABLE
        } else {
            &SANS_TABLE
        }),
        "courier" | "courier new" | "liberation mono" | "monospace" => Some(&MONO_TABLE),
        _ => None,
    }
}

/// Measurer backed by the bundled metric tables.
#[derive(Debug, Default, Clone, Copy)]
pub struct MetricTableMeasurer;

impl TextMeasurer for MetricTableMeasurer {
    fn measure(&self, text: &str, family: &str, size: u32) -> Result<u32> {
        lookup_table(family)
            .map(|table| table.measure_px(text, size))
            .ok_or_else(|| CaptionError::MeasurementUnavailable {
                family: family.to_string(),
            })
    }

    fn name(&self) -> &'static str {
        "metric tables"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Memoization
// ────────────────────────────────────────────────────────────────────────────

type CacheKey = (String, String, u32);

/// Memoizes another measurer per distinct `(text, family, size)`.
///
/// Unavailable families are remembered too; other errors are not cached.
pub struct CachedMeasurer<M> {
    inner: M,
    cache: Mutex<HashMap<CacheKey, Option<u32>>>,
}

impl<M: TextMeasurer> CachedMeasurer<M> {
    pub fn new(inner: M) -> Self {
        Self {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache.lock().map(|c| c.len()).unwrap_or(0)
    }
}

impl<M: TextMeasurer> TextMeasurer for CachedMeasurer<M> {
    fn measure(&self, text: &str, family: &str, size: u32) -> Result<u32> {
        let key = (text.to_string(), family.to_string(), size);

        if let Ok(cache) = self.cache.lock() {
            if let Some(hit) = cache.get(&key) {
                return (*hit).ok_or_else(|| CaptionError::MeasurementUnavailable {
                    family: family.to_string(),
                });
            }
        }

        let result = self.inner.measure(text, family, size);

        let entry = match &result {
            Ok(width) => Some(Some(*width)),
            Err(CaptionError::MeasurementUnavailable { .. }) => Some(None),
            Err(_) => None,
        };
        if let (Some(entry), Ok(mut cache)) = (entry, self.cache.lock()) {
            cache.insert(key, entry);
        }

        result
    }

    fn name(&self) -> &'static str {
        self.inner.name()
    }
}
