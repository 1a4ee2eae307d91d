pub mod ass;
pub mod layout;
pub mod metrics;

pub use ass::{emit, format_time, AssDocument};
pub use layout::{layout, vertical_position, Canvas, SegmentLayout, WordLayout};
pub use metrics::{
    estimate_width, CachedMeasurer, EstimateMeasurer, MetricTableMeasurer, TextMeasurer,
};
