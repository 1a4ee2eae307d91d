pub mod caption;
pub mod config;
pub mod error;
pub mod events;
pub mod interactive;
pub mod pipeline;
pub mod render;
pub mod style;
pub mod transcript;

pub use caption::{segment, Segment};
pub use config::Config;
pub use error::{CaptionError, Result};
pub use events::{CaptionEvent, EventSink, TracingSink};
pub use pipeline::{
    generate_captions, print_summary, CaptionPipeline, PipelineConfig, PipelineResult,
    PipelineStats,
};
pub use render::{emit, format_time, layout, AssDocument, Canvas, SegmentLayout, TextMeasurer};
pub use style::StyleConfig;
pub use transcript::{Word, WordSource};
