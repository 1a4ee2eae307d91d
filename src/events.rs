use std::sync::Mutex;
use tracing::{debug, info, warn};

/// Progress reported while turning a word stream into a caption document.
#[derive(Debug, Clone, PartialEq)]
pub enum CaptionEvent {
    WordsLoaded {
        count: usize,
        source: &'static str,
    },
    FillersRemoved {
        removed: usize,
    },
    SegmentProduced {
        index: usize,
        word_count: usize,
        start: f64,
        end: f64,
    },
    /// Layout for a segment used the estimated glyph widths.
    LayoutFallback {
        segment_index: usize,
        family: String,
        size: u32,
    },
    SegmentLaidOut {
        index: usize,
    },
    DocumentEmitted {
        events: usize,
        bytes: usize,
    },
}

/// Receiver for [`CaptionEvent`]s.
pub trait EventSink: Send + Sync {
    fn on_event(&self, event: &CaptionEvent);
}

impl<F> EventSink for F
where
    F: Fn(&CaptionEvent) + Send + Sync,
{
    fn on_event(&self, event: &CaptionEvent) {
        self(event)
    }
}

/// Forwards events to `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn on_event(&self, event: &CaptionEvent) {
        match event {
            CaptionEvent::WordsLoaded { count, source } => {
                info!("Loaded {} words from {}", count, source)
            }
            CaptionEvent::FillersRemoved { removed } => {
                info!("Removed {} filler words", removed)
            }
            CaptionEvent::SegmentProduced {
                index,
                word_count,
                start,
                end,
            } => debug!(
                "Segment {}: {} words, {:.2}s-{:.2}s",
                index, word_count, start, end
            ),
            CaptionEvent::LayoutFallback {
                segment_index,
                family,
                size,
            } => warn!(
                "Segment {}: no metrics for '{}' at {}px, using estimated widths",
                segment_index, family, size
            ),
            CaptionEvent::SegmentLaidOut { index } => debug!("Segment {} laid out", index),
            CaptionEvent::DocumentEmitted { events, bytes } => {
                info!("Emitted {} subtitle events ({} bytes)", events, bytes)
            }
        }
    }
}

/// Keeps every event in memory, in arrival order.
#[derive(Debug, Default)]
pub struct CollectingSink {
    events: Mutex<Vec<CaptionEvent>>,
}

impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<CaptionEvent> {
        self.events
            .lock()
            .map(|events| events.clone())
            .unwrap_or_default()
    }
}

impl EventSink for CollectingSink {
    fn on_event(&self, event: &CaptionEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_closure_sink() {
        let count = AtomicUsize::new(0);
        let sink = |_: &CaptionEvent| {
            count.fetch_add(1, Ordering::SeqCst);
        };

        sink.on_event(&CaptionEvent::FillersRemoved { removed: 2 });
        sink.on_event(&CaptionEvent::SegmentLaidOut { index: 0 });

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_collecting_sink_keeps_order() {
        let sink = CollectingSink::new();
        sink.on_event(&CaptionEvent::SegmentLaidOut { index: 1 });
        sink.on_event(&CaptionEvent::SegmentLaidOut { index: 0 });

        assert_eq!(
            sink.events(),
            vec![
                CaptionEvent::SegmentLaidOut { index: 1 },
                CaptionEvent::SegmentLaidOut { index: 0 },
            ]
        );
    }
}
