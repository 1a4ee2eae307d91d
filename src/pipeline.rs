use crate::caption::{segment, Segment};
use crate::error::{CaptionError, Result};
use crate::events::{CaptionEvent, EventSink, TracingSink};
use crate::render::{
    emit, layout, AssDocument, CachedMeasurer, Canvas, MetricTableMeasurer, SegmentLayout,
    TextMeasurer,
};
use crate::style::StyleConfig;
use crate::transcript::{remove_fillers, validate_words, Word, WordSource};
use futures::stream::{FuturesUnordered, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tracing::{debug, info};

/// Configuration for the caption generation pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Finalized style (preset plus overrides).
    pub style: StyleConfig,
    /// Name of the preset the style came from, for reporting.
    pub preset_name: String,
    pub canvas: Canvas,
    /// Number of segments laid out concurrently.
    pub concurrency: usize,
    /// Drop hesitation tokens before segmentation.
    pub clean_fillers: bool,
    /// Show a progress bar over the layout stage.
    pub show_progress: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            style: StyleConfig::default(),
            preset_name: "tiktok".to_string(),
            canvas: Canvas::default(),
            concurrency: 4,
            clean_fillers: false,
            show_progress: true,
        }
    }
}

/// Statistics from the caption generation process.
#[derive(Debug, Clone, Default)]
pub struct PipelineStats {
    /// Words read from the source.
    pub words_loaded: usize,
    /// Filler words dropped before segmentation.
    pub fillers_removed: usize,
    pub segments: usize,
    /// Dialogue events in the document.
    pub events: usize,
    /// Segments whose layout used estimated widths.
    pub degraded_layouts: usize,
    /// Size of the written document.
    pub bytes_written: usize,
    /// Time from first to last spoken word.
    pub speech_duration: Duration,
    pub load_time: Duration,
    pub layout_time: Duration,
    pub total_time: Duration,
    pub source: String,
    pub preset: String,
}

/// Result of the caption generation pipeline.
#[derive(Debug)]
pub struct PipelineResult {
    /// Path to the written `.ass` file.
    pub output_path: PathBuf,
    pub segments: Vec<Segment>,
    pub stats: PipelineStats,
}

/// Document plus the intermediate products it was built from.
#[derive(Debug)]
pub struct RenderOutput {
    pub document: AssDocument,
    pub segments: Vec<Segment>,
    pub layouts: Vec<SegmentLayout>,
    pub fillers_removed: usize,
}

/// Turns word streams into ASS documents.
pub struct CaptionPipeline {
    config: PipelineConfig,
    measurer: Arc<dyn TextMeasurer>,
    sink: Arc<dyn EventSink>,
}

impl CaptionPipeline {
    /// Create a pipeline that measures with the bundled metric tables and
    /// reports through `tracing`.
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            measurer: Arc::new(CachedMeasurer::new(MetricTableMeasurer)),
            sink: Arc::new(TracingSink),
        }
    }

    /// Measure with `measurer` instead, memoized per distinct string.
    pub fn with_measurer(mut self, measurer: impl TextMeasurer + 'static) -> Self {
        self.measurer = Arc::new(CachedMeasurer::new(measurer));
        self
    }

    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    fn check_config(&self) -> Result<()> {
        self.config.style.validate()?;
        if self.config.concurrency == 0 {
            return Err(CaptionError::config("concurrency", "must be greater than 0"));
        }
        if self.config.canvas.width == 0 || self.config.canvas.height == 0 {
            return Err(CaptionError::config(
                "canvas",
                format!("dimensions must be non-zero, got {}", self.config.canvas),
            ));
        }
        Ok(())
    }

    /// Segment, lay out and emit `words` without touching the filesystem.
    pub async fn render(&self, words: Vec<Word>) -> Result<RenderOutput> {
        self.check_config()?;
        validate_words(&words)?;

        let (words, fillers_removed) = if self.config.clean_fillers {
            let before = words.len();
            let kept = remove_fillers(words);
            let removed = before - kept.len();
            self.sink.on_event(&CaptionEvent::FillersRemoved { removed });
            (kept, removed)
        } else {
            (words, 0)
        };

        // Cleaning may have removed every word.
        validate_words(&words)?;

        let segments = segment(&words, &self.config.style.chunking)?;
        for (index, seg) in segments.iter().enumerate() {
            self.sink.on_event(&CaptionEvent::SegmentProduced {
                index,
                word_count: seg.len(),
                start: seg.start(),
                end: seg.end(),
            });
        }

        let segments = Arc::new(segments);
        let layouts = self.layout_segments(segments.clone()).await?;
        let segments = Arc::try_unwrap(segments).unwrap_or_else(|shared| (*shared).clone());

        let document = emit(&segments, &layouts, &self.config.style, &self.config.canvas)?;

        Ok(RenderOutput {
            document,
            segments,
            layouts,
            fillers_removed,
        })
    }

    /// Lay out every segment on the blocking pool, at most `concurrency` at a
    /// time, and return the layouts in segment order.
    async fn layout_segments(&self, segments: Arc<Vec<Segment>>) -> Result<Vec<SegmentLayout>> {
        let total = segments.len();
        debug!(
            "Laying out {} segments with concurrency {} using {}",
            total,
            self.config.concurrency,
            self.measurer.name()
        );

        let progress_bar = if self.config.show_progress {
            let pb = ProgressBar::new(total as u64);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} segments ({eta})")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            Some(pb)
        } else {
            None
        };

        let semaphore = Arc::new(Semaphore::new(self.config.concurrency));
        let style = Arc::new(self.config.style.clone());
        let canvas = self.config.canvas;

        let mut futures = FuturesUnordered::new();

        for index in 0..total {
            let sem = semaphore.clone();
            let segments = segments.clone();
            let style = style.clone();
            let measurer = self.measurer.clone();

            futures.push(async move {
                let _permit = sem
                    .acquire_owned()
                    .await
                    .map_err(|e| CaptionError::Layout(format!("layout pool closed: {}", e)))?;

                let laid_out = tokio::task::spawn_blocking(move || {
                    layout(&segments[index], &style, &canvas, &*measurer)
                })
                .await
                .map_err(|e| {
                    CaptionError::Layout(format!("layout of segment {} aborted: {}", index, e))
                })??;

                Ok::<_, CaptionError>((index, laid_out))
            });
        }

        let mut results: Vec<(usize, SegmentLayout)> = Vec::with_capacity(total);
        while let Some(result) = futures.next().await {
            let (index, laid_out) = result?;

            if laid_out.degraded {
                self.sink.on_event(&CaptionEvent::LayoutFallback {
                    segment_index: index,
                    family: self.config.style.font.family.clone(),
                    size: self.config.style.font.size,
                });
            }
            self.sink.on_event(&CaptionEvent::SegmentLaidOut { index });

            if let Some(ref pb) = progress_bar {
                pb.inc(1);
            }
            results.push((index, laid_out));
        }

        if let Some(pb) = progress_bar {
            pb.finish_with_message("Layout complete");
        }

        // Sort results by segment index to maintain order
        results.sort_by_key(|(index, _)| *index);
        Ok(results.into_iter().map(|(_, laid_out)| laid_out).collect())
    }

    /// Read words from `source`, render them and write the document to
    /// `output`.
    pub async fn run(&self, source: &dyn WordSource, output: &Path) -> Result<PipelineResult> {
        let start_time = Instant::now();

        info!("Loading words from {}", source.name());
        let load_start = Instant::now();
        let words = source.words().await?;
        let load_time = load_start.elapsed();
        self.sink.on_event(&CaptionEvent::WordsLoaded {
            count: words.len(),
            source: source.name(),
        });

        let words_loaded = words.len();
        let speech_duration = match (words.first(), words.last()) {
            (Some(first), Some(last)) => {
                Duration::from_secs_f64((last.end() - first.start()).max(0.0))
            }
            _ => Duration::ZERO,
        };

        let layout_start = Instant::now();
        let rendered = self.render(words).await?;
        let layout_time = layout_start.elapsed();

        let event_count = rendered.document.event_count();
        let degraded_layouts = rendered.layouts.iter().filter(|l| l.degraded).count();
        let text = rendered.document.into_text();

        write_atomic(output, &text)?;
        self.sink.on_event(&CaptionEvent::DocumentEmitted {
            events: event_count,
            bytes: text.len(),
        });
        info!("Wrote {} segments to {:?}", rendered.segments.len(), output);

        let stats = PipelineStats {
            words_loaded,
            fillers_removed: rendered.fillers_removed,
            segments: rendered.segments.len(),
            events: event_count,
            degraded_layouts,
            bytes_written: text.len(),
            speech_duration,
            load_time,
            layout_time,
            total_time: start_time.elapsed(),
            source: source.name().to_string(),
            preset: self.config.preset_name.clone(),
        };

        Ok(PipelineResult {
            output_path: output.to_path_buf(),
            segments: rendered.segments,
            stats,
        })
    }
}

/// Write `contents` to a temp file next to `output`, then rename it into
/// place, so readers never see a partial document.
fn write_atomic(output: &Path, contents: &str) -> Result<()> {
    let dir = output
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut file = tempfile::NamedTempFile::new_in(dir)?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    file.persist(output).map_err(|e| CaptionError::Io(e.error))?;
    Ok(())
}

/// Generate an ASS caption file from a word source.
///
/// This is the main entry point for the autocaption pipeline. It:
/// 1. Loads words from the source
/// 2. Optionally removes filler words
/// 3. Segments the stream into caption lines
/// 4. Lays out each segment concurrently
/// 5. Emits the ASS document and writes it atomically
pub async fn generate_captions(
    source: &dyn WordSource,
    output: &Path,
    pipeline_config: PipelineConfig,
) -> Result<PipelineResult> {
    CaptionPipeline::new(pipeline_config)
        .run(source, output)
        .await
}

/// Print a summary of the pipeline results.
pub fn print_summary(result: &PipelineResult) {
    let stats = &result.stats;

    println!();
    println!("═══════════════════════════════════════════════════════════════");
    println!("                     Caption Generation Complete                ");
    println!("═══════════════════════════════════════════════════════════════");
    println!();
    println!("  Output:     {}", result.output_path.display());
    println!("  Preset:     {}", stats.preset);
    println!("  Words:      {} from {}", stats.words_loaded, stats.source);
    if stats.fillers_removed > 0 {
        println!("  Fillers:    {} removed", stats.fillers_removed);
    }
    println!("  Segments:   {}", stats.segments);
    println!("  Events:     {}", stats.events);
    println!(
        "  Duration:   {:.1}s speech",
        stats.speech_duration.as_secs_f64()
    );
    println!();
    println!("  Timing:");
    println!("    Load:     {:.2}s", stats.load_time.as_secs_f64());
    println!("    Render:   {:.2}s", stats.layout_time.as_secs_f64());
    println!("    Total:    {:.2}s", stats.total_time.as_secs_f64());
    if stats.degraded_layouts > 0 {
        println!();
        println!(
            "  Note: {} segment(s) used estimated font widths; positions are approximate",
            stats.degraded_layouts
        );
    }
    println!();
    println!("  Burn in with:");
    println!("    {}", burn_in_command(&result.output_path));
    println!();
    println!("═══════════════════════════════════════════════════════════════");
}

/// FFmpeg invocation that renders the captions into a video.
pub fn burn_in_command(subtitles: &Path) -> String {
    format!(
        "ffmpeg -i input.mp4 -vf \"ass={}\" -c:a copy output.mp4",
        subtitles.display()
    )
}
