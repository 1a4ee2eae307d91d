//! Integration tests for autocaption
//!
//! These tests drive the public API end to end, from transcript JSON through
//! segmentation and layout to the written ASS file.

use autocaption::caption::{segment, Segment};
use autocaption::config::Config;
use autocaption::events::{CaptionEvent, CollectingSink};
use autocaption::pipeline::{generate_captions, CaptionPipeline, PipelineConfig};
use autocaption::render::{
    emit, format_time, layout, Canvas, EstimateMeasurer, MetricTableMeasurer,
};
use autocaption::style::{
    load_preset, AnimationKind, ChunkingConfig, StyleConfig, StyleOverrides, VerticalPosition,
};
use autocaption::transcript::{parse_transcript, JsonTranscript, Word, WordSource};
use autocaption::CaptionError;

use std::fs;
use std::sync::Arc;
use tempfile::TempDir;

fn word(text: &str, start: f64, end: f64) -> Word {
    Word::new(text, start, end, 1.0).unwrap()
}

fn sample_words() -> Vec<Word> {
    vec![
        word("Hello", 0.0, 0.5),
        word("world", 0.5, 1.0),
        word("this", 2.0, 2.3),
        word("is", 2.3, 2.5),
        word("great", 2.5, 3.0),
    ]
}

fn quiet() -> PipelineConfig {
    PipelineConfig {
        show_progress: false,
        ..PipelineConfig::default()
    }
}

// ============================================================================
// Config Integration Tests
// ============================================================================

mod config_tests {
    use super::*;

    #[test]
    fn test_config_default_values() {
        let config = Config::default();
        assert_eq!(config.default_preset, "tiktok");
        assert_eq!(config.concurrency, 4);
        assert_eq!(config.canvas, Canvas::default());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Config::default();
        assert!(config.validate().is_ok());

        config.concurrency = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_preset_file_with_aliases() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("bold.json"),
            r#"{
                "font": {"name": "Helvetica", "size": 80, "color": "&H0000FFFF"},
                "highlight": {"enabled": true, "color": "&H00FF0000", "animation": "none"},
                "chunking": {"max_chars": 12, "max_words": 2, "gap_threshold": 0.3},
                "margin_bottom": 200,
                "position": "top",
                "clean_fillers": true
            }"#,
        )
        .unwrap();

        let preset = load_preset("bold", Some(dir.path())).unwrap();

        assert_eq!(preset.style.font.family, "Helvetica");
        assert_eq!(preset.style.font.size, 80);
        assert_eq!(preset.style.font.primary_color.as_str(), "&H0000FFFF");
        assert_eq!(preset.style.highlight.box_color.as_str(), "&H00FF0000");
        assert_eq!(preset.style.highlight.animation_kind, AnimationKind::None);
        assert_eq!(preset.style.chunking.max_words, 2);
        assert_eq!(preset.style.chunking.gap_threshold_seconds, 0.3);
        assert_eq!(preset.style.margin_bottom_px, 200);
        assert_eq!(preset.style.vertical_position, VerticalPosition::Top);
        assert!(preset.clean_fillers);
        // Unspecified fields keep their defaults.
        assert_eq!(preset.style.chunking.max_lines, 2);
    }

    #[test]
    fn test_invalid_preset_file_names_field() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("broken.toml"),
            "[chunking]\nmax_words = 0\n",
        )
        .unwrap();

        let err = load_preset("broken", Some(dir.path())).unwrap_err();
        assert!(err.to_string().contains("chunking.max_words"));
    }

    #[test]
    fn test_unknown_preset() {
        assert!(matches!(
            load_preset("does-not-exist", None),
            Err(CaptionError::PresetNotFound(_))
        ));
    }

    #[test]
    fn test_overrides_on_builtin() {
        let preset = load_preset("center", None).unwrap();
        let overrides = StyleOverrides {
            font_size: Some(64),
            position: Some(VerticalPosition::Bottom),
            highlight: Some(false),
            ..StyleOverrides::default()
        };

        let style = overrides.apply(preset.style).unwrap();

        assert_eq!(style.font.size, 64);
        assert_eq!(style.vertical_position, VerticalPosition::Bottom);
        assert!(!style.highlight.enabled);
        assert_eq!(style.chunking.max_words, 3);
    }
}

// ============================================================================
// Segmentation Tests
// ============================================================================

mod segmentation_tests {
    use super::*;

    #[test]
    fn test_pause_scenario() {
        let config = ChunkingConfig {
            max_chars: 20,
            max_words: 5,
            max_lines: 2,
            gap_threshold_seconds: 0.5,
        };

        let segments = segment(&sample_words(), &config).unwrap();

        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text(), "Hello world");
        assert_eq!(segments[1].text(), "this is great");
        assert_eq!(segments[1].start(), 2.0);
        assert_eq!(segments[1].end(), 3.0);
    }

    #[test]
    fn test_transcript_round_trip_into_segments() {
        let json = r#"{"words": [
            {"word": " So", "start": 0.0, "end": 0.2, "probability": 0.9},
            {"word": "", "start": 0.2, "end": 0.2},
            {"word": " here's", "start": 0.2, "end": 0.5},
            {"word": " the", "start": 0.5, "end": 0.6},
            {"word": " thing.", "start": 0.6, "end": 1.0},
            {"word": " Listen", "start": 1.1, "end": 1.5}
        ]}"#;

        let words = parse_transcript(json).unwrap();
        assert_eq!(words.len(), 5);
        assert_eq!(words[0].text(), "So");

        let segments = segment(&words, &ChunkingConfig::default()).unwrap();
        let texts: Vec<&str> = segments.iter().map(Segment::text).collect();
        assert_eq!(texts, vec!["So here's the thing.", "Listen"]);
    }

    #[test]
    fn test_markup_only_token_skipped() {
        let json = r#"[
            {"word": "Hi", "start": 0.0, "end": 0.3},
            {"word": "{}", "start": 0.3, "end": 0.4},
            {"word": "there", "start": 0.4, "end": 0.8}
        ]"#;

        let words = parse_transcript(json).unwrap();
        let texts: Vec<&str> = words.iter().map(Word::text).collect();
        assert_eq!(texts, vec!["Hi", "there"]);
    }

    #[test]
    fn test_word_ending_after_its_successor_rejected() {
        let words = vec![word("a", 0.0, 5.0), word("b", 1.0, 2.0)];
        assert!(matches!(
            segment(&words, &ChunkingConfig::default()),
            Err(CaptionError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_invalid_word_rejected() {
        let json = r#"[{"word": "late", "start": 2.0, "end": 1.0}]"#;
        assert!(matches!(
            parse_transcript(json),
            Err(CaptionError::InvalidInput(_))
        ));
    }
}

// ============================================================================
// Layout + Emission Tests
// ============================================================================

mod render_tests {
    use super::*;

    #[test]
    fn test_format_time_examples() {
        assert_eq!(format_time(0.0), "0:00:00.00");
        assert_eq!(format_time(3661.235), "1:01:01.23");
    }

    #[test]
    fn test_layout_centering_with_bundled_metrics() {
        let segments = segment(&sample_words(), &ChunkingConfig::default()).unwrap();
        let canvas = Canvas::default();

        for seg in &segments {
            let placed = layout(seg, &StyleConfig::default(), &canvas, &MetricTableMeasurer).unwrap();
            let summed: i32 = placed.words.iter().map(|w| w.width + placed.space_width).sum();
            assert_eq!(summed - placed.space_width, placed.total_width);
            assert!((placed.line_left_x + placed.total_width / 2 - canvas.center_x()).abs() <= 1);
            assert_eq!(placed.y, 1920 - 150);
            assert!(!placed.degraded);
        }
    }

    #[test]
    fn test_highlight_spans_word_range() {
        let segments = segment(&sample_words(), &ChunkingConfig::default()).unwrap();
        let style = StyleConfig::default();
        let canvas = Canvas::default();
        let layouts: Vec<_> = segments
            .iter()
            .map(|s| layout(s, &style, &canvas, &EstimateMeasurer).unwrap())
            .collect();

        let doc = emit(&segments, &layouts, &style, &canvas).unwrap();

        let this_box = doc
            .events()
            .iter()
            .find(|e| e.contains("HighlightBox") && e.ends_with("}this"))
            .unwrap();
        assert!(this_box.starts_with("Dialogue: 1,0:00:02.00,0:00:02.30,"));

        let this_base = doc
            .events()
            .iter()
            .find(|e| e.contains(",Default,") && e.ends_with("}this"))
            .unwrap();
        assert!(this_base.starts_with("Dialogue: 0,0:00:02.00,0:00:03.00,"));
    }

    #[test]
    fn test_emit_rejects_foreign_layouts() {
        let segments = segment(&sample_words(), &ChunkingConfig::default()).unwrap();
        let style = StyleConfig::default();
        let canvas = Canvas::default();
        let first = layout(&segments[0], &style, &canvas, &EstimateMeasurer).unwrap();

        let result = emit(&segments, &[first.clone(), first], &style, &canvas);
        assert!(matches!(result, Err(CaptionError::Layout(_))));
    }
}

// ============================================================================
// End-to-end Pipeline Tests
// ============================================================================

mod pipeline_tests {
    use super::*;

    #[tokio::test]
    async fn test_json_transcript_to_ass_file() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("talk.json");
        let output = dir.path().join("talk.ass");
        fs::write(
            &input,
            r#"[
                {"word": "Hello", "start": 0.0, "end": 0.5},
                {"word": "world", "start": 0.5, "end": 1.0},
                {"word": "this", "start": 2.0, "end": 2.3},
                {"word": "is", "start": 2.3, "end": 2.5},
                {"word": "great", "start": 2.5, "end": 3.0}
            ]"#,
        )
        .unwrap();

        let source = JsonTranscript::new(&input);
        let result = generate_captions(&source, &output, quiet()).await.unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("[Script Info]\n"));
        assert!(text.contains("[V4+ Styles]\n"));
        assert!(text.contains("[Events]\n"));
        assert_eq!(text.lines().filter(|l| l.starts_with("Dialogue:")).count(), 15);
        assert_eq!(result.stats.segments, 2);
        assert_eq!(result.stats.events, 15);
        assert_eq!(result.stats.source, "JSON transcript");
        assert_eq!(result.segments[0].text(), "Hello world");
    }

    #[tokio::test]
    async fn test_existing_output_replaced() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.ass");
        fs::write(&output, "stale").unwrap();

        generate_captions(&sample_words(), &output, quiet())
            .await
            .unwrap();

        let text = fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("[Script Info]"));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_event_stream_order() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.ass");
        let sink = Arc::new(CollectingSink::new());

        CaptionPipeline::new(quiet())
            .with_sink(sink.clone())
            .run(&sample_words(), &output)
            .await
            .unwrap();

        let events = sink.events();
        assert!(matches!(
            events.first(),
            Some(CaptionEvent::WordsLoaded { count: 5, .. })
        ));
        assert!(matches!(
            events.last(),
            Some(CaptionEvent::DocumentEmitted { events: 15, .. })
        ));
        let laid_out = events
            .iter()
            .filter(|e| matches!(e, CaptionEvent::SegmentLaidOut { .. }))
            .count();
        assert_eq!(laid_out, 2);
    }

    #[tokio::test]
    async fn test_in_memory_source() {
        let words = sample_words();
        assert_eq!(words.name(), "in-memory");
        assert_eq!(words.words().await.unwrap().len(), 5);
    }

    #[tokio::test]
    async fn test_missing_transcript_is_io_error() {
        let dir = TempDir::new().unwrap();
        let source = JsonTranscript::new(dir.path().join("missing.json"));

        let result = generate_captions(&source, &dir.path().join("out.ass"), quiet()).await;
        assert!(matches!(result, Err(CaptionError::Io(_))));
    }

    #[tokio::test]
    async fn test_out_of_order_transcript_writes_nothing() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("talk.json");
        let output = dir.path().join("talk.ass");
        fs::write(
            &input,
            r#"[
                {"word": "a", "start": 0.0, "end": 5.0},
                {"word": "b", "start": 1.0, "end": 2.0}
            ]"#,
        )
        .unwrap();

        let source = JsonTranscript::new(&input);
        let result = generate_captions(&source, &output, quiet()).await;

        assert!(matches!(result, Err(CaptionError::InvalidInput(_))));
        assert!(!output.exists());
    }

    #[tokio::test]
    async fn test_no_highlight_emits_one_event_per_word() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("out.ass");
        let mut config = quiet();
        config.style.highlight.enabled = false;

        let result = generate_captions(&sample_words(), &output, config)
            .await
            .unwrap();

        assert_eq!(result.stats.events, 5);
    }
}
