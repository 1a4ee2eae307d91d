use anyhow::{Context, Result};
use autocaption::config::Config;
use autocaption::interactive::run_interactive_wizard;
use autocaption::pipeline::{generate_captions, print_summary, PipelineConfig};
use autocaption::render::Canvas;
use autocaption::style::{load_preset, StyleOverrides};
use autocaption::transcript::JsonTranscript;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser)]
#[command(name = "autocaption")]
#[command(version, about = "Word-level animated captions in ASS format")]
#[command(long_about = "Turn a word-timed transcript into styled, highlighted ASS captions ready to burn into short-form video.")]
struct Cli {
    /// Word-timed transcript (JSON)
    input: Option<PathBuf>,

    /// Output subtitle file (defaults to input name with .ass extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Style preset: built-in name (tiktok, minimal, center) or preset file path
    #[arg(short, long)]
    preset: Option<String>,

    /// Font family
    #[arg(long)]
    font_name: Option<String>,

    /// Font size in pixels
    #[arg(long)]
    font_size: Option<u32>,

    /// Text color (ASS notation, e.g. &H00FFFFFF)
    #[arg(long)]
    color: Option<String>,

    /// Outline color for base and highlighted text
    #[arg(long)]
    outline_color: Option<String>,

    /// Highlight box color
    #[arg(long)]
    highlight_color: Option<String>,

    /// Highlighted word text color
    #[arg(long)]
    highlight_text_color: Option<String>,

    /// Vertical position: top, middle, bottom
    #[arg(long)]
    position: Option<String>,

    /// Turn the active-word highlight on or off
    #[arg(long)]
    highlight: Option<bool>,

    /// Highlight animation: none, pop
    #[arg(long)]
    animation: Option<String>,

    /// Canvas size as WIDTHxHEIGHT
    #[arg(long)]
    canvas: Option<String>,

    /// Number of segments laid out concurrently
    #[arg(short, long)]
    concurrency: Option<usize>,

    /// Remove filler words (um, uh, ...) before segmenting
    #[arg(long)]
    clean_fillers: bool,

    /// Run the interactive setup wizard
    #[arg(short, long)]
    interactive: bool,

    /// Disable the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };

    FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();
}

fn derive_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let mut output = input.to_path_buf();
    output.set_file_name(format!("{}.ass", stem.to_string_lossy()));
    output
}

fn parse_opt<T>(value: Option<&str>) -> Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    value
        .map(|v| v.parse::<T>().map_err(|e| anyhow::anyhow!(e)))
        .transpose()
}

fn build_overrides(cli: &Cli) -> Result<StyleOverrides> {
    Ok(StyleOverrides {
        font_name: cli.font_name.clone(),
        font_size: cli.font_size,
        color: parse_opt(cli.color.as_deref())?,
        outline_color: parse_opt(cli.outline_color.as_deref())?,
        highlight_color: parse_opt(cli.highlight_color.as_deref())?,
        highlight_text_color: parse_opt(cli.highlight_text_color.as_deref())?,
        position: parse_opt(cli.position.as_deref())?,
        highlight: cli.highlight,
        animation: parse_opt(cli.animation.as_deref())?,
    })
}

fn build_pipeline_config(cli: &Cli, config: &Config) -> Result<PipelineConfig> {
    let preset_name = cli
        .preset
        .clone()
        .unwrap_or_else(|| config.default_preset.clone());

    let preset = load_preset(&preset_name, config.presets_dir.as_deref())
        .with_context(|| format!("Failed to load preset '{}'", preset_name))?;

    let overrides = build_overrides(cli)?;
    if !overrides.is_empty() {
        debug!("Applying style overrides: {:?}", overrides);
    }
    let style = overrides
        .apply(preset.style)
        .context("Invalid style settings")?;

    let canvas = match cli.canvas.as_deref() {
        Some(c) => c.parse::<Canvas>().map_err(|e| anyhow::anyhow!(e))?,
        None => config.canvas,
    };

    Ok(PipelineConfig {
        style,
        preset_name,
        canvas,
        concurrency: cli.concurrency.unwrap_or(config.concurrency),
        clean_fillers: cli.clean_fillers || preset.clean_fillers,
        show_progress: !cli.no_progress,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let (input, output, pipeline_config) = match cli.input.as_ref() {
        Some(input) if !cli.interactive => {
            // Validate input file exists
            if !input.exists() {
                anyhow::bail!("Input file not found: {}", input.display());
            }

            // Load and validate configuration
            let config = Config::load().context("Failed to load configuration")?;
            config.validate().context("Configuration validation failed")?;

            let output = cli
                .output
                .clone()
                .unwrap_or_else(|| derive_output_path(input));
            let pipeline_config = build_pipeline_config(&cli, &config)?;
            (input.clone(), output, pipeline_config)
        }
        _ => {
            let wizard = run_interactive_wizard()?;
            (wizard.input, wizard.output, wizard.pipeline_config)
        }
    };

    info!("Input:    {}", input.display());
    info!("Output:   {}", output.display());
    info!("Preset:   {}", pipeline_config.preset_name);
    info!("Canvas:   {}", pipeline_config.canvas);

    let source = JsonTranscript::new(&input);
    let result = generate_captions(&source, &output, pipeline_config)
        .await
        .context("Caption generation failed")?;

    print_summary(&result);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use autocaption::style::{AnimationKind, VerticalPosition};

    #[test]
    fn test_derive_output_path() {
        let input = PathBuf::from("/path/to/talk.json");
        assert_eq!(derive_output_path(&input), PathBuf::from("/path/to/talk.ass"));
    }

    #[test]
    fn test_overrides_from_flags() {
        let cli = Cli::parse_from([
            "autocaption",
            "talk.json",
            "--position",
            "top",
            "--animation",
            "none",
            "--highlight-color",
            "&H00FF00FF",
        ]);

        let overrides = build_overrides(&cli).unwrap();
        assert_eq!(overrides.position, Some(VerticalPosition::Top));
        assert_eq!(overrides.animation, Some(AnimationKind::None));
        assert_eq!(
            overrides.highlight_color.map(String::from),
            Some("&H00FF00FF".to_string())
        );
        assert!(overrides.font_size.is_none());
    }

    #[test]
    fn test_invalid_color_flag_rejected() {
        let cli = Cli::parse_from(["autocaption", "talk.json", "--color", "white"]);
        assert!(build_overrides(&cli).is_err());
    }

    #[test]
    fn test_pipeline_config_from_flags() {
        let cli = Cli::parse_from([
            "autocaption",
            "talk.json",
            "--preset",
            "minimal",
            "--font-size",
            "50",
            "--canvas",
            "1920x1080",
            "--no-progress",
        ]);

        let config = build_pipeline_config(&cli, &Config::default()).unwrap();
        assert_eq!(config.preset_name, "minimal");
        assert_eq!(config.style.font.size, 50);
        assert!(!config.style.highlight.enabled);
        assert_eq!(config.canvas.width, 1920);
        assert_eq!(config.concurrency, 4);
        assert!(!config.show_progress);
    }

    #[test]
    fn test_zero_font_size_rejected() {
        let cli = Cli::parse_from(["autocaption", "talk.json", "--font-size", "0"]);
        assert!(build_pipeline_config(&cli, &Config::default()).is_err());
    }
}
