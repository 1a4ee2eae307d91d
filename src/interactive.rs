use crate::config::Config;
use crate::pipeline::PipelineConfig;
use crate::style::{load_preset, VerticalPosition, BUILTIN_PRESETS};
use console::style;
use dialoguer::{Confirm, Input, Select};
use std::fs;
use std::path::{Path, PathBuf};

const TRANSCRIPT_EXTENSIONS: &[&str] = &["json"];

const POSITIONS: &[(&str, VerticalPosition)] = &[
    ("Bottom - classic subtitle placement", VerticalPosition::Bottom),
    ("Middle - centered on screen", VerticalPosition::Middle),
    ("Top - above the action", VerticalPosition::Top),
];

pub struct InteractiveResult {
    pub input: PathBuf,
    pub output: PathBuf,
    pub pipeline_config: PipelineConfig,
}

pub fn run_interactive_wizard() -> anyhow::Result<InteractiveResult> {
    print_header();

    let config = Config::load().unwrap_or_default();

    // Step 1: Select transcript
    let input = select_transcript()?;

    // Step 2: Select preset
    let preset_name = select_preset(&config)?;
    let preset = load_preset(&preset_name, config.presets_dir.as_deref())?;
    let mut caption_style = preset.style;

    // Step 3: Position
    caption_style.vertical_position = select_position(caption_style.vertical_position)?;

    // Step 4: Highlight
    caption_style.highlight.enabled = Confirm::new()
        .with_prompt("Highlight the active word?")
        .default(caption_style.highlight.enabled)
        .interact()?;

    let clean_fillers = Confirm::new()
        .with_prompt("Remove filler words (um, uh, ...)?")
        .default(preset.clean_fillers)
        .interact()?;

    let output = derive_output_path(&input);

    // Step 5: Confirm
    print_summary(
        &input,
        &output,
        &preset_name,
        caption_style.vertical_position,
        caption_style.highlight.enabled,
    );

    if !Confirm::new()
        .with_prompt("Proceed with these settings?")
        .default(true)
        .interact()?
    {
        anyhow::bail!("Cancelled by user");
    }

    println!();

    caption_style.validate()?;

    let pipeline_config = PipelineConfig {
        style: caption_style,
        preset_name,
        canvas: config.canvas,
        concurrency: config.concurrency,
        clean_fillers,
        show_progress: true,
    };

    Ok(InteractiveResult {
        input,
        output,
        pipeline_config,
    })
}

fn print_header() {
    println!();
    println!(
        "{}",
        style("╔═══════════════════════════════════════════════════╗").cyan()
    );
    println!(
        "{}",
        style("║        autocaption - Word-level Caption Styler    ║").cyan()
    );
    println!(
        "{}",
        style("╚═══════════════════════════════════════════════════╝").cyan()
    );
    println!();
}

fn select_transcript() -> anyhow::Result<PathBuf> {
    println!("{}", style("Select transcript:").bold());

    let files = scan_transcripts(Path::new("."))?;

    if files.is_empty() {
        println!("  No transcript files found in current directory.\n");
        return prompt_existing_path("Enter transcript path");
    }

    let mut items: Vec<String> = files
        .iter()
        .map(|f| {
            let size = fs::metadata(f)
                .map(|m| format_size(m.len()))
                .unwrap_or_else(|_| "?".to_string());
            format!("{} ({})", f.display(), size)
        })
        .collect();
    items.push("Enter custom path...".to_string());

    let selection = Select::new()
        .with_prompt("Choose a file")
        .items(&items)
        .default(0)
        .interact()?;

    if selection == files.len() {
        prompt_existing_path("Enter transcript path")
    } else {
        Ok(files[selection].clone())
    }
}

fn prompt_existing_path(prompt: &str) -> anyhow::Result<PathBuf> {
    let path: String = Input::new().with_prompt(prompt).interact_text()?;
    let path = PathBuf::from(path.trim());
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    Ok(path)
}

fn scan_transcripts(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && has_extension(&path, TRANSCRIPT_EXTENSIONS) {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn has_extension(path: &Path, extensions: &[&str]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Built-in preset names followed by any preset files in the presets dir.
fn available_presets(presets_dir: Option<&Path>) -> Vec<String> {
    let mut names: Vec<String> = BUILTIN_PRESETS.iter().map(|n| n.to_string()).collect();

    if let Some(entries) = presets_dir.and_then(|dir| fs::read_dir(dir).ok()) {
        let mut custom: Vec<String> = entries
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| has_extension(path, &["json", "toml"]))
            .filter_map(|path| path.file_stem().map(|s| s.to_string_lossy().into_owned()))
            .filter(|name| !names.contains(name))
            .collect();
        custom.sort();
        custom.dedup();
        names.extend(custom);
    }

    names
}

fn select_preset(config: &Config) -> anyhow::Result<String> {
    let names = available_presets(config.presets_dir.as_deref());
    let default = names
        .iter()
        .position(|n| *n == config.default_preset)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Select style preset")
        .items(&names)
        .default(default)
        .interact()?;

    Ok(names[selection].clone())
}

fn select_position(current: VerticalPosition) -> anyhow::Result<VerticalPosition> {
    let items: Vec<&str> = POSITIONS.iter().map(|(label, _)| *label).collect();
    let default = POSITIONS
        .iter()
        .position(|(_, p)| *p == current)
        .unwrap_or(0);

    let selection = Select::new()
        .with_prompt("Caption position")
        .items(&items)
        .default(default)
        .interact()?;

    Ok(POSITIONS[selection].1)
}

fn format_size(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;

    if bytes >= MB {
        format!("{:.1} MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1} KB", bytes as f64 / KB as f64)
    } else {
        format!("{} B", bytes)
    }
}

fn derive_output_path(input: &Path) -> PathBuf {
    input.with_extension("ass")
}

fn print_summary(
    input: &Path,
    output: &Path,
    preset: &str,
    position: VerticalPosition,
    highlight: bool,
) {
    println!("\n{}", style("═══ Summary ═══").bold());
    println!("  Input:     {}", style(input.display()).cyan());
    println!("  Output:    {}", style(output.display()).cyan());
    println!("  Preset:    {}", preset);
    println!("  Position:  {}", position);
    println!(
        "  Highlight: {}",
        if highlight { "on" } else { "off" }
    );
    println!();
}
