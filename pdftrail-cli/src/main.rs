use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use pdftrail_core::output::{
    render_table, save_cleaned_text, save_segments, OutputFormat, OutputMetadata,
};
use pdftrail_core::{
    open_source, CleaningConfig, DiscardTracker, DocumentProcessor, PipelineStages, SegmentKind,
};

#[derive(Parser)]
#[command(name = "pdftrail")]
#[command(about = "Extract cleaned text, sentences or paragraphs from PDFs with a discard audit log")]
struct Cli {
    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Write the cleaned document text
    Text(ExtractArgs),
    /// Split the cleaned text into sentences tagged with their pages
    Sentences(ExtractArgs),
    /// Split the cleaned text into paragraphs tagged with their pages
    Paragraphs(ExtractArgs),
}

#[derive(Args)]
struct ExtractArgs {
    /// Path to the PDF file to process
    input: PathBuf,

    /// Output file path (defaults depend on the command)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Where to write the discard report
    #[arg(short, long, default_value = "discard_tracking.txt")]
    track_log: PathBuf,

    /// Print a table of the extracted segments
    #[arg(short, long)]
    display: bool,

    /// Path to custom config file (YAML format)
    #[arg(short, long)]
    config: Option<String>,

    /// Output format: text or json
    #[arg(short = 'f', long, default_value = "text")]
    format: OutputFormat,

    /// Also write every discarded item as JSON
    #[arg(long)]
    json_log: Option<PathBuf>,

    /// Treat the input as form-feed separated text instead of a PDF
    #[arg(long)]
    plain_text: bool,

    /// Enable detailed profiling of all pipeline steps
    #[arg(long)]
    profile: bool,

    /// Save every intermediate pipeline stage to a directory
    #[arg(long)]
    save_stages: bool,

    /// Directory for stage output
    #[arg(long, default_value = "test_outputs/stages")]
    stages_dir: PathBuf,
}

impl Command {
    fn parts(&self) -> (Option<SegmentKind>, &ExtractArgs) {
        match self {
            Command::Text(args) => (None, args),
            Command::Sentences(args) => (Some(SegmentKind::Sentence), args),
            Command::Paragraphs(args) => (Some(SegmentKind::Paragraph), args),
        }
    }

    fn default_output(&self) -> &'static str {
        match self {
            Command::Text(_) => "cleaned_text.txt",
            Command::Sentences(_) => "extracted_sentences.txt",
            Command::Paragraphs(_) => "extracted_paragraphs.txt",
        }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(err) = run(&cli.command) {
        error!(error = %err, "command failed");
        for cause in err.chain().skip(1) {
            error!(cause = %cause, "caused by");
        }
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: &Command) -> Result<()> {
    let (kind, args) = command.parts();

    let config = CleaningConfig::load_with_fallback(args.config.as_deref());
    match &args.config {
        Some(path) => info!(path = %path, "loaded config"),
        None => info!("using default config"),
    }

    let processor = DocumentProcessor::new(config)?.with_profiling(args.profile);
    let source = open_source(&args.input, args.plain_text)
        .with_context(|| format!("cannot open {}", args.input.display()))?;
    info!(
        input = %args.input.display(),
        pages = source.page_count(),
        "processing document"
    );

    let mut tracker = DiscardTracker::new();
    let stages = processor.process_source_capture_stages(source.as_ref(), &mut tracker)?;
    if args.save_stages {
        save_stages(&stages, &args.stages_dir)?;
    }
    let extracted = stages.extracted;

    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(command.default_output()));
    let metadata = OutputMetadata::collect(&args.input, processor.config())?;

    match kind {
        Some(kind) => {
            let segmentation = processor.segment(&extracted, kind, &mut tracker)?;
            save_segments(&segmentation, kind, &output, args.format, &metadata, &tracker)?;
            println!(
                "Extracted {} {}s to {}",
                segmentation.len(),
                kind.label().to_lowercase(),
                output.display()
            );
            if args.display {
                print!("{}", render_table(&segmentation, kind));
            }
        }
        None => {
            save_cleaned_text(&extracted, &output, args.format, &metadata, &tracker)?;
            println!(
                "Extracted {} characters from {} pages to {}",
                extracted.char_len(),
                extracted.page_count(),
                output.display()
            );
            if args.display {
                println!("{}", extracted.text);
            }
        }
    }

    tracker.export(&args.track_log)?;
    println!("Discard report saved to: {}", args.track_log.display());
    if let Some(json_log) = &args.json_log {
        tracker.export_json(json_log)?;
        println!("Discard log saved to: {}", json_log.display());
    }
    tracker.print_summary();

    Ok(())
}

fn save_stages(stages: &PipelineStages, output_dir: &Path) -> Result<()> {
    fs::create_dir_all(output_dir)?;

    let raw_path = output_dir.join("stage1_raw_pages.json");
    fs::write(&raw_path, serde_json::to_string_pretty(&stages.raw_pages)?)?;
    println!("  {} ({} pages)", raw_path.display(), stages.raw_pages.len());

    let cleaned_path = output_dir.join("stage2_cleaned_pages.json");
    fs::write(&cleaned_path, serde_json::to_string_pretty(&stages.cleaned_pages)?)?;
    println!("  {}", cleaned_path.display());

    let text_path = output_dir.join("stage3_cleaned_text.txt");
    fs::write(&text_path, &stages.cleaned_text)?;
    println!("  {}", text_path.display());

    let extracted_path = output_dir.join("stage4_extracted.json");
    fs::write(&extracted_path, serde_json::to_string_pretty(&stages.extracted)?)?;
    println!("  {}", extracted_path.display());

    let summary = serde_json::json!({
        "stage_counts": {
            "pages": stages.raw_pages.len(),
            "failed_pages": stages.raw_pages.iter().filter(|p| p.is_none()).count(),
            "cleaned_characters": stages.cleaned_text.chars().count(),
            "final_characters": stages.extracted.char_len(),
            "retained_lines": stages.extracted.line_origins.len(),
        }
    });
    let summary_path = output_dir.join("summary.json");
    fs::write(&summary_path, serde_json::to_string_pretty(&summary)?)?;
    println!("  {}", summary_path.display());

    info!(dir = %output_dir.display(), "pipeline stages saved");
    Ok(())
}
