use std::path::{Path, PathBuf};

use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use subalign_rs::srt::{format_srt, parse_srt};
use subalign_rs::{CorrectionError, CorrectorConfig, Segment, SubtitleCorrectorBuilder};

#[path = "srt_correct/json_report.rs"]
mod json_report;

const EXIT_CONFIG: i32 = 2;
const EXIT_NOT_FOUND: i32 = 3;
const EXIT_ENCODING: i32 = 4;
const EXIT_INVALID_INPUT: i32 = 5;
const EXIT_WRITE: i32 = 6;

#[derive(Debug, Parser)]
#[command(
    name = "srt-correct",
    about = "Correct transcribed SRT subtitles against a trusted reference text"
)]
struct Args {
    /// SRT file to correct.
    srt: PathBuf,
    /// Reference text file with the trusted wording.
    reference: PathBuf,
    /// Output path; defaults to the input with a `_corrected` suffix.
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Minimum similarity ratio for a correction to be accepted.
    #[arg(long, default_value_t = CorrectorConfig::DEFAULT_THRESHOLD)]
    threshold: f64,
    /// Search window size over the normalized reference, in bytes.
    #[arg(long, default_value_t = CorrectorConfig::DEFAULT_WINDOW_SIZE)]
    window_size: usize,
    /// Anchor word counts to try, in order.
    #[arg(long, value_delimiter = ',', default_values_t = CorrectorConfig::DEFAULT_ANCHOR_LENGTHS)]
    anchors: Vec<usize>,
    /// Enable the sliding-window fuzzy fallback for misrecognized first words.
    #[arg(long)]
    fuzzy: bool,
    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
    /// Number of before/after correction examples to print.
    #[arg(long, default_value_t = 5)]
    examples: usize,
    /// List the indices of segments left unmatched.
    #[arg(long)]
    show_unmatched: bool,
}

struct CliError {
    code: i32,
    message: String,
}

impl CliError {
    fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

fn main() {
    if let Err(err) = run() {
        eprintln!("error: {}", err.message);
        std::process::exit(err.code);
    }
}

fn run() -> Result<(), CliError> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| default_output_path(&args.srt));

    let srt_content = read_text(&args.srt, "subtitle file")?;
    let reference_content = read_text(&args.reference, "reference file")?;

    let mut segments = parse_srt(&srt_content).map_err(engine_error)?;

    let config = CorrectorConfig {
        threshold: args.threshold,
        window_size: args.window_size,
        anchor_lengths: args.anchors.clone(),
        fuzzy_fallback: args.fuzzy,
    };
    let corrector = SubtitleCorrectorBuilder::new(config)
        .build(&reference_content)
        .map_err(engine_error)?;

    let progress = ProgressBar::new(segments.len() as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-"),
    );
    progress.set_message("aligning...");

    let mut session = corrector.session();
    for segment in segments.iter_mut() {
        session.correct_segment(segment).map_err(engine_error)?;
        progress.inc(1);
    }
    let stats = session.finish();
    progress.finish_and_clear();

    std::fs::write(&output_path, format_srt(&segments)).map_err(|err| {
        CliError::new(
            EXIT_WRITE,
            format!("writing {}: {err}", output_path.display()),
        )
    })?;

    println!(
        "Corrected {}/{} segments ({:.1}%), written to {}",
        stats.matched_count,
        stats.total,
        stats.correction_rate * 100.0,
        output_path.display()
    );
    if stats.fuzzy_count > 0 {
        println!("  {} accepted via fuzzy fallback", stats.fuzzy_count);
    }

    print_examples(&segments, args.examples);
    if args.show_unmatched {
        print_unmatched(&segments);
    }

    if let Some(report_path) = args.report.as_deref() {
        let context = json_report::RunContext {
            srt_path: &args.srt,
            reference_path: &args.reference,
            threshold: args.threshold,
            window_size: args.window_size,
            fuzzy_fallback: args.fuzzy,
        };
        let report = json_report::build_report(&context, &segments, &stats);
        json_report::write_report(report_path, &report)
            .map_err(|message| CliError::new(EXIT_WRITE, message))?;
        println!("Run report written to {}", report_path.display());
    }

    Ok(())
}

fn default_output_path(srt: &Path) -> PathBuf {
    let stem = srt
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "subtitles".to_string());
    srt.with_file_name(format!("{stem}_corrected.srt"))
}

fn read_text(path: &Path, what: &str) -> Result<String, CliError> {
    let bytes = std::fs::read(path).map_err(|err| {
        let code = if err.kind() == std::io::ErrorKind::NotFound {
            EXIT_NOT_FOUND
        } else {
            1
        };
        CliError::new(code, format!("reading {what} {}: {err}", path.display()))
    })?;
    String::from_utf8(bytes).map_err(|_| {
        CliError::new(
            EXIT_ENCODING,
            format!("{what} {} is not valid UTF-8", path.display()),
        )
    })
}

fn engine_error(err: CorrectionError) -> CliError {
    let code = match &err {
        CorrectionError::InvalidConfig { .. } => EXIT_CONFIG,
        CorrectionError::InvalidInput { .. } => EXIT_INVALID_INPUT,
        CorrectionError::Io { .. } => 1,
    };
    CliError::new(code, err.to_string())
}

fn print_examples(segments: &[Segment], limit: usize) {
    let mut shown = 0usize;
    for segment in segments {
        if shown >= limit {
            break;
        }
        if segment.corrected_text == segment.original_text {
            continue;
        }
        shown += 1;
        println!(
            "\n#{} {} --> {} (score {:.2})",
            segment.index, segment.start_time, segment.end_time, segment.score
        );
        println!("  - {}", segment.original_text.replace('\n', " / "));
        println!("  + {}", segment.corrected_text.replace('\n', " / "));
    }
}

fn print_unmatched(segments: &[Segment]) {
    let unmatched: Vec<String> = segments
        .iter()
        .filter(|segment| !segment.matched)
        .map(|segment| segment.index.to_string())
        .collect();
    if unmatched.is_empty() {
        println!("\nAll segments matched.");
    } else {
        println!("\nUnmatched segments: {}", unmatched.join(", "));
    }
}
