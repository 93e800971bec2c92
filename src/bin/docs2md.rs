//! CLI binary for edgequake-docs2md.
//!
//! A thin shim over the library crate that maps CLI flags to `BatchConfig`,
//! runs the batch and prints a summary.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_docs2md::{
    find_convertible_files, timestamped_output_dir, BatchConfig, BatchOutput,
    BatchProgressCallback, ConversionPipeline, Credential, ProgressCallback, VisionEngine,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

const TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar over the batch plus a log line per file.
struct CliProgressCallback {
    bar: ProgressBar,
    input_root: PathBuf,
}

impl CliProgressCallback {
    fn new(input_root: PathBuf) -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS);
        bar.set_style(style);
        bar.set_prefix("Converting");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar, input_root })
    }

    fn display<'a>(&self, path: &'a Path) -> std::borrow::Cow<'a, str> {
        path.strip_prefix(&self.input_root)
            .unwrap_or(path)
            .to_string_lossy()
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.set_length(total_files as u64);
        self.bar.reset_eta();
    }

    fn on_file_start(&self, _index: usize, _total: usize, path: &Path) {
        self.bar.set_message(self.display(path).into_owned());
    }

    fn on_file_complete(&self, index: usize, total: usize, path: &Path) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            index + 1,
            total,
            self.display(path)
        ));
        self.bar.inc(1);
    }

    fn on_file_error(&self, index: usize, total: usize, path: &Path, error: &str) {
        let msg = match error.char_indices().nth(80) {
            Some((cut, _)) => format!("{}\u{2026}", &error[..cut]),
            None => error.to_string(),
        };
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            self.display(path),
            red(&msg)
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, _total: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert everything under ./contracts into ./contracts_<timestamp>/
  docs2md ./contracts

  # Explicit output directory and model
  docs2md ./reports --output ./reports_md --model gpt-4o

  # Keep LibreOffice/pdfium intermediates for inspection
  docs2md ./slides --no-cleanup

  # Machine-readable results
  docs2md ./inbox --json > results.json

SUPPORTED FILE TYPES:
  pdf doc docx xls xlsx odt ott rtf txt html htm xml csv tsv ppt pptx odp otp

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY          API key used for every conversion (required)
  DOCS2MD_MODEL           Override model ID
  PDFIUM_LIB_PATH         Path to an existing libpdfium (skips auto-download)
  RUST_LOG                Log filter (overrides --verbose)

REQUIREMENTS:
  Non-PDF files are converted to PDF with LibreOffice; `soffice` must be on PATH.
  PDFium (~30 MB) is downloaded automatically on first run and cached.
"#;

/// Convert a directory of documents to Markdown using Vision LLMs.
#[derive(Parser, Debug)]
#[command(
    name = "docs2md",
    version,
    about = "Batch-convert a directory of documents to Markdown using Vision LLMs",
    long_about = "Recursively converts PDF, Office, OpenDocument, RTF, text, HTML, XML and \
CSV/TSV files to Markdown, preserving the directory structure in a timestamped output \
directory next to the input.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Directory to convert.
    input: PathBuf,

    /// Output directory. Default: <INPUT>_<yyyyMMddHHmmss> next to the input.
    #[arg(short, long, env = "DOCS2MD_OUTPUT")]
    output: Option<PathBuf>,

    /// API key for the vision model.
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Model ID.
    #[arg(long, env = "DOCS2MD_MODEL", default_value = edgequake_docs2md::prompts::DEFAULT_MODEL)]
    model: String,

    /// Concurrent page requests per document.
    #[arg(short, long, env = "DOCS2MD_CONCURRENCY", default_value_t = 10)]
    concurrency: usize,

    /// Pass each page's output as context for the next page.
    #[arg(long, env = "DOCS2MD_MAINTAIN_FORMAT")]
    maintain_format: bool,

    /// Keep intermediate files (converted PDFs).
    #[arg(long)]
    no_cleanup: bool,

    /// Path to a text file with a custom extraction instruction.
    #[arg(long, env = "DOCS2MD_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Treat a conversion that leaves no Markdown file as a failure.
    #[arg(long)]
    require_artifact: bool,

    /// Print results as JSON.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "DOCS2MD_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long)]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long)]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{} {:#}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<ExitCode> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Preconditions ────────────────────────────────────────────────────
    let credential = Credential::from_optional(cli.api_key.clone())
        .ok_or(edgequake_docs2md::Docs2MdError::MissingCredential)?;

    if !cli.input.is_dir() {
        anyhow::bail!("input directory '{}' does not exist", cli.input.display());
    }
    let input = std::fs::canonicalize(&cli.input)
        .with_context(|| format!("Failed to resolve {}", cli.input.display()))?;
    let output = match cli.output {
        Some(ref o) => o.clone(),
        None => {
            let stamp = chrono::Local::now().format("%Y%m%d%H%M%S").to_string();
            timestamped_output_dir(&input, &stamp)
        }
    };

    let files = find_convertible_files(&input).context("Failed to scan input directory")?;
    if files.is_empty() {
        if !cli.quiet {
            eprintln!("{} No convertible files found in {}", yellow("⚠"), input.display());
        }
        return Ok(ExitCode::SUCCESS);
    }

    if !cli.quiet && !cli.json {
        eprintln!("{} {}", cyan("◆"), bold("Starting conversion…"));
        eprintln!("   input:  {}", input.display());
        eprintln!("   output: {}", output.display());
        eprintln!("   {} convertible files found", files.len());
    }

    ensure_pdfium(cli.quiet)?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(input.clone()) as ProgressCallback)
    } else {
        None
    };
    let config = build_config(&cli, progress).await?;

    // ── Run batch ────────────────────────────────────────────────────────
    // The scanned list drives the batch so the banner count matches it.
    tokio::fs::create_dir_all(&output)
        .await
        .with_context(|| format!("Failed to create output directory {}", output.display()))?;
    let pipeline = ConversionPipeline::new(Arc::new(VisionEngine::default()), config);
    let batch = BatchOutput::new(
        pipeline
            .convert_files(&files, &input, &output, Some(&credential))
            .await,
    );

    if cli.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&batch).context("Failed to serialise results")?
        );
    } else if !cli.quiet {
        print_summary(&batch, &output);
    }

    Ok(if batch.summary.all_succeeded() {
        ExitCode::SUCCESS
    } else {
        ExitCode::from(2)
    })
}

/// Extract the pdfium library embedded at build time.
#[cfg(feature = "bundled")]
fn ensure_pdfium(_quiet: bool) -> Result<()> {
    tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_bundled())
        .context("Failed to extract bundled PDFium engine")?;
    Ok(())
}

/// Download pdfium on first run so the progress bar isn't interrupted later.
#[cfg(not(feature = "bundled"))]
fn ensure_pdfium(quiet: bool) -> Result<()> {
    if pdfium_auto::is_pdfium_cached() {
        return Ok(());
    }
    if quiet {
        tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
            .context("Failed to download PDFium engine")?;
        return Ok(());
    }

    let dl_bar = ProgressBar::new(0);
    dl_bar.set_style(
        ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(TICKS),
    );
    dl_bar.set_prefix("PDF engine");
    dl_bar.enable_steady_tick(Duration::from_millis(80));

    let bar = dl_bar.clone();
    tokio::task::block_in_place(|| {
        pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
            if let Some(t) = total {
                bar.set_length(t);
            }
            bar.set_position(downloaded);
        }))
    })
    .context("Failed to download PDFium engine")?;
    dl_bar.finish_and_clear();
    Ok(())
}

/// Map CLI args to `BatchConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<BatchConfig> {
    let mut builder = BatchConfig::builder()
        .model(cli.model.clone())
        .concurrency(cli.concurrency)
        .cleanup(!cli.no_cleanup)
        .maintain_format(cli.maintain_format)
        .require_artifact(cli.require_artifact);

    if let Some(ref path) = cli.prompt_file {
        let instruction = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read prompt from {:?}", path))?;
        builder = builder.instruction(instruction);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_summary(batch: &BatchOutput, output: &Path) {
    let s = &batch.summary;
    let mark = if s.failed == 0 {
        green("✔")
    } else if s.succeeded == 0 {
        red("✘")
    } else {
        yellow("⚠")
    };
    eprintln!(
        "{} {}/{} files converted  {}",
        mark,
        bold(&s.succeeded.to_string()),
        s.total,
        dim(&format!("{:.1}s", s.total_duration_ms as f64 / 1000.0))
    );

    if s.failed > 0 {
        eprintln!("{} {} files failed:", yellow("⚠"), s.failed);
        for r in batch.failures() {
            eprintln!(
                "  {} {}: {}",
                red("-"),
                r.file_path().display(),
                r.error().unwrap_or("unknown error")
            );
        }
    }
    eprintln!("   output: {}", bold(&output.display().to_string()));
}
