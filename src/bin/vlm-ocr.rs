//! CLI binary for edgequake-ocr.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `LlmOcrOptions`, runs the OCR stage over a document and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use edgequake_ocr::{
    ocr_resolved, resolve_input, InputKind, LlmOcrModel, LlmOcrOptions, OcrOutput,
    OcrProgressCallback, ProgressCallback, OCR_TIMER_KEY,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
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

const SPINNER_TICKS: &[&str] = &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar plus one log line per page.
struct CliProgressCallback {
    bar: ProgressBar,
    start_times: Mutex<HashMap<usize, Instant>>,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    /// Spinner until `on_document_start` reports the page count.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER_TICKS);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening document…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            start_times: Mutex::new(HashMap::new()),
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER_TICKS);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Recognising");
        self.bar.reset_eta();
    }

    fn elapsed_secs(&self, page_num: usize) -> f64 {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&page_num)
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0)
    }
}

impl OcrProgressCallback for CliProgressCallback {
    fn on_document_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Starting OCR of {total_pages} pages…"))
        ));
    }

    fn on_page_start(&self, page_num: usize, _total: usize) {
        self.start_times
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(page_num, Instant::now());
        self.bar.set_message(format!("page {page_num}"));
    }

    fn on_page_complete(&self, page_num: usize, total: usize, cell_count: usize) {
        let secs = self.elapsed_secs(page_num);
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {:<10}  {}",
            green("✓"),
            page_num,
            total,
            dim(&format!("{cell_count:>4} cells")),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_page_skipped(&self, page_num: usize, total: usize) {
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            yellow("–"),
            page_num,
            total,
            dim("skipped"),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, page_num: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs(page_num);
        self.errors.fetch_add(1, Ordering::SeqCst);

        let msg = if error.chars().count() > 80 {
            format!("{}\u{2026}", error.chars().take(79).collect::<String>())
        } else {
            error.to_string()
        };

        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}  {}",
            red("✗"),
            page_num,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        self.bar.inc(1);
    }

    fn on_document_complete(&self, total_pages: usize, success_count: usize) {
        let failed = self.errors.load(Ordering::SeqCst);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {}/{} pages recognised",
                green("✔"),
                bold(&success_count.to_string()),
                total_pages
            );
        } else {
            eprintln!(
                "{} {}/{} pages recognised  ({} failed)",
                if success_count == 0 { red("✘") } else { cyan("⚠") },
                bold(&success_count.to_string()),
                total_pages,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # OCR a scanned PDF against OpenAI
  vlm-ocr --api-url https://api.openai.com/v1 --model gpt-4o-mini scan.pdf

  # A local OpenAI-compatible server; the first listed model is used
  vlm-ocr --api-url http://localhost:8000/v1 --api-key local photo.png

  # Only recognise bitmap areas instead of the whole page
  vlm-ocr --force-full-page false scan.png

  # Write per-page debug images with regions and cells outlined
  vlm-ocr --visualize --debug-dir debug/ scan.pdf

  # JSON output with cells, statistics and timings
  vlm-ocr --json scan.pdf > scan.json

ENVIRONMENT VARIABLES:
  LLM_OCR_API_KEY         API key for the vision model service
  LLM_OCR_API_URL         Base URL of an OpenAI-compatible API
  LLM_OCR_MODEL           Model ID (default: first model the service lists)
  PDFIUM_LIB_PATH         Path to an existing libpdfium; skips auto-download
  PDFIUM_AUTO_CACHE_DIR   Override the default pdfium cache directory

NOTES:
  PDF pages report no bitmap areas, so --force-full-page defaults to true.
  A page whose recognition fails keeps its original text and is reported
  as failed; the remaining pages are still processed.
"#;

/// OCR PDF and image files with a remote vision language model.
#[derive(Parser, Debug)]
#[command(
    name = "vlm-ocr",
    version,
    about = "OCR PDF and image files with a remote vision language model",
    long_about = "Recognise text in PDF documents and images (local files or URLs) by sending \
page regions to any OpenAI-compatible vision model endpoint (OpenAI, vLLM, Ollama, LM Studio, \
LiteLLM, etc.).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF/PNG/JPEG file path or HTTP/HTTPS URL.
    input: String,

    /// Write recognised text (or JSON) to this file instead of stdout.
    #[arg(short, long, env = "LLM_OCR_OUTPUT")]
    output: Option<PathBuf>,

    /// API key for the vision model service.
    #[arg(long, env = "LLM_OCR_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API (e.g. https://api.openai.com/v1).
    #[arg(long, env = "LLM_OCR_API_URL")]
    api_url: Option<String>,

    /// Model ID. Defaults to the first model the service lists.
    #[arg(long, env = "LLM_OCR_MODEL")]
    model: Option<String>,

    /// Path to a text file containing a custom OCR prompt.
    #[arg(long, env = "LLM_OCR_PROMPT_FILE")]
    prompt_file: Option<PathBuf>,

    /// Recognise whole pages instead of bitmap areas only.
    #[arg(long, env = "LLM_OCR_FORCE_FULL_PAGE", default_value_t = true,
          action = clap::ArgAction::Set)]
    force_full_page: bool,

    /// Minimum page fraction covered by bitmaps before OCR runs (0–1).
    #[arg(long, env = "LLM_OCR_BITMAP_AREA_THRESHOLD", default_value_t = 0.05)]
    bitmap_area_threshold: f64,

    /// Per-request timeout for the vision model API, in seconds.
    #[arg(long, env = "LLM_OCR_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// HTTP download timeout for URL inputs, in seconds.
    #[arg(long, env = "LLM_OCR_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "LLM_OCR_PASSWORD", hide_env_values = true)]
    password: Option<String>,

    /// Write a debug PNG per page with regions and cells outlined.
    #[arg(long, env = "LLM_OCR_VISUALIZE")]
    visualize: bool,

    /// Directory for debug PNGs.
    #[arg(long, env = "LLM_OCR_DEBUG_DIR", default_value = "debug")]
    debug_dir: PathBuf,

    /// Output structured JSON (pages, cells, stats, timings) instead of text.
    #[arg(long, env = "LLM_OCR_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "LLM_OCR_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "LLM_OCR_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "LLM_OCR_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs.
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

    // ── Resolve input ────────────────────────────────────────────────────
    let resolved = resolve_input(&cli.input, cli.download_timeout)
        .await
        .with_context(|| format!("Failed to open '{}'", cli.input))?;
    if resolved.kind() == InputKind::Pdf {
        ensure_pdfium(cli.quiet)?;
    }

    // ── Build engine ─────────────────────────────────────────────────────
    let options = build_options(&cli).await?;
    let engine = LlmOcrModel::new(true, options)
        .await
        .context("Failed to initialise the OCR engine")?;

    let progress_cb: Option<ProgressCallback> = if show_progress {
        let cb = CliProgressCallback::new_dynamic();
        Some(cb as Arc<dyn OcrProgressCallback>)
    } else {
        None
    };

    // ── Run OCR ──────────────────────────────────────────────────────────
    let output = ocr_resolved(&resolved, &engine, progress_cb, cli.password.as_deref())
        .await
        .context("OCR failed")?;

    let rendered = if cli.json {
        serde_json::to_string_pretty(&output).context("Failed to serialise output")?
    } else {
        output.text()
    };

    match cli.output {
        Some(ref path) => write_atomic(path, &rendered).await?,
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(rendered.as_bytes())
                .context("Failed to write to stdout")?;
            if !rendered.ends_with('\n') {
                handle.write_all(b"\n").ok();
            }
        }
    }

    if !cli.quiet && !show_progress && !cli.json {
        print_summary(&output, engine.model().unwrap_or("?"));
    }

    Ok(())
}

/// Make sure pdfium is loadable before a PDF is opened; images never need it.
///
/// With `bundled` the embedded library is extracted; otherwise it is
/// downloaded (~30 MB) on first run and cached.
fn ensure_pdfium(quiet: bool) -> Result<()> {
    #[cfg(feature = "bundled")]
    {
        let _ = quiet;
        tokio::task::block_in_place(pdfium_auto::ensure_pdfium_bundled)
            .context("Failed to extract bundled PDFium engine")?;
    }

    #[cfg(not(feature = "bundled"))]
    if !pdfium_auto::is_pdfium_cached() {
        if quiet {
            tokio::task::block_in_place(|| pdfium_auto::ensure_pdfium_library(None))
                .context("Failed to download PDFium engine")?;
        } else {
            let dl_bar = ProgressBar::new(0);
            dl_bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.cyan} {prefix:.bold}  \
                     [{bar:42.green/238}] {bytes}/{total_bytes}  ETA {eta_precise}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("█▉▊▋▌▍▎▏  ")
                .tick_strings(SPINNER_TICKS),
            );
            dl_bar.set_prefix("PDF engine");
            dl_bar.enable_steady_tick(Duration::from_millis(80));

            let bar = dl_bar.clone();
            tokio::task::block_in_place(|| {
                pdfium_auto::ensure_pdfium_library(Some(&|downloaded, total| {
                    if let Some(t) = total {
                        if bar.length().unwrap_or(0) != t {
                            bar.set_length(t);
                        }
                    }
                    bar.set_position(downloaded);
                }))
            })
            .context("Failed to download PDFium engine")?;

            dl_bar.finish_with_message("ready ✓");
        }
    }

    Ok(())
}

/// Map CLI args to `LlmOcrOptions`.
async fn build_options(cli: &Cli) -> Result<LlmOcrOptions> {
    let mut builder = LlmOcrOptions::builder()
        .force_full_page_ocr(cli.force_full_page)
        .bitmap_area_threshold(cli.bitmap_area_threshold)
        .request_timeout_secs(cli.api_timeout)
        .visualize_ocr(cli.visualize)
        .debug_output_dir(cli.debug_dir.clone());

    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key.clone());
    }
    if let Some(ref url) = cli.api_url {
        builder = builder.api_url(url.clone());
    }
    if let Some(ref model) = cli.model {
        builder = builder.model(model.clone());
    }
    if let Some(ref path) = cli.prompt_file {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read OCR prompt from {:?}", path))?;
        builder = builder.prompt(prompt);
    }

    builder.build().context("Invalid configuration")
}

/// Write to a temp file next to `path`, then rename over it.
async fn write_atomic(path: &std::path::Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let tmp_path = path.with_extension("tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .with_context(|| format!("Failed to write {}", tmp_path.display()))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}

fn print_summary(output: &OcrOutput, model: &str) {
    let stats = &output.stats;
    eprintln!(
        "Recognised {}/{} pages with {} in {}ms ({} skipped, {} failed)",
        stats.processed_pages,
        stats.total_pages,
        model,
        stats.total_duration_ms,
        stats.skipped_pages,
        stats.failed_pages
    );
    if let Some(ocr) = output.timings.get(OCR_TIMER_KEY) {
        eprintln!(
            "  {} cells ({} from OCR), {:.2}s avg per page",
            stats.total_cells,
            stats.ocr_cells,
            ocr.avg()
        );
    }
}
