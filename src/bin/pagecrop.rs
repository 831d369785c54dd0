//! CLI binary for pagecrop.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `PipelineConfig` and prints the cropped images as JSON.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pagecrop::{
    convert, convert_to_file, DecodeFallback, DocumentSource, FramePolicy, OutputFormat,
    PipelineConfig, PipelineProgressCallback, ProgressCallback,
};
use std::io::{self, Read, Write};
use std::path::PathBuf;
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
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner while the document is fetched, then a bar over frames.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        bar.set_prefix("Loading");
        bar.set_message("Reading document…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl PipelineProgressCallback for CliProgressCallback {
    fn on_pipeline_start(&self, total_frames: usize) {
        self.bar.set_style(
            ProgressStyle::with_template(
                "{spinner:.cyan} {prefix:.bold}  [{bar:30.green/238}] {pos}/{len} frames",
            )
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
        );
        self.bar.set_length(total_frames as u64);
        self.bar.set_prefix("Cropping");
    }

    fn on_frame_complete(&self, frame_num: usize, total_frames: usize, encoded_len: usize) {
        self.bar.println(format!(
            "  {} Frame {}/{}  {}",
            green("✓"),
            frame_num,
            total_frames,
            dim(&format!("{encoded_len} bytes"))
        ));
        self.bar.inc(1);
    }

    fn on_frame_error(&self, frame_num: usize, total_frames: usize, error: &str) {
        self.bar.println(format!(
            "  {} Frame {}/{}  {}",
            red("✗"),
            frame_num,
            total_frames,
            red(error)
        ));
        self.bar.inc(1);
    }

    fn on_pipeline_complete(&self, _total_frames: usize, _success_count: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Crop a scan and print {"cropped_images": [...]} to stdout
  pagecrop scan.png

  # Fetch from a URL, lossless output, written to a file
  pagecrop https://example.com/page.png --format png -o page.json

  # Read the document from stdin
  cat scan.jpg | pagecrop -

  # One data URI per line instead of JSON
  pagecrop scan.png --raw

  # Fail instead of emitting a placeholder when the document cannot be decoded
  pagecrop document.pdf --strict-decode

DEGRADED MODE:
  Documents the image decoders cannot read (including PDF) produce a single
  blank 800x600 placeholder image. A warning is printed and the JSON output
  carries a "degraded" field naming the decode error.
"#;

/// Render documents to tightly cropped, base64 data-URI images.
#[derive(Parser, Debug)]
#[command(
    name = "pagecrop",
    version,
    about = "Render documents to tightly cropped, base64 data-URI images",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path, HTTP/HTTPS URL, or `-` for stdin.
    input: String,

    /// Write JSON output to this file instead of stdout.
    #[arg(short, long, env = "PAGECROP_OUTPUT")]
    output: Option<PathBuf>,

    /// Luminance threshold (0–255); darker pixels are content.
    #[arg(short, long, env = "PAGECROP_THRESHOLD", default_value_t = 240)]
    threshold: u8,

    /// Output format: jpeg (lossy) or png (lossless).
    #[arg(short, long, env = "PAGECROP_FORMAT", default_value = "jpeg")]
    format: OutputFormat,

    /// Encoder quality (0–100, JPEG only).
    #[arg(long, env = "PAGECROP_QUALITY", default_value_t = 85,
          value_parser = clap::value_parser!(u8).range(0..=100))]
    quality: u8,

    /// Fail when the document cannot be decoded instead of emitting a placeholder.
    #[arg(long, env = "PAGECROP_STRICT_DECODE")]
    strict_decode: bool,

    /// Drop frames that fail to encode instead of failing the whole run.
    #[arg(long, env = "PAGECROP_SKIP_FAILED")]
    skip_failed_frames: bool,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "PAGECROP_DOWNLOAD_TIMEOUT", default_value_t = 10)]
    download_timeout: u64,

    /// Print one data URI per line instead of JSON.
    #[arg(long, conflicts_with = "output")]
    raw: bool,

    /// Include per-frame details and stats in the JSON output.
    #[arg(long)]
    full: bool,

    /// Disable progress bar.
    #[arg(long, env = "PAGECROP_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PAGECROP_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PAGECROP_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.no_progress && !cli.verbose;
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

    // ── Resolve source ───────────────────────────────────────────────────
    let source = if cli.input == "-" {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Failed to read document from stdin")?;
        DocumentSource::Uploaded(buf)
    } else {
        DocumentSource::from_arg(&cli.input).context("Invalid input")?
    };

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn PipelineProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Run ──────────────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = convert_to_file(source, output_path, &config)
            .await
            .context("Processing failed")?;
        if !cli.quiet {
            if stats.degraded {
                eprintln!(
                    "{} document could not be rendered; wrote a placeholder image",
                    yellow("⚠")
                );
            }
            eprintln!(
                "{}  {}/{} frames  {}ms  →  {}",
                if stats.failed_frames == 0 && !stats.degraded {
                    green("✔")
                } else {
                    yellow("⚠")
                },
                stats.processed_frames,
                stats.total_frames,
                stats.total_duration_ms,
                output_path.display()
            );
        }
        return Ok(());
    }

    let output = convert(source, &config)
        .await
        .context("Processing failed")?;

    if let Some(ref e) = output.degraded {
        if !cli.quiet {
            eprintln!(
                "{} document could not be rendered ({e}); emitted a placeholder image",
                yellow("⚠")
            );
        }
    }

    let stdout = io::stdout();
    let mut handle = stdout.lock();
    if cli.raw {
        for uri in output.data_uris() {
            writeln!(handle, "{uri}").context("Failed to write to stdout")?;
        }
    } else if cli.full {
        let json = serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    } else {
        let json = serde_json::to_string_pretty(&serde_json::json!({
            "cropped_images": output.cropped_images,
        }))
        .context("Failed to serialise output")?;
        writeln!(handle, "{json}").context("Failed to write to stdout")?;
    }

    if !cli.quiet && !show_progress {
        eprintln!(
            "Processed {}/{} frames in {}ms",
            output.stats.processed_frames, output.stats.total_frames, output.stats.total_duration_ms
        );
    }

    Ok(())
}

/// Map CLI args to `PipelineConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<PipelineConfig> {
    let mut builder = PipelineConfig::builder()
        .threshold(cli.threshold)
        .format(cli.format)
        .quality(cli.quality)
        .download_timeout_secs(cli.download_timeout)
        .decode_fallback(if cli.strict_decode {
            DecodeFallback::Propagate
        } else {
            DecodeFallback::Placeholder
        })
        .frame_policy(if cli.skip_failed_frames {
            FramePolicy::Skip
        } else {
            FramePolicy::Abort
        });

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
