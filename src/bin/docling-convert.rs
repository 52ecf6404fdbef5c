//! CLI binary for docling-serve-client.
//!
//! A thin shim over the library crate that maps CLI flags and manifest
//! entries to `ConversionRecord`s and prints the service's responses.

use anyhow::{Context, Result};
use clap::Parser;
use docling_serve_client::{
    run_batch, AdvancedOptions, BatchProgress, ClientConfig, ConversionRecord, ConversionResponse,
    DoclingClient, EndpointKind, InputFormat, OutputFormat, RecordDefaults, DEFAULT_ENDPOINT_URL,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::{Duration, Instant};
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
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress observer using indicatif ────────────────────────────────────

/// Terminal progress observer: renders a live progress bar and one log line
/// per record using [indicatif]. The batch driver is strictly sequential, so
/// at most one record is in flight and a single start time suffices.
struct CliBatchProgress {
    /// The single progress bar anchored at the bottom of the terminal.
    /// Hidden when progress output is disabled.
    bar: ProgressBar,
    /// Wall-clock start of the record currently in flight.
    started: Mutex<Option<Instant>>,
    /// Zero-based index of the record that aborted the batch, if any.
    failed: Mutex<Option<usize>>,
    enabled: bool,
}

impl CliBatchProgress {
    fn new(enabled: bool) -> Self {
        let bar = if enabled {
            let bar = ProgressBar::new(0); // length set in on_batch_start
            let spinner_style =
                ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner())
                    .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
            bar.set_style(spinner_style);
            bar.set_prefix("Preparing");
            bar.enable_steady_tick(Duration::from_millis(80));
            bar
        } else {
            ProgressBar::hidden()
        };
        Self {
            bar,
            started: Mutex::new(None),
            failed: Mutex::new(None),
            enabled,
        }
    }

    /// Which record aborted the batch, for the final error context.
    fn failed_record(&self) -> Option<usize> {
        *self.failed.lock().unwrap()
    }

    fn elapsed_secs(&self) -> f64 {
        self.started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_millis() as f64 / 1000.0)
            .unwrap_or(0.0)
    }
}

impl BatchProgress for CliBatchProgress {
    fn on_batch_start(&self, total: usize) {
        if !self.enabled {
            return;
        }
        // Switch from spinner-only style to the full bar: unlike a page
        // count, the batch size is known before the first request.
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} records  \
             ⏱ {elapsed_precise}  ETA {eta_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Converting");
        self.bar.reset_eta();
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Forwarding {total} records…"))
        ));
    }

    fn on_record_start(&self, index: usize, _total: usize) {
        *self.started.lock().unwrap() = Some(Instant::now());
        self.bar.set_message(format!("record {}", index + 1));
    }

    fn on_record_done(&self, index: usize, total: usize) {
        let secs = self.elapsed_secs();
        if self.enabled {
            self.bar.println(format!(
                "  {} Record {:>3}/{:<3}  {}",
                green("✓"),
                index + 1,
                total,
                dim(&format!("{secs:.1}s")),
            ));
        }
        self.bar.inc(1);
    }

    fn on_record_failed(&self, index: usize, total: usize, error: &str) {
        let secs = self.elapsed_secs();
        *self.failed.lock().unwrap() = Some(index);
        if !self.enabled {
            return;
        }

        let msg = truncate_error_line(error);

        self.bar.println(format!(
            "  {} Record {:>3}/{:<3}  {}  {}",
            red("✗"),
            index + 1,
            total,
            red(&msg),
            dim(&format!("{secs:.1}s")),
        ));
        // The batch stops after this call.
        self.bar.finish_and_clear();
    }

    fn on_batch_complete(&self, total: usize) {
        if !self.enabled {
            return;
        }
        self.bar.finish_and_clear();
        eprintln!(
            "{} {} records converted successfully",
            green("✔"),
            bold(&total.to_string())
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a document by URL (stdout)
  docling-convert https://arxiv.org/pdf/1706.03762

  # Several URLs in one request, Markdown and JSON out
  docling-convert --to md,json https://x.test/a.pdf https://x.test/b.pdf

  # Upload a local file (multipart)
  docling-convert scan.pdf -o scan.json

  # Inline base64 payload, uploaded as a file
  docling-convert --mode file --base64 "$(base64 < report.docx)" --filename report.docx

  # Service options, passed through verbatim
  docling-convert --options '{"do_ocr": true, "table_mode": "accurate"}' doc.pdf

  # Batch from a manifest, one output record per entry
  docling-convert --records batch.json -o results.json --pretty

  # Against a remote instance
  DOCLING_SERVE_URL=https://docling.internal:5001 docling-convert doc.pdf

MANIFEST FORMAT (--records):
  A JSON array of records; unset fields fall back to the CLI flags.
  [
    {"source_urls": "https://x.test/a.pdf,https://x.test/b.pdf"},
    {"endpoint": "file", "attachment": "reports/q3.pdf", "to_formats": ["md"]},
    {"base64": "JVBERi0...", "filename": "inline.pdf"}
  ]

SUPPORTED FORMATS:
  from:  docx, pptx, html, image, pdf, asciidoc, md, xlsx
  to:    md, json, html, text, doctags

ENVIRONMENT VARIABLES:
  DOCLING_SERVE_URL        Base URL of the Docling Serve instance
  DOCLING_FROM_FORMATS     Default input formats (comma-separated)
  DOCLING_TO_FORMATS       Default output formats (comma-separated)
  DOCLING_OPTIONS          Default advanced options (JSON object)
  DOCLING_TIMEOUT          Per-request timeout in seconds

SETUP:
  1. Start the service:   docker run -p 5001:5001 ghcr.io/docling-project/docling-serve
  2. Convert:             docling-convert document.pdf -o document.json

  The service does the heavy lifting (OCR, layout analysis, table structure);
  this tool only forwards requests and relays responses.
"#;

/// Forward document-conversion requests to a Docling Serve instance.
#[derive(Parser, Debug)]
#[command(
    name = "docling-convert",
    version,
    about = "Convert documents through a Docling Serve instance",
    long_about = "Forward document-conversion requests to a Docling Serve instance and print \
its responses. Documents are named by URL (fetched by the service), embedded as base64, or \
uploaded from local files as multipart form data. Conversion itself happens server-side.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Document URLs (source mode) or local file paths (file mode).
    input: Vec<String>,

    /// Write responses to this file instead of stdout.
    #[arg(short, long, env = "DOCLING_CONVERT_OUTPUT")]
    output: Option<PathBuf>,

    /// Base URL of the Docling Serve instance.
    #[arg(
        long,
        env = "DOCLING_SERVE_URL",
        default_value = DEFAULT_ENDPOINT_URL,
        long_help = "Base URL of the Docling Serve instance, without the /v1/convert/... path.\n\
          The convert path is appended per request depending on the mode."
    )]
    endpoint_url: String,

    /// Force the request mode instead of inferring it from the inputs.
    #[arg(
        long,
        value_enum,
        long_help = "Request mode. Inferred when not set: HTTP(S) inputs run as one JSON \
          request naming every URL; local files upload as one multipart request each."
    )]
    mode: Option<ModeArg>,

    /// Base64 document payload.
    #[arg(
        long,
        long_help = "Base64 document payload. In source mode it is embedded in the JSON body \
          as-is; in file mode it is decoded and uploaded as its own record."
    )]
    base64: Option<String>,

    /// Filename for base64 payloads.
    #[arg(long, requires = "base64")]
    filename: Option<String>,

    /// Run a batch of records from a JSON manifest.
    #[arg(long, value_name = "FILE", conflicts_with_all = ["input", "base64"])]
    records: Option<PathBuf>,

    /// Input formats the service should accept (comma-separated).
    #[arg(long = "from", env = "DOCLING_FROM_FORMATS", value_name = "FORMATS")]
    from_formats: Option<String>,

    /// Output formats to request (comma-separated). Default: md.
    #[arg(long = "to", env = "DOCLING_TO_FORMATS", value_name = "FORMATS")]
    to_formats: Option<String>,

    /// Advanced service options as a JSON object, merged into the request.
    #[arg(
        long,
        env = "DOCLING_OPTIONS",
        value_name = "JSON",
        long_help = "Advanced service options as a JSON object, e.g. '{\"do_ocr\": true}'.\n\
          Keys are passed through verbatim and take precedence over --from/--to."
    )]
    options: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, env = "DOCLING_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Pretty-print the JSON output.
    #[arg(long, env = "DOCLING_PRETTY")]
    pretty: bool,

    /// Disable the progress bar.
    #[arg(long, env = "DOCLING_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCLING_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors and the responses themselves.
    #[arg(short, long, env = "DOCLING_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ModeArg {
    Source,
    File,
}

impl From<ModeArg> for EndpointKind {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Source => EndpointKind::Source,
            ModeArg::File => EndpointKind::File,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress;
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

    // ── Build client and batch defaults ──────────────────────────────────
    let config = ClientConfig::builder()
        .endpoint_url(&cli.endpoint_url)
        .timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;
    let client = DoclingClient::new(config).context("Failed to build HTTP client")?;

    let mut defaults = RecordDefaults::for_config(client.config());
    if let Some(ref raw) = cli.from_formats {
        defaults.from_formats = parse_formats::<InputFormat>(raw, "--from")?;
    }
    if let Some(ref raw) = cli.to_formats {
        defaults.to_formats = parse_formats::<OutputFormat>(raw, "--to")?;
    }

    let records = collect_records(&cli)?;
    let total = records.len();

    // ── Run the batch ────────────────────────────────────────────────────
    let progress = CliBatchProgress::new(show_progress);
    let responses = match run_batch(&client, &defaults, records, &progress).await {
        Ok(responses) => responses,
        Err(e) => {
            let ctx = match progress.failed_record() {
                Some(i) => format!("Record {}/{} failed", i + 1, total),
                None => "Batch failed".to_string(),
            };
            return Err(anyhow::Error::new(e).context(ctx));
        }
    };

    // ── Print or write the responses ─────────────────────────────────────
    let rendered = render_responses(&responses, cli.pretty)?;

    if let Some(ref output_path) = cli.output {
        write_atomic(output_path, &format!("{rendered}\n"))
            .await
            .with_context(|| format!("Failed to write {}", output_path.display()))?;
        if !cli.quiet {
            eprintln!(
                "{}  {} records  →  {}",
                green("✔"),
                total,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        // Ensure a trailing newline on stdout.
        if !rendered.ends_with('\n') {
            handle.write_all(b"\n").ok();
        }
    }

    Ok(())
}

/// Map CLI args to the batch of records to run.
fn collect_records(cli: &Cli) -> Result<Vec<ConversionRecord>> {
    let cli_options = cli
        .options
        .as_deref()
        .map(|raw| AdvancedOptions::Text(raw.to_string()));

    if let Some(ref manifest) = cli.records {
        let text = std::fs::read_to_string(manifest)
            .with_context(|| format!("Failed to read manifest {}", manifest.display()))?;
        let mut records: Vec<ConversionRecord> = serde_json::from_str(&text)
            .with_context(|| format!("Manifest {} is not a JSON array of records", manifest.display()))?;
        if records.is_empty() {
            anyhow::bail!("Manifest {} contains no records", manifest.display());
        }
        // CLI options are a batch-wide default; entries that set their own
        // keep them.
        for record in &mut records {
            if record.advanced_options.is_none() {
                record.advanced_options = cli_options.clone();
            }
        }
        return Ok(records);
    }

    let (urls, files): (Vec<&String>, Vec<&String>) =
        cli.input.iter().partition(|s| looks_like_url(s));

    let mode = match cli.mode {
        Some(m) => EndpointKind::from(m),
        None if files.is_empty() => EndpointKind::Source,
        None if urls.is_empty() => EndpointKind::File,
        None => anyhow::bail!(
            "Inputs mix URLs and local files; run them separately or force --mode"
        ),
    };

    let mut records = Vec::new();
    match mode {
        // One JSON request naming every URL, plus the base64 payload if any.
        EndpointKind::Source => {
            if !files.is_empty() {
                anyhow::bail!(
                    "Source mode takes HTTP(S) URLs, got a local path: {}",
                    files[0]
                );
            }
            let source_urls = (!urls.is_empty())
                .then(|| urls.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(","));
            if source_urls.is_none() && cli.base64.is_none() {
                anyhow::bail!("No input given; pass URLs, file paths, --base64 or --records");
            }
            records.push(ConversionRecord {
                source_urls,
                base64: cli.base64.clone(),
                filename: cli.filename.clone(),
                advanced_options: cli_options,
                ..Default::default()
            });
        }
        // One multipart upload per file; a base64 payload is its own record.
        EndpointKind::File => {
            if !urls.is_empty() {
                anyhow::bail!("File mode takes local paths, got a URL: {}", urls[0]);
            }
            for path in &files {
                records.push(ConversionRecord {
                    endpoint: EndpointKind::File,
                    attachment: Some(PathBuf::from(path.as_str())),
                    advanced_options: cli_options.clone(),
                    ..Default::default()
                });
            }
            if let Some(ref b64) = cli.base64 {
                records.push(ConversionRecord {
                    endpoint: EndpointKind::File,
                    base64: Some(b64.clone()),
                    filename: cli.filename.clone(),
                    advanced_options: cli_options.clone(),
                    ..Default::default()
                });
            }
            if records.is_empty() {
                anyhow::bail!("No input given; pass URLs, file paths, --base64 or --records");
            }
        }
    }
    Ok(records)
}

fn looks_like_url(s: &str) -> bool {
    s.starts_with("http://") || s.starts_with("https://")
}

/// First line of an error message, shortened to keep the log line tidy.
///
/// Truncation counts characters, not bytes: API errors relay the raw
/// response text, which is not guaranteed to be ASCII.
fn truncate_error_line(error: &str) -> String {
    let line = error.lines().next().unwrap_or("");
    if line.chars().count() > 80 {
        let mut msg: String = line.chars().take(79).collect();
        msg.push('\u{2026}');
        msg
    } else {
        line.to_string()
    }
}

/// Parse a comma-separated format list via the library's `FromStr` impls.
fn parse_formats<F>(raw: &str, flag: &str) -> Result<Vec<F>>
where
    F: std::str::FromStr<Err = docling_serve_client::DoclingError>,
{
    let formats: Vec<F> = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<F>())
        .collect::<docling_serve_client::Result<_>>()
        .with_context(|| format!("Invalid {flag} value: '{raw}'"))?;
    if formats.is_empty() {
        anyhow::bail!("{flag} must name at least one format, got: '{raw}'");
    }
    Ok(formats)
}

/// Serialise the responses: one record prints its body alone, a batch
/// prints a JSON array in record order.
fn render_responses(responses: &[ConversionResponse], pretty: bool) -> Result<String> {
    let value = match responses {
        [single] => single.body.clone(),
        many => serde_json::Value::Array(many.iter().map(|r| r.body.clone()).collect()),
    };
    let rendered = if pretty {
        serde_json::to_string_pretty(&value)
    } else {
        serde_json::to_string(&value)
    };
    rendered.context("Failed to serialise responses")
}

/// Atomic write: write to temp, then rename, so a crash never leaves a
/// partial output file.
async fn write_atomic(path: &Path, contents: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            tokio::fs::create_dir_all(parent).await?;
        }
    }
    let tmp_path = path.with_extension("json.tmp");
    tokio::fs::write(&tmp_path, contents).await?;
    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}
