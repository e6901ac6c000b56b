//! CLI binary for docask.
//!
//! A thin shim over the library crate that maps CLI flags to `AskConfig`,
//! loads the document, and runs either a one-shot question or an
//! interactive ask loop.

use anyhow::{Context, Result};
use clap::Parser;
use docask::{AskConfig, AskProgressCallback, AskSession, ProgressCallback};
use indicatif::{ProgressBar, ProgressStyle};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a spinner while the request is in flight,
/// with a visible line per rate-limit wait so long pauses never look like
/// a hang.
///
/// A finished indicatif bar is inert (`set_message` becomes a no-op), so the
/// interactive loop gets a fresh spinner per question: `begin` swaps one in,
/// `finish` clears it.
struct CliProgressCallback {
    bar: Mutex<ProgressBar>,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            bar: Mutex::new(ProgressBar::hidden()),
        })
    }

    /// Start a fresh spinner for the next question.
    fn begin(&self) {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix("Asking");
        bar.enable_steady_tick(Duration::from_millis(80));

        let mut slot = self.bar.lock().unwrap();
        slot.finish_and_clear();
        *slot = bar;
    }

    fn finish(&self) {
        self.bar.lock().unwrap().finish_and_clear();
    }
}

impl AskProgressCallback for CliProgressCallback {
    fn on_attempt_start(&self, attempt: u32, max_attempts: u32) {
        let bar = self.bar.lock().unwrap();
        if attempt == 1 {
            bar.set_message("waiting for the model…");
        } else {
            bar.set_message(format!("attempt {attempt}/{max_attempts}…"));
        }
    }

    fn on_retry_wait(&self, delay_secs: u64, next_attempt: u32, max_attempts: u32) {
        let bar = self.bar.lock().unwrap();
        bar.println(format!(
            "  {} Rate limited — waiting {}s before attempt {}/{}",
            yellow("⚠"),
            delay_secs,
            next_attempt,
            max_attempts,
        ));
        bar.set_message(format!("waiting {delay_secs}s…"));
    }

    fn on_reply(&self, reply_len: usize) {
        self.bar.lock().unwrap().println(format!(
            "  {} Reply received {}",
            green("✓"),
            dim(&format!("({reply_len} chars)"))
        ));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # One-shot question
  docask informe.pdf -q "¿Cuál es la conclusión principal?"

  # Interactive loop (one question per line, Ctrl-D to exit)
  docask notas.txt

  # Custom model and endpoint
  docask --model grok-2-1212 --endpoint https://api.x.ai/v1/chat/completions doc.pdf

  # Literal extraction instead of paraphrase
  docask --temperature 0.0 contrato.pdf -q "¿Qué dice la cláusula 4?"

ENVIRONMENT VARIABLES:
  DOCASK_API_KEY   Bearer token for the chat endpoint (preferred)
  XAI_API_KEY      Fallback token variable

SETUP:
  1. Set API key:   export DOCASK_API_KEY=xai-...
  2. Ask:           docask document.pdf -q "..."

Scanned PDFs with no embedded text layer come back empty — docask reads the
text layer only and does no OCR.
"#;

/// Ask questions about a PDF or text document via a chat-completion API.
#[derive(Parser, Debug)]
#[command(
    name = "docask",
    version,
    about = "Ask questions about a PDF or text document via a chat-completion API",
    long_about = "Extracts the text of a local PDF or plain-text file and answers questions \
about it through an OpenAI-compatible chat-completion endpoint. The whole document travels \
with every question; no index, no embeddings, no stored history.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF or plain-text file.
    file: PathBuf,

    /// Ask one question and exit; omit for an interactive loop on stdin.
    #[arg(short, long)]
    question: Option<String>,

    /// Chat model ID.
    #[arg(long, env = "DOCASK_MODEL")]
    model: Option<String>,

    /// Chat-completion endpoint URL.
    #[arg(long, env = "DOCASK_ENDPOINT")]
    endpoint: Option<String>,

    /// Bearer token. Falls back to DOCASK_API_KEY, then XAI_API_KEY.
    #[arg(long, env = "DOCASK_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Sampling temperature (0.0–2.0).
    #[arg(long, env = "DOCASK_TEMPERATURE", default_value_t = 0.7)]
    temperature: f64,

    /// Attempts per question when rate limited.
    #[arg(long, env = "DOCASK_MAX_RETRIES", default_value_t = 5)]
    max_retries: u32,

    /// Per-request HTTP timeout in seconds.
    #[arg(long, env = "DOCASK_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "DOCASK_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Disable the progress spinner.
    #[arg(long, env = "DOCASK_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "DOCASK_VERBOSE")]
    verbose: bool,

    /// Suppress all output except replies and errors.
    #[arg(short, long, env = "DOCASK_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the spinner is active; the
    // spinner provides all the feedback that matters to the user.
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

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb = if show_progress {
        Some(CliProgressCallback::new())
    } else {
        None
    };

    let config = build_config(&cli, progress_cb.clone().map(|cb| cb as ProgressCallback))?;

    // ── Load the document ────────────────────────────────────────────────
    let mut session = AskSession::new(config).context("Invalid configuration")?;
    session
        .load_path(&cli.file)
        .with_context(|| format!("Failed to load '{}'", cli.file.display()))?;

    if !cli.quiet {
        let chars = session.document_text().map(str::len).unwrap_or(0);
        if chars == 0 {
            eprintln!(
                "{} '{}' yielded no text (scanned PDF without a text layer?)",
                yellow("⚠"),
                cli.file.display()
            );
        } else {
            eprintln!(
                "{} Loaded {} {}",
                green("✔"),
                bold(&cli.file.display().to_string()),
                dim(&format!("({chars} chars)")),
            );
        }
    }

    // ── One-shot or interactive ──────────────────────────────────────────
    if let Some(ref question) = cli.question {
        if let Some(ref cb) = progress_cb {
            cb.begin();
        }
        let reply = session.ask(question).await;
        if let Some(ref cb) = progress_cb {
            cb.finish();
        }
        println!("{}", reply.context("Question failed")?);
        return Ok(());
    }

    run_interactive(&session, progress_cb.as_deref()).await
}

/// Read questions line-by-line from stdin until EOF. A failed question is
/// reported and the loop continues; only I/O errors end the session early.
async fn run_interactive(
    session: &AskSession,
    progress: Option<&CliProgressCallback>,
) -> Result<()> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        eprint!("{} ", cyan("pregunta>"));
        io::stderr().flush().ok();

        let line = match lines.next() {
            Some(line) => line.context("Failed to read from stdin")?,
            None => break, // EOF
        };
        if line.trim().is_empty() {
            continue;
        }

        if let Some(cb) = progress {
            cb.begin();
        }
        match session.ask(&line).await {
            Ok(reply) => {
                if let Some(cb) = progress {
                    cb.finish();
                }
                println!("{reply}\n");
            }
            Err(e) => {
                if let Some(cb) = progress {
                    cb.finish();
                }
                eprintln!("{}\n", e);
            }
        }
    }

    Ok(())
}

/// Map CLI args to `AskConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<AskConfig> {
    let api_key = match cli.api_key.clone() {
        Some(key) => key,
        None => std::env::var("XAI_API_KEY")
            .context("No API key found. Set DOCASK_API_KEY or XAI_API_KEY, or pass --api-key")?,
    };

    let mut builder = AskConfig::builder()
        .api_key(api_key)
        .temperature(cli.temperature)
        .max_retries(cli.max_retries)
        .api_timeout_secs(cli.api_timeout);

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref endpoint) = cli.endpoint {
        builder = builder.endpoint(endpoint);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}
