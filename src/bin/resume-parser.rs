//! CLI binary for resume-parser.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ParserConfig` and writes or prints the artifact.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use resume_parser::{
    inspect_text, parse_resume, parse_resume_to_dir, ErrorKind, LinkPolicy, PageScope, ParserConfig,
    PipelineObserver, PipelineStage, ResumeParserError, ResumeSchema, UploadedFile,
};
use std::io::{self, Write};
use std::path::PathBuf;
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

// ── CLI observer using indicatif ─────────────────────────────────────────────

/// Spinner that follows the pipeline stage of the single request.
struct CliObserver {
    bar: ProgressBar,
}

impl CliObserver {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Parsing");
        bar.set_message("Waiting…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl PipelineObserver for CliObserver {
    fn on_stage(&self, stage: PipelineStage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_failed(&self, stage: PipelineStage, _error: &str) {
        self.bar.finish_and_clear();
        eprintln!("{} failed while {}", red("✘"), stage);
    }

    fn on_ready(&self, filename: &str, links_found: usize) {
        self.bar.finish_and_clear();
        eprintln!(
            "{} {}  {}",
            green("✔"),
            bold(filename),
            dim(&format!("{links_found} links"))
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Parse a resume, writing <Name>_resume_parsed.json to the current directory
  resume-parser resume.pdf

  # Write into a specific directory
  resume-parser resume.pdf -o parsed/

  # Print the JSON instead of writing a file
  resume-parser --stdout resume.pdf

  # Use every page, not just the first
  resume-parser --all-pages long_cv.pdf

  # Show the extracted text and links (no API key needed)
  resume-parser --text-only resume.pdf

  # Any OpenAI-compatible endpoint
  resume-parser --base-url http://localhost:11434/v1 --model llama3.1 resume.pdf

ENVIRONMENT VARIABLES:
  OPENAI_API_KEY              API key (name configurable with --api-key-env)
  RESUME_PARSER_MODEL         Override model ID
  RESUME_PARSER_BASE_URL      Override API base URL
  PDFIUM_LIB_PATH             Path to libpdfium (file or directory)

  A .env file in the working directory is loaded before the environment
  is read.
"#;

/// Parse PDF resumes into structured JSON.
#[derive(Parser, Debug)]
#[command(
    name = "resume-parser",
    version,
    about = "Parse PDF resumes into structured JSON",
    long_about = "Extract the text of a PDF resume, ask a language model to fill a strict JSON \
schema, and overwrite the `links` field with every URL found in the raw text. Works with any \
OpenAI-compatible endpoint that supports json_schema response formats.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF resume.
    input: PathBuf,

    /// Directory for the `<Name>_resume_parsed.json` artifact.
    #[arg(short, long, env = "RESUME_PARSER_OUTPUT_DIR", default_value = ".")]
    output_dir: PathBuf,

    /// Print the artifact JSON to stdout instead of writing a file.
    #[arg(long, env = "RESUME_PARSER_STDOUT")]
    stdout: bool,

    /// Model ID.
    #[arg(long, env = "RESUME_PARSER_MODEL")]
    model: Option<String>,

    /// Base URL of an OpenAI-compatible API.
    #[arg(long, env = "RESUME_PARSER_BASE_URL")]
    base_url: Option<String>,

    /// Environment variable holding the API key.
    #[arg(long, env = "RESUME_PARSER_API_KEY_ENV", default_value = "OPENAI_API_KEY")]
    api_key_env: String,

    /// Send the text of every page, not just the first.
    #[arg(long, env = "RESUME_PARSER_ALL_PAGES")]
    all_pages: bool,

    /// Strip trailing punctuation such as `.` or `)` from extracted links.
    #[arg(long, env = "RESUME_PARSER_TRIM_LINK_PUNCTUATION")]
    trim_link_punctuation: bool,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "RESUME_PARSER_PASSWORD")]
    password: Option<String>,

    /// JSON Schema file replacing the built-in resume schema.
    #[arg(long, env = "RESUME_PARSER_SCHEMA")]
    schema: Option<PathBuf>,

    /// Path to a text file containing a custom system prompt.
    #[arg(long, env = "RESUME_PARSER_SYSTEM_PROMPT")]
    system_prompt: Option<PathBuf>,

    /// Max completion tokens.
    #[arg(long, env = "RESUME_PARSER_MAX_TOKENS", default_value_t = 4096)]
    max_tokens: usize,

    /// API call timeout in seconds (0 disables the timeout).
    #[arg(long, env = "RESUME_PARSER_API_TIMEOUT", default_value_t = 120)]
    api_timeout: u64,

    /// Print extracted text and links only, no model call.
    #[arg(long)]
    text_only: bool,

    /// Disable the progress spinner.
    #[arg(long, env = "RESUME_PARSER_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "RESUME_PARSER_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "RESUME_PARSER_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before clap reads `env =` fallbacks.
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner covers INFO-level progress; keep library logs quiet unless asked.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.text_only;
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

    match run(&cli, show_progress).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(&e),
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    let upload = UploadedFile::from_path(&cli.input).await?;

    let mut config = build_config(cli).await?;
    // Start the spinner only once nothing else can fail before the pipeline runs.
    if show_progress {
        config.observer = Some(CliObserver::new() as Arc<dyn PipelineObserver>);
    }

    // ── Text-only mode ───────────────────────────────────────────────────
    if cli.text_only {
        let preview = inspect_text(&upload, &config).await?;
        println!("File:    {}", preview.name);
        println!("Pages:   {} ({} used)", preview.page_count, preview.pages_used);
        println!("Links:   {}", preview.links.len());
        for link in &preview.links {
            println!("  {link}");
        }
        println!();
        println!("{}", preview.text);
        return Ok(());
    }

    // ── Parse ────────────────────────────────────────────────────────────
    if cli.stdout {
        let artifact = parse_resume(&upload, &config).await?;
        let json = artifact.to_json_pretty()?;
        let stdout = io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(json.as_bytes())
            .context("Failed to write to stdout")?;
        handle.write_all(b"\n").ok();
    } else {
        let (artifact, path) = parse_resume_to_dir(&upload, &cli.output_dir, &config).await?;
        if !cli.quiet {
            eprintln!(
                "{}  {} links  {}ms  →  {}",
                green("✔"),
                artifact.stats.links_found,
                artifact.stats.total_ms,
                bold(&path.display().to_string()),
            );
            eprintln!(
                "   {} tokens in  /  {} tokens out",
                dim(&artifact.stats.input_tokens.to_string()),
                dim(&artifact.stats.output_tokens.to_string()),
            );
        }
    }

    Ok(())
}

/// Map CLI args to `ParserConfig`.
async fn build_config(cli: &Cli) -> Result<ParserConfig> {
    let mut builder = ParserConfig::builder()
        .api_key_env(&cli.api_key_env)
        .max_tokens(cli.max_tokens)
        .api_timeout_secs((cli.api_timeout > 0).then_some(cli.api_timeout))
        .pages(if cli.all_pages {
            PageScope::All
        } else {
            PageScope::First
        })
        .link_policy(if cli.trim_link_punctuation {
            LinkPolicy::TrimTrailingPunctuation
        } else {
            LinkPolicy::Verbatim
        });

    if let Some(ref model) = cli.model {
        builder = builder.model(model);
    }
    if let Some(ref url) = cli.base_url {
        builder = builder.base_url(url);
    }
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd);
    }
    if let Some(ref path) = cli.schema {
        builder = builder.schema(ResumeSchema::from_file(path)?);
    }
    if let Some(ref path) = cli.system_prompt {
        let prompt = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read system prompt from {:?}", path))?;
        builder = builder.system_prompt(prompt);
    }

    Ok(builder.build()?)
}

/// Print an error by category and pick the exit code.
fn report(err: &anyhow::Error) -> ExitCode {
    let Some(e) = err.downcast_ref::<ResumeParserError>() else {
        eprintln!("{} {:#}", red("error:"), err);
        return ExitCode::FAILURE;
    };

    match e.kind() {
        ErrorKind::Configuration => {
            eprintln!("{} {}", yellow("configuration error:"), e);
            ExitCode::from(2)
        }
        ErrorKind::Extraction | ErrorKind::NoFileProvided => {
            eprintln!("{} {}", red("could not read resume:"), e);
            ExitCode::from(3)
        }
        ErrorKind::RemoteService => {
            eprintln!("{} {}", red("model request failed:"), e);
            ExitCode::from(4)
        }
        ErrorKind::Output | ErrorKind::Internal => {
            eprintln!("{} {}", red("error:"), e);
            ExitCode::FAILURE
        }
    }
}
