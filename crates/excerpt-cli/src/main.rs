//! `excerpt` - render a highlighted window of a PHP file.
//!
//! ```text
//! excerpt src/Foo.php --line 42 --buffer 5 --styles > excerpt.html
//! excerpt src/Foo.php --start 10 --end 20 --format json
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`).

use clap::{Parser, ValueEnum};
use excerpt_core::{DEFAULT_BUFFER, Lexer, MAX_BUFFER, Window, normalize_to_lf};
use excerpt_core_php::{PhpHighlighter, PhpLexError, PhpLexer, highlighter};
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(
    name = "excerpt",
    version,
    about = "Render a line-numbered, highlighted excerpt of a PHP file"
)]
struct Cli {
    /// PHP source file.
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// First line to render.
    #[arg(long, conflicts_with = "line")]
    start: Option<usize>,

    /// Last line to render.
    #[arg(long, conflicts_with = "line")]
    end: Option<usize>,

    /// Line to highlight.
    #[arg(long, conflicts_with = "line")]
    focus: Option<usize>,

    /// Render `--buffer` lines either side of this line and highlight it.
    #[arg(long)]
    line: Option<usize>,

    /// Context lines either side of `--line` (1 to 30).
    #[arg(long, requires = "line", default_value_t = DEFAULT_BUFFER)]
    buffer: usize,

    /// Output format.
    #[arg(long, value_enum, default_value_t = Format::Html)]
    format: Format,

    /// Prepend the bundled stylesheet as a `<style>` block (html only).
    #[arg(long)]
    styles: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// The `<samp class="source">` markup block.
    Html,
    /// The rendered lines and edge markers as JSON.
    Json,
    /// The raw lexer output as JSON.
    Tokens,
}

#[derive(Debug, Error)]
enum CliError {
    #[error("cannot read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Lex(#[from] PhpLexError),

    #[error("cannot serialize output: {0}")]
    Json(#[from] serde_json::Error),
}

impl Cli {
    fn window(&self) -> Window {
        match self.line {
            Some(line) => Window::around(line, self.buffer, MAX_BUFFER),
            None => Window {
                start_line: self.start,
                end_line: self.end,
                focus_line: self.focus,
            },
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    match run(&cli) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            error!(file = %cli.file.display(), "{err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<String, CliError> {
    let source = std::fs::read(&cli.file).map_err(|source| CliError::Read {
        path: cli.file.clone(),
        source,
    })?;
    let source = String::from_utf8_lossy(&source);
    debug!(file = %cli.file.display(), bytes = source.len(), "read source");
    render(cli, &highlighter(), &source)
}

fn render(cli: &Cli, hl: &PhpHighlighter, source: &str) -> Result<String, CliError> {
    let window = cli.window();
    match cli.format {
        Format::Html => {
            let markup = hl.highlight(source, window)?;
            if cli.styles {
                Ok(format!(
                    "{}\n{markup}",
                    PhpHighlighter::export_inline_styles()
                ))
            } else {
                Ok(markup)
            }
        }
        Format::Json => Ok(serde_json::to_string_pretty(&hl.render(source, window)?)?),
        Format::Tokens => {
            let tokens = PhpLexer.tokenize(&normalize_to_lf(source))?;
            Ok(serde_json::to_string_pretty(&tokens)?)
        }
    }
}
