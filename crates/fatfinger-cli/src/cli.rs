//! CLI argument definitions for fatfinger.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Run the candidate pipeline over top-volume or explicit targets |
//! | `ipo` | Candidate pairs for priced IPOs in a year range |
//! | `check` | Classify one target/candidate pair offline |
//! | `validate` | Check tickers for recent trading volume |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table, csv) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--config` | none | TOML pipeline configuration |
//! | `--mock` | `false` | Use the built-in offline dataset |
//! | `--verbose` | `false` | Debug logging when `RUST_LOG` is unset |
//!
//! # Examples
//!
//! ```bash
//! fatfinger scan --top 50 --format csv > candidates.csv
//! fatfinger scan --targets TSLA,NVDA --proximate-only --pretty
//! fatfinger ipo --start-year 2023 --end-year 2024
//! fatfinger check TSLA TALA --candidate-name "Taland Corp"
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Finds tickers one keystroke away from heavily traded stocks.
#[derive(Debug, Parser)]
#[command(
    name = "fatfinger",
    author,
    version,
    about = "Fat-finger typo candidates for exchange tickers"
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Pipeline configuration file (TOML).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Use the built-in offline dataset instead of live providers.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    /// Log at debug level (ignored when RUST_LOG is set).
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Ndjson,
    Table,
    Csv,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full candidate pipeline.
    Scan(ScanArgs),
    /// Candidate pairs whose target is a recent IPO.
    Ipo(IpoArgs),
    /// Distance, proximity and design checks for a single pair.
    Check(CheckArgs),
    /// Recent-volume check for the given tickers.
    Validate(ValidateArgs),
}

impl Command {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Scan(_) => "scan",
            Self::Ipo(_) => "ipo",
            Self::Check(_) => "check",
            Self::Validate(_) => "validate",
        }
    }
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Number of most-traded tickers to use as targets.
    #[arg(long)]
    pub top: Option<usize>,

    /// Explicit comma-separated targets; overrides --top.
    #[arg(long, value_delimiter = ',')]
    pub targets: Vec<String>,

    /// Maximum edit distance.
    #[arg(long)]
    pub threshold: Option<usize>,

    /// Keep only adjacent-key substitutions.
    #[arg(long, default_value_t = false)]
    pub proximate_only: bool,

    /// Skip the recent-volume check on candidates.
    #[arg(long, default_value_t = false)]
    pub skip_validation: bool,
}

#[derive(Debug, Args)]
pub struct IpoArgs {
    /// First calendar year (defaults to last year).
    #[arg(long)]
    pub start_year: Option<i32>,

    /// Last calendar year, inclusive (defaults to this year).
    #[arg(long)]
    pub end_year: Option<i32>,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    pub target: String,
    pub candidate: String,

    #[arg(long, default_value = "")]
    pub target_name: String,

    #[arg(long, default_value = "")]
    pub candidate_name: String,
}

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[arg(required = true)]
    pub tickers: Vec<String>,
}
