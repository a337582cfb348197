//! CLI argument definitions for `fcfe`.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `value` | Value a ticker across every source in its snapshot |
//! | `sensitivity` | Growth and discount-rate grid for one source |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--verbose` | `false` | Debug logging on stderr |
//!
//! # Examples
//!
//! ```bash
//! fcfe value AAPL --pretty
//! fcfe value AAPL --growth 0.06 --cost-of-equity 0.095 --format table
//! fcfe sensitivity MSFT --source "Yahoo Finance" --discount-rates 0.08,0.10,0.12
//! fcfe sensitivity MSFT --price 410 --terminal-growth 0.02 --years 10
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Multi-source FCFE valuation.
///
/// Reads per-source financial figures from a JSON snapshot, values each
/// source with a Free Cash Flow to Equity DCF model and reports the
/// cross-source average next to every per-source result.
#[derive(Debug, Parser)]
#[command(
    name = "fcfe",
    author,
    version,
    about = "Multi-source FCFE discounted-cash-flow valuation",
    long_about = "fcfe values an equity from several data sources at once. Each source's figures \
are run through the same FCFE model; failing sources are reported, never fatal.\n\
\n\
Model assumptions can also be set through FCFE_PROJECTION_YEARS, FCFE_GROWTH_RATE, \
FCFE_TERMINAL_GROWTH_RATE, FCFE_COST_OF_EQUITY and FCFE_SOURCE_TIMEOUT_MS; flags win over \
the environment."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Log at debug level on stderr (RUST_LOG takes precedence).
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summary.
    Table,
    /// Single JSON envelope.
    Json,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Value a ticker across every source in its snapshot.
    ///
    /// # Examples
    ///
    ///   fcfe value AAPL
    ///   fcfe value AAPL --price 187.5 --concurrent --pretty
    Value(ValueArgs),

    /// Re-value one source over a grid of growth and discount rates.
    ///
    /// # Examples
    ///
    ///   fcfe sensitivity AAPL
    ///   fcfe sensitivity AAPL --growth-rates 0.02,0.04,0.06
    Sensitivity(SensitivityArgs),
}

#[derive(Debug, Args)]
pub struct ValueArgs {
    /// Equity ticker, e.g. AAPL or BRK.B.
    pub ticker: String,

    /// Snapshot file; defaults to snapshots/<TICKER>.json.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Explicit FCFE growth rate (decimal).
    #[arg(long, allow_negative_numbers = true)]
    pub growth: Option<f64>,

    /// Per-source timeout in milliseconds.
    #[arg(long)]
    pub timeout_ms: Option<u64>,

    /// Query sources concurrently instead of one after another.
    #[arg(long, default_value_t = false)]
    pub concurrent: bool,
}

#[derive(Debug, Args)]
pub struct SensitivityArgs {
    /// Equity ticker, e.g. AAPL or BRK.B.
    pub ticker: String,

    /// Snapshot file; defaults to snapshots/<TICKER>.json.
    #[arg(long)]
    pub snapshot: Option<PathBuf>,

    /// Source to analyse; defaults to the first source with figures.
    #[arg(long)]
    pub source: Option<String>,

    #[command(flatten)]
    pub model: ModelArgs,

    /// Comma-separated growth rates (decimal).
    #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
    pub growth_rates: Vec<f64>,

    /// Comma-separated cost-of-equity values (decimal).
    #[arg(long, value_delimiter = ',')]
    pub discount_rates: Vec<f64>,
}

/// Price and model flags shared by `value` and `sensitivity`.
#[derive(Debug, Default, Args)]
pub struct ModelArgs {
    /// Market price overriding the snapshot's current price.
    #[arg(long)]
    pub price: Option<f64>,

    /// Terminal growth rate (decimal).
    #[arg(long, allow_negative_numbers = true)]
    pub terminal_growth: Option<f64>,

    /// Explicit cost of equity (decimal); CAPM per source when omitted.
    #[arg(long)]
    pub cost_of_equity: Option<f64>,

    /// Projection horizon in years.
    #[arg(long)]
    pub years: Option<u32>,
}
