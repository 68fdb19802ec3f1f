//! CLI argument definitions for marketpulse.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `stocks` | Fetch stock quotes in rate-limited groups |
//! | `crypto` | Aggregate a crypto market snapshot |
//! | `alerts` | Evaluate threshold alerts over the crypto snapshot |
//! | `opportunities` | Filter, score and rank domain and business listings |
//! | `domains` | Check domain registration availability |
//! | `report` | Render a full market report as JSON or Markdown |
//! | `sources` | List configured providers and their capabilities |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, text) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings and errors as failures |
//! | `--timeout-ms` | env or `5000` | Per-request timeout in ms |
//! | `--currency` | env or `USD` | Snapshot currency |
//! | `--mock` | `false` | Serve every provider from its mocked tier |
//!
//! # Examples
//!
//! ```bash
//! marketpulse stocks AAPL MSFT --pretty
//! marketpulse opportunities --category saas --max-price 50000 --limit 3
//! marketpulse report --format text --output report.md
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use marketpulse_core::{OpportunityKind, ReportFormat};

/// Market pulse: aggregate, score and report on market data providers.
#[derive(Debug, Parser)]
#[command(
    name = "marketpulse",
    author,
    version,
    about = "Aggregate, score and report on market data providers",
    long_about = "marketpulse merges stock quotes, crypto listings and opportunity feeds \
from several rate-limited providers into one snapshot, derives alerts and rankings, \
and renders the result as JSON or Markdown.\n\
\n\
Credentials are read from MARKETPULSE_ALPHAVANTAGE_API_KEY / ALPHAVANTAGE_API_KEY and \
MARKETPULSE_COINMARKETCAP_API_KEY / COINMARKETCAP_API_KEY. Without a CoinMarketCap key \
the deterministic reference snapshot is served."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true)]
    pub timeout_ms: Option<u64>,

    /// Currency code for snapshots (e.g. USD).
    #[arg(long, global = true)]
    pub currency: Option<String>,

    /// Serve every provider from its mocked tier.
    #[arg(long, global = true, default_value_t = false)]
    pub mock: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// JSON envelope (structured report for `report`).
    Json,
    /// Human-readable text (Markdown for `report`).
    Text,
}

impl OutputFormat {
    pub const fn report_format(self) -> ReportFormat {
        match self {
            Self::Json => ReportFormat::Structured,
            Self::Text => ReportFormat::Text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KindArg {
    Domain,
    Business,
}

impl From<KindArg> for OpportunityKind {
    fn from(value: KindArg) -> Self {
        match value {
            KindArg::Domain => Self::Domain,
            KindArg::Business => Self::Business,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch stock quotes for one or more symbols.
    ///
    ///   marketpulse stocks AAPL MSFT GOOGL
    Stocks(StocksArgs),

    /// Aggregate the crypto market snapshot.
    Crypto,

    /// Evaluate threshold alerts over the crypto snapshot.
    Alerts,

    /// Filter, score and rank opportunity listings.
    ///
    ///   marketpulse opportunities --kind business --category saas --limit 5
    Opportunities(OpportunitiesArgs),

    /// Check domain registration availability.
    ///
    ///   marketpulse domains example.com launchpad.io
    Domains(DomainsArgs),

    /// Render the market report.
    ///
    ///   marketpulse report --format text --output report.md
    Report(ReportArgs),

    /// List configured providers and their capabilities.
    Sources,
}

#[derive(Debug, Args)]
pub struct StocksArgs {
    /// One or more stock tickers (e.g., AAPL, BRK.B).
    #[arg(required = true, num_args = 1..)]
    pub symbols: Vec<String>,
}

#[derive(Debug, Args)]
pub struct OpportunitiesArgs {
    /// Restrict to one listing kind.
    #[arg(long, value_enum)]
    pub kind: Option<KindArg>,

    /// Category, matched case-insensitively.
    #[arg(long)]
    pub category: Option<String>,

    /// Maximum asking price.
    #[arg(long)]
    pub max_price: Option<f64>,

    /// Minimum monthly revenue.
    #[arg(long)]
    pub min_revenue: Option<f64>,

    /// Title keyword; repeat for any-of matching.
    #[arg(long = "keyword")]
    pub keywords: Vec<String>,

    /// Maximum number of ranked results.
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Debug, Args)]
pub struct DomainsArgs {
    /// One or more domain names.
    #[arg(required = true, num_args = 1..)]
    pub domains: Vec<String>,
}

#[derive(Debug, Args)]
pub struct ReportArgs {
    /// Write the rendered report to this file instead of stdout.
    #[arg(long)]
    pub output: Option<PathBuf>,
}
