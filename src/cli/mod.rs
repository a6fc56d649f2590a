//! Command-line parsing for the ETF share collector.
//!
//! The goal of this module is to keep **argument parsing** separate from the
//! collection pipeline. Every collect option can also come from an `ETF_SHARES_*`
//! environment variable (or a `.env` file).

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{DEFAULT_MIN_POINTS, DEFAULT_TABLE_MARKER, DEFAULT_WINDOW_SIZE, Engine};
use crate::render::DEFAULT_USER_AGENT;

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "etf-shares", version, about = "Daily ETF on-exchange share tracker")]
pub struct Cli {
    /// Log level when RUST_LOG is not set (error, warn, info, debug, trace).
    #[arg(long, global = true, env = "ETF_SHARES_LOG", default_value = "info")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Collect share histories, print the ranking, and write chart/report/exports.
    Collect(CollectArgs),
    /// Print the tracked instruments (code,name) and exit.
    List,
}

/// Options for a collection run.
#[derive(Debug, Parser, Clone)]
pub struct CollectArgs {
    /// Browsing engine.
    #[arg(long, value_enum, env = "ETF_SHARES_ENGINE", default_value_t = Engine::Chrome)]
    pub engine: Engine,

    /// Chromium/Chrome binary (auto-detected when omitted).
    #[arg(long, env = "ETF_SHARES_CHROME_PATH")]
    pub chrome_path: Option<PathBuf>,

    /// User-agent string sent to the data site.
    #[arg(long, env = "ETF_SHARES_USER_AGENT", default_value = DEFAULT_USER_AGENT)]
    pub user_agent: String,

    /// Only collect these codes (comma-separated).
    #[arg(long, value_delimiter = ',', env = "ETF_SHARES_ONLY")]
    pub only: Vec<String>,

    /// Most recent points kept per instrument (also caps rows read).
    #[arg(long, env = "ETF_SHARES_WINDOW", default_value_t = DEFAULT_WINDOW_SIZE)]
    pub window: usize,

    /// A series needs more than this many points to be kept.
    #[arg(long, env = "ETF_SHARES_MIN_POINTS", default_value_t = DEFAULT_MIN_POINTS)]
    pub min_points: usize,

    /// Text identifying the share-history table.
    #[arg(long, env = "ETF_SHARES_TABLE_MARKER", default_value = DEFAULT_TABLE_MARKER)]
    pub table_marker: String,

    /// Max wait for the page to render a table after navigation (ms).
    #[arg(long, env = "ETF_SHARES_SETTLE_TIMEOUT_MS", default_value_t = 10_000)]
    pub settle_timeout_ms: u64,

    /// Max wait for the history tab, and for its table after clicking (ms).
    #[arg(long, env = "ETF_SHARES_TAB_TIMEOUT_MS", default_value_t = 5_000)]
    pub tab_timeout_ms: u64,

    /// Delay between readiness checks (ms).
    #[arg(long, env = "ETF_SHARES_POLL_INTERVAL_MS", default_value_t = 250)]
    pub poll_interval_ms: u64,

    /// Directory for the chart, report and relative export paths.
    #[arg(long, env = "ETF_SHARES_OUT_DIR", default_value = ".")]
    pub out_dir: PathBuf,

    /// Chart file name, relative to --out-dir.
    #[arg(long, default_value = "etf_trends.svg")]
    pub chart_file: String,

    /// Report page file name, relative to --out-dir.
    #[arg(long, default_value = "index.html")]
    pub report_file: String,

    /// Font file whose family is used for chart text.
    #[arg(long, env = "ETF_SHARES_FONT_FILE", default_value = "SimHei.ttf")]
    pub font_file: PathBuf,

    /// Skip the chart.
    #[arg(long)]
    pub no_chart: bool,

    /// Skip the report page.
    #[arg(long)]
    pub no_report: bool,

    /// Export the dataset to JSON.
    #[arg(long = "export-json", value_name = "PATH")]
    pub export_json: Option<PathBuf>,

    /// Export the dataset to long-format CSV.
    #[arg(long = "export-csv", value_name = "PATH")]
    pub export_csv: Option<PathBuf>,
}
