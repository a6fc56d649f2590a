//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - collects share histories (`pipeline`)
//! - prints the ranking
//! - writes the chart, report page and optional exports

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{info, warn};

use crate::cli::{CollectArgs, Command};
use crate::domain::{Instrument, PipelineConfig, Series, WaitConfig};
use crate::error::{AppError, EXIT_OUTPUT, EXIT_SETUP};
use crate::plot::ChartConfig;
use crate::render::SessionOptions;
use crate::report::ReportContext;

pub mod pipeline;

/// Entry point for the `etf-shares` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();

    // `etf-shares` and `etf-shares --only 510300` behave like `etf-shares collect ...`.
    let argv = rewrite_args(std::env::args().collect());
    let cli = crate::cli::Cli::parse_from(argv);
    crate::logging::init_logging(&cli.log_level);

    match cli.command {
        Command::Collect(args) => handle_collect(args),
        Command::List => {
            for inst in crate::registry::instruments() {
                println!("{},{}", inst.id, inst.display_name);
            }
            Ok(())
        }
    }
}

fn handle_collect(args: CollectArgs) -> Result<(), AppError> {
    let config = pipeline_config_from_args(&args)?;
    let instruments = instruments_from_args(&args)?;
    let options = SessionOptions {
        engine: args.engine,
        user_agent: args.user_agent.clone(),
        chrome_path: args.chrome_path.clone(),
    };

    let report = pipeline::collect(&instruments, &options, &config)?;
    let failures = crate::report::format_failures(&report);
    let dataset = report.into_dataset()?;

    let ctx = ReportContext::now(config.window_size);
    let ranked = crate::report::rank_by_latest(&dataset);
    println!("{}", crate::report::format_rankings(&ranked, ctx));
    if !failures.is_empty() {
        print!("{failures}");
    }

    let writes_files =
        !args.no_chart || !args.no_report || args.export_json.is_some() || args.export_csv.is_some();
    if writes_files {
        std::fs::create_dir_all(&args.out_dir).map_err(|e| {
            AppError::new(
                EXIT_OUTPUT,
                format!("Failed to create output dir '{}': {e}", args.out_dir.display()),
            )
        })?;
    }

    // Chart panels follow collection order so the layout is stable from day to day.
    let chart_file = if args.no_chart {
        None
    } else {
        let chart_config = ChartConfig::default().with_font_file(&args.font_file);
        let series: Vec<&Series> = dataset.iter().collect();
        let path = args.out_dir.join(&args.chart_file);
        crate::plot::write_chart_svg(&path, &series, ctx, &chart_config)?;
        info!(path = %path.display(), "chart written");
        Some(args.chart_file.as_str())
    };

    if !args.no_report {
        let path = args.out_dir.join(&args.report_file);
        crate::report::write_report_html(&path, &ranked, ctx, chart_file)?;
        info!(path = %path.display(), "report written");
    }

    if let Some(path) = &args.export_json {
        let path = resolve_output(&args.out_dir, path);
        crate::io::write_dataset_json(&path, &dataset, ctx)?;
        info!(path = %path.display(), "JSON export written");
    }
    if let Some(path) = &args.export_csv {
        let path = resolve_output(&args.out_dir, path);
        crate::io::write_dataset_csv(&path, &dataset)?;
        info!(path = %path.display(), "CSV export written");
    }

    Ok(())
}

pub fn pipeline_config_from_args(args: &CollectArgs) -> Result<PipelineConfig, AppError> {
    if args.window == 0 {
        return Err(AppError::new(EXIT_SETUP, "--window must be at least 1."));
    }
    if args.min_points >= args.window {
        return Err(AppError::new(
            EXIT_SETUP,
            format!(
                "--min-points ({}) must be below --window ({}); no series could qualify.",
                args.min_points, args.window
            ),
        ));
    }
    if args.table_marker.trim().is_empty() {
        return Err(AppError::new(EXIT_SETUP, "--table-marker cannot be empty."));
    }

    Ok(PipelineConfig {
        window_size: args.window,
        min_points: args.min_points,
        table_marker: args.table_marker.clone(),
        waits: WaitConfig {
            settle_timeout: Duration::from_millis(args.settle_timeout_ms),
            tab_timeout: Duration::from_millis(args.tab_timeout_ms),
            poll_interval: Duration::from_millis(args.poll_interval_ms),
        },
    })
}

fn instruments_from_args(args: &CollectArgs) -> Result<Vec<Instrument>, AppError> {
    if args.only.is_empty() {
        return Ok(crate::registry::instruments());
    }
    let (selected, unknown) = crate::registry::select(&args.only);
    for id in &unknown {
        warn!(code = %id, "not a tracked instrument; ignoring");
    }
    if selected.is_empty() {
        return Err(AppError::new(EXIT_SETUP, "No tracked instruments match --only."));
    }
    Ok(selected)
}

/// Relative export paths land in the output directory.
fn resolve_output(out_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        out_dir.join(path)
    }
}

fn is_subcommand(arg: &str) -> bool {
    matches!(arg, "collect" | "list")
}

/// Rewrite argv so `etf-shares` defaults to `etf-shares collect`.
///
/// Rules:
/// - `etf-shares`                        -> `etf-shares collect`
/// - `etf-shares --only 510300 ...`      -> `etf-shares collect --only 510300 ...`
/// - `etf-shares --log-level debug list` -> unchanged (global flag before a subcommand)
/// - `etf-shares --help/--version/-h`    -> unchanged (show top-level help/version)
fn rewrite_args(mut argv: Vec<String>) -> Vec<String> {
    let Some(arg1) = argv.get(1).cloned() else {
        argv.push("collect".to_string());
        return argv;
    };

    let is_top_level_help_or_version = matches!(
        arg1.as_str(),
        "-h" | "--help" | "-V" | "--version" | "help"
    );
    if is_top_level_help_or_version {
        return argv;
    }

    // Global flags may come before the subcommand: `etf-shares --log-level debug list`.
    if argv[1..].iter().any(|a| is_subcommand(a)) {
        return argv;
    }

    // If the first token is a flag, treat it as "collect flags".
    if arg1.starts_with('-') {
        argv.insert(1, "collect".to_string());
        return argv;
    }

    argv
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::Cli;

    fn args(extra: &[&str]) -> CollectArgs {
        let mut argv = vec!["etf-shares", "collect"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Command::Collect(a) => a,
            Command::List => panic!("expected collect"),
        }
    }

    fn strings(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn bare_invocation_and_flags_mean_collect() {
        assert_eq!(rewrite_args(strings(&["etf-shares"])), strings(&["etf-shares", "collect"]));
        assert_eq!(
            rewrite_args(strings(&["etf-shares", "--only", "510300"])),
            strings(&["etf-shares", "collect", "--only", "510300"])
        );
        assert_eq!(rewrite_args(strings(&["etf-shares", "list"])), strings(&["etf-shares", "list"]));
        assert_eq!(rewrite_args(strings(&["etf-shares", "-h"])), strings(&["etf-shares", "-h"]));
    }

    #[test]
    fn global_flag_before_subcommand_is_left_alone() {
        let argv = strings(&["etf-shares", "--log-level", "debug", "list"]);
        assert_eq!(rewrite_args(argv.clone()), argv);
        let cli = Cli::try_parse_from(rewrite_args(argv)).unwrap();
        assert!(matches!(cli.command, Command::List));
        assert_eq!(cli.log_level, "debug");

        let collect = rewrite_args(strings(&["etf-shares", "--log-level", "debug", "--window", "90"]));
        assert_eq!(collect[1], "collect");
        assert!(Cli::try_parse_from(collect).is_ok());
    }

    #[test]
    fn pipeline_config_carries_waits() {
        let cfg = pipeline_config_from_args(&args(&["--window", "90", "--tab-timeout-ms", "1500"])).unwrap();
        assert_eq!(cfg.window_size, 90);
        assert_eq!(cfg.waits.tab_timeout, Duration::from_millis(1500));
        assert_eq!(cfg.waits.settle_timeout, Duration::from_secs(10));
    }

    #[test]
    fn impossible_density_is_rejected() {
        let err = pipeline_config_from_args(&args(&["--window", "5", "--min-points", "5"])).unwrap_err();
        assert_eq!(err.exit_code(), EXIT_SETUP);
    }

    #[test]
    fn only_filters_registry() {
        let picked = instruments_from_args(&args(&["--only", "512800,999999"])).unwrap();
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].display_name, "银行ETF");
        assert!(instruments_from_args(&args(&["--only", "999999"])).is_err());
    }

    #[test]
    fn relative_exports_resolve_under_out_dir() {
        let out = Path::new("/tmp/out");
        assert_eq!(resolve_output(out, Path::new("a.json")), PathBuf::from("/tmp/out/a.json"));
        assert_eq!(resolve_output(out, Path::new("/abs/a.csv")), PathBuf::from("/abs/a.csv"));
    }
}
