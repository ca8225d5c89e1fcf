#![forbid(unsafe_code)]

mod cmd;
mod input;
mod output;

use clap::{Parser, Subcommand};
use output::{OutputMode, resolve_output_mode};
use rtcascade_core::timing;
use std::env;
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser, Debug)]
#[command(
    name = "rtcascade",
    author,
    version,
    about = "rtcascade: reconstruct who exposed whom to a re-shared post",
    long_about = None
)]
struct Cli {
    /// Log per-stage counts at info level.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit stage timing report to stderr.
    #[arg(long, global = true)]
    timing: bool,

    /// Output format.
    #[arg(long, global = true, value_enum)]
    format: Option<OutputMode>,

    /// Shorthand for `--format json`.
    #[arg(long, global = true, hide = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn output_mode(&self) -> OutputMode {
        resolve_output_mode(self.format, self.json)
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(
        about = "Estimate a cascade",
        long_about = "Attribute every re-sharer to the earlier re-sharer (or the root) that most likely exposed them.",
        after_help = "EXAMPLES:\n    # Interaction-weighted, replies count double\n    rtcascade estimate --reshares rs.json --followers fo.json --interactions ia.json --re 2\n\n    # Friendship-based, with analytics\n    rtcascade estimate --reshares rs.json --followers fo.json --friends fr.json --info\n\n    # Save for later analysis\n    rtcascade estimate --reshares rs.json --followers fo.json --friends fr.json --json > cascade.json"
    )]
    Estimate(cmd::estimate::EstimateArgs),

    #[command(
        about = "Analyze an estimated cascade",
        long_about = "Report disconnected re-sharers, per-level reach and top influencers of a cascade.",
        after_help = "EXAMPLES:\n    rtcascade analyze --cascade cascade.json\n\n    rtcascade analyze --cascade cascade.json --root 12345 --top 10 --json"
    )]
    Analyze(cmd::analyze::AnalyzeArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("RTCASCADE_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if env::var("DEBUG").is_ok() {
            "rtcascade=debug,info"
        } else {
            "rtcascade=info,warn"
        })
    });

    let format = env::var("RTCASCADE_LOG_FORMAT").unwrap_or_else(|_| "compact".to_string());

    let registry = tracing_subscriber::registry().with(filter);

    // stdout carries command output, so logs go to stderr.
    match format.as_str() {
        "json" => {
            registry
                .with(fmt::layer().json().with_ansi(false).with_writer(std::io::stderr))
                .init();
        }
        _ => {
            registry
                .with(fmt::layer().compact().with_writer(std::io::stderr))
                .init();
        }
    }
}

fn main() -> anyhow::Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let timing_enabled = cli.timing || timing::timing_enabled_from_env();
    timing::set_timing_enabled(timing_enabled);
    timing::clear_timings();

    let output = cli.output_mode();
    debug!(?output, verbose = cli.verbose, "starting");

    let command_result = match cli.command {
        Commands::Estimate(ref args) => timing::timed("cmd.estimate", || {
            cmd::estimate::run_estimate(args, cli.verbose, output)
        }),
        Commands::Analyze(ref args) => {
            timing::timed("cmd.analyze", || cmd::analyze::run_analyze(args, output))
        }
    };

    if timing_enabled {
        let report = timing::collect_report();
        if report.is_empty() {
            eprintln!("timing report: no samples recorded");
        } else if output.is_json() {
            eprintln!("{}", serde_json::to_string_pretty(&report.to_json())?);
        } else {
            eprintln!("timing report:");
            eprintln!("{}", report.display_table());
        }
    }

    command_result
}
