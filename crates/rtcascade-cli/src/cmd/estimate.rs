//! `rtcascade estimate`: infer a cascade from re-shares plus one social signal.

use std::collections::BTreeMap;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rtcascade_core::config::resolve_config;
use rtcascade_core::{
    Attribution, Cascade, CascadeConfig, Strategy, analyze, estimate_by_friendship,
    estimate_by_interaction,
};
use serde::Serialize;
use tracing::info;

use crate::cmd::analyze::AnalysisReport;
use crate::input;
use crate::output::{
    CliError, OutputMode, pretty_kv, pretty_rule, pretty_section, render_error, render_mode,
};

/// `--strategy` choices.
#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
pub enum StrategyArg {
    Interaction,
    Friendship,
}

impl From<StrategyArg> for Strategy {
    fn from(arg: StrategyArg) -> Self {
        match arg {
            StrategyArg::Interaction => Self::Interaction,
            StrategyArg::Friendship => Self::Friendship,
        }
    }
}

/// Arguments for `rtcascade estimate`.
#[derive(Args, Debug, Default)]
pub struct EstimateArgs {
    /// Re-share records (JSON array).
    #[arg(long)]
    pub reshares: PathBuf,

    /// Followers of the root (JSON array of user ids).
    #[arg(long)]
    pub followers: PathBuf,

    /// Interaction records; selects the interaction strategy.
    #[arg(long, required_unless_present = "friends")]
    pub interactions: Option<PathBuf>,

    /// Friend lists (JSON object of user id → ids); selects the friendship strategy.
    #[arg(long)]
    pub friends: Option<PathBuf>,

    /// Strategy to run when both signal files are given.
    #[arg(long, value_enum)]
    pub strategy: Option<StrategyArg>,

    /// Quote weight.
    #[arg(long)]
    pub qt: Option<f64>,

    /// Reply weight.
    #[arg(long)]
    pub re: Option<f64>,

    /// Retweet weight.
    #[arg(long)]
    pub rt: Option<f64>,

    /// Also compute cascade analytics.
    #[arg(long)]
    pub info: bool,

    /// Number of influencers shown with `--info`.
    #[arg(long)]
    pub top: Option<usize>,

    /// Config file (default: `<config dir>/rtcascade/config.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Output payload. Its JSON form deserializes as a [`Cascade`], which is what
/// `rtcascade analyze --cascade` reads.
#[derive(Debug, Serialize)]
pub struct EstimateReport {
    #[serde(flatten)]
    pub cascade: Cascade,
    pub strategy: Strategy,
    pub content_hash: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<AnalysisReport>,
}

impl EstimateReport {
    fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "source\ttarget\tvia")?;
        for edge in &self.cascade.edges {
            writeln!(
                w,
                "{}\t{}\t{}",
                edge.source,
                edge.target.as_deref().unwrap_or("-"),
                edge.via
            )?;
        }
        if let Some(info) = &self.info {
            info.write_text(w)?;
        }
        Ok(())
    }

    fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("Cascade for {}", self.cascade.root))?;
        pretty_kv(w, "strategy", self.strategy.as_str())?;
        pretty_kv(w, "re-sharers", self.cascade.len().to_string())?;
        let counts: BTreeMap<&str, usize> = self
            .cascade
            .attribution_counts()
            .into_iter()
            .map(|(via, count)| (via.as_str(), count))
            .collect();
        for via in [
            Attribution::Direct,
            Attribution::Interaction,
            Attribution::Friendship,
            Attribution::Unresolved,
        ] {
            if let Some(count) = counts.get(via.as_str()) {
                pretty_kv(w, via.as_str(), count.to_string())?;
            }
        }
        pretty_kv(w, "hash", &self.content_hash)?;

        writeln!(w)?;
        pretty_section(w, "Edges")?;
        for edge in &self.cascade.edges {
            writeln!(
                w,
                "{:<24} -> {:<24} {}",
                edge.source,
                edge.target.as_deref().unwrap_or("(unresolved)"),
                edge.via
            )?;
        }

        if let Some(info) = &self.info {
            writeln!(w)?;
            info.write_pretty(w)?;
        }
        pretty_rule(w)
    }
}

/// Resolve which strategy to run from the flag, the supplied signal files
/// and the config, in that order.
fn select_strategy(args: &EstimateArgs, config: &CascadeConfig) -> Strategy {
    if let Some(choice) = args.strategy {
        return choice.into();
    }
    match (&args.interactions, &args.friends) {
        (Some(_), None) => Strategy::Interaction,
        (None, Some(_)) => Strategy::Friendship,
        _ => config.strategy,
    }
}

/// Layer CLI flags over the loaded config.
fn effective_config(args: &EstimateArgs, verbose: bool, mut config: CascadeConfig) -> CascadeConfig {
    if let Some(qt) = args.qt {
        config.weights.quote = qt;
    }
    if let Some(re) = args.re {
        config.weights.reply = re;
    }
    if let Some(rt) = args.rt {
        config.weights.retweet = rt;
    }
    if let Some(top) = args.top {
        config.top_influencers = top;
    }
    config.verbose |= verbose;
    config
}

/// Execute `rtcascade estimate`.
pub fn run_estimate(args: &EstimateArgs, verbose: bool, output: OutputMode) -> anyhow::Result<()> {
    let config = effective_config(args, verbose, resolve_config(args.config.as_deref())?);

    let strategy = select_strategy(args, &config);

    let reshares = input::load_reshares(&args.reshares)?;
    let followers = input::load_followers(&args.followers)?;

    let result = match strategy {
        Strategy::Interaction => {
            let Some(path) = &args.interactions else {
                return missing_signal(output, "--interactions", strategy);
            };
            let interactions = input::load_interactions(path)?;
            estimate_by_interaction(
                &reshares,
                &followers,
                &interactions,
                &config.interaction_options(),
            )
        }
        Strategy::Friendship => {
            let Some(path) = &args.friends else {
                return missing_signal(output, "--friends", strategy);
            };
            let friends = input::load_friends(path)?;
            estimate_by_friendship(&reshares, &followers, &friends, &config.friendship_options())
        }
    };

    let cascade = match result {
        Ok(cascade) => cascade,
        Err(err) => {
            render_error(output, &CliError::from(&err))?;
            return Err(err.into());
        }
    };

    info!(
        strategy = strategy.as_str(),
        edges = cascade.len(),
        unresolved = cascade.unresolved().count(),
        "estimated cascade"
    );

    let info = args.info.then(|| {
        AnalysisReport::new(
            &cascade.root,
            analyze(&cascade, &cascade.root),
            config.top_influencers,
        )
    });
    let report = EstimateReport {
        content_hash: cascade.content_hash(),
        cascade,
        strategy,
        info,
    };

    render_mode(
        output,
        &report,
        |r, w| r.write_text(w),
        |r, w| r.write_pretty(w),
    )
}

fn missing_signal(output: OutputMode, flag: &str, strategy: Strategy) -> anyhow::Result<()> {
    render_error(
        output,
        &CliError::new("E2001", format!("the {strategy} strategy needs {flag}"))
            .with_hint(format!("pass {flag} <FILE> or choose the other strategy with --strategy")),
    )?;
    anyhow::bail!("missing {flag} for the {strategy} strategy")
}
