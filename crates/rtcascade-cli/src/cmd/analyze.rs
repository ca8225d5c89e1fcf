//! `rtcascade analyze`: structural analytics over an estimated cascade.

use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;
use rtcascade_core::config::resolve_config;
use rtcascade_core::{CascadeInfo, Influencer, analyze};
use serde::Serialize;

use crate::input;
use crate::output::{OutputMode, pretty_kv, pretty_section, render_mode};

/// Arguments for `rtcascade analyze`.
#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Cascade JSON as written by `rtcascade estimate --format json` (`-` for stdin).
    #[arg(long)]
    pub cascade: PathBuf,

    /// Root user id. Defaults to the root recorded in the cascade file.
    #[arg(long)]
    pub root: Option<String>,

    /// Number of influencers shown in pretty/text output.
    #[arg(long)]
    pub top: Option<usize>,

    /// Config file (default: `<config dir>/rtcascade/config.toml`).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Analytics payload shared by `analyze` and `estimate --info`.
#[derive(Debug, Serialize)]
pub struct AnalysisReport {
    pub root: String,
    pub disconnected: usize,
    pub reached: usize,
    pub depth: usize,
    pub levels: Vec<usize>,
    pub influencers: Vec<Influencer>,
    #[serde(skip)]
    pub top: usize,
}

impl AnalysisReport {
    pub fn new(root: &str, info: CascadeInfo, top: usize) -> Self {
        Self {
            root: root.to_string(),
            disconnected: info.disconnected,
            reached: info.reached(),
            depth: info.depth(),
            levels: info.levels,
            influencers: info.influencers,
            top,
        }
    }

    fn shown(&self) -> &[Influencer] {
        &self.influencers[..self.top.min(self.influencers.len())]
    }

    pub fn write_text(&self, w: &mut dyn Write) -> io::Result<()> {
        writeln!(w, "disconnected\t{}", self.disconnected)?;
        writeln!(w, "reached\t{}", self.reached)?;
        writeln!(w, "depth\t{}", self.depth)?;
        for (index, count) in self.levels.iter().enumerate() {
            writeln!(w, "level.{}\t{count}", index + 1)?;
        }
        for influencer in self.shown() {
            writeln!(w, "influencer\t{}\t{}", influencer.user_id, influencer.count)?;
        }
        Ok(())
    }

    pub fn write_pretty(&self, w: &mut dyn Write) -> io::Result<()> {
        pretty_section(w, &format!("Cascade analysis for {}", self.root))?;
        pretty_kv(w, "disconnected", self.disconnected.to_string())?;
        pretty_kv(w, "reached", self.reached.to_string())?;
        pretty_kv(w, "depth", self.depth.to_string())?;
        let levels = self
            .levels
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" / ");
        pretty_kv(w, "levels", if levels.is_empty() { "-".to_string() } else { levels })?;

        writeln!(w)?;
        pretty_section(w, &format!("Top influencers ({})", self.shown().len()))?;
        if self.shown().is_empty() {
            writeln!(w, "(none)")?;
        }
        for (rank, influencer) in self.shown().iter().enumerate() {
            writeln!(
                w,
                "{:>3}. {:<24} {:>6}",
                rank + 1,
                influencer.user_id,
                influencer.count
            )?;
        }
        Ok(())
    }
}

/// Execute `rtcascade analyze`.
pub fn run_analyze(args: &AnalyzeArgs, output: OutputMode) -> anyhow::Result<()> {
    let config = resolve_config(args.config.as_deref())?;
    let cascade = input::load_cascade(&args.cascade)?;
    let root = args.root.as_deref().unwrap_or(&cascade.root);

    let info = analyze(&cascade, root);
    let report = AnalysisReport::new(root, info, args.top.unwrap_or(config.top_influencers));

    render_mode(
        output,
        &report,
        |r, w| r.write_text(w),
        |r, w| r.write_pretty(w),
    )
}
