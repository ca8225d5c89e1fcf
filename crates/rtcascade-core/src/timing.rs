//! Opt-in per-stage timing for estimation runs.
//!
//! Each pipeline stage is wrapped in [`timed`]. When timing is enabled
//! (`--timing` or `RTCASCADE_TIMING=1`) the elapsed time is recorded in a
//! thread-local buffer; [`collect_report`] drains it into a [`TimingReport`].

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use serde_json::json;

/// Aggregated timings, one row per stage name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimingReport {
    pub stages: Vec<StageTiming>,
}

/// Timing totals for a single named stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageTiming {
    pub name: String,
    /// Number of times the stage ran.
    pub count: usize,
    pub total: Duration,
    pub max: Duration,
}

thread_local! {
    static SAMPLES: RefCell<Vec<(String, Duration)>> = const { RefCell::new(Vec::new()) };
}

static TIMING_ENABLED: AtomicBool = AtomicBool::new(false);

/// Returns true when `RTCASCADE_TIMING` enables timing collection.
///
/// Supported truthy values: `1`, `true`, `yes`, `on` (case-insensitive).
#[must_use]
pub fn timing_enabled_from_env() -> bool {
    std::env::var("RTCASCADE_TIMING")
        .ok()
        .is_some_and(|value| is_truthy(&value))
}

/// Enable or disable timing collection.
pub fn set_timing_enabled(enabled: bool) {
    TIMING_ENABLED.store(enabled, Ordering::Relaxed);
    if !enabled {
        clear_timings();
    }
}

#[must_use]
pub fn is_timing_enabled() -> bool {
    TIMING_ENABLED.load(Ordering::Relaxed)
}

/// Clears all recorded timings for the current thread.
pub fn clear_timings() {
    SAMPLES.with(|samples| samples.borrow_mut().clear());
}

/// Run `f`, recording its duration under `name` when timing is enabled.
pub fn timed<R>(name: &str, f: impl FnOnce() -> R) -> R {
    if !is_timing_enabled() {
        return f();
    }

    let started = Instant::now();
    let result = f();
    let elapsed = started.elapsed();
    SAMPLES.with(|samples| samples.borrow_mut().push((name.to_string(), elapsed)));
    result
}

/// Drain the current thread's samples into a report sorted by stage name.
#[must_use]
pub fn collect_report() -> TimingReport {
    let samples = SAMPLES.with(|samples| std::mem::take(&mut *samples.borrow_mut()));

    let mut grouped: BTreeMap<String, StageTiming> = BTreeMap::new();
    for (name, elapsed) in samples {
        let stage = grouped.entry(name.clone()).or_insert_with(|| StageTiming {
            name,
            count: 0,
            total: Duration::ZERO,
            max: Duration::ZERO,
        });
        stage.count += 1;
        stage.total += elapsed;
        stage.max = stage.max.max(elapsed);
    }

    TimingReport {
        stages: grouped.into_values().collect(),
    }
}

impl TimingReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    #[must_use]
    pub fn to_json(&self) -> serde_json::Value {
        let stages = self
            .stages
            .iter()
            .map(|stage| {
                json!({
                    "name": stage.name,
                    "count": stage.count,
                    "total_us": stage.total.as_micros(),
                    "max_us": stage.max.as_micros(),
                })
            })
            .collect::<Vec<_>>();

        json!({ "stages": stages })
    }

    /// Render as a fixed-width table for terminal output.
    #[must_use]
    pub fn display_table(&self) -> String {
        if self.stages.is_empty() {
            return "No timing samples recorded.".to_string();
        }

        let mut out = String::new();
        out.push_str("stage                        count     total       max\n");
        out.push_str("------------------------------------------------------\n");
        for stage in &self.stages {
            let _ = writeln!(
                out,
                "{:<28} {:>6} {:>9} {:>9}",
                stage.name,
                stage.count,
                format_duration(stage.total),
                format_duration(stage.max)
            );
        }
        out
    }
}

fn format_duration(duration: Duration) -> String {
    let micros = duration.as_micros();

    if micros >= 1_000_000 {
        format!("{}.{:03}s", micros / 1_000_000, (micros % 1_000_000) / 1_000)
    } else if micros >= 1_000 {
        format!("{}.{:03}ms", micros / 1_000, micros % 1_000)
    } else {
        format!("{micros}us")
    }
}

fn is_truthy(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truthy_values() {
        for v in ["1", "true", "YES", " on "] {
            assert!(is_truthy(v), "{v}");
        }
        for v in ["0", "false", "", "maybe"] {
            assert!(!is_truthy(v), "{v}");
        }
    }

    // One test toggles the global flag so parallel tests cannot race on it.
    #[test]
    fn timing_records_only_while_enabled() {
        set_timing_enabled(false);
        assert_eq!(timed("stage.noop", || 7), 7);
        assert!(collect_report().is_empty());

        set_timing_enabled(true);
        timed("b.stage", || ());
        timed("a.stage", || ());
        timed("a.stage", || ());
        let report = collect_report();
        set_timing_enabled(false);

        let names: Vec<&str> = report.stages.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["a.stage", "b.stage"]);
        assert_eq!(report.stages[0].count, 2);
        assert!(report.stages[0].max <= report.stages[0].total);
        assert_eq!(report.to_json()["stages"][1]["count"], 1);
    }

    #[test]
    fn durations_pick_a_readable_unit() {
        assert_eq!(format_duration(Duration::from_micros(42)), "42us");
        assert_eq!(format_duration(Duration::from_micros(1_500)), "1.500ms");
        assert_eq!(format_duration(Duration::from_millis(2_250)), "2.250s");
    }
}
