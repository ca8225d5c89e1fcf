//! Cascade estimation entry points.
//!
//! Both estimators validate every input record before any inference runs,
//! then go through the same stages:
//!
//! ```text
//! ReshareRecord[] ──▶ Timeline ──▶ strategy links ──┐
//! FollowerSet ─────────────────▶ direct links ──────┴─▶ assemble ──▶ Cascade
//! ```
//!
//! With `verbose` set, per-stage counts are logged at `info`; otherwise at
//! `debug`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::assemble::{AssemblyStats, assemble, classify_direct};
use crate::error::CascadeError;
use crate::friendship::resolve_by_friendship;
use crate::interaction::{Channel, InteractionSignals, Weights, extract, extract_channel};
use crate::model::{
    Attribution, Cascade, FollowerSet, FriendMap, InteractionEvent, InteractionRecord,
    ReshareRecord,
};
use crate::timeline::Timeline;
use crate::timing::timed;

macro_rules! stage {
    ($verbose:expr, $($arg:tt)+) => {
        if $verbose {
            tracing::info!($($arg)+);
        } else {
            tracing::debug!($($arg)+);
        }
    };
}

/// Which edge-inference strategy a run uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strategy {
    #[default]
    Interaction,
    Friendship,
}

impl Strategy {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interaction => "interaction",
            Self::Friendship => "friendship",
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = CascadeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "interaction" | "interactions" => Ok(Self::Interaction),
            "friendship" | "friendships" | "friends" => Ok(Self::Friendship),
            other => Err(CascadeError::InvalidArgument(format!(
                "unknown strategy `{other}` (expected interaction or friendship)"
            ))),
        }
    }
}

/// Options for [`estimate_by_interaction`].
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionOptions {
    pub weights: Weights,
    /// Log per-stage counts at `info` instead of `debug`.
    pub verbose: bool,
}

/// Options for [`estimate_by_friendship`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FriendshipOptions {
    /// Log per-stage counts at `info` instead of `debug`.
    pub verbose: bool,
}

/// Estimate a cascade from quote / reply / retweet interactions.
///
/// Followers of the root link to the root. Every other re-sharer links to the
/// earlier re-sharer (or the root) they interacted with most, by weighted
/// score; with no qualifying interaction they stay unresolved.
///
/// # Errors
///
/// - [`CascadeError::EmptyInput`] when `reshares` is empty.
/// - [`CascadeError::MissingField`] when a re-share or interaction record
///   lacks a user id or timestamp.
/// - [`CascadeError::InvalidArgument`] for a negative or non-finite weight.
#[instrument(skip_all, fields(reshares = reshares.len(), interactions = interactions.len()))]
pub fn estimate_by_interaction(
    reshares: &[ReshareRecord],
    followers: &FollowerSet,
    interactions: &[InteractionRecord],
    options: &InteractionOptions,
) -> Result<Cascade, CascadeError> {
    let verbose = options.verbose;
    options.weights.validate()?;
    let timeline = timed("estimate.normalize", || Timeline::from_reshares(reshares))?;
    let events = interactions
        .iter()
        .enumerate()
        .map(|(index, record)| record.validate(index))
        .collect::<Result<Vec<InteractionEvent<'_>>, _>>()?;

    stage!(
        verbose,
        root = timeline.root(),
        posted_at = %timeline.root_posted_at(),
        resharers = timeline.resharer_count(),
        followers = followers.len(),
        interactions = events.len(),
        quote_weight = options.weights.quote,
        reply_weight = options.weights.reply,
        retweet_weight = options.weights.retweet,
        "normalized re-share timeline"
    );

    let channels: Vec<(Channel, extract::ChannelCounts)> = timed("estimate.extract", || {
        Channel::ALL
            .into_iter()
            .map(|channel| (channel, extract_channel(&timeline, &events, channel)))
            .collect()
    });
    for (channel, counts) in &channels {
        stage!(
            verbose,
            channel = channel.as_str(),
            pairs = extract::pair_count(counts),
            "extracted qualifying interactions"
        );
    }

    let inferred = timed("estimate.resolve", || {
        let signals = InteractionSignals::merge(&channels);
        stage!(
            verbose,
            users_with_candidates = signals.user_count(),
            "merged interaction channels"
        );
        signals.resolve(&options.weights)
    });
    let direct = classify_direct(&timeline, followers);
    let (cascade, stats) = timed("estimate.assemble", || {
        assemble(&timeline, &direct, &inferred, Attribution::Interaction)
    })?;

    report(verbose, Strategy::Interaction, &stats);
    Ok(cascade)
}

/// Estimate a cascade from who-follows-whom.
///
/// Followers of the root link to the root. Every other re-sharer links to the
/// friend who re-shared most recently before them; with no such friend they
/// stay unresolved.
///
/// # Errors
///
/// - [`CascadeError::EmptyInput`] when `reshares` is empty.
/// - [`CascadeError::MissingField`] when a re-share record lacks a user id or
///   timestamp.
#[instrument(skip_all, fields(reshares = reshares.len(), friend_lists = friends.len()))]
pub fn estimate_by_friendship(
    reshares: &[ReshareRecord],
    followers: &FollowerSet,
    friends: &FriendMap,
    options: &FriendshipOptions,
) -> Result<Cascade, CascadeError> {
    let verbose = options.verbose;
    let timeline = timed("estimate.normalize", || Timeline::from_reshares(reshares))?;

    stage!(
        verbose,
        root = timeline.root(),
        posted_at = %timeline.root_posted_at(),
        resharers = timeline.resharer_count(),
        followers = followers.len(),
        friend_lists = friends.len(),
        "normalized re-share timeline"
    );

    let inferred = timed("estimate.resolve", || {
        resolve_by_friendship(&timeline, followers, friends)
    });
    let direct = classify_direct(&timeline, followers);
    let (cascade, stats) = timed("estimate.assemble", || {
        assemble(&timeline, &direct, &inferred, Attribution::Friendship)
    })?;

    report(verbose, Strategy::Friendship, &stats);
    Ok(cascade)
}

fn report(verbose: bool, strategy: Strategy, stats: &AssemblyStats) {
    stage!(
        verbose,
        strategy = strategy.as_str(),
        direct = stats.direct,
        inferred = stats.inferred,
        overridden = stats.overridden,
        unresolved = stats.unresolved,
        "assembled cascade"
    );
}
