//! Interaction-weighted parent selection.
//!
//! # Scoring
//!
//! For a re-sharer `X` and an earlier re-sharer `Y`:
//!
//! ```text
//! score(X, Y) = quote·quotes(X→Y) + reply·replies(X→Y) + retweet·retweets(X→Y)
//! ```
//!
//! The highest score wins. Ties go to the candidate with the most recent
//! qualifying interaction, then to the lexicographically smallest id, so the
//! outcome never depends on input order.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::extract::{Channel, ChannelCounts};
use crate::error::CascadeError;

/// Per-channel weights for the interaction score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    #[serde(alias = "qt")]
    pub quote: f64,
    #[serde(alias = "re")]
    pub reply: f64,
    #[serde(alias = "rt")]
    pub retweet: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            quote: 1.0,
            reply: 1.0,
            retweet: 1.0,
        }
    }
}

impl Weights {
    #[must_use]
    pub const fn new(quote: f64, reply: f64, retweet: f64) -> Self {
        Self {
            quote,
            reply,
            retweet,
        }
    }

    #[must_use]
    pub const fn get(&self, channel: Channel) -> f64 {
        match channel {
            Channel::Quote => self.quote,
            Channel::Reply => self.reply,
            Channel::Retweet => self.retweet,
        }
    }

    /// Reject negative or non-finite weights.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::InvalidArgument`] naming the offending channel.
    pub fn validate(&self) -> Result<(), CascadeError> {
        for channel in Channel::ALL {
            let weight = self.get(channel);
            if !weight.is_finite() || weight < 0.0 {
                return Err(CascadeError::InvalidArgument(format!(
                    "{channel} weight must be finite and non-negative, got {weight}"
                )));
            }
        }
        Ok(())
    }
}

/// Merged channel counts for one `(X, Y)` pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateSignal {
    pub quotes: usize,
    pub replies: usize,
    pub retweets: usize,
    /// Most recent qualifying interaction on any channel.
    pub latest: DateTime<Utc>,
}

impl CandidateSignal {
    #[must_use]
    pub const fn count(&self, channel: Channel) -> usize {
        match channel {
            Channel::Quote => self.quotes,
            Channel::Reply => self.replies,
            Channel::Retweet => self.retweets,
        }
    }

    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn score(&self, weights: &Weights) -> f64 {
        Channel::ALL
            .iter()
            .map(|channel| weights.get(*channel) * self.count(*channel) as f64)
            .sum()
    }
}

/// Acting user → candidate parent → merged signal.
#[derive(Debug, Clone, Default)]
pub struct InteractionSignals {
    by_user: HashMap<String, BTreeMap<String, CandidateSignal>>,
}

impl InteractionSignals {
    /// Merge the three per-channel tables into one signal per pair.
    #[must_use]
    pub fn merge(channels: &[(Channel, ChannelCounts)]) -> Self {
        let mut by_user: HashMap<String, BTreeMap<String, CandidateSignal>> = HashMap::new();

        for (channel, counts) in channels {
            for (acting, targets) in counts {
                let candidates = by_user.entry(acting.clone()).or_default();
                for (target, stats) in targets {
                    let signal = candidates.entry(target.clone()).or_insert(CandidateSignal {
                        quotes: 0,
                        replies: 0,
                        retweets: 0,
                        latest: stats.latest,
                    });
                    match channel {
                        Channel::Quote => signal.quotes += stats.count,
                        Channel::Reply => signal.replies += stats.count,
                        Channel::Retweet => signal.retweets += stats.count,
                    }
                    signal.latest = signal.latest.max(stats.latest);
                }
            }
        }

        Self { by_user }
    }

    #[cfg(test)]
    fn candidates(&self, user_id: &str) -> Option<&BTreeMap<String, CandidateSignal>> {
        self.by_user.get(user_id)
    }

    /// Number of users with at least one candidate.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }

    /// Pick a parent for every user with candidates.
    ///
    /// Returns `source → parent`, sorted by source.
    #[must_use]
    pub fn resolve(&self, weights: &Weights) -> BTreeMap<String, String> {
        self.by_user
            .iter()
            .filter_map(|(user, candidates)| {
                best_candidate(candidates, weights).map(|(parent, _)| (user.clone(), parent.to_string()))
            })
            .collect()
    }
}

/// Highest-scoring candidate and its score.
///
/// Returns `None` only when `candidates` is empty.
#[must_use]
pub fn best_candidate<'a>(
    candidates: &'a BTreeMap<String, CandidateSignal>,
    weights: &Weights,
) -> Option<(&'a str, f64)> {
    let mut best: Option<(&str, f64, DateTime<Utc>)> = None;

    // Ascending id order: a later candidate must be strictly better to win.
    for (id, signal) in candidates {
        let score = signal.score(weights);
        let better = best.is_none_or(|(_, best_score, best_latest)| {
            match score.total_cmp(&best_score) {
                Ordering::Greater => true,
                Ordering::Less => false,
                Ordering::Equal => signal.latest > best_latest,
            }
        });
        if better {
            best = Some((id.as_str(), score, signal.latest));
        }
    }

    best.map(|(id, score, _)| (id, score))
}
