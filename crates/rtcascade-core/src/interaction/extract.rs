//! Per-channel interaction counts between re-sharers.
//!
//! For one channel, every interaction naming a target forms the ordered pair
//! `(acting, target)`. A pair only counts when both users are in the
//! [`Timeline`] and the target acted strictly before the acting user, since
//! only then could the target have exposed the acting user to the post.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CascadeError;
use crate::model::InteractionEvent;
use crate::timeline::Timeline;

/// Interaction channel between two users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Quote,
    Reply,
    Retweet,
}

impl Channel {
    pub const ALL: [Self; 3] = [Self::Quote, Self::Reply, Self::Retweet];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Quote => "quote",
            Self::Reply => "reply",
            Self::Retweet => "retweet",
        }
    }

    /// The user this event targets on this channel, if any.
    #[must_use]
    pub const fn target<'a>(self, event: &InteractionEvent<'a>) -> Option<&'a str> {
        match self {
            Self::Quote => event.quoted_user_id,
            Self::Reply => event.replied_to_user_id,
            Self::Retweet => event.retweeted_user_id,
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = CascadeError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "quote" | "qt" => Ok(Self::Quote),
            "reply" | "re" => Ok(Self::Reply),
            "retweet" | "rt" => Ok(Self::Retweet),
            other => Err(CascadeError::InvalidArgument(format!(
                "unknown interaction channel `{other}` (expected quote, reply or retweet)"
            ))),
        }
    }
}

/// Qualifying interactions from one user to one earlier re-sharer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairStats {
    pub count: usize,
    /// Timestamp of the most recent qualifying interaction.
    pub latest: DateTime<Utc>,
}

/// Acting user → earlier target → stats, for a single channel.
pub type ChannelCounts = HashMap<String, BTreeMap<String, PairStats>>;

/// Count temporally valid interactions on `channel`.
#[must_use]
pub fn extract_channel(
    timeline: &Timeline,
    interactions: &[InteractionEvent<'_>],
    channel: Channel,
) -> ChannelCounts {
    let mut counts = ChannelCounts::new();

    for event in interactions {
        let Some(target) = channel.target(event) else {
            continue;
        };
        if !timeline.precedes(target, event.user_id) {
            continue;
        }

        counts
            .entry(event.user_id.to_string())
            .or_default()
            .entry(target.to_string())
            .and_modify(|stats| {
                stats.count += 1;
                stats.latest = stats.latest.max(event.created_at);
            })
            .or_insert(PairStats {
                count: 1,
                latest: event.created_at,
            });
    }

    counts
}

/// Number of distinct qualifying pairs in `counts`.
#[must_use]
pub fn pair_count(counts: &ChannelCounts) -> usize {
    counts.values().map(BTreeMap::len).sum()
}
