//! The assembled cascade: one outgoing edge per re-sharer.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// How an edge's target was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Attribution {
    /// The source follows the root.
    Direct,
    /// Chosen by the interaction-weighted resolver.
    Interaction,
    /// Chosen by the friendship resolver.
    Friendship,
    /// No parent could be inferred.
    Unresolved,
}

impl Attribution {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Interaction => "interaction",
            Self::Friendship => "friendship",
            Self::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for Attribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A parent link `source → target`.
///
/// `target` is `None` for unresolved re-sharers; otherwise it is the root id
/// or another re-sharer's id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    pub source: String,
    pub target: Option<String>,
    pub via: Attribution,
}

impl Edge {
    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }
}

/// Every non-root re-sharer exactly once as an edge source.
///
/// Cascades produced by the estimators keep `edges` sorted by source id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cascade {
    /// Author of the original post.
    pub root: String,
    pub edges: Vec<Edge>,
}

impl Cascade {
    /// Number of edges (one per non-root re-sharer).
    #[must_use]
    pub fn len(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// Look up the edge leaving `source`.
    #[must_use]
    pub fn edge(&self, source: &str) -> Option<&Edge> {
        self.edges.iter().find(|edge| edge.source == source)
    }

    /// Parent of `source`: `Some(None)` when unresolved, `None` when absent.
    #[must_use]
    pub fn target_of(&self, source: &str) -> Option<Option<&str>> {
        self.edge(source).map(|edge| edge.target.as_deref())
    }

    /// Sources with no inferred parent.
    pub fn unresolved(&self) -> impl Iterator<Item = &str> {
        self.edges
            .iter()
            .filter(|edge| !edge.is_resolved())
            .map(|edge| edge.source.as_str())
    }

    /// Count edges per attribution kind.
    #[must_use]
    pub fn attribution_counts(&self) -> HashMap<Attribution, usize> {
        let mut counts = HashMap::new();
        for edge in &self.edges {
            *counts.entry(edge.via).or_insert(0) += 1;
        }
        counts
    }

    /// BLAKE3 hash of the sorted edge set.
    ///
    /// Attribution is not hashed: two cascades with the same parent links
    /// hash identically regardless of strategy.
    #[must_use]
    pub fn content_hash(&self) -> String {
        let mut pairs: Vec<(&str, Option<&str>)> = self
            .edges
            .iter()
            .map(|edge| (edge.source.as_str(), edge.target.as_deref()))
            .collect();
        pairs.sort_unstable();

        let mut hasher = blake3::Hasher::new();
        hasher.update(self.root.as_bytes());
        hasher.update(b"\x00");
        for (source, target) in pairs {
            hasher.update(source.as_bytes());
            hasher.update(b"\x00");
            // Tagged so an unresolved edge never hashes like a real target.
            match target {
                Some(target) => {
                    hasher.update(b"\x01");
                    hasher.update(target.as_bytes());
                }
                None => {
                    hasher.update(b"\x02");
                }
            }
            hasher.update(b"\x00");
        }
        format!("blake3:{}", hasher.finalize())
    }
}
