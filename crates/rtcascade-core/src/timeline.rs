//! Re-share timeline: one effective moment per user, root first.
//!
//! # Overview
//!
//! Platform exports routinely contain several re-shares by the same user
//! (undo + redo, API retries). Only the earliest one can have exposed
//! anybody else, so the timeline keeps that one and drops the rest.
//!
//! The root author is injected as a synthetic event at [`Moment::Origin`],
//! which orders before every timestamp. The root therefore "acts first" even
//! when its recorded post time is skewed relative to the re-shares.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use tracing::{instrument, warn};

use crate::error::CascadeError;
use crate::model::ReshareRecord;

/// Effective time of a user's action within one cascade.
///
/// Variant order matters: `Origin` sorts before every `At`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Moment {
    /// The root's original post.
    Origin,
    /// A re-share at the given instant.
    At(DateTime<Utc>),
}

/// Deduplicated re-share events indexed by user id.
#[derive(Debug, Clone)]
pub struct Timeline {
    root: String,
    root_posted_at: DateTime<Utc>,
    moments: HashMap<String, Moment>,
}

impl Timeline {
    /// Normalize raw re-share records.
    ///
    /// The root is read from the first record's `original` post. Re-shares by
    /// the root itself are ignored; every other user keeps their earliest
    /// timestamp.
    ///
    /// # Errors
    ///
    /// - [`CascadeError::EmptyInput`] if `reshares` is empty.
    /// - [`CascadeError::MissingField`] if the root post or any record lacks
    ///   a user id or timestamp. An empty user id counts as missing.
    #[instrument(skip(reshares), fields(records = reshares.len()))]
    pub fn from_reshares(reshares: &[ReshareRecord]) -> Result<Self, CascadeError> {
        let first = reshares.first().ok_or(CascadeError::EmptyInput)?;
        let original = first
            .original
            .as_ref()
            .ok_or_else(|| CascadeError::missing("reshare", 0, "original"))?;
        let root = original
            .user_id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CascadeError::missing("reshare", 0, "original.user_id"))?;
        let root_posted_at = original
            .created_at
            .ok_or_else(|| CascadeError::missing("reshare", 0, "original.created_at"))?;

        let mut moments: HashMap<String, Moment> = HashMap::with_capacity(reshares.len() + 1);
        let mut foreign_roots = 0usize;

        for (index, record) in reshares.iter().enumerate() {
            let user_id = record
                .user_id
                .as_deref()
                .filter(|id| !id.is_empty())
                .ok_or_else(|| CascadeError::missing("reshare", index, "user_id"))?;
            let created_at = record
                .created_at
                .ok_or_else(|| CascadeError::missing("reshare", index, "created_at"))?;

            if record
                .original
                .as_ref()
                .and_then(|post| post.user_id.as_deref())
                .is_some_and(|author| author != root)
            {
                foreign_roots += 1;
            }

            if user_id == root {
                continue;
            }

            let moment = Moment::At(created_at);
            moments
                .entry(user_id.to_string())
                .and_modify(|existing| *existing = (*existing).min(moment))
                .or_insert(moment);
        }

        if foreign_roots > 0 {
            warn!(
                root = %root,
                foreign_roots,
                "re-share records point at a different original author"
            );
        }

        moments.insert(root.clone(), Moment::Origin);

        Ok(Self {
            root,
            root_posted_at,
            moments,
        })
    }

    /// Author of the original post.
    #[must_use]
    pub fn root(&self) -> &str {
        &self.root
    }

    /// Recorded publication time of the original post.
    #[must_use]
    pub const fn root_posted_at(&self) -> DateTime<Utc> {
        self.root_posted_at
    }

    /// Effective moment for `user_id`, if they are in the cascade.
    #[must_use]
    pub fn moment(&self, user_id: &str) -> Option<Moment> {
        self.moments.get(user_id).copied()
    }

    /// True when both users are known and `earlier` acted strictly before
    /// `later`.
    #[must_use]
    pub fn precedes(&self, earlier: &str, later: &str) -> bool {
        match (self.moment(earlier), self.moment(later)) {
            (Some(a), Some(b)) => a < b,
            _ => false,
        }
    }

    /// Number of distinct non-root re-sharers.
    #[must_use]
    pub fn resharer_count(&self) -> usize {
        self.moments.len() - 1
    }

    /// Non-root re-sharers sorted by id.
    #[must_use]
    pub fn resharers(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .moments
            .keys()
            .map(String::as_str)
            .filter(|id| *id != self.root)
            .collect();
        ids.sort_unstable();
        ids
    }
}
