//! Raw input records as handed over by the host.
//!
//! Records mirror what a platform export deserializes into: every field is
//! optional, and [`crate::timeline::Timeline`] / [`InteractionRecord::validate`]
//! reject the ones missing a user id or timestamp before inference starts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CascadeError;

/// The original post a re-share points at.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostRef {
    /// Author of the original post (the cascade root).
    #[serde(default)]
    pub user_id: Option<String>,
    /// When the original post was published.
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
}

impl PostRef {
    #[must_use]
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            created_at: Some(created_at),
        }
    }
}

/// One re-share of the original post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReshareRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    /// The post being re-shared. Only the first record's is required.
    #[serde(default)]
    pub original: Option<PostRef>,
}

impl ReshareRecord {
    #[must_use]
    pub fn new(user_id: impl Into<String>, created_at: DateTime<Utc>, original: PostRef) -> Self {
        Self {
            user_id: Some(user_id.into()),
            created_at: Some(created_at),
            original: Some(original),
        }
    }
}

/// A post by a re-sharer that may reference another user.
///
/// Each `*_user_id` field is present only when that interaction channel
/// applies to the post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionRecord {
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default, with = "timestamp")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub quoted_user_id: Option<String>,
    #[serde(default, alias = "in_reply_to_user_id")]
    pub replied_to_user_id: Option<String>,
    #[serde(default)]
    pub retweeted_user_id: Option<String>,
}

impl InteractionRecord {
    fn acting(user_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            created_at: Some(created_at),
            ..Self::default()
        }
    }

    /// `user_id` quoted a post by `quoted`.
    #[must_use]
    pub fn quote(
        user_id: impl Into<String>,
        created_at: DateTime<Utc>,
        quoted: impl Into<String>,
    ) -> Self {
        Self {
            quoted_user_id: Some(quoted.into()),
            ..Self::acting(user_id, created_at)
        }
    }

    /// `user_id` replied to `replied_to`.
    #[must_use]
    pub fn reply(
        user_id: impl Into<String>,
        created_at: DateTime<Utc>,
        replied_to: impl Into<String>,
    ) -> Self {
        Self {
            replied_to_user_id: Some(replied_to.into()),
            ..Self::acting(user_id, created_at)
        }
    }

    /// `user_id` retweeted a post by `retweeted`.
    #[must_use]
    pub fn retweet(
        user_id: impl Into<String>,
        created_at: DateTime<Utc>,
        retweeted: impl Into<String>,
    ) -> Self {
        Self {
            retweeted_user_id: Some(retweeted.into()),
            ..Self::acting(user_id, created_at)
        }
    }

    /// Check required fields and borrow a validated view of this record.
    ///
    /// # Errors
    ///
    /// Returns [`CascadeError::MissingField`] when the acting user id is
    /// absent or empty, or the timestamp is absent.
    pub fn validate(&self, index: usize) -> Result<InteractionEvent<'_>, CascadeError> {
        let user_id = self
            .user_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CascadeError::missing("interaction", index, "user_id"))?;
        let created_at = self
            .created_at
            .ok_or_else(|| CascadeError::missing("interaction", index, "created_at"))?;

        Ok(InteractionEvent {
            user_id,
            created_at,
            quoted_user_id: self.quoted_user_id.as_deref(),
            replied_to_user_id: self.replied_to_user_id.as_deref(),
            retweeted_user_id: self.retweeted_user_id.as_deref(),
        })
    }
}

/// A validated interaction borrowing from its [`InteractionRecord`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InteractionEvent<'a> {
    pub user_id: &'a str,
    pub created_at: DateTime<Utc>,
    pub quoted_user_id: Option<&'a str>,
    pub replied_to_user_id: Option<&'a str>,
    pub retweeted_user_id: Option<&'a str>,
}

/// Optional timestamps in either RFC 3339 or the legacy platform format
/// (`Wed Oct 10 20:19:24 +0000 2018`).
pub(crate) mod timestamp {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const LEGACY_FORMAT: &str = "%a %b %d %H:%M:%S %z %Y";

    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, LEGACY_FORMAT))
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }

    #[allow(clippy::ref_option)]
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<String>::deserialize(deserializer)?
            .map(|raw| {
                parse(&raw).ok_or_else(|| D::Error::custom(format!("unrecognized timestamp `{raw}`")))
            })
            .transpose()
    }
}
