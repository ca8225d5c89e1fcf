//! JSON dataset loaders.
//!
//! | File            | Shape                                    |
//! |-----------------|------------------------------------------|
//! | re-shares       | `[ReshareRecord, ...]`                   |
//! | followers       | `["user id", ...]`                       |
//! | interactions    | `[InteractionRecord, ...]`               |
//! | friends         | `{"user id": ["friend id", ...], ...}`   |
//! | cascade         | `Cascade` (the JSON output of `estimate`) |
//!
//! A path of `-` reads standard input.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use rtcascade_core::{Cascade, FollowerSet, FriendMap, InteractionRecord, ReshareRecord};
use serde::de::DeserializeOwned;
use tracing::debug;

fn read_json<T: DeserializeOwned>(path: &Path, what: &str) -> Result<T> {
    let content = if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin()
            .read_to_string(&mut buf)
            .with_context(|| format!("Failed to read {what} from stdin"))?;
        buf
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {what} file {}", path.display()))?
    };

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse {what} file {}", path.display()))
}

pub fn load_reshares(path: &Path) -> Result<Vec<ReshareRecord>> {
    let records: Vec<ReshareRecord> = read_json(path, "re-shares")?;
    debug!(records = records.len(), path = %path.display(), "loaded re-shares");
    Ok(records)
}

pub fn load_followers(path: &Path) -> Result<FollowerSet> {
    let ids: Vec<String> = read_json(path, "followers")?;
    debug!(followers = ids.len(), path = %path.display(), "loaded followers");
    Ok(ids.into_iter().collect())
}

pub fn load_interactions(path: &Path) -> Result<Vec<InteractionRecord>> {
    let records: Vec<InteractionRecord> = read_json(path, "interactions")?;
    debug!(records = records.len(), path = %path.display(), "loaded interactions");
    Ok(records)
}

pub fn load_friends(path: &Path) -> Result<FriendMap> {
    let friends: FriendMap = read_json(path, "friends")?;
    debug!(users = friends.len(), path = %path.display(), "loaded friend lists");
    Ok(friends)
}

pub fn load_cascade(path: &Path) -> Result<Cascade> {
    read_json(path, "cascade")
}
