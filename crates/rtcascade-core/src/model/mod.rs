//! Data model shared by every pipeline stage.

use std::collections::{HashMap, HashSet};

pub mod cascade;
pub mod record;

pub use cascade::{Attribution, Cascade, Edge};
pub use record::{InteractionEvent, InteractionRecord, PostRef, ReshareRecord};

/// User ids that follow the root author.
pub type FollowerSet = HashSet<String>;

/// User id → ids of the accounts that user follows.
pub type FriendMap = HashMap<String, HashSet<String>>;
