//! Friendship-based parent selection.
//!
//! A re-sharer who does not follow the root is attributed to the friend who
//! re-shared most recently before them: the smallest positive time gap.
//! Equal gaps go to the smallest id. The root never re-shared its own post,
//! so a friend-listed root is not a candidate.

use std::cmp::Reverse;
use std::collections::BTreeMap;

use crate::model::{FollowerSet, FriendMap};
use crate::timeline::Timeline;

/// Pick a parent for every non-follower re-sharer with an eligible friend.
///
/// Returns `source → parent`, sorted by source. Users with no friend entry
/// or no friend acting strictly earlier are absent from the result.
#[must_use]
pub fn resolve_by_friendship(
    timeline: &Timeline,
    followers: &FollowerSet,
    friends: &FriendMap,
) -> BTreeMap<String, String> {
    timeline
        .resharers()
        .into_iter()
        .filter(|user| !followers.contains(*user))
        .filter_map(|user| {
            let parent = latest_earlier_friend(timeline, user, friends.get(user)?)?;
            Some((user.to_string(), parent.to_string()))
        })
        .collect()
}

fn latest_earlier_friend<'a>(
    timeline: &Timeline,
    user: &str,
    friends: impl IntoIterator<Item = &'a String>,
) -> Option<&'a str> {
    let acted = timeline.moment(user)?;

    friends
        .into_iter()
        .filter(|friend| friend.as_str() != timeline.root())
        .filter_map(|friend| {
            let moment = timeline.moment(friend)?;
            (moment < acted).then_some((moment, friend.as_str()))
        })
        .max_by_key(|(moment, id)| (*moment, Reverse(*id)))
        .map(|(_, id)| id)
}
