use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, TimeZone, Utc};
use proptest::prelude::*;

use rtcascade_core::interaction::{CandidateSignal, best_candidate};
use rtcascade_core::{
    Cascade, FollowerSet, FriendMap, FriendshipOptions, InteractionOptions, InteractionRecord,
    PostRef, ReshareRecord, Weights, analyze, estimate_by_friendship, estimate_by_interaction,
};

const ROOT: &str = "R";

fn at(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_600_000_000 + secs, 0).unwrap()
}

fn user(index: usize) -> String {
    format!("u{index:02}")
}

/// A generated dataset: re-share times per user (duplicates allowed),
/// follower flags, interactions and friend lists.
#[derive(Debug, Clone)]
struct Dataset {
    reshares: Vec<ReshareRecord>,
    followers: FollowerSet,
    interactions: Vec<InteractionRecord>,
    friends: FriendMap,
}

impl Dataset {
    /// Earliest re-share time per non-root user.
    fn earliest(&self) -> HashMap<String, DateTime<Utc>> {
        let mut earliest: HashMap<String, DateTime<Utc>> = HashMap::new();
        for record in &self.reshares {
            let (Some(id), Some(time)) = (record.user_id.clone(), record.created_at) else {
                continue;
            };
            earliest
                .entry(id)
                .and_modify(|t| *t = (*t).min(time))
                .or_insert(time);
        }
        earliest
    }
}

fn arb_dataset() -> impl Strategy<Value = Dataset> {
    (1usize..12).prop_flat_map(|n| {
        (
            prop::collection::vec((0..n, 1i64..30), n..n * 2),
            prop::collection::vec(any::<bool>(), n),
            prop::collection::vec((0..n, 0..=n, 0u8..3, 1i64..60), 0..40),
            prop::collection::vec(prop::collection::vec(0..=n, 0..4), n),
        )
            .prop_map(move |(times, follows, raw_interactions, raw_friends)| {
                let original = PostRef::new(ROOT, at(0));
                // Every user re-shares at least once.
                let mut reshares: Vec<ReshareRecord> = (0..n)
                    .map(|i| ReshareRecord::new(user(i), at(30 + i64::try_from(i).unwrap_or(0)), original.clone()))
                    .collect();
                reshares.extend(
                    times
                        .into_iter()
                        .map(|(i, t)| ReshareRecord::new(user(i), at(t), original.clone())),
                );

                let target = |j: usize| if j == n { ROOT.to_string() } else { user(j) };

                let followers = follows
                    .iter()
                    .enumerate()
                    .filter(|(_, follows)| **follows)
                    .map(|(i, _)| user(i))
                    .collect();

                let interactions = raw_interactions
                    .into_iter()
                    .map(|(i, j, channel, t)| match channel {
                        0 => InteractionRecord::quote(user(i), at(t), target(j)),
                        1 => InteractionRecord::reply(user(i), at(t), target(j)),
                        _ => InteractionRecord::retweet(user(i), at(t), target(j)),
                    })
                    .collect();

                let friends = raw_friends
                    .into_iter()
                    .enumerate()
                    .map(|(i, list)| (user(i), list.into_iter().map(target).collect::<HashSet<_>>()))
                    .collect();

                Dataset {
                    reshares,
                    followers,
                    interactions,
                    friends,
                }
            })
    })
}

fn arb_weights() -> impl Strategy<Value = Weights> {
    (0u8..5, 0u8..5, 0u8..5)
        .prop_map(|(q, r, t)| Weights::new(f64::from(q), f64::from(r), f64::from(t)))
}

fn both_cascades(data: &Dataset, weights: Weights) -> [Cascade; 2] {
    let by_interaction = estimate_by_interaction(
        &data.reshares,
        &data.followers,
        &data.interactions,
        &InteractionOptions {
            weights,
            verbose: false,
        },
    )
    .expect("interaction estimate");
    let by_friendship = estimate_by_friendship(
        &data.reshares,
        &data.followers,
        &data.friends,
        &FriendshipOptions::default(),
    )
    .expect("friendship estimate");
    [by_interaction, by_friendship]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(256))]

    #[test]
    fn every_resharer_is_a_source_exactly_once(data in arb_dataset(), weights in arb_weights()) {
        let expected: Vec<String> = {
            let mut ids: Vec<String> = data.earliest().into_keys().collect();
            ids.sort();
            ids
        };
        for cascade in both_cascades(&data, weights) {
            let sources: Vec<String> = cascade.edges.iter().map(|e| e.source.clone()).collect();
            prop_assert_eq!(&sources, &expected);
            prop_assert!(cascade.edge(ROOT).is_none());
        }
    }

    #[test]
    fn resolved_edges_point_back_in_time(data in arb_dataset(), weights in arb_weights()) {
        let earliest = data.earliest();
        for cascade in both_cascades(&data, weights) {
            for edge in &cascade.edges {
                let Some(target) = edge.target.as_deref() else { continue };
                prop_assert_ne!(target, edge.source.as_str());
                if target == ROOT {
                    continue;
                }
                prop_assert!(
                    earliest[target] < earliest[&edge.source],
                    "{} -> {} violates causality", edge.source, target
                );
            }
        }
    }

    #[test]
    fn followers_always_link_to_root(data in arb_dataset(), weights in arb_weights()) {
        for cascade in both_cascades(&data, weights) {
            for edge in &cascade.edges {
                if data.followers.contains(&edge.source) {
                    prop_assert_eq!(edge.target.as_deref(), Some(ROOT));
                }
            }
        }
    }

    #[test]
    fn friendship_links_to_root_only_through_followers(data in arb_dataset(), weights in arb_weights()) {
        let [_, by_friendship] = both_cascades(&data, weights);
        for edge in &by_friendship.edges {
            if edge.target.as_deref() == Some(ROOT) {
                prop_assert!(data.followers.contains(&edge.source));
            }
        }
    }

    #[test]
    fn disconnected_and_reached_partition_resharers(data in arb_dataset(), weights in arb_weights()) {
        for cascade in both_cascades(&data, weights) {
            let info = analyze(&cascade, ROOT);
            prop_assert_eq!(info.disconnected + info.reached(), cascade.len());
        }
    }

    #[test]
    fn analyze_is_idempotent(data in arb_dataset(), weights in arb_weights()) {
        for cascade in both_cascades(&data, weights) {
            prop_assert_eq!(analyze(&cascade, ROOT), analyze(&cascade, ROOT));
        }
    }

    #[test]
    fn estimation_ignores_record_order(data in arb_dataset(), weights in arb_weights()) {
        let mut shuffled = data.clone();
        // Keep the first record so the root post is still found first.
        shuffled.reshares[1..].reverse();
        shuffled.interactions.reverse();
        prop_assert_eq!(both_cascades(&data, weights), both_cascades(&shuffled, weights));
    }

    #[test]
    fn raising_retweet_weight_keeps_retweet_only_winner(
        retweets in 1usize..5,
        others in prop::collection::vec((0usize..4, 0usize..4, 0usize..4, 0i64..10), 0..5),
        weights in (0u8..5, 0u8..5, 1u8..5).prop_map(|(q, r, t)| Weights::new(f64::from(q), f64::from(r), f64::from(t))),
        bump in 0u8..5,
    ) {
        let mut candidates = BTreeMap::new();
        candidates.insert("retweeter".to_string(), CandidateSignal {
            quotes: 0,
            replies: 0,
            retweets,
            latest: at(5),
        });
        for (i, (quotes, replies, rts, latest)) in others.into_iter().enumerate() {
            candidates.insert(format!("other{i}"), CandidateSignal {
                quotes,
                replies,
                retweets: rts,
                latest: at(latest),
            });
        }

        let before = best_candidate(&candidates, &weights).map(|(id, _)| id);
        prop_assume!(before == Some("retweeter"));

        let raised = Weights { retweet: weights.retweet + f64::from(bump), ..weights };
        let after = best_candidate(&candidates, &raised).map(|(id, _)| id);
        prop_assert_eq!(after, Some("retweeter"));
    }
}
