#![no_main]

use libfuzzer_sys::fuzz_target;
use rtcascade_core::{
    FollowerSet, FriendMap, FriendshipOptions, InteractionOptions, InteractionRecord,
    ReshareRecord, analyze, estimate_by_friendship, estimate_by_interaction,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct Dataset {
    #[serde(default)]
    reshares: Vec<ReshareRecord>,
    #[serde(default)]
    followers: FollowerSet,
    #[serde(default)]
    interactions: Vec<InteractionRecord>,
    #[serde(default)]
    friends: FriendMap,
}

fuzz_target!(|data: &[u8]| {
    let Ok(dataset) = serde_json::from_slice::<Dataset>(data) else {
        return;
    };

    // Validation errors are fine; panics and invariant violations are not.
    for result in [
        estimate_by_interaction(
            &dataset.reshares,
            &dataset.followers,
            &dataset.interactions,
            &InteractionOptions::default(),
        ),
        estimate_by_friendship(
            &dataset.reshares,
            &dataset.followers,
            &dataset.friends,
            &FriendshipOptions::default(),
        ),
    ] {
        match result {
            Ok(cascade) => {
                let info = analyze(&cascade, &cascade.root);
                assert_eq!(info.disconnected + info.reached(), cascade.len());
            }
            Err(rtcascade_core::CascadeError::InvariantViolation(msg)) => {
                panic!("invariant violated: {msg}");
            }
            Err(_) => {}
        }
    }
});
