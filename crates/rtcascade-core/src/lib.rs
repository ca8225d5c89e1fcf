#![forbid(unsafe_code)]
//! rtcascade-core library.
//!
//! Reconstructs the propagation forest of a re-shared post and computes
//! structural analytics over it.
//!
//! # Conventions
//!
//! - **Errors**: [`CascadeError`] for the estimation pipeline; `anyhow::Result`
//!   where files are read ([`config`]).
//! - **Logging**: Use `tracing` macros (`info!`, `warn!`, `debug!`, `trace!`).
//! - **Determinism**: Every map that drives output order is a `BTreeMap` or is
//!   sorted before use.

pub mod analytics;
pub mod assemble;
pub mod config;
pub mod error;
pub mod estimate;
pub mod friendship;
pub mod interaction;
pub mod model;
pub mod timeline;
pub mod timing;

pub use analytics::{CascadeInfo, Influencer, analyze};
pub use config::CascadeConfig;
pub use error::{CascadeError, ErrorCode};
pub use estimate::{
    FriendshipOptions, InteractionOptions, Strategy, estimate_by_friendship,
    estimate_by_interaction,
};
pub use interaction::{Channel, Weights};
pub use model::{
    Attribution, Cascade, Edge, FollowerSet, FriendMap, InteractionRecord, PostRef, ReshareRecord,
};
