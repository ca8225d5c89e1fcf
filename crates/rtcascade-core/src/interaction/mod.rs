//! Interaction-based edge inference.
//!
//! # Pipeline
//!
//! ```text
//! Timeline + InteractionEvent[]
//!        ↓  extract::extract_channel()   (once per channel)
//! ChannelCounts × 3
//!        ↓  resolve::InteractionSignals::merge()
//! InteractionSignals
//!        ↓  resolve::InteractionSignals::resolve(weights)
//! source → parent
//! ```

pub mod extract;
pub mod resolve;

pub use extract::{Channel, ChannelCounts, PairStats, extract_channel};
pub use resolve::{CandidateSignal, InteractionSignals, Weights, best_candidate};
