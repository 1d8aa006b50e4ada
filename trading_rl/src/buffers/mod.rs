//! Experience storage for the on-policy trading agent.
//!
//! - `RolloutBuffer`: chronological transitions of the current rollout,
//!   consumed by value after each replay

pub mod rollout_buffer;

pub use rollout_buffer::{RolloutBatch, RolloutBuffer};
