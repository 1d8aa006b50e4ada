//! Algorithm components for the trading agent.
//!
//! - `gae`: Generalized Advantage Estimation and target returns
//! - `action_policy`: validated action distributions and stochastic sampling
//! - `actor_critic`: actor/critic capability trait and the training signal
//! - `policy_loss`: clipped surrogate and value losses

pub mod action_policy;
pub mod actor_critic;
pub mod gae;
pub mod policy_loss;

#[cfg(test)]
mod tests;

pub use action_policy::{ActionDistribution, ActionSampler, PROBABILITY_TOLERANCE};
pub use actor_critic::{ActorCritic, FitOptions, LossHistory, TrainingSignal};
pub use gae::{compute_gae, estimate_advantages, normalize_advantages, AdvantageEstimate, GaeParams};
pub use policy_loss::{entropy, ppo_signal_loss, value_loss, PolicyLossConfig};
