//! Rollout buffer for on-policy replay.
//!
//! Key characteristics:
//! - Preserves temporal ordering of one episode or fixed-length segment
//! - Append-only until consumed
//! - Consumed by value, so a replayed rollout cannot be reused

use crate::core::{MarketState, TradeAction, TradingTransition, N_ACTIONS};
use crate::error::AgentError;

/// Column view of a finished rollout.
///
/// Every column has the same non-zero length and step order.
#[derive(Debug, Clone)]
pub struct RolloutBatch {
    states: Vec<MarketState>,
    actions: Vec<TradeAction>,
    rewards: Vec<f32>,
    policy_probs: Vec<[f32; N_ACTIONS]>,
    dones: Vec<bool>,
    next_states: Vec<MarketState>,
}

impl RolloutBatch {
    /// Build a batch from parallel columns.
    pub fn from_columns(
        states: Vec<MarketState>,
        actions: Vec<TradeAction>,
        rewards: Vec<f32>,
        policy_probs: Vec<[f32; N_ACTIONS]>,
        dones: Vec<bool>,
        next_states: Vec<MarketState>,
    ) -> Result<Self, AgentError> {
        let n = states.len();
        if n == 0 {
            return Err(AgentError::EmptyBatch("rollout"));
        }
        AgentError::check_len("actions", n, actions.len())?;
        AgentError::check_len("rewards", n, rewards.len())?;
        AgentError::check_len("policy_probs", n, policy_probs.len())?;
        AgentError::check_len("dones", n, dones.len())?;
        AgentError::check_len("next_states", n, next_states.len())?;

        Ok(Self {
            states,
            actions,
            rewards,
            policy_probs,
            dones,
            next_states,
        })
    }

    pub fn states(&self) -> &[MarketState] {
        &self.states
    }

    pub fn actions(&self) -> &[TradeAction] {
        &self.actions
    }

    pub fn rewards(&self) -> &[f32] {
        &self.rewards
    }

    /// Distributions the actions were sampled from.
    pub fn policy_probs(&self) -> &[[f32; N_ACTIONS]] {
        &self.policy_probs
    }

    pub fn dones(&self) -> &[bool] {
        &self.dones
    }

    pub fn next_states(&self) -> &[MarketState] {
        &self.next_states
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }
}

/// Transitions of the rollout in progress.
#[derive(Debug, Default)]
pub struct RolloutBuffer {
    transitions: Vec<TradingTransition>,
}

impl RolloutBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            transitions: Vec::with_capacity(capacity),
        }
    }

    /// Append the next step.
    pub fn push(&mut self, transition: TradingTransition) {
        if self.episode_finished() {
            log::warn!(
                "step {} recorded after the episode finished; replay treats it as a new episode",
                self.transitions.len()
            );
        }
        self.transitions.push(transition);
    }

    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Whether the last recorded step ended its episode.
    pub fn episode_finished(&self) -> bool {
        self.transitions.last().is_some_and(TradingTransition::done)
    }

    pub fn transitions(&self) -> &[TradingTransition] {
        &self.transitions
    }

    /// Consume the buffer into a column batch.
    pub fn into_batch(self) -> Result<RolloutBatch, AgentError> {
        let n = self.transitions.len();
        let mut states = Vec::with_capacity(n);
        let mut actions = Vec::with_capacity(n);
        let mut rewards = Vec::with_capacity(n);
        let mut dones = Vec::with_capacity(n);
        let mut policy_probs = Vec::with_capacity(n);
        let mut next_states = Vec::with_capacity(n);

        for transition in self.transitions {
            let (state, action, reward, done, probs, next_state) = transition.into_parts();
            states.push(state);
            actions.push(action);
            rewards.push(reward);
            dones.push(done);
            policy_probs.push(probs);
            next_states.push(next_state);
        }

        RolloutBatch::from_columns(states, actions, rewards, policy_probs, dones, next_states)
    }
}
