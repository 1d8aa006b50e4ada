//! Actor-critic capability consumed by the training orchestrator.
//!
//! # Design
//!
//! The orchestrator only needs four operations: policy prediction, value
//! prediction, fitting the policy on a training signal and fitting the value
//! function on targets. Whether the two functions share weights is an
//! implementation detail of the type behind [`ActorCritic`]:
//!
//! - [`SeparateActorCritic`](crate::nn::SeparateActorCritic): independent networks
//! - [`SharedActorCritic`](crate::nn::SharedActorCritic): one trunk, two heads
//!
//! # Training Signal Layout
//!
//! ```text
//! column:  0          1..4                 4..7
//!          advantage  old probabilities    one-hot action
//! ```

use std::path::Path;

use crate::core::{MarketState, TradeAction, N_ACTIONS};
use crate::error::AgentError;

/// Options for one fit call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Passes over the data.
    pub epochs: usize,
    /// Minibatch size (the last minibatch of an epoch may be smaller).
    pub batch_size: usize,
    /// Reshuffle step order before every epoch.
    pub shuffle: bool,
    /// Optimizer learning rate.
    pub learning_rate: f64,
}

/// Mean minibatch loss of each epoch of one fit call.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LossHistory {
    pub epoch_losses: Vec<f32>,
}

impl LossHistory {
    pub fn new(epoch_losses: Vec<f32>) -> Self {
        Self { epoch_losses }
    }

    /// Sum over epochs, the scalar reported per replay.
    pub fn total(&self) -> f32 {
        self.epoch_losses.iter().sum()
    }
}

/// Per-step rows consumed by the actor loss.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSignal {
    data: Vec<f32>,
    rows: usize,
}

impl TrainingSignal {
    /// Columns per row: advantage, old distribution, one-hot action.
    pub const WIDTH: usize = 1 + 2 * N_ACTIONS;
    pub const ADVANTAGE: usize = 0;
    pub const OLD_PROBS: std::ops::Range<usize> = 1..1 + N_ACTIONS;
    pub const ACTION: std::ops::Range<usize> = 1 + N_ACTIONS..1 + 2 * N_ACTIONS;

    /// Concatenate `[advantage, old_probs, one_hot(action)]` for every step.
    pub fn assemble(
        advantages: &[f32],
        old_probs: &[[f32; N_ACTIONS]],
        actions: &[TradeAction],
    ) -> Result<Self, AgentError> {
        let rows = advantages.len();
        AgentError::check_len("old_probs", rows, old_probs.len())?;
        AgentError::check_len("actions", rows, actions.len())?;

        let mut data = Vec::with_capacity(rows * Self::WIDTH);
        for ((&advantage, probs), action) in advantages.iter().zip(old_probs).zip(actions) {
            data.push(advantage);
            data.extend_from_slice(probs);
            data.extend_from_slice(&action.one_hot());
        }

        Ok(Self { data, rows })
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Row-major `[rows, WIDTH]` buffer.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    pub fn row(&self, index: usize) -> &[f32] {
        &self.data[index * Self::WIDTH..(index + 1) * Self::WIDTH]
    }

    /// Rows at `indices`, in that order, flattened.
    pub fn gather(&self, indices: &[usize]) -> Vec<f32> {
        indices.iter().flat_map(|&i| self.row(i)).copied().collect()
    }
}

/// Policy and value function approximators.
pub trait ActorCritic {
    /// Action distribution for each state.
    fn predict_policy(&self, states: &[MarketState]) -> Result<Vec<[f32; N_ACTIONS]>, AgentError>;

    /// Value estimate for each state.
    fn predict_values(&self, states: &[MarketState]) -> Result<Vec<f32>, AgentError>;

    /// Fit the policy on `(states, signal)`.
    fn fit_actor(
        &mut self,
        states: &[MarketState],
        signal: &TrainingSignal,
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError>;

    /// Fit the value function on `(states, targets)`.
    fn fit_critic(
        &mut self,
        states: &[MarketState],
        targets: &[f32],
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError>;

    /// Persist parameters under `dir`, optionally tagged with a score.
    fn save(&self, dir: &Path, name: &str, score: Option<&str>) -> Result<(), AgentError>;

    /// Restore parameters written by [`ActorCritic::save`].
    fn load(&mut self, dir: &Path, name: &str) -> Result<(), AgentError>;
}
