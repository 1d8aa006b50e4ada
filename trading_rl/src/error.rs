//! Crate-level error type.
//!
//! Shape and precondition violations fail immediately. Failures raised by the
//! networks or the environment are carried through unchanged; nothing in this
//! crate retries or recovers a partial result.

use std::error::Error as StdError;
use std::io;

use thiserror::Error;

use crate::checkpoint::CheckpointError;
use crate::config::ConfigError;

/// Errors produced by the agent core.
#[derive(Debug, Error)]
pub enum AgentError {
    /// Two sequences that must line up step-for-step have different lengths.
    #[error("length mismatch: `{field}` has {actual} entries, expected {expected}")]
    LengthMismatch {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    /// An operation that needs at least one step received none.
    #[error("empty batch passed to {0}")]
    EmptyBatch(&'static str),

    /// A policy output that is not a probability vector over the action set.
    #[error("invalid action distribution {probs:?}: {reason}")]
    InvalidDistribution { probs: Vec<f32>, reason: &'static str },

    /// A state whose window does not match the agent's configured shape.
    #[error("state shape mismatch: expected [{expected_lookback}, {expected_features}], got [{lookback}, {features}]")]
    StateShape {
        expected_lookback: usize,
        expected_features: usize,
        lookback: usize,
        features: usize,
    },

    /// A fit call produced a NaN or infinite minibatch loss.
    #[error("{network} loss diverged to {loss} in epoch {epoch}")]
    NonFiniteLoss {
        network: &'static str,
        epoch: usize,
        loss: f32,
    },

    /// Tensor data could not be read back from the backend.
    #[error("model readback failed: {0}")]
    Model(String),

    /// The environment failed during `reset` or `step`.
    #[error("environment failure: {0}")]
    Environment(#[source] Box<dyn StdError + Send + Sync>),

    /// An evaluation episode never reached its boundary within the step cap.
    #[error("episode {episode} exceeded {max_steps} steps without ending")]
    EpisodeOverrun { episode: usize, max_steps: usize },

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Wrap an environment error.
    pub fn environment<E>(err: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        AgentError::Environment(Box::new(err))
    }

    /// Fail unless `actual == expected`.
    pub fn check_len(field: &'static str, expected: usize, actual: usize) -> Result<(), AgentError> {
        if expected == actual {
            Ok(())
        } else {
            Err(AgentError::LengthMismatch {
                field,
                expected,
                actual,
            })
        }
    }
}
