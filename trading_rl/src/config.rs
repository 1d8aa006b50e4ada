//! Agent configuration.
//!
//! An [`AgentConfig`] is fixed when the agent is built and never changes
//! afterwards; the agent only hands out shared references to it.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::algorithms::actor_critic::FitOptions;
use crate::algorithms::gae::GaeParams;
use crate::core::StateShape;

/// Configuration validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// A count parameter must be positive.
    #[error("{field} must be > 0, got {value}")]
    InvalidCount { field: &'static str, value: usize },
    /// A parameter is outside its valid range.
    #[error("{field} must be in [{min}, {max}], got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

/// Hyperparameters the agent holds for its lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Steps of market and order history in each observation.
    pub lookback_window_size: usize,
    /// Values per step: 10 market/order columns plus 9 indicators by default.
    pub feature_count: usize,
    /// Discount factor.
    pub gamma: f32,
    /// GAE decay.
    pub gae_lambda: f32,
    /// Learning rate passed to every optimizer step.
    pub learning_rate: f64,
    /// Minibatch size for both fit calls.
    pub batch_size: usize,
    /// Passes over each rollout per fit call.
    pub epochs: usize,
    /// Normalize advantages across the whole batch.
    pub normalize_advantages: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            lookback_window_size: 50,
            feature_count: 10 + 9,
            gamma: 0.99,
            gae_lambda: 0.95,
            learning_rate: 0.00005,
            batch_size: 32,
            epochs: 1,
            normalize_advantages: true,
        }
    }
}

impl AgentConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_lookback_window_size(mut self, size: usize) -> Self {
        self.lookback_window_size = size;
        self
    }

    pub fn with_feature_count(mut self, count: usize) -> Self {
        self.feature_count = count;
        self
    }

    pub fn with_gamma(mut self, gamma: f32) -> Self {
        self.gamma = gamma;
        self
    }

    pub fn with_gae_lambda(mut self, lambda: f32) -> Self {
        self.gae_lambda = lambda;
        self
    }

    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_epochs(mut self, epochs: usize) -> Self {
        self.epochs = epochs;
        self
    }

    pub fn with_normalize_advantages(mut self, normalize: bool) -> Self {
        self.normalize_advantages = normalize;
        self
    }

    /// Observation window shape.
    pub fn state_shape(&self) -> StateShape {
        StateShape::new(self.lookback_window_size, self.feature_count)
    }

    /// GAE parameters derived from this configuration.
    pub fn gae_params(&self) -> GaeParams {
        GaeParams {
            gamma: self.gamma,
            lambda: self.gae_lambda,
            normalize: self.normalize_advantages,
        }
    }

    /// Fit options shared by the actor and critic fits. Minibatches are
    /// always shuffled.
    pub fn fit_options(&self) -> FitOptions {
        FitOptions {
            epochs: self.epochs,
            batch_size: self.batch_size,
            shuffle: true,
            learning_rate: self.learning_rate,
        }
    }

    /// Validate all parameters.
    ///
    /// - window size, feature count, batch size and epochs must be > 0
    /// - gamma and gae_lambda must be in [0, 1]
    /// - learning_rate must be in (0, 1]
    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("lookback_window_size", self.lookback_window_size),
            ("feature_count", self.feature_count),
            ("batch_size", self.batch_size),
            ("epochs", self.epochs),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value });
            }
        }

        let unit_ranges = [("gamma", self.gamma), ("gae_lambda", self.gae_lambda)];
        for (field, value) in unit_ranges {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::OutOfRange {
                    field,
                    value: value as f64,
                    min: 0.0,
                    max: 1.0,
                });
            }
        }

        if !(self.learning_rate > 0.0 && self.learning_rate <= 1.0) {
            return Err(ConfigError::OutOfRange {
                field: "learning_rate",
                value: self.learning_rate,
                min: 0.0,
                max: 1.0,
            });
        }

        Ok(())
    }

    /// Validate and return the configuration.
    pub fn build(self) -> Result<Self, ConfigError> {
        self.validate()?;
        Ok(self)
    }
}
