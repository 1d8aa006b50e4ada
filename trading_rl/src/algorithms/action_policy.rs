//! Stochastic action selection over the discrete trading action set.
//!
//! - [`ActionDistribution`]: validated probability vector, one entry per [`TradeAction`]
//! - [`ActionSampler`]: draws an action using the distribution as weights
//!
//! Actions are drawn, never taken by argmax. The distribution travels with
//! the action into the rollout as the old probabilities of the actor loss.

use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::core::{TradeAction, N_ACTIONS};
use crate::error::AgentError;

/// Allowed deviation of the probability sum from 1.
pub const PROBABILITY_TOLERANCE: f32 = 1e-3;

/// A probability vector over [`TradeAction::ALL`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActionDistribution([f32; N_ACTIONS]);

impl ActionDistribution {
    /// Validate a policy output.
    ///
    /// Degenerate vectors are rejected, never renormalized.
    pub fn new(probs: &[f32]) -> Result<Self, AgentError> {
        let invalid = |reason| AgentError::InvalidDistribution {
            probs: probs.to_vec(),
            reason,
        };

        if probs.len() != N_ACTIONS {
            return Err(invalid("expected one probability per action"));
        }
        if probs.iter().any(|p| !p.is_finite()) {
            return Err(invalid("non-finite probability"));
        }
        if probs.iter().any(|&p| p < 0.0) {
            return Err(invalid("negative probability"));
        }
        let sum: f32 = probs.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(invalid("probabilities do not sum to 1"));
        }

        let mut values = [0.0; N_ACTIONS];
        values.copy_from_slice(probs);
        Ok(Self(values))
    }

    /// Probabilities in action-index order.
    pub fn probs(&self) -> [f32; N_ACTIONS] {
        self.0
    }
}

/// Weighted random action selection.
///
/// The random source is owned so tests can fix it with [`ActionSampler::seeded`].
#[derive(Debug, Clone)]
pub struct ActionSampler<R: Rng = StdRng> {
    rng: R,
}

impl ActionSampler<StdRng> {
    /// Sampler with a fixed seed for reproducible action sequences.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Sampler seeded from OS entropy.
    pub fn from_entropy() -> Self {
        Self::new(StdRng::from_entropy())
    }
}

impl<R: Rng> ActionSampler<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Draw one action from `probs`.
    ///
    /// Returns the action together with the validated distribution it was
    /// drawn from.
    pub fn select(&mut self, probs: &[f32]) -> Result<(TradeAction, ActionDistribution), AgentError> {
        let distribution = ActionDistribution::new(probs)?;
        let action = self.sample(&distribution)?;
        Ok((action, distribution))
    }

    /// Draw one action from an already validated distribution.
    pub fn sample(&mut self, distribution: &ActionDistribution) -> Result<TradeAction, AgentError> {
        let weights = WeightedIndex::new(distribution.0.iter()).map_err(|_| AgentError::InvalidDistribution {
            probs: distribution.0.to_vec(),
            reason: "weights cannot be sampled",
        })?;
        Ok(TradeAction::ALL[weights.sample(&mut self.rng)])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distribution_accepts_valid() {
        let dist = ActionDistribution::new(&[0.2, 0.3, 0.5]).unwrap();
        assert_eq!(dist.probs(), [0.2, 0.3, 0.5]);
    }

    #[test]
    fn test_distribution_accepts_softmax_rounding() {
        assert!(ActionDistribution::new(&[0.3333, 0.3333, 0.3333]).is_ok());
    }

    #[test]
    fn test_distribution_rejects_degenerate() {
        let cases: [&[f32]; 5] = [
            &[0.5, 0.5],
            &[0.5, 0.5, 0.5],
            &[1.2, -0.2, 0.0],
            &[f32::NAN, 0.5, 0.5],
            &[0.0, 0.0, 0.0],
        ];
        for probs in cases {
            assert!(
                matches!(ActionDistribution::new(probs), Err(AgentError::InvalidDistribution { .. })),
                "{:?} should be rejected",
                probs
            );
        }
    }
}
