//! Actor and critic objectives.
//!
//! The actor loss reads everything it needs from a [`TrainingSignal`]
//! tensor: the advantage, the distribution the action was sampled from and
//! the one-hot action.
//!
//! # Numerical Stability
//!
//! Probabilities are clamped to `[PROB_FLOOR, 1]` before taking logs, so a
//! zero-probability entry in either distribution never produces `-inf`.
//!
//! [`TrainingSignal`]: crate::algorithms::actor_critic::TrainingSignal

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::algorithms::actor_critic::TrainingSignal;
use crate::core::N_ACTIONS;

/// Lower bound applied to probabilities before `log`.
const PROB_FLOOR: f32 = 1e-10;

/// Actor objective settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolicyLossConfig {
    /// PPO clipping ratio ε.
    pub clip_ratio: f32,
    /// Weight of the entropy bonus.
    pub entropy_coef: f32,
}

impl Default for PolicyLossConfig {
    fn default() -> Self {
        Self {
            clip_ratio: 0.2,
            entropy_coef: 0.001,
        }
    }
}

impl PolicyLossConfig {
    pub fn with_clip_ratio(mut self, clip_ratio: f32) -> Self {
        self.clip_ratio = clip_ratio;
        self
    }

    pub fn with_entropy_coef(mut self, entropy_coef: f32) -> Self {
        self.entropy_coef = entropy_coef;
        self
    }
}

/// PPO clipped surrogate keyed off the training signal.
///
/// L = -E[min(r A, clip(r, 1-ε, 1+ε) A)] - c_H E[H(π)]
/// where r = π(a|s) / π_old(a|s)
///
/// # Arguments
///
/// * `probs` - Current policy probabilities: [batch, 3]
/// * `signal` - Training signal rows: [batch, 7]
///
/// # Returns
///
/// Scalar loss tensor (for backpropagation) - 1D tensor with single element
pub fn ppo_signal_loss<B: Backend>(
    probs: Tensor<B, 2>,
    signal: Tensor<B, 2>,
    config: &PolicyLossConfig,
) -> Tensor<B, 1> {
    let [batch, _] = signal.dims();

    let advantages = signal
        .clone()
        .slice([0..batch, TrainingSignal::ADVANTAGE..TrainingSignal::ADVANTAGE + 1]);
    let old_probs = signal.clone().slice([0..batch, TrainingSignal::OLD_PROBS]);
    let actions = signal.slice([0..batch, TrainingSignal::ACTION]);

    // Probability of the taken action under each policy: [batch, 1]
    let prob = (actions.clone() * probs.clone()).sum_dim(1).clamp(PROB_FLOOR, 1.0);
    let old_prob = (actions * old_probs).sum_dim(1).clamp(PROB_FLOOR, 1.0);

    let ratio = (prob.log() - old_prob.log()).exp();
    let clipped = ratio
        .clone()
        .clamp(1.0 - config.clip_ratio, 1.0 + config.clip_ratio);

    let surr1 = ratio * advantages.clone();
    let surr2 = clipped * advantages;
    let actor_loss = -surr1.min_pair(surr2).mean();

    actor_loss - entropy(probs).mean().mul_scalar(config.entropy_coef)
}

/// Per-row entropy of a batch of distributions: [batch, 1].
pub fn entropy<B: Backend>(probs: Tensor<B, 2>) -> Tensor<B, 2> {
    let log_probs = probs.clone().clamp(PROB_FLOOR, 1.0).log();
    -(probs * log_probs).sum_dim(1)
}

/// Mean squared error between value predictions and targets.
///
/// * `values` - [batch, 1]
/// * `targets` - [batch, 1]
pub fn value_loss<B: Backend>(values: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
    (targets - values).powf_scalar(2.0).mean()
}

/// Scalar version of the clipped surrogate (without entropy), for checks.
pub fn ppo_signal_loss_scalar(probs: &[[f32; N_ACTIONS]], signal: &TrainingSignal, clip_ratio: f32) -> f32 {
    let n = signal.rows();
    if n == 0 {
        return 0.0;
    }

    let mut total = 0.0f32;
    for (i, p) in probs.iter().enumerate().take(n) {
        let row = signal.row(i);
        let advantage = row[TrainingSignal::ADVANTAGE];
        let old = &row[TrainingSignal::OLD_PROBS];
        let action = &row[TrainingSignal::ACTION];

        let prob: f32 = action.iter().zip(p).map(|(a, p)| a * p).sum::<f32>().clamp(PROB_FLOOR, 1.0);
        let old_prob: f32 = action.iter().zip(old).map(|(a, p)| a * p).sum::<f32>().clamp(PROB_FLOOR, 1.0);

        let ratio = (prob.ln() - old_prob.ln()).exp();
        let clipped = ratio.clamp(1.0 - clip_ratio, 1.0 + clip_ratio);
        total += (ratio * advantage).min(clipped * advantage);
    }

    -total / n as f32
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::ElementConversion;

    use crate::core::TradeAction;

    type B = NdArray<f32>;

    fn scalar(t: Tensor<B, 1>) -> f32 {
        t.into_scalar().elem()
    }

    fn tensor2(data: &[f32], rows: usize, cols: usize) -> Tensor<B, 2> {
        Tensor::<B, 1>::from_floats(data, &Default::default()).reshape([rows, cols])
    }

    #[test]
    fn test_unchanged_policy_gives_negative_mean_advantage() {
        let probs = [[0.2, 0.5, 0.3], [0.6, 0.3, 0.1]];
        let signal = TrainingSignal::assemble(&[1.0, 3.0], &probs, &[TradeAction::Buy, TradeAction::Hold]).unwrap();
        let config = PolicyLossConfig::default().with_entropy_coef(0.0);

        let flat: Vec<f32> = probs.iter().flatten().copied().collect();
        let loss = scalar(ppo_signal_loss(
            tensor2(&flat, 2, 3),
            tensor2(signal.as_slice(), 2, TrainingSignal::WIDTH),
            &config,
        ));

        // ratio = 1 everywhere → loss = -mean(A)
        assert!((loss + 2.0).abs() < 1e-5, "loss {}", loss);
    }

    #[test]
    fn test_ratio_is_clipped_for_positive_advantage() {
        let old = [[0.1, 0.8, 0.1]];
        let new = [[0.5, 0.4, 0.1]];
        let signal = TrainingSignal::assemble(&[2.0], &old, &[TradeAction::Hold]).unwrap();
        let config = PolicyLossConfig::default().with_entropy_coef(0.0);

        let loss = scalar(ppo_signal_loss(
            tensor2(&new[0], 1, 3),
            tensor2(signal.as_slice(), 1, TrainingSignal::WIDTH),
            &config,
        ));

        // ratio = 5, clipped to 1.2 → -(1.2 * 2)
        assert!((loss + 2.4).abs() < 1e-4, "loss {}", loss);
        assert!((ppo_signal_loss_scalar(&new, &signal, 0.2) - loss).abs() < 1e-4);
    }

    #[test]
    fn test_entropy_bonus_lowers_loss() {
        let probs = [[1.0 / 3.0; 3]];
        let signal = TrainingSignal::assemble(&[0.0], &probs, &[TradeAction::Sell]).unwrap();
        let with = PolicyLossConfig::default().with_entropy_coef(0.1);

        let loss = scalar(ppo_signal_loss(
            tensor2(&probs[0], 1, 3),
            tensor2(signal.as_slice(), 1, TrainingSignal::WIDTH),
            &with,
        ));

        // zero advantage: loss is just -c * ln(3)
        assert!((loss + 0.1 * 3.0f32.ln()).abs() < 1e-4, "loss {}", loss);
    }

    #[test]
    fn test_value_loss_is_mse() {
        let loss = scalar(value_loss(tensor2(&[1.0, 2.0], 2, 1), tensor2(&[2.0, 4.0], 2, 1)));
        assert!((loss - 2.5).abs() < 1e-6);
    }
}
