//! Generalized Advantage Estimation over one rollout batch.
//!
//! GAE provides a family of policy gradient estimators parameterized by λ:
//! - λ = 0: one-step TD (low variance, high bias)
//! - λ = 1: Monte Carlo (high variance, low bias)
//! - λ ∈ (0, 1): interpolation
//!
//! ## Formula
//!
//! δ_t = r_t + γ (1 - d_t) V(s_{t+1}) - V(s_t)
//! A_t = δ_t + (1 - d_t) γλ A_{t+1},   A_{N-1} = δ_{N-1}
//!
//! The critic supplies `V(s_{t+1})` for every step, so the last step bootstraps
//! from its own next-state estimate rather than a separate tail value.
//!
//! ## References
//!
//! - Schulman et al., "High-Dimensional Continuous Control Using
//!   Generalized Advantage Estimation" (2016)

use crate::error::AgentError;

/// Added to the standard deviation when normalizing.
pub const NORMALIZATION_EPSILON: f32 = 1e-8;

/// Discounting and normalization settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaeParams {
    /// Discount factor γ.
    pub gamma: f32,
    /// GAE decay λ.
    pub lambda: f32,
    /// Rescale advantages to zero mean, unit variance across the batch.
    pub normalize: bool,
}

impl Default for GaeParams {
    fn default() -> Self {
        Self {
            gamma: 0.99,
            lambda: 0.95,
            normalize: true,
        }
    }
}

/// Per-step advantages and critic targets, in input order.
#[derive(Debug, Clone, PartialEq)]
pub struct AdvantageEstimate {
    /// Advantages, normalized if requested.
    pub advantages: Vec<f32>,
    /// Critic regression targets: raw advantage + value.
    pub targets: Vec<f32>,
}

impl AdvantageEstimate {
    pub fn len(&self) -> usize {
        self.advantages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.advantages.is_empty()
    }
}

/// Fail unless every column has the same non-zero length as `rewards`.
fn check_columns(rewards: &[f32], dones: &[bool], values: &[f32], next_values: &[f32]) -> Result<(), AgentError> {
    let n = rewards.len();
    if n == 0 {
        return Err(AgentError::EmptyBatch("advantage estimation"));
    }
    AgentError::check_len("dones", n, dones.len())?;
    AgentError::check_len("values", n, values.len())?;
    AgentError::check_len("next_values", n, next_values.len())
}

/// One-step TD residuals.
pub fn td_residuals(
    rewards: &[f32],
    dones: &[bool],
    values: &[f32],
    next_values: &[f32],
    gamma: f32,
) -> Result<Vec<f32>, AgentError> {
    check_columns(rewards, dones, values, next_values)?;
    Ok(rewards
        .iter()
        .zip(dones)
        .zip(values.iter().zip(next_values))
        .map(|((&r, &d), (&v, &nv))| {
            let not_done = if d { 0.0 } else { 1.0 };
            r + gamma * not_done * nv - v
        })
        .collect())
}

/// Raw GAE recursion.
///
/// # Returns
///
/// (advantages, targets) - both [N], advantages unnormalized
pub fn compute_gae(
    rewards: &[f32],
    dones: &[bool],
    values: &[f32],
    next_values: &[f32],
    gamma: f32,
    gae_lambda: f32,
) -> Result<(Vec<f32>, Vec<f32>), AgentError> {
    let mut gaes = td_residuals(rewards, dones, values, next_values, gamma)?;

    // Must run newest to oldest: step t reads the finished step t+1.
    for t in (0..gaes.len() - 1).rev() {
        let not_done = if dones[t] { 0.0 } else { 1.0 };
        gaes[t] += not_done * gamma * gae_lambda * gaes[t + 1];
    }

    let targets = gaes.iter().zip(values).map(|(a, v)| a + v).collect();
    Ok((gaes, targets))
}

/// Normalize advantages to zero mean and unit variance.
///
/// Uses the population standard deviation plus [`NORMALIZATION_EPSILON`], so
/// a batch whose variance collapses (including a single step) maps to zeros
/// instead of NaN.
pub fn normalize_advantages(advantages: &mut [f32]) {
    if advantages.is_empty() {
        return;
    }

    let n = advantages.len() as f32;
    let mean = advantages.iter().sum::<f32>() / n;
    let variance = advantages.iter().map(|a| (a - mean).powi(2)).sum::<f32>() / n;
    let std = variance.sqrt();

    for a in advantages.iter_mut() {
        *a = (*a - mean) / (std + NORMALIZATION_EPSILON);
    }
}

/// Validate inputs, run GAE and optionally normalize the advantages.
///
/// Targets are always computed from the unnormalized advantages.
pub fn estimate_advantages(
    rewards: &[f32],
    dones: &[bool],
    values: &[f32],
    next_values: &[f32],
    params: GaeParams,
) -> Result<AdvantageEstimate, AgentError> {
    let (mut advantages, targets) =
        compute_gae(rewards, dones, values, next_values, params.gamma, params.lambda)?;

    if params.normalize {
        normalize_advantages(&mut advantages);
    }

    Ok(AdvantageEstimate {
        advantages,
        targets,
    })
}
