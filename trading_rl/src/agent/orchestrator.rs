//! Replay: rollout batch in, fitted actor and critic out.

use crate::algorithms::actor_critic::{ActorCritic, TrainingSignal};
use crate::algorithms::gae::estimate_advantages;
use crate::buffers::RolloutBatch;
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::metrics::ScalarSink;

/// Metric name of the summed actor loss.
pub const ACTOR_LOSS_METRIC: &str = "Data/actor_loss_per_replay";
/// Metric name of the summed critic loss.
pub const CRITIC_LOSS_METRIC: &str = "Data/critic_loss_per_replay";

/// Losses reported by one replay, each summed over fit epochs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReplayLosses {
    pub actor: f32,
    pub critic: f32,
}

/// Turns rollouts into actor and critic updates.
///
/// Owns the replay counter that keys the loss series.
#[derive(Default)]
pub struct TrainingOrchestrator {
    replay_count: usize,
    sink: Option<Box<dyn ScalarSink>>,
}

impl TrainingOrchestrator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Orchestrator that reports losses to `sink`.
    pub fn with_sink<S: ScalarSink + 'static>(sink: S) -> Self {
        Self {
            replay_count: 0,
            sink: Some(Box::new(sink)),
        }
    }

    pub fn set_sink(&mut self, sink: Box<dyn ScalarSink>) {
        self.sink = Some(sink);
    }

    /// Completed replays.
    pub fn replay_count(&self) -> usize {
        self.replay_count
    }

    /// Fit `model` on one rollout.
    ///
    /// Critic estimates for states and next states feed the advantage
    /// estimate; the actor is fitted on the `[advantage, old_probs, one_hot]`
    /// signal and the critic on the unnormalized targets. Fit failures
    /// propagate unchanged and leave the counter untouched.
    pub fn replay<M: ActorCritic>(
        &mut self,
        model: &mut M,
        batch: &RolloutBatch,
        config: &AgentConfig,
    ) -> Result<ReplayLosses, AgentError> {
        let values = model.predict_values(batch.states())?;
        let next_values = model.predict_values(batch.next_states())?;

        let estimate = estimate_advantages(
            batch.rewards(),
            batch.dones(),
            &values,
            &next_values,
            config.gae_params(),
        )?;

        let signal = TrainingSignal::assemble(&estimate.advantages, batch.policy_probs(), batch.actions())?;
        let options = config.fit_options();

        let actor = model.fit_actor(batch.states(), &signal, &options)?.total();
        let critic = model.fit_critic(batch.states(), &estimate.targets, &options)?.total();

        if let Some(sink) = self.sink.as_mut() {
            sink.add_scalar(ACTOR_LOSS_METRIC, actor, self.replay_count);
            sink.add_scalar(CRITIC_LOSS_METRIC, critic, self.replay_count);
        }
        log::debug!(
            "replay {} over {} steps: actor_loss={:.6} critic_loss={:.6}",
            self.replay_count,
            batch.len(),
            actor,
            critic
        );
        self.replay_count += 1;

        Ok(ReplayLosses { actor, critic })
    }

    /// Flush the sink, if any.
    pub fn flush(&mut self) {
        if let Some(sink) = self.sink.as_mut() {
            sink.flush();
        }
    }
}
