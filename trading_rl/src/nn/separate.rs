//! Independent actor and critic networks, each with its own optimizer.

use std::path::Path;

use burn::module::AutodiffModule;
use burn::optim::AdamConfig;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::Tensor;
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::algorithms::actor_critic::{ActorCritic, FitOptions, LossHistory, TrainingSignal};
use crate::algorithms::policy_loss::{ppo_signal_loss, value_loss, PolicyLossConfig};
use crate::checkpoint::{Checkpointer, ModelRole};
use crate::core::{MarketState, StateShape, N_ACTIONS};
use crate::error::AgentError;

use super::fit::{fit_minibatches, flatten_states, gather_rows, read_floats, rows_tensor};
use super::networks::{NetworkConfig, PolicyNet, ValueNet};
use super::AdamOptimizer;

/// Actor and critic with no shared weights.
pub struct SeparateActorCritic<B: AutodiffBackend> {
    actor: PolicyNet<B>,
    critic: ValueNet<B>,
    actor_optimizer: AdamOptimizer<PolicyNet<B>, B>,
    critic_optimizer: AdamOptimizer<ValueNet<B>, B>,
    loss_config: PolicyLossConfig,
    shape: StateShape,
    device: B::Device,
    /// Minibatch shuffling.
    rng: StdRng,
}

impl<B: AutodiffBackend> SeparateActorCritic<B> {
    pub fn new(
        shape: StateShape,
        network: &NetworkConfig,
        loss_config: PolicyLossConfig,
        device: &B::Device,
    ) -> Self {
        let input = shape.flat_len();
        Self {
            actor: PolicyNet::new(input, network, device),
            critic: ValueNet::new(input, network, device),
            actor_optimizer: AdamConfig::new().init(),
            critic_optimizer: AdamConfig::new().init(),
            loss_config,
            shape,
            device: device.clone(),
            rng: StdRng::from_entropy(),
        }
    }

    /// Fix the minibatch shuffling order.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state_shape(&self) -> StateShape {
        self.shape
    }
}

impl<B: AutodiffBackend> ActorCritic for SeparateActorCritic<B> {
    fn predict_policy(&self, states: &[MarketState]) -> Result<Vec<[f32; N_ACTIONS]>, AgentError> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let flat = flatten_states(states, self.shape)?;
        let x = rows_tensor::<B::InnerBackend>(&flat, self.shape.flat_len(), &self.device);
        let probs = read_floats(self.actor.valid().forward(x))?;
        Ok(probs
            .chunks_exact(N_ACTIONS)
            .map(|row| [row[0], row[1], row[2]])
            .collect())
    }

    fn predict_values(&self, states: &[MarketState]) -> Result<Vec<f32>, AgentError> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let flat = flatten_states(states, self.shape)?;
        let x = rows_tensor::<B::InnerBackend>(&flat, self.shape.flat_len(), &self.device);
        read_floats(self.critic.valid().forward(x))
    }

    fn fit_actor(
        &mut self,
        states: &[MarketState],
        signal: &TrainingSignal,
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError> {
        AgentError::check_len("training signal", states.len(), signal.rows())?;
        let flat = flatten_states(states, self.shape)?;
        let width = self.shape.flat_len();
        let device = self.device.clone();
        let loss_config = self.loss_config;

        let (actor, history) = fit_minibatches(
            self.actor.clone(),
            &mut self.actor_optimizer,
            &mut self.rng,
            states.len(),
            options,
            "actor",
            |model: &PolicyNet<B>, batch| {
                let x = gather_rows::<B>(&flat, width, batch, &device);
                let y = Tensor::<B, 1>::from_floats(signal.gather(batch).as_slice(), &device)
                    .reshape([batch.len(), TrainingSignal::WIDTH]);
                ppo_signal_loss(model.forward(x), y, &loss_config)
            },
        )?;

        self.actor = actor;
        Ok(history)
    }

    fn fit_critic(
        &mut self,
        states: &[MarketState],
        targets: &[f32],
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError> {
        AgentError::check_len("targets", states.len(), targets.len())?;
        let flat = flatten_states(states, self.shape)?;
        let width = self.shape.flat_len();
        let device = self.device.clone();

        let (critic, history) = fit_minibatches(
            self.critic.clone(),
            &mut self.critic_optimizer,
            &mut self.rng,
            states.len(),
            options,
            "critic",
            |model: &ValueNet<B>, batch| {
                let x = gather_rows::<B>(&flat, width, batch, &device);
                let y = gather_rows::<B>(targets, 1, batch, &device);
                value_loss(model.forward(x), y)
            },
        )?;

        self.critic = critic;
        Ok(history)
    }

    fn save(&self, dir: &Path, name: &str, score: Option<&str>) -> Result<(), AgentError> {
        let checkpointer = Checkpointer::new(dir)?;
        checkpointer.save_module(&self.actor, name, score, ModelRole::Actor)?;
        checkpointer.save_module(&self.critic, name, score, ModelRole::Critic)?;
        Ok(())
    }

    fn load(&mut self, dir: &Path, name: &str) -> Result<(), AgentError> {
        let checkpointer = Checkpointer::open(dir);
        let actor = checkpointer.load_module(self.actor.clone(), name, ModelRole::Actor, &self.device)?;
        let critic = checkpointer.load_module(self.critic.clone(), name, ModelRole::Critic, &self.device)?;
        self.actor = actor;
        self.critic = critic;
        Ok(())
    }
}
