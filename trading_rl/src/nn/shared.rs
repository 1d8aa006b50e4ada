//! Actor and critic sharing one trunk.
//!
//! The actor fit moves the trunk and the policy head, the critic fit moves
//! the trunk and the value head. Each objective keeps its own Adam state.

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
use super::networks::{NetworkConfig, SharedNet};
use super::AdamOptimizer;

/// Actor-critic backed by a single [`SharedNet`].
pub struct SharedActorCritic<B: AutodiffBackend> {
    net: SharedNet<B>,
    actor_optimizer: AdamOptimizer<SharedNet<B>, B>,
    critic_optimizer: AdamOptimizer<SharedNet<B>, B>,
    loss_config: PolicyLossConfig,
    shape: StateShape,
    device: B::Device,
    /// Minibatch shuffling.
    rng: StdRng,
}

impl<B: AutodiffBackend> SharedActorCritic<B> {
    pub fn new(
        shape: StateShape,
        network: &NetworkConfig,
        loss_config: PolicyLossConfig,
        device: &B::Device,
    ) -> Self {
        Self {
            net: SharedNet::new(shape.flat_len(), network, device),
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

impl<B: AutodiffBackend> ActorCritic for SharedActorCritic<B> {
    fn predict_policy(&self, states: &[MarketState]) -> Result<Vec<[f32; N_ACTIONS]>, AgentError> {
        if states.is_empty() {
            return Ok(Vec::new());
        }
        let flat = flatten_states(states, self.shape)?;
        let x = rows_tensor::<B::InnerBackend>(&flat, self.shape.flat_len(), &self.device);
        let probs = read_floats(self.net.valid().forward_policy(x))?;
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
        read_floats(self.net.valid().forward_value(x))
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

        let (net, history) = fit_minibatches(
            self.net.clone(),
            &mut self.actor_optimizer,
            &mut self.rng,
            states.len(),
            options,
            "actor",
            |model: &SharedNet<B>, batch| {
                let x = gather_rows::<B>(&flat, width, batch, &device);
                let y = Tensor::<B, 1>::from_floats(signal.gather(batch).as_slice(), &device)
                    .reshape([batch.len(), TrainingSignal::WIDTH]);
                ppo_signal_loss(model.forward_policy(x), y, &loss_config)
            },
        )?;

        self.net = net;
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

        let (net, history) = fit_minibatches(
            self.net.clone(),
            &mut self.critic_optimizer,
            &mut self.rng,
            states.len(),
            options,
            "critic",
            |model: &SharedNet<B>, batch| {
                let x = gather_rows::<B>(&flat, width, batch, &device);
                let y = gather_rows::<B>(targets, 1, batch, &device);
                value_loss(model.forward_value(x), y)
            },
        )?;

        self.net = net;
        Ok(history)
    }

    fn save(&self, dir: &Path, name: &str, score: Option<&str>) -> Result<(), AgentError> {
        Checkpointer::new(dir)?.save_module(&self.net, name, score, ModelRole::Shared)?;
        Ok(())
    }

    fn load(&mut self, dir: &Path, name: &str) -> Result<(), AgentError> {
        self.net = Checkpointer::open(dir).load_module(self.net.clone(), name, ModelRole::Shared, &self.device)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TradeAction;
    use burn::backend::{Autodiff, NdArray};
    use tempfile::tempdir;

    type B = Autodiff<NdArray<f32>>;

    fn model(shape: StateShape) -> SharedActorCritic<B> {
        SharedActorCritic::new(
            shape,
            &NetworkConfig::new(vec![16, 8]),
            PolicyLossConfig::default(),
            &Default::default(),
        )
    }

    fn states(shape: StateShape, n: usize) -> Vec<MarketState> {
        (0..n)
            .map(|i| MarketState::filled(shape, i as f32 / n as f32))
            .collect()
    }

    #[test]
    fn test_both_heads_answer() {
        let shape = StateShape::new(3, 2);
        let model = model(shape);
        let probe = states(shape, 4);

        let probs = model.predict_policy(&probe).unwrap();
        let values = model.predict_values(&probe).unwrap();
        assert_eq!(probs.len(), 4);
        assert_eq!(values.len(), 4);
        for row in probs {
            assert!((row.iter().sum::<f32>() - 1.0).abs() < 1e-5);
        }
    }

    #[test]
    fn test_critic_fit_touches_policy_through_trunk() {
        let shape = StateShape::new(2, 2);
        let mut model = model(shape);
        let probe = states(shape, 8);
        let before = model.predict_policy(&probe).unwrap();

        let options = FitOptions {
            epochs: 3,
            batch_size: 8,
            shuffle: false,
            learning_rate: 1e-2,
        };
        model.fit_critic(&probe, &[5.0; 8], &options).unwrap();

        assert_ne!(before, model.predict_policy(&probe).unwrap());
    }

    #[test]
    fn test_actor_fit_reports_each_epoch() {
        let shape = StateShape::new(2, 2);
        let mut model = model(shape);
        let probe = states(shape, 6);
        let old = model.predict_policy(&probe).unwrap();
        let signal = TrainingSignal::assemble(&[0.5; 6], &old, &[TradeAction::Sell; 6]).unwrap();

        let options = FitOptions {
            epochs: 2,
            batch_size: 4,
            shuffle: true,
            learning_rate: 1e-3,
        };
        let history = model.fit_actor(&probe, &signal, &options).unwrap();
        assert_eq!(history.epoch_losses.len(), 2);
        assert!(history.total().is_finite());
    }

    #[test]
    fn test_seeded_fits_repeat() {
        let dir = tempdir().unwrap();
        let shape = StateShape::new(2, 2);
        let mut first = model(shape).with_seed(21);
        first.save(dir.path(), "start", None).unwrap();
        let mut second = model(shape).with_seed(21);
        second.load(dir.path(), "start").unwrap();

        let probe = states(shape, 7);
        let options = FitOptions {
            epochs: 2,
            batch_size: 2,
            shuffle: true,
            learning_rate: 1e-2,
        };
        let targets: Vec<f32> = (0..7).map(|i| i as f32 * 0.5).collect();
        first.fit_critic(&probe, &targets, &options).unwrap();
        second.fit_critic(&probe, &targets, &options).unwrap();

        assert_eq!(first.predict_policy(&probe).unwrap(), second.predict_policy(&probe).unwrap());
        assert_eq!(first.predict_values(&probe).unwrap(), second.predict_values(&probe).unwrap());
    }

    #[test]
    fn test_single_checkpoint_file() {
        let dir = tempdir().unwrap();
        let shape = StateShape::new(2, 2);
        let saved = model(shape);
        saved.save(dir.path(), "trader", None).unwrap();

        assert!(dir.path().join("trader_Shared.bin").exists());
        assert!(!dir.path().join("trader_Actor.bin").exists());

        let mut loaded = model(shape);
        loaded.load(dir.path(), "trader").unwrap();
        let probe = states(shape, 2);
        assert_eq!(saved.predict_values(&probe).unwrap(), loaded.predict_values(&probe).unwrap());
    }
}
