//! Test doubles shared by unit tests across modules.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::algorithms::actor_critic::{ActorCritic, FitOptions, LossHistory, TrainingSignal};
use crate::core::{MarketState, StateShape, TradeAction, N_ACTIONS};
use crate::environment::{StepOutcome, TradingEnvironment};
use crate::error::AgentError;

/// Actor-critic with fixed outputs that records every call.
#[derive(Debug, Clone)]
pub struct MockActorCritic {
    pub probs: [f32; N_ACTIONS],
    pub value: f32,
    pub actor_history: Vec<f32>,
    pub critic_history: Vec<f32>,
    pub diverge_actor: bool,
    pub actor_fits: Vec<(usize, TrainingSignal, FitOptions)>,
    pub critic_fits: Vec<(usize, Vec<f32>, FitOptions)>,
    pub value_queries: usize,
    pub loads: Vec<(PathBuf, String)>,
}

impl MockActorCritic {
    pub fn new(probs: [f32; N_ACTIONS], value: f32) -> Self {
        Self {
            probs,
            value,
            actor_history: vec![0.5],
            critic_history: vec![2.0],
            diverge_actor: false,
            actor_fits: Vec::new(),
            critic_fits: Vec::new(),
            value_queries: 0,
            loads: Vec::new(),
        }
    }
}

impl ActorCritic for MockActorCritic {
    fn predict_policy(&self, states: &[MarketState]) -> Result<Vec<[f32; N_ACTIONS]>, AgentError> {
        Ok(vec![self.probs; states.len()])
    }

    fn predict_values(&self, states: &[MarketState]) -> Result<Vec<f32>, AgentError> {
        Ok(vec![self.value; states.len()])
    }

    fn fit_actor(
        &mut self,
        states: &[MarketState],
        signal: &TrainingSignal,
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError> {
        if self.diverge_actor {
            return Err(AgentError::NonFiniteLoss {
                network: "actor",
                epoch: 0,
                loss: f32::NAN,
            });
        }
        self.actor_fits.push((states.len(), signal.clone(), *options));
        Ok(LossHistory::new(self.actor_history.clone()))
    }

    fn fit_critic(
        &mut self,
        states: &[MarketState],
        targets: &[f32],
        options: &FitOptions,
    ) -> Result<LossHistory, AgentError> {
        self.critic_fits.push((states.len(), targets.to_vec(), *options));
        Ok(LossHistory::new(self.critic_history.clone()))
    }

    fn save(&self, dir: &Path, name: &str, score: Option<&str>) -> Result<(), AgentError> {
        // Marker file per save: `{score}_{name}.mock`.
        std::fs::create_dir_all(dir)?;
        let stem = match score {
            Some(score) => format!("{}_{}", score, name),
            None => name.to_string(),
        };
        std::fs::write(dir.join(format!("{}.mock", stem)), b"")?;
        Ok(())
    }

    fn load(&mut self, dir: &Path, name: &str) -> Result<(), AgentError> {
        self.loads.push((dir.to_path_buf(), name.to_string()));
        Ok(())
    }
}

#[derive(Debug, Error)]
#[error("scripted failure at step {0}")]
pub struct ScriptedFailure(pub usize);

/// Deterministic environment with fixed-length episodes.
///
/// Every episode ends with `final_net_worth` and `orders`. `done` is raised
/// at `done_at` (defaults to `episode_len`, the end step).
#[derive(Debug, Clone)]
pub struct ScriptedEnv {
    pub shape: StateShape,
    pub episode_len: usize,
    pub done_at: usize,
    pub reward: f32,
    pub initial_balance: f64,
    pub final_net_worth: f64,
    pub orders: usize,
    pub fail_at: Option<usize>,
    pub current_step: usize,
    pub net_worth: f64,
    pub episode_orders: usize,
    pub resets: usize,
    pub renders: Vec<bool>,
    pub actions: Vec<TradeAction>,
}

impl ScriptedEnv {
    pub fn new(shape: StateShape, episode_len: usize, final_net_worth: f64) -> Self {
        Self {
            shape,
            episode_len,
            done_at: episode_len,
            reward: 1.0,
            initial_balance: 1000.0,
            final_net_worth,
            orders: 0,
            fail_at: None,
            current_step: 0,
            net_worth: 1000.0,
            episode_orders: 0,
            resets: 0,
            renders: Vec::new(),
            actions: Vec::new(),
        }
    }

    fn observation(&self) -> MarketState {
        MarketState::filled(self.shape, self.current_step as f32)
    }
}

impl TradingEnvironment for ScriptedEnv {
    type Error = ScriptedFailure;

    fn reset(&mut self) -> Result<MarketState, ScriptedFailure> {
        self.current_step = 0;
        self.net_worth = self.initial_balance;
        self.episode_orders = 0;
        self.resets += 1;
        Ok(self.observation())
    }

    fn step(&mut self, action: TradeAction) -> Result<StepOutcome, ScriptedFailure> {
        self.current_step += 1;
        if self.fail_at == Some(self.current_step) {
            return Err(ScriptedFailure(self.current_step));
        }
        self.actions.push(action);
        if self.current_step >= self.episode_len {
            self.net_worth = self.final_net_worth;
            self.episode_orders = self.orders;
        }
        let done = self.current_step >= self.done_at;
        Ok(StepOutcome::new(self.observation(), self.reward, done))
    }

    fn render(&mut self, visualize: bool) -> Result<(), ScriptedFailure> {
        self.renders.push(visualize);
        Ok(())
    }

    fn current_step(&self) -> usize {
        self.current_step
    }

    fn end_step(&self) -> usize {
        self.episode_len
    }

    fn net_worth(&self) -> f64 {
        self.net_worth
    }

    fn initial_balance(&self) -> f64 {
        self.initial_balance
    }

    fn episode_orders(&self) -> usize {
        self.episode_orders
    }
}
