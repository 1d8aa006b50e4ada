//! Trading agent.

use std::path::Path;

use rand::rngs::StdRng;
use rand::Rng;

use crate::agent::orchestrator::{ReplayLosses, TrainingOrchestrator};
use crate::algorithms::action_policy::{ActionDistribution, ActionSampler};
use crate::algorithms::actor_critic::ActorCritic;
use crate::buffers::RolloutBatch;
use crate::config::AgentConfig;
use crate::core::{MarketState, TradeAction};
use crate::error::AgentError;
use crate::metrics::ScalarSink;

/// Anything that picks an action for a market state.
pub trait Policy {
    /// Pick an action, returning the distribution it was drawn from.
    fn act(&mut self, state: &MarketState) -> Result<(TradeAction, ActionDistribution), AgentError>;
}

/// On-policy actor-critic trading agent.
///
/// The configuration is fixed at construction.
pub struct TradingAgent<M: ActorCritic, R: Rng = StdRng> {
    config: AgentConfig,
    model: M,
    sampler: ActionSampler<R>,
    orchestrator: TrainingOrchestrator,
}

impl<M: ActorCritic, R: Rng> TradingAgent<M, R> {
    /// Validate `config` and assemble the agent.
    pub fn new(config: AgentConfig, model: M, sampler: ActionSampler<R>) -> Result<Self, AgentError> {
        let config = config.build()?;
        Ok(Self {
            config,
            model,
            sampler,
            orchestrator: TrainingOrchestrator::new(),
        })
    }

    /// Report replay losses to `sink`.
    pub fn with_sink<S: ScalarSink + 'static>(mut self, sink: S) -> Self {
        self.orchestrator.set_sink(Box::new(sink));
        self
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut M {
        &mut self.model
    }

    pub fn replay_count(&self) -> usize {
        self.orchestrator.replay_count()
    }

    /// Sample an action from the actor's distribution for `state`.
    pub fn act(&mut self, state: &MarketState) -> Result<(TradeAction, ActionDistribution), AgentError> {
        state.ensure_shape(self.config.state_shape())?;
        let probs = self
            .model
            .predict_policy(std::slice::from_ref(state))?
            .into_iter()
            .next()
            .ok_or(AgentError::EmptyBatch("policy prediction"))?;
        self.sampler.select(&probs)
    }

    /// Fit the actor and critic on one finished rollout.
    pub fn replay(&mut self, batch: RolloutBatch) -> Result<ReplayLosses, AgentError> {
        self.orchestrator.replay(&mut self.model, &batch, &self.config)
    }

    /// Save parameters as `{score}_{name}_*` (or `{name}_*`) under `dir`.
    pub fn save(&self, dir: &Path, name: &str, score: Option<&str>) -> Result<(), AgentError> {
        self.model.save(dir, name, score)
    }

    /// Load parameters saved under the full prefix `name`.
    pub fn load(&mut self, dir: &Path, name: &str) -> Result<(), AgentError> {
        self.model.load(dir, name)
    }

    pub fn flush_metrics(&mut self) {
        self.orchestrator.flush();
    }
}

impl<M: ActorCritic, R: Rng> Policy for TradingAgent<M, R> {
    fn act(&mut self, state: &MarketState) -> Result<(TradeAction, ActionDistribution), AgentError> {
        TradingAgent::act(self, state)
    }
}
