//! Collect a rollout, replay it, track the moving net worth, save the best.

use std::collections::VecDeque;

use rand::Rng;

use crate::agent::{ReplayLosses, TradingAgent};
use crate::algorithms::actor_critic::ActorCritic;
use crate::buffers::RolloutBuffer;
use crate::config::ConfigError;
use crate::core::TradingTransition;
use crate::environment::TradingEnvironment;
use crate::error::AgentError;
use crate::metrics::{RunLog, ScalarSink};

pub const AVERAGE_NET_WORTH_METRIC: &str = "Data/average net_worth";
pub const EPISODE_ORDERS_METRIC: &str = "Data/episode_orders";

/// Training loop settings.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainerConfig {
    pub episodes: usize,
    /// Most steps collected per episode before replay.
    pub rollout_length: usize,
    /// Episodes in the net worth moving average.
    pub average_window: usize,
    pub model_name: String,
    pub render: bool,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            episodes: 50,
            rollout_length: 500,
            average_window: 100,
            model_name: "Crypto_trader".to_string(),
            render: false,
        }
    }
}

impl TrainerConfig {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            ..Self::default()
        }
    }

    pub fn with_rollout_length(mut self, rollout_length: usize) -> Self {
        self.rollout_length = rollout_length;
        self
    }

    pub fn with_average_window(mut self, average_window: usize) -> Self {
        self.average_window = average_window;
        self
    }

    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let counts = [
            ("episodes", self.episodes),
            ("rollout_length", self.rollout_length),
            ("average_window", self.average_window),
        ];
        for (field, value) in counts {
            if value == 0 {
                return Err(ConfigError::InvalidCount { field, value });
            }
        }
        Ok(())
    }
}

/// Outcome of a training run.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainingSummary {
    pub episodes: usize,
    /// Best moving average reached with a full window.
    pub best_average: Option<f64>,
    pub final_average: f64,
    /// Score tag of the last best-model save.
    pub best_score_tag: Option<String>,
    pub losses: Vec<ReplayLosses>,
}

/// Train `agent` in `env` for `config.episodes` episodes.
///
/// Checkpoints and the save log go to `run`'s directory. Once the moving
/// window is full, every new best average is saved as
/// `{average:.2}_{model_name}_*` and the latest parameters as
/// `{model_name}_*`.
pub fn train_agent<E, M, R>(
    env: &mut E,
    agent: &mut TradingAgent<M, R>,
    run: &RunLog,
    config: &TrainerConfig,
    sink: &mut dyn ScalarSink,
) -> Result<TrainingSummary, AgentError>
where
    E: TradingEnvironment,
    M: ActorCritic,
    R: Rng,
{
    config.validate()?;

    let mut window: VecDeque<f64> = VecDeque::with_capacity(config.average_window);
    let mut best_average: Option<f64> = None;
    let mut best_score_tag = None;
    let mut losses = Vec::with_capacity(config.episodes);
    let mut average = 0.0;

    for episode in 0..config.episodes {
        let mut state = env.reset().map_err(AgentError::environment)?;
        let mut buffer = RolloutBuffer::with_capacity(config.rollout_length);

        for _ in 0..config.rollout_length {
            env.render(config.render).map_err(AgentError::environment)?;
            let (action, distribution) = agent.act(&state)?;
            let outcome = env.step(action).map_err(AgentError::environment)?;
            buffer.push(TradingTransition::new(
                state,
                action,
                outcome.reward,
                outcome.done,
                distribution.probs(),
                outcome.next_state.clone(),
            ));
            state = outcome.next_state;
            if outcome.done {
                break;
            }
        }

        let replay = agent.replay(buffer.into_batch()?)?;
        losses.push(replay);

        if window.len() == config.average_window {
            window.pop_front();
        }
        window.push_back(env.net_worth());
        average = window.iter().sum::<f64>() / window.len() as f64;

        let orders = env.episode_orders();
        sink.add_scalar(AVERAGE_NET_WORTH_METRIC, average as f32, episode);
        sink.add_scalar(EPISODE_ORDERS_METRIC, orders as f32, episode);
        log::info!(
            "episode: {:<5} net worth {:<7.2} average: {:<7.2} orders: {}",
            episode,
            env.net_worth(),
            average,
            orders
        );

        if window.len() == config.average_window {
            if best_average.map_or(true, |best| average > best) {
                best_average = Some(average);
                let score = format!("{:.2}", average);
                log::info!("saving model with average net worth {}", score);
                agent.save(run.dir(), &config.model_name, Some(&score))?;
                run.log_save_args(&[
                    episode.to_string(),
                    average.to_string(),
                    orders.to_string(),
                    replay.actor.to_string(),
                    replay.critic.to_string(),
                ])?;
                best_score_tag = Some(score);
            }
            agent.save(run.dir(), &config.model_name, None)?;
        }
    }

    sink.flush();
    agent.flush_metrics();
    run.end_training()?;

    Ok(TrainingSummary {
        episodes: config.episodes,
        best_average,
        final_average: average,
        best_score_tag,
        losses,
    })
}
