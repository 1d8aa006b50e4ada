//! Evaluation loop and summary statistics.

use serde::{Deserialize, Serialize};

use crate::agent::Policy;
use crate::config::ConfigError;
use crate::environment::TradingEnvironment;
use crate::error::AgentError;

/// Condition that closes an evaluation episode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum EpisodeBoundary {
    /// The step that reports `done`.
    #[default]
    EnvironmentDone,
    /// The step after which `current_step == end_step`.
    EndStep,
}

/// Evaluation run settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    pub episodes: usize,
    /// Passed to `render` before every step.
    pub render: bool,
    pub boundary: EpisodeBoundary,
    /// Abort with [`AgentError::EpisodeOverrun`] past this many steps.
    pub max_steps: Option<usize>,
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            episodes: 10,
            render: false,
            boundary: EpisodeBoundary::EnvironmentDone,
            max_steps: None,
        }
    }
}

impl EvaluationConfig {
    pub fn new(episodes: usize) -> Self {
        Self {
            episodes,
            ..Self::default()
        }
    }

    pub fn with_render(mut self, render: bool) -> Self {
        self.render = render;
        self
    }

    pub fn with_boundary(mut self, boundary: EpisodeBoundary) -> Self {
        self.boundary = boundary;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = Some(max_steps);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.episodes == 0 {
            return Err(ConfigError::InvalidCount {
                field: "episodes",
                value: 0,
            });
        }
        if self.max_steps == Some(0) {
            return Err(ConfigError::InvalidCount {
                field: "max_steps",
                value: 0,
            });
        }
        Ok(())
    }
}

/// Final bookkeeping of one episode.
#[derive(Debug, Clone, PartialEq)]
pub struct EpisodeResult {
    pub episode: usize,
    pub net_worth: f64,
    pub orders: usize,
    pub steps: usize,
    /// Net worth ended below the initial balance.
    pub no_profit: bool,
}

/// Aggregate over all evaluation episodes.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationSummary {
    pub episodes: usize,
    pub average_net_worth: f64,
    pub average_orders: f64,
    pub no_profit_episodes: usize,
    pub results: Vec<EpisodeResult>,
}

/// Running sums for one `evaluate` call.
#[derive(Debug, Default)]
struct Accumulator {
    total_net_worth: f64,
    total_orders: usize,
    no_profit_episodes: usize,
    results: Vec<EpisodeResult>,
}

impl Accumulator {
    fn record(&mut self, result: EpisodeResult) {
        self.total_net_worth += result.net_worth;
        self.total_orders += result.orders;
        if result.no_profit {
            self.no_profit_episodes += 1;
        }
        self.results.push(result);
    }

    fn average_net_worth(&self) -> f64 {
        self.total_net_worth / self.results.len().max(1) as f64
    }

    fn finish(self) -> EvaluationSummary {
        let episodes = self.results.len();
        let average_net_worth = self.average_net_worth();
        EvaluationSummary {
            episodes,
            average_net_worth,
            average_orders: self.total_orders as f64 / episodes.max(1) as f64,
            no_profit_episodes: self.no_profit_episodes,
            results: self.results,
        }
    }
}

/// Run `config.episodes` episodes of `policy` in `env`.
///
/// Any failure from the environment or the policy aborts the whole run;
/// no partial summary is returned.
pub fn evaluate<E, P>(env: &mut E, policy: &mut P, config: &EvaluationConfig) -> Result<EvaluationSummary, AgentError>
where
    E: TradingEnvironment,
    P: Policy + ?Sized,
{
    config.validate()?;
    let mut acc = Accumulator::default();

    for episode in 0..config.episodes {
        let result = run_episode(env, policy, config, episode)?;
        acc.record(result);

        let last = &acc.results[episode];
        log::info!(
            "episode: {:<5}, net_worth: {:<7.2}, average_net_worth: {:<7.2}, orders: {}",
            episode,
            last.net_worth,
            acc.average_net_worth(),
            last.orders
        );
    }

    let summary = acc.finish();
    log::info!(
        "average {} episodes agent net_worth: {}, orders: {}",
        summary.episodes,
        summary.average_net_worth,
        summary.average_orders
    );
    log::info!("No profit episodes: {}", summary.no_profit_episodes);
    Ok(summary)
}

fn run_episode<E, P>(
    env: &mut E,
    policy: &mut P,
    config: &EvaluationConfig,
    episode: usize,
) -> Result<EpisodeResult, AgentError>
where
    E: TradingEnvironment,
    P: Policy + ?Sized,
{
    let mut state = env.reset().map_err(AgentError::environment)?;
    let mut steps = 0usize;

    loop {
        env.render(config.render).map_err(AgentError::environment)?;
        let (action, _) = policy.act(&state)?;
        let outcome = env.step(action).map_err(AgentError::environment)?;
        steps += 1;

        let at_end_step = env.current_step() == env.end_step();
        if outcome.done != at_end_step {
            log::warn!(
                "episode {} step {}: done={} but current_step == end_step is {}",
                episode,
                env.current_step(),
                outcome.done,
                at_end_step
            );
        }

        let finished = match config.boundary {
            EpisodeBoundary::EnvironmentDone => outcome.done,
            EpisodeBoundary::EndStep => at_end_step,
        };
        if finished {
            let net_worth = env.net_worth();
            return Ok(EpisodeResult {
                episode,
                net_worth,
                orders: env.episode_orders(),
                steps,
                no_profit: net_worth < env.initial_balance(),
            });
        }

        if let Some(max_steps) = config.max_steps {
            if steps >= max_steps {
                return Err(AgentError::EpisodeOverrun { episode, max_steps });
            }
        }
        state = outcome.next_state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::TradingAgent;
    use crate::algorithms::ActionSampler;
    use crate::config::AgentConfig;
    use crate::core::StateShape;
    use crate::testing::{MockActorCritic, ScriptedEnv};

    fn shape() -> StateShape {
        StateShape::new(3, 2)
    }

    fn agent(seed: u64) -> TradingAgent<MockActorCritic> {
        let config = AgentConfig::default().with_lookback_window_size(3).with_feature_count(2);
        TradingAgent::new(config, MockActorCritic::new([0.4, 0.3, 0.3], 0.0), ActionSampler::seeded(seed)).unwrap()
    }

    #[test]
    fn test_losing_environment() {
        let mut env = ScriptedEnv::new(shape(), 6, 912.5);
        env.orders = 4;
        let summary = evaluate(&mut env, &mut agent(1), &EvaluationConfig::new(5)).unwrap();

        assert_eq!(summary.episodes, 5);
        assert_eq!(summary.no_profit_episodes, 5);
        assert_eq!(summary.average_net_worth, 912.5);
        assert_eq!(summary.average_orders, 4.0);
        assert_eq!(env.resets, 5);
        assert!(summary.results.iter().all(|r| r.steps == 6 && r.no_profit));
    }

    #[test]
    fn test_profitable_episodes_not_counted() {
        let mut env = ScriptedEnv::new(shape(), 3, 1200.0);
        let summary = evaluate(&mut env, &mut agent(1), &EvaluationConfig::new(2)).unwrap();

        assert_eq!(summary.no_profit_episodes, 0);
        assert_eq!(summary.average_net_worth, 1200.0);
    }

    #[test]
    fn test_render_called_before_every_step() {
        let mut env = ScriptedEnv::new(shape(), 4, 1000.0);
        let config = EvaluationConfig::new(2).with_render(true);
        evaluate(&mut env, &mut agent(1), &config).unwrap();

        assert_eq!(env.renders, vec![true; 8]);
    }

    #[test]
    fn test_boundary_when_done_arrives_early() {
        let mut env = ScriptedEnv::new(shape(), 5, 900.0);
        env.done_at = 2;

        let summary = evaluate(&mut env, &mut agent(1), &EvaluationConfig::new(1)).unwrap();
        assert_eq!(summary.results[0].steps, 2);
        assert_eq!(summary.results[0].net_worth, 1000.0);

        let config = EvaluationConfig::new(1).with_boundary(EpisodeBoundary::EndStep);
        let summary = evaluate(&mut env, &mut agent(1), &config).unwrap();
        assert_eq!(summary.results[0].steps, 5);
        assert_eq!(summary.results[0].net_worth, 900.0);
    }

    #[test]
    fn test_environment_failure_aborts() {
        let mut env = ScriptedEnv::new(shape(), 5, 900.0);
        env.fail_at = Some(3);

        let err = evaluate(&mut env, &mut agent(1), &EvaluationConfig::new(3)).unwrap_err();
        assert!(matches!(err, AgentError::Environment(_)));
        assert_eq!(env.resets, 1);
    }

    #[test]
    fn test_step_cap() {
        let mut env = ScriptedEnv::new(shape(), 5, 900.0);
        env.done_at = usize::MAX;

        let config = EvaluationConfig::new(2).with_max_steps(20);
        let err = evaluate(&mut env, &mut agent(1), &config).unwrap_err();
        assert!(matches!(err, AgentError::EpisodeOverrun { episode: 0, max_steps: 20 }));
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let mut first = ScriptedEnv::new(shape(), 10, 1000.0);
        let mut second = first.clone();
        evaluate(&mut first, &mut agent(42), &EvaluationConfig::new(3)).unwrap();
        evaluate(&mut second, &mut agent(42), &EvaluationConfig::new(3)).unwrap();

        assert_eq!(first.actions.len(), 30);
        assert_eq!(first.actions, second.actions);
    }

    #[test]
    fn test_zero_episodes_rejected() {
        let mut env = ScriptedEnv::new(shape(), 5, 900.0);
        let err = evaluate(&mut env, &mut agent(1), &EvaluationConfig::new(0)).unwrap_err();
        assert!(matches!(err, AgentError::Config(_)));
    }
}
