//! Trading environment contract.
//!
//! The agent never sees how rewards or states are produced. It drives an
//! environment through `reset`/`step` and reads the episode bookkeeping the
//! environment exposes.

use crate::core::{MarketState, TradeAction};

/// Result of one environment step.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub next_state: MarketState,
    pub reward: f32,
    pub done: bool,
}

impl StepOutcome {
    pub fn new(next_state: MarketState, reward: f32, done: bool) -> Self {
        Self {
            next_state,
            reward,
            done,
        }
    }
}

/// A single-asset trading environment.
pub trait TradingEnvironment {
    /// Failure raised by `reset`, `step` or `render`.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Start a new episode and return its first observation.
    fn reset(&mut self) -> Result<MarketState, Self::Error>;

    /// Apply `action` and advance one step.
    fn step(&mut self, action: TradeAction) -> Result<StepOutcome, Self::Error>;

    /// Draw the current step. `visualize` selects on-screen output.
    fn render(&mut self, _visualize: bool) -> Result<(), Self::Error> {
        Ok(())
    }

    fn current_step(&self) -> usize;

    /// Step index at which the environment considers the episode over.
    fn end_step(&self) -> usize;

    fn net_worth(&self) -> f64;

    fn initial_balance(&self) -> f64;

    /// Orders placed in the current episode.
    fn episode_orders(&self) -> usize;
}
