//! The trading agent and its replay orchestration.
//!
//! - `orchestrator`: rollout batch to advantage estimate to actor/critic fits
//! - `trading_agent`: config, model, sampler and orchestrator composed

pub mod orchestrator;
pub mod trading_agent;

pub use orchestrator::{ReplayLosses, TrainingOrchestrator, ACTOR_LOSS_METRIC, CRITIC_LOSS_METRIC};
pub use trading_agent::{Policy, TradingAgent};
