//! # Trading RL: On-Policy Actor-Critic Trading Agent
//!
//! Credit assignment and policy updates for an agent that trades one asset
//! with three discrete actions (hold, buy, sell).
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        TradingAgent                              │
//! ├──────────────────────────────────────────────────────────────────┤
//! │   MarketState [L, F]                                             │
//! │        │                                                         │
//! │        ▼                                                         │
//! │  ┌──────────────┐  probs   ┌───────────────┐                     │
//! │  │ ActorCritic  │─────────▶│ ActionSampler │──▶ (action, probs)  │
//! │  │ (separate or │          └───────────────┘         │           │
//! │  │  shared)     │                                    ▼           │
//! │  └──────▲───────┘                          TradingEnvironment    │
//! │         │ fit                                        │           │
//! │  ┌──────┴──────────────┐   ┌──────────────┐          │           │
//! │  │ TrainingOrchestrator│◀──│ RolloutBuffer│◀─────────┘           │
//! │  │  values ─▶ GAE ─▶   │   └──────────────┘                      │
//! │  │  signal / targets   │                                         │
//! │  └─────────────────────┘                                         │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use burn::backend::{Autodiff, NdArray};
//! use trading_rl::{ActionSampler, AgentConfig, NetworkConfig, PolicyLossConfig};
//! use trading_rl::{SeparateActorCritic, TradingAgent, EvaluationConfig, evaluate};
//!
//! let config = AgentConfig::new().with_lookback_window_size(50).build()?;
//! let model = SeparateActorCritic::<Autodiff<NdArray>>::new(
//!     config.state_shape(),
//!     &NetworkConfig::default(),
//!     PolicyLossConfig::default(),
//!     &Default::default(),
//! );
//! let mut agent = TradingAgent::new(config, model, ActionSampler::from_entropy())?;
//! agent.load(dir, "1050.00_Crypto_trader")?;
//! let summary = evaluate(&mut env, &mut agent, &EvaluationConfig::new(10))?;
//! ```

pub mod agent;
pub mod algorithms;
pub mod buffers;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod environment;
pub mod error;
pub mod evaluation;
pub mod metrics;
pub mod nn;
pub mod training;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{Policy, ReplayLosses, TradingAgent, TrainingOrchestrator};
pub use algorithms::{
    estimate_advantages, ActionDistribution, ActionSampler, ActorCritic, AdvantageEstimate, FitOptions, GaeParams,
    LossHistory, PolicyLossConfig, TrainingSignal,
};
pub use buffers::{RolloutBatch, RolloutBuffer};
pub use checkpoint::{CheckpointError, Checkpointer, ModelRole};
pub use config::{AgentConfig, ConfigError};
pub use core::{MarketState, StateShape, TradeAction, TradingTransition, N_ACTIONS};
pub use environment::{StepOutcome, TradingEnvironment};
pub use error::AgentError;
pub use evaluation::{evaluate, EpisodeBoundary, EpisodeResult, EvaluationConfig, EvaluationSummary};
pub use metrics::{CsvScalarSink, LogScalarSink, MemoryScalarSink, MultiSink, RunLog, RunLogConfig, ScalarSink};
pub use nn::{NetworkConfig, SeparateActorCritic, SharedActorCritic};
pub use training::{train_agent, TrainerConfig, TrainingSummary};
