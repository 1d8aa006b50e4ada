//! Multi-episode evaluation of a trained policy.
//!
//! ```text
//! Start ──reset──▶ Stepping ──act/step──▶ Stepping ... ──boundary──▶ Episode-End
//!                                                                     │
//!                               next episode ◀────────────────────────┘
//! ```
//!
//! The episode boundary is the environment's `done` flag unless
//! [`EpisodeBoundary::EndStep`] is requested. Either way a disagreement
//! between `done` and `current_step == end_step` is logged.

pub mod harness;

pub use crate::environment::{StepOutcome, TradingEnvironment};
pub use harness::{evaluate, EpisodeBoundary, EpisodeResult, EvaluationConfig, EvaluationSummary};
