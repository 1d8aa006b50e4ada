//! On-policy training loop.

pub mod trainer;

pub use trainer::{train_agent, TrainerConfig, TrainingSummary, AVERAGE_NET_WORTH_METRIC, EPISODE_ORDERS_METRIC};
