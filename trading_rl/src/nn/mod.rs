//! Burn implementations of the [`ActorCritic`](crate::algorithms::ActorCritic) capability.
//!
//! # Modules
//!
//! - [`networks`]: MLP policy, value and shared-trunk networks
//! - [`fit`]: shuffled minibatch fitting loop shared by every network
//! - [`separate`]: independent actor and critic networks
//! - [`shared`]: one trunk feeding a policy head and a value head
//!
//! Both variants flatten the `[L, F]` window into one input row.

pub mod fit;
pub mod networks;
pub mod separate;
pub mod shared;

pub use networks::{Mlp, NetworkConfig, PolicyNet, SharedNet, ValueNet};
pub use separate::SeparateActorCritic;
pub use shared::SharedActorCritic;

use burn::optim::adaptor::OptimizerAdaptor;
use burn::optim::Adam;

/// Adam optimizer over module `M`.
pub type AdamOptimizer<M, B> = OptimizerAdaptor<Adam, M, B>;
