//! Model persistence.
//!
//! Saves and restores network parameters with Burn's binary recorder. Files
//! are named after the model, its role and an optional score tag:
//!
//! ```text
//! <dir>/<score>_<name>_Actor.bin
//! <dir>/<name>_Critic.bin
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use trading_rl::checkpoint::{Checkpointer, ModelRole};
//!
//! let checkpointer = Checkpointer::new("runs/btc_eval")?;
//! checkpointer.save_module(&actor, "Crypto_trader", Some("1123.45"), ModelRole::Actor)?;
//! let actor = checkpointer.load_module(actor, "1123.45_Crypto_trader", ModelRole::Actor, &device)?;
//! ```

pub mod checkpointer;

pub use checkpointer::{CheckpointError, Checkpointer, ModelRole};
