//! Core value types shared by every component.

pub mod state;
pub mod transition;

pub use state::{MarketState, StateShape};
pub use transition::{TradeAction, TradingTransition, N_ACTIONS};
