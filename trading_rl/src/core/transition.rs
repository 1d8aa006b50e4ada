//! Discrete trading actions and per-step transition records.

use crate::core::state::MarketState;

/// Size of the fixed action set.
pub const N_ACTIONS: usize = 3;

/// The agent's action set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TradeAction {
    Hold = 0,
    Buy = 1,
    Sell = 2,
}

impl TradeAction {
    /// All actions in index order.
    pub const ALL: [TradeAction; N_ACTIONS] = [TradeAction::Hold, TradeAction::Buy, TradeAction::Sell];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// One-hot encoding over the action set.
    pub fn one_hot(self) -> [f32; N_ACTIONS] {
        let mut encoded = [0.0; N_ACTIONS];
        encoded[self.index()] = 1.0;
        encoded
    }
}

impl From<TradeAction> for usize {
    fn from(action: TradeAction) -> Self {
        action.index()
    }
}

/// One recorded environment step.
///
/// Fields are private so a recorded step cannot be altered after the fact.
#[derive(Debug, Clone)]
pub struct TradingTransition {
    state: MarketState,
    action: TradeAction,
    reward: f32,
    done: bool,
    policy_probs: [f32; N_ACTIONS],
    next_state: MarketState,
}

impl TradingTransition {
    pub fn new(
        state: MarketState,
        action: TradeAction,
        reward: f32,
        done: bool,
        policy_probs: [f32; N_ACTIONS],
        next_state: MarketState,
    ) -> Self {
        Self {
            state,
            action,
            reward,
            done,
            policy_probs,
            next_state,
        }
    }

    pub fn state(&self) -> &MarketState {
        &self.state
    }

    pub fn action(&self) -> TradeAction {
        self.action
    }

    pub fn reward(&self) -> f32 {
        self.reward
    }

    /// Whether this is the last valid step of its episode.
    pub fn done(&self) -> bool {
        self.done
    }

    /// Distribution the action was sampled from.
    pub fn policy_probs(&self) -> [f32; N_ACTIONS] {
        self.policy_probs
    }

    pub fn next_state(&self) -> &MarketState {
        &self.next_state
    }

    pub(crate) fn into_parts(
        self,
    ) -> (MarketState, TradeAction, f32, bool, [f32; N_ACTIONS], MarketState) {
        (
            self.state,
            self.action,
            self.reward,
            self.done,
            self.policy_probs,
            self.next_state,
        )
    }
}
