//! Lookback-window observations.

use serde::{Deserialize, Serialize};

use crate::error::AgentError;

/// Shape of one observation window: `lookback` rows of `features` columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StateShape {
    /// Number of past steps in the window (L).
    pub lookback: usize,
    /// Values recorded per step (F): market and order history plus indicators.
    pub features: usize,
}

impl StateShape {
    pub fn new(lookback: usize, features: usize) -> Self {
        Self { lookback, features }
    }

    /// Length of the flattened window, the network input width.
    pub fn flat_len(&self) -> usize {
        self.lookback * self.features
    }
}

/// One `[L, F]` observation, stored row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct MarketState {
    shape: StateShape,
    data: Vec<f32>,
}

impl MarketState {
    /// Build a state from a row-major buffer.
    pub fn new(shape: StateShape, data: Vec<f32>) -> Result<Self, AgentError> {
        AgentError::check_len("state data", shape.flat_len(), data.len())?;
        Ok(Self { shape, data })
    }

    /// Build a state from `L` rows of `F` values each.
    pub fn from_rows(rows: &[Vec<f32>]) -> Result<Self, AgentError> {
        let features = rows.first().map(Vec::len).unwrap_or(0);
        let mut data = Vec::with_capacity(rows.len() * features);
        for row in rows {
            AgentError::check_len("state row", features, row.len())?;
            data.extend_from_slice(row);
        }
        Ok(Self {
            shape: StateShape::new(rows.len(), features),
            data,
        })
    }

    /// All-zero window.
    pub fn zeros(shape: StateShape) -> Self {
        Self {
            shape,
            data: vec![0.0; shape.flat_len()],
        }
    }

    /// Window filled with a single value.
    pub fn filled(shape: StateShape, value: f32) -> Self {
        Self {
            shape,
            data: vec![value; shape.flat_len()],
        }
    }

    pub fn shape(&self) -> StateShape {
        self.shape
    }

    /// Flattened row-major values.
    pub fn as_slice(&self) -> &[f32] {
        &self.data
    }

    /// Values of step `index` within the window.
    pub fn row(&self, index: usize) -> Option<&[f32]> {
        if index >= self.shape.lookback {
            return None;
        }
        let start = index * self.shape.features;
        Some(&self.data[start..start + self.shape.features])
    }

    /// Fail unless this state has the expected shape.
    pub fn ensure_shape(&self, expected: StateShape) -> Result<(), AgentError> {
        if self.shape == expected {
            Ok(())
        } else {
            Err(AgentError::StateShape {
                expected_lookback: expected.lookback,
                expected_features: expected.features,
                lookback: self.shape.lookback,
                features: self.shape.features,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_wrong_length() {
        let shape = StateShape::new(3, 2);
        assert!(MarketState::new(shape, vec![0.0; 6]).is_ok());
        assert!(matches!(
            MarketState::new(shape, vec![0.0; 5]),
            Err(AgentError::LengthMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_from_rows_is_row_major() {
        let state = MarketState::from_rows(&[vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
        assert_eq!(state.shape(), StateShape::new(3, 2));
        assert_eq!(state.row(1), Some(&[3.0, 4.0][..]));
        assert_eq!(state.row(3), None);
        assert_eq!(state.as_slice(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_from_rows_rejects_ragged_rows() {
        let result = MarketState::from_rows(&[vec![1.0, 2.0], vec![3.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn test_ensure_shape() {
        let state = MarketState::zeros(StateShape::new(4, 3));
        assert!(state.ensure_shape(StateShape::new(4, 3)).is_ok());
        assert!(matches!(
            state.ensure_shape(StateShape::new(3, 4)),
            Err(AgentError::StateShape { lookback: 4, features: 3, .. })
        ));
    }
}
