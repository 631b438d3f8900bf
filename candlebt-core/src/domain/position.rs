use serde::{Deserialize, Serialize};

/// Position state of the single-asset simulator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PositionSide {
    #[default]
    Flat,
    Long,
    Short,
}

impl PositionSide {
    pub fn is_open(&self) -> bool {
        !matches!(self, PositionSide::Flat)
    }

    /// Unrealized return of a position opened at `entry_price`, marked at `price`.
    pub fn unrealized_return(&self, entry_price: f64, price: f64) -> f64 {
        match self {
            PositionSide::Long => (price - entry_price) / entry_price,
            PositionSide::Short => (entry_price - price) / entry_price,
            PositionSide::Flat => 0.0,
        }
    }
}
