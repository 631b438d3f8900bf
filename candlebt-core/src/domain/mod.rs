//! Domain types for CandleBT

pub mod bar;
pub mod equity;
pub mod position;
pub mod signal;
pub mod trade;

pub use bar::{closes, Bar};
pub use equity::{equity_values, EquityPoint};
pub use position::PositionSide;
pub use signal::{signal_counts, InvalidSignal, Signal};
pub use trade::{ConsolidatedTrade, TradeEvent, TradeKind, TradeSide};

