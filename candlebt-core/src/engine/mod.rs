//! Backtesting engine: single-position simulator and ledger post-processing.
//!
//! The engine consumes a price series and an aligned signal series, then runs
//! the per-bar loop:
//!
//! 1. Transition: enter from flat, or flip on an opposing signal
//! 2. Mark-to-market: record equity at the bar's close
//!
//! Followed by terminal liquidation of any open position. The resulting
//! ledger is folded into round-trip trades by [`trade_extraction`].

pub mod simulator;
pub mod state;
pub mod trade_extraction;

pub use simulator::simulate;
pub use state::{SimulationContext, SimulationOutput, SimulationParams};
pub use trade_extraction::consolidate;

use thiserror::Error;

/// Errors surfaced by a simulation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Empty or mismatched series, or out-of-range parameters.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("numeric instability at bar {bar_index}: {reason}")]
    NumericInstability { bar_index: usize, reason: String },
}

impl From<crate::domain::InvalidSignal> for EngineError {
    fn from(e: crate::domain::InvalidSignal) -> Self {
        EngineError::InvalidInput(e.to_string())
    }
}
