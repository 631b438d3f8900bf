//! Simulation parameters, per-run mutable context, and run output types.

use crate::domain::{EquityPoint, PositionSide, TradeEvent, TradeKind};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::EngineError;

/// Default starting balance in quote currency.
pub const DEFAULT_INITIAL_BALANCE: f64 = 1000.0;
/// Default fee per exit leg (0.1%).
pub const DEFAULT_FEE_RATE: f64 = 0.001;
/// Default slippage fraction (0.05%).
pub const DEFAULT_SLIPPAGE_RATE: f64 = 0.0005;

/// Execution parameters for one simulation run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub initial_balance: f64,
    /// Fraction of balance charged on each exit leg. Entries are fee-free.
    pub fee_rate: f64,
    /// Unfavorable price adjustment applied to every execution.
    pub slippage_rate: f64,
}

impl Default for SimulationParams {
    fn default() -> Self {
        Self {
            initial_balance: DEFAULT_INITIAL_BALANCE,
            fee_rate: DEFAULT_FEE_RATE,
            slippage_rate: DEFAULT_SLIPPAGE_RATE,
        }
    }
}

impl SimulationParams {
    pub fn new(initial_balance: f64, fee_rate: f64, slippage_rate: f64) -> Self {
        Self {
            initial_balance,
            fee_rate,
            slippage_rate,
        }
    }

    /// Frictionless parameters: no fee, no slippage.
    pub fn frictionless(initial_balance: f64) -> Self {
        Self::new(initial_balance, 0.0, 0.0)
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if !(self.initial_balance.is_finite() && self.initial_balance > 0.0) {
            return Err(EngineError::InvalidInput(format!(
                "initial_balance must be > 0, got {}",
                self.initial_balance
            )));
        }
        if !(0.0..1.0).contains(&self.fee_rate) {
            return Err(EngineError::InvalidInput(format!(
                "fee_rate must be in [0, 1), got {}",
                self.fee_rate
            )));
        }
        if !(0.0..1.0).contains(&self.slippage_rate) {
            return Err(EngineError::InvalidInput(format!(
                "slippage_rate must be in [0, 1), got {}",
                self.slippage_rate
            )));
        }
        Ok(())
    }

    /// Execution price for buying at `close` (long entry, short exit).
    pub fn buy_price(&self, close: f64) -> f64 {
        close * (1.0 + self.slippage_rate)
    }

    /// Execution price for selling at `close` (short entry, long exit).
    pub fn sell_price(&self, close: f64) -> f64 {
        close * (1.0 - self.slippage_rate)
    }
}

/// Mutable state owned by exactly one simulation run.
///
/// Created at run start, mutated bar by bar, consumed into a
/// [`SimulationOutput`] at run end. Nothing here is shared between runs.
#[derive(Debug, Clone)]
pub struct SimulationContext {
    pub params: SimulationParams,
    pub balance: f64,
    pub position: PositionSide,
    /// Entry price of the open position. Meaningless while flat.
    pub entry_price: f64,
    pub ledger: Vec<TradeEvent>,
    pub equity_curve: Vec<EquityPoint>,
}

impl SimulationContext {
    pub fn new(params: SimulationParams, capacity: usize) -> Self {
        Self {
            params,
            balance: params.initial_balance,
            position: PositionSide::Flat,
            entry_price: 0.0,
            ledger: Vec::with_capacity(capacity / 4),
            equity_curve: Vec::with_capacity(capacity + 1),
        }
    }

    /// Open a position at `close`, applying slippage against the trader.
    pub fn open(&mut self, side: PositionSide, close: f64, timestamp: NaiveDateTime) {
        let (price, kind) = match side {
            PositionSide::Long => (self.params.buy_price(close), TradeKind::LongEntry),
            PositionSide::Short => (self.params.sell_price(close), TradeKind::ShortEntry),
            PositionSide::Flat => return,
        };
        self.entry_price = price;
        self.position = side;
        self.ledger.push(TradeEvent::entry(kind, price, timestamp));
    }

    /// Close the open position at `close`: realize pnl, charge the exit fee.
    ///
    /// Returns the realized pnl fraction, or `None` when already flat.
    pub fn close(&mut self, close: f64, timestamp: NaiveDateTime) -> Option<f64> {
        let (exit_price, kind) = match self.position {
            PositionSide::Long => (self.params.sell_price(close), TradeKind::LongExit),
            PositionSide::Short => (self.params.buy_price(close), TradeKind::ShortExit),
            PositionSide::Flat => return None,
        };
        let pnl = self.position.unrealized_return(self.entry_price, exit_price);
        self.balance *= 1.0 + pnl - self.params.fee_rate;
        self.ledger.push(TradeEvent::exit(
            kind,
            exit_price,
            timestamp,
            pnl,
            self.entry_price,
        ));
        self.position = PositionSide::Flat;
        Some(pnl)
    }

    /// Balance plus the open position's mark-to-market at `price`.
    pub fn mark_to_market(&self, price: f64) -> f64 {
        self.balance
            + self.balance * self.position.unrealized_return(self.entry_price, price)
    }

    pub fn record_equity(&mut self, timestamp: NaiveDateTime, equity: f64) {
        self.equity_curve.push(EquityPoint { timestamp, equity });
    }

    pub fn finish(self) -> SimulationOutput {
        SimulationOutput {
            final_balance: self.balance,
            ledger: self.ledger,
            equity_curve: self.equity_curve,
        }
    }
}

/// Output of one simulation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub ledger: Vec<TradeEvent>,
    pub equity_curve: Vec<EquityPoint>,
    /// Realized balance after terminal liquidation.
    pub final_balance: f64,
}

impl SimulationOutput {
    /// Number of exit events (completed round trips).
    pub fn exit_count(&self) -> usize {
        self.ledger.iter().filter(|e| e.kind.is_exit()).count()
    }
}
