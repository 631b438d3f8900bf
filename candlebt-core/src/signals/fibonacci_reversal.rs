//! Long-only Fibonacci retracement entry.
//!
//! level = highest high − (highest high − lowest low) × retrace over the last
//! `lookback` bars. Long whenever the close is below that level.

use serde::{Deserialize, Serialize};

use super::{check_window, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{rolling_max, rolling_min};

const NAME: &str = "FIBONACCI_REVERSAL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FibonacciReversalStrategy {
    pub lookback: usize,
    pub retrace: f64,
}

impl Default for FibonacciReversalStrategy {
    fn default() -> Self {
        Self {
            lookback: 50,
            retrace: 0.618,
        }
    }
}

impl FibonacciReversalStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "lookback", self.lookback)?;
        if !(0.0..=1.0).contains(&self.retrace) {
            return Err(StrategyError::InvalidParams {
                strategy: NAME,
                field: "retrace",
                reason: format!("must be in [0, 1], got {}", self.retrace),
            });
        }
        Ok(())
    }

    /// Retracement level per bar; NaN during warm-up.
    pub fn levels(&self, bars: &[Bar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let hh = rolling_max(&highs, self.lookback);
        let ll = rolling_min(&lows, self.lookback);
        hh.iter()
            .zip(&ll)
            .map(|(h, l)| h - (h - l) * self.retrace)
            .collect()
    }
}

impl SignalSource for FibonacciReversalStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.lookback.saturating_sub(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        self.levels(bars)
            .iter()
            .zip(bars)
            .map(|(&level, bar)| {
                if bar.close < level {
                    Signal::Long
                } else {
                    Signal::Flat
                }
            })
            .collect()
    }
}
