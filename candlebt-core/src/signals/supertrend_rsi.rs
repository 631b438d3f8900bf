//! Trend-cycle + RSI strategy.
//!
//! The trend component is the Schaff Trend Cycle (STC). Long when STC is above
//! `stc_buy` and RSI is below `rsi_buy`; short when STC is below `stc_sell`
//! and RSI is above `rsi_sell`.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Indicator, Rsi, Stc};

const NAME: &str = "SUPERTREND_RSI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SupertrendRsiStrategy {
    pub stc_fast: usize,
    pub stc_slow: usize,
    pub stc_cycle: usize,
    pub stc_buy: f64,
    pub stc_sell: f64,
    pub rsi_window: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
}

impl Default for SupertrendRsiStrategy {
    fn default() -> Self {
        Self {
            stc_fast: 23,
            stc_slow: 50,
            stc_cycle: 10,
            stc_buy: 50.0,
            stc_sell: 50.0,
            rsi_window: 14,
            rsi_buy: 30.0,
            rsi_sell: 70.0,
        }
    }
}

impl SupertrendRsiStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "stc_fast", self.stc_fast)?;
        check_window(NAME, "stc_slow", self.stc_slow)?;
        check_window(NAME, "stc_cycle", self.stc_cycle)?;
        check_window(NAME, "rsi_window", self.rsi_window)?;
        for (field, value) in [
            ("stc_buy", self.stc_buy),
            ("stc_sell", self.stc_sell),
            ("rsi_buy", self.rsi_buy),
            ("rsi_sell", self.rsi_sell),
        ] {
            check_finite(NAME, field, value)?;
        }
        Ok(())
    }

    fn stc(&self) -> Stc {
        Stc::new(self.stc_fast, self.stc_slow, self.stc_cycle)
    }
}

impl SignalSource for SupertrendRsiStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.stc().lookback().max(self.rsi_window)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let stc = self.stc().compute(bars);
        let rsi = Rsi::wilder(self.rsi_window).compute(bars);
        (0..bars.len())
            .map(|i| {
                if !defined(&[stc[i], rsi[i]]) {
                    return Signal::Flat;
                }
                decide(
                    stc[i] > self.stc_buy && rsi[i] < self.rsi_buy,
                    stc[i] < self.stc_sell && rsi[i] > self.rsi_sell,
                )
            })
            .collect()
    }
}
