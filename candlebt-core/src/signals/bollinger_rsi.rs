//! Bollinger Band mean reversion confirmed by a simple-average RSI.
//!
//! Long when price closes below the lower band with RSI under `rsi_buy`.
//! Short when price closes above the upper band with RSI over `rsi_sell`.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Bollinger, Indicator, Rsi, RsiSmoothing};

const NAME: &str = "BOLLINGER_RSI";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BollingerRsiStrategy {
    pub bb_window: usize,
    pub bb_std: f64,
    pub rsi_window: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
}

impl Default for BollingerRsiStrategy {
    fn default() -> Self {
        Self {
            bb_window: 20,
            bb_std: 2.0,
            rsi_window: 14,
            rsi_buy: 30.0,
            rsi_sell: 70.0,
        }
    }
}

impl BollingerRsiStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        // The sample deviation needs at least two points.
        if self.bb_window < 2 {
            return Err(StrategyError::InvalidParams {
                strategy: NAME,
                field: "bb_window",
                reason: "window must be >= 2".into(),
            });
        }
        check_finite(NAME, "bb_std", self.bb_std)?;
        check_window(NAME, "rsi_window", self.rsi_window)?;
        check_finite(NAME, "rsi_buy", self.rsi_buy)?;
        check_finite(NAME, "rsi_sell", self.rsi_sell)
    }
}

impl SignalSource for BollingerRsiStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.bb_window.max(self.rsi_window).saturating_sub(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let upper = Bollinger::upper(self.bb_window, self.bb_std).compute(bars);
        let lower = Bollinger::lower(self.bb_window, self.bb_std).compute(bars);
        let rsi = Rsi::new(self.rsi_window, RsiSmoothing::Simple).compute(bars);
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if !defined(&[upper[i], lower[i], rsi[i]]) {
                    return Signal::Flat;
                }
                decide(
                    bar.close < lower[i] && rsi[i] < self.rsi_buy,
                    bar.close > upper[i] && rsi[i] > self.rsi_sell,
                )
            })
            .collect()
    }
}
