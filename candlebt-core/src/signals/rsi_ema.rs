//! RSI + EMA pullback strategy.
//!
//! Long when RSI dips below `rsi_buy` while price holds above its EMA.
//! Short when RSI rises above `rsi_sell` while price sits below its EMA.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Ema, EmaSeed, Indicator, Rsi};

const NAME: &str = "RSI_EMA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RsiEmaStrategy {
    pub rsi_period: usize,
    pub ema_period: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
    pub ema_seed: EmaSeed,
}

impl Default for RsiEmaStrategy {
    fn default() -> Self {
        Self {
            rsi_period: 7,
            ema_period: 21,
            rsi_buy: 45.0,
            rsi_sell: 55.0,
            ema_seed: EmaSeed::Sma,
        }
    }
}

impl RsiEmaStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "rsi_period", self.rsi_period)?;
        check_window(NAME, "ema_period", self.ema_period)?;
        check_finite(NAME, "rsi_buy", self.rsi_buy)?;
        check_finite(NAME, "rsi_sell", self.rsi_sell)
    }

    fn ema(&self) -> Ema {
        Ema::with_seed(self.ema_period, self.ema_seed)
    }
}

impl SignalSource for RsiEmaStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.rsi_period.max(self.ema().lookback())
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let rsi = Rsi::wilder(self.rsi_period).compute(bars);
        let ema = self.ema().compute(bars);
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if !defined(&[rsi[i], ema[i]]) {
                    return Signal::Flat;
                }
                decide(
                    rsi[i] < self.rsi_buy && bar.close > ema[i],
                    rsi[i] > self.rsi_sell && bar.close < ema[i],
                )
            })
            .collect()
    }
}
