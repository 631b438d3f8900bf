//! Keltner Channel breakout: long on a close above the upper band, short on a
//! close below the lower band.

use serde::{Deserialize, Serialize};

use super::{check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Indicator, Keltner};

const NAME: &str = "KELTNER_BREAKOUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KeltnerBreakoutStrategy {
    pub window: usize,
    pub window_atr: usize,
    /// Use the typical-price band construction instead of EMA ± 2 ATR.
    pub original: bool,
}

impl Default for KeltnerBreakoutStrategy {
    fn default() -> Self {
        Self {
            window: 20,
            window_atr: 10,
            original: false,
        }
    }
}

impl KeltnerBreakoutStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "window", self.window)?;
        check_window(NAME, "window_atr", self.window_atr)
    }
}

impl SignalSource for KeltnerBreakoutStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        Keltner::upper(self.window, self.window_atr, self.original).lookback()
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let upper = Keltner::upper(self.window, self.window_atr, self.original).compute(bars);
        let lower = Keltner::lower(self.window, self.window_atr, self.original).compute(bars);
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if !defined(&[upper[i], lower[i]]) {
                    return Signal::Flat;
                }
                decide(bar.close > upper[i], bar.close < lower[i])
            })
            .collect()
    }
}
