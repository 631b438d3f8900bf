//! EMA trend side, taken only while ADX confirms a trending market.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Adx, Ema, EmaSeed, Indicator};

const NAME: &str = "ADX_EMA";

/// Wilder period of the ADX filter.
pub const ADX_WINDOW: usize = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdxEmaStrategy {
    pub ema_span: usize,
    pub adx_threshold: f64,
    pub ema_seed: EmaSeed,
}

impl Default for AdxEmaStrategy {
    fn default() -> Self {
        Self {
            ema_span: 20,
            adx_threshold: 25.0,
            ema_seed: EmaSeed::Sma,
        }
    }
}

impl AdxEmaStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "ema_span", self.ema_span)?;
        check_finite(NAME, "adx_threshold", self.adx_threshold)
    }
}

impl SignalSource for AdxEmaStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        Ema::with_seed(self.ema_span, self.ema_seed)
            .lookback()
            .max(Adx::new(ADX_WINDOW).lookback())
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let ema = Ema::with_seed(self.ema_span, self.ema_seed).compute(bars);
        let adx = Adx::new(ADX_WINDOW).compute(bars);
        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                if !defined(&[ema[i], adx[i]]) || adx[i] <= self.adx_threshold {
                    return Signal::Flat;
                }
                decide(bar.close > ema[i], bar.close < ema[i])
            })
            .collect()
    }
}
