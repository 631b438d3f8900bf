//! Heikin-Ashi close against an EMA of the raw close.

use serde::{Deserialize, Serialize};

use super::{check_window, sign_of_spread, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Ema, EmaSeed, HeikinAshiClose, Indicator};

const NAME: &str = "HEIKIN_ASHI_EMA";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HeikinAshiEmaStrategy {
    pub ema_span: usize,
    pub ema_seed: EmaSeed,
}

impl Default for HeikinAshiEmaStrategy {
    fn default() -> Self {
        Self {
            ema_span: 20,
            ema_seed: EmaSeed::Sma,
        }
    }
}

impl HeikinAshiEmaStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "ema_span", self.ema_span)
    }

    fn ema(&self) -> Ema {
        Ema::with_seed(self.ema_span, self.ema_seed)
    }
}

impl SignalSource for HeikinAshiEmaStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.ema().lookback()
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let ha = HeikinAshiClose.compute(bars);
        let ema = self.ema().compute(bars);
        sign_of_spread(&ha, &ema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::bars_from_closes;

    #[test]
    fn smoothed_candles_above_ema_go_long() {
        let closes: Vec<f64> = (0..30).map(|i| 50.0 + i as f64).collect();
        let s = HeikinAshiEmaStrategy {
            ema_span: 5,
            ..Default::default()
        };
        let signals = s.generate(&bars_from_closes(&closes));
        assert_eq!(signals[3], Signal::Flat);
        assert!(signals[5..].iter().all(|&x| x == Signal::Long));
    }
}
