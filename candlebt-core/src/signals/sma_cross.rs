//! Simple moving average cross: long while the short SMA is above the long
//! SMA, short while it is below.

use serde::{Deserialize, Serialize};

use super::{check_window, sign_of_spread, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Indicator, Sma};

const NAME: &str = "SMA_CROSS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SmaCrossStrategy {
    pub short_window: usize,
    pub long_window: usize,
}

impl Default for SmaCrossStrategy {
    fn default() -> Self {
        Self {
            short_window: 50,
            long_window: 200,
        }
    }
}

impl SmaCrossStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "short_window", self.short_window)?;
        check_window(NAME, "long_window", self.long_window)
    }
}

impl SignalSource for SmaCrossStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.short_window.max(self.long_window).saturating_sub(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let fast = Sma::new(self.short_window).compute(bars);
        let slow = Sma::new(self.long_window).compute(bars);
        sign_of_spread(&fast, &slow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::bars_from_closes;

    #[test]
    fn follows_the_cross() {
        let mut closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        closes.extend((0..20).map(|i| 119.0 - 3.0 * i as f64));
        let s = SmaCrossStrategy {
            short_window: 3,
            long_window: 8,
        };
        let signals = s.generate(&bars_from_closes(&closes));
        assert!(signals[..7].iter().all(|&x| x == Signal::Flat));
        assert_eq!(signals[10], Signal::Long);
        assert_eq!(signals[39], Signal::Short);
    }
}
