//! TRIX against its own moving average.

use serde::{Deserialize, Serialize};

use super::{check_window, sign_of_spread, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{sma_of_series, Indicator, Trix};

const NAME: &str = "TRIX";

/// Smoothing window of the triple EMA.
pub const TRIX_WINDOW: usize = 15;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrixStrategy {
    pub signal_window: usize,
}

impl Default for TrixStrategy {
    fn default() -> Self {
        Self { signal_window: 9 }
    }
}

impl TrixStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "signal_window", self.signal_window)
    }
}

impl SignalSource for TrixStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        (Trix::new(TRIX_WINDOW).lookback() + self.signal_window).saturating_sub(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let trix = Trix::new(TRIX_WINDOW).compute(bars);
        let signal = sma_of_series(&trix, self.signal_window);
        sign_of_spread(&trix, &signal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::{bars_from_closes, wave};

    #[test]
    fn first_signal_after_warmup() {
        let bars = bars_from_closes(&wave(200));
        let s = TrixStrategy::default();
        let signals = s.generate(&bars);
        assert!(signals[..s.warmup_bars()].iter().all(|&x| x == Signal::Flat));
        assert!(signals[s.warmup_bars()..].iter().any(|&x| x != Signal::Flat));
    }

    #[test]
    fn accelerating_rise_is_long() {
        let closes: Vec<f64> = (0..120).map(|i| 100.0 * 1.0005_f64.powi(i * i / 10)).collect();
        let signals = TrixStrategy::default().generate(&bars_from_closes(&closes));
        assert_eq!(signals[119], Signal::Long);
    }
}
