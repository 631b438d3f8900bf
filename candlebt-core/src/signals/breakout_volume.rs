//! Long-only channel breakout on a volume spike.
//!
//! Fires when the bar's high exceeds the highest high of the previous
//! `breakout_window` bars and volume beats `min_vol_mult` × its rolling mean.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{rolling_max, shift, sma_of_series};

const NAME: &str = "BREAKOUT_VOLUME";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct BreakoutVolumeStrategy {
    pub breakout_window: usize,
    pub min_vol_mult: f64,
}

impl Default for BreakoutVolumeStrategy {
    fn default() -> Self {
        Self {
            breakout_window: 20,
            min_vol_mult: 1.0,
        }
    }
}

impl BreakoutVolumeStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "breakout_window", self.breakout_window)?;
        check_finite(NAME, "min_vol_mult", self.min_vol_mult)
    }
}

impl SignalSource for BreakoutVolumeStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.breakout_window
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let prior_high = shift(&rolling_max(&highs, self.breakout_window), 1);
        let avg_volume = sma_of_series(&volumes, self.breakout_window);

        bars.iter()
            .enumerate()
            .map(|(i, bar)| {
                // NaN comparisons are false during warm-up.
                let breakout = bar.high > prior_high[i];
                let spike = bar.volume > self.min_vol_mult * avg_volume[i];
                if breakout && spike {
                    Signal::Long
                } else {
                    Signal::Flat
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::bars_from_closes;

    #[test]
    fn breakout_needs_volume() {
        let mut bars = bars_from_closes(&[100.0, 100.0, 100.0, 100.0, 110.0, 120.0]);
        bars[5].volume = 3000.0;
        let s = BreakoutVolumeStrategy {
            breakout_window: 3,
            min_vol_mult: 1.0,
        };
        let signals = s.generate(&bars);
        // bar 4 breaks out on average volume
        assert_eq!(signals[4], Signal::Flat);
        assert_eq!(signals[5], Signal::Long);
    }

    #[test]
    fn never_goes_short() {
        let closes: Vec<f64> = (0..60).map(|i| 200.0 - i as f64).collect();
        let signals = BreakoutVolumeStrategy::default().generate(&bars_from_closes(&closes));
        assert!(!signals.contains(&Signal::Short));
    }
}
