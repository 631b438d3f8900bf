//! Volume-confirmed momentum bar.
//!
//! Long when the bar's return exceeds `min_change` on above-average volume,
//! short when it falls below `-min_change` on above-average volume.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::sma_of_series;

const NAME: &str = "VOLUME_BREAKOUT";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VolumeBreakoutStrategy {
    pub avg_window: usize,
    pub min_change: f64,
    pub min_vol_mult: f64,
}

impl Default for VolumeBreakoutStrategy {
    fn default() -> Self {
        Self {
            avg_window: 20,
            min_change: 0.0,
            min_vol_mult: 1.0,
        }
    }
}

impl VolumeBreakoutStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "avg_window", self.avg_window)?;
        check_finite(NAME, "min_change", self.min_change)?;
        check_finite(NAME, "min_vol_mult", self.min_vol_mult)
    }
}

impl SignalSource for VolumeBreakoutStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.avg_window.saturating_sub(1).max(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let volumes: Vec<f64> = bars.iter().map(|b| b.volume).collect();
        let avg = sma_of_series(&volumes, self.avg_window);
        (0..bars.len())
            .map(|i| {
                if i == 0 || avg[i].is_nan() {
                    return Signal::Flat;
                }
                let change = bars[i].close / bars[i - 1].close - 1.0;
                let spike = bars[i].volume > self.min_vol_mult * avg[i];
                decide(
                    spike && change > self.min_change,
                    spike && change < -self.min_change,
                )
            })
            .collect()
    }
}
