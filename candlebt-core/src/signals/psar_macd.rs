//! Parabolic SAR position combined with MACD momentum.
//!
//! Long when price is under the SAR while MACD is above its signal line;
//! short when price is over the SAR while MACD is below its signal line.

use serde::{Deserialize, Serialize};

use super::{check_finite, check_window, decide, defined, SignalSource, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::{macd_lines, Indicator, ParabolicSar};

const NAME: &str = "PSAR_MACD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PsarMacdStrategy {
    pub psar_step: f64,
    pub psar_max: f64,
    pub window_fast: usize,
    pub window_slow: usize,
    pub window_sign: usize,
}

impl Default for PsarMacdStrategy {
    fn default() -> Self {
        Self {
            psar_step: 0.02,
            psar_max: 0.2,
            window_fast: 12,
            window_slow: 26,
            window_sign: 9,
        }
    }
}

impl PsarMacdStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_finite(NAME, "psar_step", self.psar_step)?;
        check_finite(NAME, "psar_max", self.psar_max)?;
        if self.psar_step <= 0.0 || self.psar_max < self.psar_step {
            return Err(StrategyError::InvalidParams {
                strategy: NAME,
                field: "psar_max",
                reason: format!(
                    "need 0 < psar_step <= psar_max, got {} / {}",
                    self.psar_step, self.psar_max
                ),
            });
        }
        check_window(NAME, "window_fast", self.window_fast)?;
        check_window(NAME, "window_slow", self.window_slow)?;
        check_window(NAME, "window_sign", self.window_sign)
    }
}

impl SignalSource for PsarMacdStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        (self.window_fast.max(self.window_slow) + self.window_sign).saturating_sub(2)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let sar = ParabolicSar::with_step(self.psar_step, self.psar_max).compute(bars);
        let closes = closes(bars);
        let lines = macd_lines(&closes, self.window_fast, self.window_slow, self.window_sign);
        (0..bars.len())
            .map(|i| {
                let (macd, signal) = (lines.macd[i], lines.signal[i]);
                if !defined(&[sar[i], macd, signal]) {
                    return Signal::Flat;
                }
                decide(
                    closes[i] < sar[i] && macd > signal,
                    closes[i] > sar[i] && macd < signal,
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::{bars_from_closes, wave};

    #[test]
    fn conditions_hold_wherever_signals_fire() {
        let closes = wave(300);
        let bars = bars_from_closes(&closes);
        let s = PsarMacdStrategy::default();
        let signals = s.generate(&bars);
        let sar = ParabolicSar::with_step(0.02, 0.2).compute(&bars);
        let lines = macd_lines(&closes, 12, 26, 9);
        for (i, sig) in signals.iter().enumerate() {
            match sig {
                Signal::Long => assert!(closes[i] < sar[i] && lines.macd[i] > lines.signal[i]),
                Signal::Short => assert!(closes[i] > sar[i] && lines.macd[i] < lines.signal[i]),
                Signal::Flat => {}
            }
        }
        assert!(signals[..s.warmup_bars()].iter().all(|&x| x == Signal::Flat));
    }

    #[test]
    fn step_above_max_is_invalid() {
        let s = PsarMacdStrategy {
            psar_step: 0.3,
            psar_max: 0.2,
            ..Default::default()
        };
        assert!(s.validate().is_err());
    }
}
