//! MACD crossover with a long EMA trend filter.
//!
//! - A bullish MACD/signal crossover above the trend EMA goes long
//! - A bearish crossover below the trend EMA goes short
//! - The last direction is held until the opposite one fires
//! - When the series is longer than `ema200_span`, the first `ema200_span`
//!   bars are forced flat while the trend EMA warms up

use serde::{Deserialize, Serialize};

use super::{check_window, SignalSource, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::{ema_of_series, macd_lines};

const NAME: &str = "MACD";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MacdStrategy {
    pub window_fast: usize,
    pub window_slow: usize,
    pub window_sign: usize,
    pub ema200_span: usize,
}

impl Default for MacdStrategy {
    fn default() -> Self {
        Self {
            window_fast: 12,
            window_slow: 26,
            window_sign: 9,
            ema200_span: 200,
        }
    }
}

impl MacdStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "window_fast", self.window_fast)?;
        check_window(NAME, "window_slow", self.window_slow)?;
        check_window(NAME, "window_sign", self.window_sign)?;
        check_window(NAME, "ema200_span", self.ema200_span)
    }
}

impl SignalSource for MacdStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        let signal = (self.window_fast.max(self.window_slow) + self.window_sign).saturating_sub(1);
        signal.max(self.ema200_span)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let closes = closes(bars);
        let lines = macd_lines(&closes, self.window_fast, self.window_slow, self.window_sign);
        let trend = ema_of_series(&closes, self.ema200_span);

        let mut held = Signal::Flat;
        let mut out = Vec::with_capacity(bars.len());
        for i in 0..bars.len() {
            let diff = lines.histogram[i];
            let prev = if i == 0 { f64::NAN } else { lines.histogram[i - 1] };
            let close = closes[i];

            // NaN comparisons are false, so warm-up never crosses.
            let fired = if diff > 0.0 && prev <= 0.0 && close > trend[i] {
                Signal::Long
            } else if diff < 0.0 && prev >= 0.0 && close < trend[i] {
                Signal::Short
            } else {
                Signal::Flat
            };
            if fired != Signal::Flat {
                held = fired;
            }
            out.push(held);
        }

        if bars.len() > self.ema200_span {
            out[..self.ema200_span].fill(Signal::Flat);
        }
        out
    }
}
