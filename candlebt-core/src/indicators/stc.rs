//! Schaff Trend Cycle (STC).
//!
//! A double stochastic of the MACD line:
//! 1. macd = EMA(close, fast) − EMA(close, slow)
//! 2. k = 100 × (macd − min(macd, cycle)) / range, d = EMA(k, 3)
//! 3. kd = 100 × (d − min(d, cycle)) / range
//! 4. stc = EMA(kd, 3)
//!
//! A zero stochastic range repeats the previous stochastic value (0 when
//! there is none). Output lies in [0, 100].

use super::ema::ema_of_series;
use super::rolling::{rolling_max, rolling_min};
use super::Indicator;
use crate::domain::{closes, Bar};

const SMOOTHING: usize = 3;

#[derive(Debug, Clone)]
pub struct Stc {
    fast: usize,
    slow: usize,
    cycle: usize,
    name: String,
}

impl Stc {
    pub fn new(fast: usize, slow: usize, cycle: usize) -> Self {
        Self {
            fast: fast.max(1),
            slow: slow.max(1),
            cycle: cycle.max(1),
            name: format!("stc_{fast}_{slow}_{cycle}"),
        }
    }
}

/// Stochastic position of each value within its rolling `cycle` range.
fn stochastic(values: &[f64], cycle: usize) -> Vec<f64> {
    let lo = rolling_min(values, cycle);
    let hi = rolling_max(values, cycle);
    let mut out = vec![f64::NAN; values.len()];
    let mut prev = 0.0;
    for i in 0..values.len() {
        if values[i].is_nan() || lo[i].is_nan() || hi[i].is_nan() {
            continue;
        }
        let range = hi[i] - lo[i];
        let k = if range > 0.0 {
            100.0 * (values[i] - lo[i]) / range
        } else {
            prev
        };
        out[i] = k;
        prev = k;
    }
    out
}

impl Indicator for Stc {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.fast.max(self.slow) - 1 + 2 * (self.cycle - 1) + 2 * (SMOOTHING - 1)
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let fast = ema_of_series(&closes, self.fast);
        let slow = ema_of_series(&closes, self.slow);
        let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();

        let k = stochastic(&macd, self.cycle);
        let d = ema_of_series(&k, SMOOTHING);
        let kd = stochastic(&d, self.cycle);
        ema_of_series(&kd, SMOOTHING)
    }
}
