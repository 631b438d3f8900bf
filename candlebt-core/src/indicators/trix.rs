//! TRIX: one-bar percent rate of change of a triple-smoothed EMA.
//!
//! trix[t] = 100 × (E3[t] − E3[t−1]) / E3[t−1], E3 = EMA(EMA(EMA(close))).
//! Lookback: 3 × (window − 1) + 1.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::{closes, Bar};

#[derive(Debug, Clone)]
pub struct Trix {
    window: usize,
    name: String,
}

impl Trix {
    pub fn new(window: usize) -> Self {
        Self {
            window: window.max(1),
            name: format!("trix_{window}"),
        }
    }
}

impl Indicator for Trix {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        3 * (self.window - 1) + 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let e1 = ema_of_series(&closes(bars), self.window);
        let e2 = ema_of_series(&e1, self.window);
        let e3 = ema_of_series(&e2, self.window);

        let mut result = vec![f64::NAN; e3.len()];
        for i in 1..e3.len() {
            let prev = e3[i - 1];
            if prev.is_nan() || e3[i].is_nan() || prev == 0.0 {
                continue;
            }
            result[i] = 100.0 * (e3[i] - prev) / prev;
        }
        result
    }
}
