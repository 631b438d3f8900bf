//! Heikin-Ashi close: (open + high + low + close) / 4. No warm-up.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, Default)]
pub struct HeikinAshiClose;

impl Indicator for HeikinAshiClose {
    fn name(&self) -> &str {
        "heikin_ashi_close"
    }

    fn lookback(&self) -> usize {
        0
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        bars.iter()
            .map(|b| (b.open + b.high + b.low + b.close) / 4.0)
            .collect()
    }
}
