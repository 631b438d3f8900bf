//! Relative Strength Index (RSI).
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//!
//! Two smoothings of the average gain/loss:
//! - `Wilder`: SMA seed over the first `period` changes, then alpha = 1/period.
//!   Lookback: period.
//! - `Simple`: plain rolling mean of the last `period` gains/losses, with the
//!   first bar counted as a zero change. Lookback: period - 1.
//!
//! Edge cases: avg_loss == 0 → 100; avg_gain == 0 → 0; both zero → 50.

use super::rolling::sma_of_series;
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsiSmoothing {
    Wilder,
    Simple,
}

#[derive(Debug, Clone)]
pub struct Rsi {
    period: usize,
    smoothing: RsiSmoothing,
    name: String,
}

impl Rsi {
    pub fn new(period: usize, smoothing: RsiSmoothing) -> Self {
        let tag = match smoothing {
            RsiSmoothing::Wilder => "rsi",
            RsiSmoothing::Simple => "rsi_simple",
        };
        Self {
            period: period.max(1),
            smoothing,
            name: format!("{tag}_{period}"),
        }
    }

    pub fn wilder(period: usize) -> Self {
        Self::new(period, RsiSmoothing::Wilder)
    }
}

impl Indicator for Rsi {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.smoothing {
            RsiSmoothing::Wilder => self.period,
            RsiSmoothing::Simple => self.period - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        match self.smoothing {
            RsiSmoothing::Wilder => wilder_rsi(bars, self.period),
            RsiSmoothing::Simple => simple_rsi(bars, self.period),
        }
    }
}

fn changes(bars: &[Bar]) -> Vec<f64> {
    let mut out = vec![f64::NAN; bars.len()];
    for i in 1..bars.len() {
        out[i] = bars[i].close - bars[i - 1].close;
    }
    out
}

fn wilder_rsi(bars: &[Bar], period: usize) -> Vec<f64> {
    let n = bars.len();
    let mut result = vec![f64::NAN; n];
    if n < period + 1 {
        return result;
    }

    let changes = changes(bars);
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;
    for &ch in &changes[1..=period] {
        if ch.is_nan() {
            return result;
        }
        avg_gain += ch.max(0.0);
        avg_loss += (-ch).max(0.0);
    }
    avg_gain /= period as f64;
    avg_loss /= period as f64;
    result[period] = rsi_from_averages(avg_gain, avg_loss);

    let alpha = 1.0 / period as f64;
    for i in (period + 1)..n {
        let ch = changes[i];
        if ch.is_nan() {
            return result;
        }
        avg_gain = alpha * ch.max(0.0) + (1.0 - alpha) * avg_gain;
        avg_loss = alpha * (-ch).max(0.0) + (1.0 - alpha) * avg_loss;
        result[i] = rsi_from_averages(avg_gain, avg_loss);
    }

    result
}

fn simple_rsi(bars: &[Bar], period: usize) -> Vec<f64> {
    let changes = changes(bars);
    let gains: Vec<f64> = changes
        .iter()
        .enumerate()
        .map(|(i, &c)| if i == 0 { 0.0 } else { c.max(0.0) })
        .collect();
    let losses: Vec<f64> = changes
        .iter()
        .enumerate()
        .map(|(i, &c)| if i == 0 { 0.0 } else { (-c).max(0.0) })
        .collect();
    let avg_gain = sma_of_series(&gains, period);
    let avg_loss = sma_of_series(&losses, period);
    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&g, &l)| {
            if g.is_nan() || l.is_nan() {
                f64::NAN
            } else {
                rsi_from_averages(g, l)
            }
        })
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        50.0
    } else if avg_loss == 0.0 {
        100.0
    } else if avg_gain == 0.0 {
        0.0
    } else {
        100.0 - 100.0 / (1.0 + avg_gain / avg_loss)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars};

    #[test]
    fn rsi_all_gains() {
        let bars = make_bars(&[100.0, 101.0, 102.0, 103.0, 104.0, 105.0]);
        let result = Rsi::wilder(3).compute(&bars);
        assert_approx(result[3], 100.0, 1e-6);
    }

    #[test]
    fn rsi_all_losses() {
        let bars = make_bars(&[105.0, 104.0, 103.0, 102.0, 101.0, 100.0]);
        let result = Rsi::wilder(3).compute(&bars);
        assert_approx(result[3], 0.0, 1e-6);
    }

    #[test]
    fn rsi_wilder_seed_value() {
        // Changes: +0.34, -0.25, -0.48 → avg_gain 0.34/3, avg_loss 0.73/3
        let bars = make_bars(&[44.0, 44.34, 44.09, 43.61, 44.33]);
        let result = Rsi::wilder(3).compute(&bars);
        assert!(result[2].is_nan());
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 0.34 / 0.73), 1e-9);
    }

    #[test]
    fn rsi_simple_window_includes_first_bar() {
        // window 3 at index 2: gains [0, 2, 0], losses [0, 0, 1]
        let bars = make_bars(&[10.0, 12.0, 11.0, 13.0]);
        let result = Rsi::new(3, RsiSmoothing::Simple).compute(&bars);
        assert!(result[1].is_nan());
        assert_approx(result[2], 100.0 - 100.0 / (1.0 + 2.0), 1e-9);
        // index 3: gains [2, 0, 2], losses [0, 1, 0]
        assert_approx(result[3], 100.0 - 100.0 / (1.0 + 4.0), 1e-9);
    }

    #[test]
    fn rsi_bounds() {
        let bars = make_bars(&[100.0, 105.0, 98.0, 110.0, 95.0, 115.0, 90.0, 120.0]);
        for smoothing in [RsiSmoothing::Wilder, RsiSmoothing::Simple] {
            for v in Rsi::new(3, smoothing).compute(&bars) {
                assert!(v.is_nan() || (0.0..=100.0).contains(&v));
            }
        }
    }

    #[test]
    fn rsi_lookback() {
        assert_eq!(Rsi::wilder(14).lookback(), 14);
        assert_eq!(Rsi::new(14, RsiSmoothing::Simple).lookback(), 13);
    }
}
