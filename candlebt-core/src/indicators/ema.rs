//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * x[t] + (1 - alpha) * EMA[t-1], alpha = 2/(span+1).
//! Seed: SMA of the first `span` valid values (lookback span - 1), or the first
//! valid value itself (lookback 0). Leading NaNs (the warm-up of an upstream
//! indicator) are skipped, so EMAs can be chained.

use serde::{Deserialize, Serialize};

use super::Indicator;
use crate::domain::{closes, Bar};

/// Where the EMA recursion starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmaSeed {
    /// Mean of the first `span` values; NaN before that.
    #[default]
    Sma,
    /// The first value as-is, so the EMA is defined from the first bar.
    First,
}

#[derive(Debug, Clone)]
pub struct Ema {
    span: usize,
    seed: EmaSeed,
    name: String,
}

impl Ema {
    pub fn new(span: usize) -> Self {
        Self::with_seed(span, EmaSeed::Sma)
    }

    pub fn with_seed(span: usize, seed: EmaSeed) -> Self {
        let name = match seed {
            EmaSeed::Sma => format!("ema_{span}"),
            EmaSeed::First => format!("ema_{span}_first"),
        };
        Self {
            span: span.max(1),
            seed,
            name,
        }
    }
}

impl Indicator for Ema {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        match self.seed {
            EmaSeed::Sma => self.span - 1,
            EmaSeed::First => 0,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        match self.seed {
            EmaSeed::Sma => ema_of_series(&closes, self.span),
            EmaSeed::First => ema_from_first(&closes, self.span),
        }
    }
}

/// Compute EMA values from a raw f64 series.
///
/// A NaN after the seed taints every later value.
pub fn ema_of_series(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }

    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };
    let seed_end = start + span;
    if seed_end > n {
        return result;
    }

    let seed_window = &values[start..seed_end];
    if seed_window.iter().any(|v| v.is_nan()) {
        return result;
    }
    let seed = seed_window.iter().sum::<f64>() / span as f64;
    result[seed_end - 1] = seed;

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = seed;
    for i in seed_end..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }

    result
}

/// EMA seeded with the first valid value instead of an SMA.
///
/// Same NaN handling as [`ema_of_series`].
pub fn ema_from_first(values: &[f64], span: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];
    if span == 0 {
        return result;
    }
    let Some(start) = values.iter().position(|v| !v.is_nan()) else {
        return result;
    };

    let alpha = 2.0 / (span as f64 + 1.0);
    let mut prev = values[start];
    result[start] = prev;
    for i in start + 1..n {
        if values[i].is_nan() {
            return result;
        }
        prev = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = prev;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn ema_period_1_equals_close() {
        let bars = make_bars(&[100.0, 200.0, 300.0]);
        let result = Ema::new(1).compute(&bars);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed SMA(10,11,12) = 11
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::new(3).compute(&bars);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_skips_leading_nan() {
        let values = [f64::NAN, f64::NAN, 10.0, 11.0, 12.0, 13.0];
        let out = ema_of_series(&values, 3);
        assert!(out[3].is_nan());
        assert_approx(out[4], 11.0, DEFAULT_EPSILON);
        assert_approx(out[5], 12.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_nan_after_seed_propagates() {
        let out = ema_of_series(&[10.0, 11.0, 12.0, f64::NAN, 14.0], 3);
        assert_approx(out[2], 11.0, DEFAULT_EPSILON);
        assert!(out[3].is_nan());
        assert!(out[4].is_nan());
    }

    #[test]
    fn ema_lookback() {
        assert_eq!(Ema::new(20).lookback(), 19);
        assert_eq!(Ema::new(1).lookback(), 0);
        assert_eq!(Ema::with_seed(20, EmaSeed::First).lookback(), 0);
    }

    #[test]
    fn first_seeded_ema_starts_at_first_close() {
        // alpha = 0.5: 10, 10.5, 11.25, 12.125, 13.0625
        let bars = make_bars(&[10.0, 11.0, 12.0, 13.0, 14.0]);
        let result = Ema::with_seed(3, EmaSeed::First).compute(&bars);
        assert_approx(result[0], 10.0, DEFAULT_EPSILON);
        assert_approx(result[1], 10.5, DEFAULT_EPSILON);
        assert_approx(result[2], 11.25, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0625, DEFAULT_EPSILON);
    }

    #[test]
    fn first_seeded_ema_skips_leading_nan() {
        let out = ema_from_first(&[f64::NAN, 4.0, 8.0, f64::NAN, 1.0], 3);
        assert!(out[0].is_nan());
        assert_approx(out[1], 4.0, DEFAULT_EPSILON);
        assert_approx(out[2], 6.0, DEFAULT_EPSILON);
        assert!(out[3].is_nan());
        assert!(out[4].is_nan());
    }
}
