//! Technical indicators consumed by the strategy library.
//!
//! Every indicator is a pure function of the bar history: the value at bar t
//! never depends on bars after t. Warm-up positions are `f64::NAN`.
//!
//! Multi-series indicators (Bollinger, Keltner, MACD, Ichimoku) are exposed as
//! separate named instances per band/line, keeping the single-series
//! [`Indicator`] trait unchanged. Strategies that need several lines of the
//! same indicator use the free functions to avoid recomputation.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod ema;
pub mod heikin_ashi;
pub mod ichimoku;
pub mod keltner;
pub mod macd;
pub mod parabolic_sar;
pub mod rolling;
pub mod rsi;
pub mod sma;
pub mod stc;
pub mod trix;

pub use adx::Adx;
pub use atr::{true_range, wilder_smooth, Atr};
pub use bollinger::{Bollinger, BollingerBand};
pub use ema::{ema_from_first, ema_of_series, Ema, EmaSeed};
pub use heikin_ashi::HeikinAshiClose;
pub use ichimoku::{Ichimoku, IchimokuLine};
pub use keltner::{Keltner, KeltnerBand};
pub use macd::{macd_lines, Macd, MacdLine, MacdLines};
pub use parabolic_sar::ParabolicSar;
pub use rolling::{rolling_max, rolling_min, rolling_std, shift, sma_of_series};
pub use rsi::{Rsi, RsiSmoothing};
pub use sma::Sma;
pub use stc::Stc;
pub use trix::Trix;

use crate::domain::Bar;

/// Trait for indicators.
///
/// Indicators take a full bar series and produce a numeric output series of
/// the same length. The first `lookback()` values are `f64::NAN` (warmup).
///
/// # Look-ahead contamination guard
/// No indicator value at bar t may depend on price data from bar t+1 or later.
/// Every indicator must pass the truncated-vs-full series test.
pub trait Indicator: Send + Sync {
    /// Human-readable name (e.g., "sma_20", "atr_14").
    fn name(&self) -> &str;

    /// Number of bars needed before the indicator produces valid output.
    fn lookback(&self) -> usize;

    /// Compute the indicator for the entire bar series.
    fn compute(&self, bars: &[Bar]) -> Vec<f64>;
}

/// Create synthetic bars from close prices for testing.
///
/// open = prev_close (or close for first bar),
/// high = max(open,close) + 1.0, low = min(open,close) - 1.0, volume = 1000.
#[cfg(test)]
pub fn make_bars(closes: &[f64]) -> Vec<Bar> {
    let base = chrono::NaiveDate::from_ymd_opt(2024, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let open = if i == 0 { close } else { closes[i - 1] };
            Bar {
                timestamp: base + chrono::Duration::hours(i as i64),
                open,
                high: open.max(close) + 1.0,
                low: open.min(close) - 1.0,
                close,
                volume: 1000.0,
            }
        })
        .collect()
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;
