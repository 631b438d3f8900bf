//! Strategy library: turns a bar series into a per-bar signal series.
//!
//! Strategies never see simulator state (positions, balance). They are pure
//! market-timing rules over OHLCV data, and the value for bar t only uses bars
//! up to t. Wherever an indicator a strategy needs is still warming up (NaN)
//! the strategy emits `Flat`.

pub mod adx_ema;
pub mod bollinger_rsi;
pub mod breakout_volume;
pub mod config;
pub mod ema200_price_action;
pub mod fibonacci_reversal;
pub mod heikin_ashi_ema;
pub mod ichimoku;
pub mod keltner_breakout;
pub mod macd;
pub mod psar_macd;
pub mod rsi_ema;
pub mod sma_cross;
pub mod supertrend_rsi;
pub mod trix;
pub mod volume_breakout;

pub use adx_ema::AdxEmaStrategy;
pub use bollinger_rsi::BollingerRsiStrategy;
pub use breakout_volume::BreakoutVolumeStrategy;
pub use config::StrategyConfig;
pub use ema200_price_action::Ema200PriceActionStrategy;
pub use fibonacci_reversal::FibonacciReversalStrategy;
pub use heikin_ashi_ema::HeikinAshiEmaStrategy;
pub use ichimoku::IchimokuStrategy;
pub use keltner_breakout::KeltnerBreakoutStrategy;
pub use macd::MacdStrategy;
pub use psar_macd::PsarMacdStrategy;
pub use rsi_ema::RsiEmaStrategy;
pub use sma_cross::SmaCrossStrategy;
pub use supertrend_rsi::SupertrendRsiStrategy;
pub use trix::TrixStrategy;
pub use volume_breakout::VolumeBreakoutStrategy;

use crate::domain::{Bar, Signal};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Errors raised while resolving or constructing a strategy.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StrategyError {
    #[error("unknown strategy: {0}")]
    UnknownStrategy(String),
    #[error("invalid {strategy} parameter `{field}`: {reason}")]
    InvalidParams {
        strategy: &'static str,
        field: &'static str,
        reason: String,
    },
}

/// A source of per-bar signals.
///
/// # Invariants
/// - `generate()` returns exactly one signal per input bar
/// - `generate()` is deterministic for the same bar sequence
/// - the signal at bar t depends only on bars `..=t`
pub trait SignalSource: Send + Sync {
    /// Strategy name as it appears in configs and artifacts (e.g. `RSI_EMA`).
    fn name(&self) -> &str;

    /// Bars needed before every indicator of the strategy is defined.
    fn warmup_bars(&self) -> usize;

    fn generate(&self, bars: &[Bar]) -> Vec<Signal>;
}

/// The closed set of strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyKind {
    RsiEma,
    Macd,
    BollingerRsi,
    SmaCross,
    VolumeBreakout,
    BreakoutVolume,
    PsarMacd,
    FibonacciReversal,
    Trix,
    HeikinAshiEma,
    SupertrendRsi,
    AdxEma,
    Ichimoku,
    Ema200PriceAction,
    KeltnerBreakout,
}

impl StrategyKind {
    pub const ALL: [StrategyKind; 15] = [
        StrategyKind::RsiEma,
        StrategyKind::Macd,
        StrategyKind::BollingerRsi,
        StrategyKind::SmaCross,
        StrategyKind::VolumeBreakout,
        StrategyKind::BreakoutVolume,
        StrategyKind::PsarMacd,
        StrategyKind::FibonacciReversal,
        StrategyKind::Trix,
        StrategyKind::HeikinAshiEma,
        StrategyKind::SupertrendRsi,
        StrategyKind::AdxEma,
        StrategyKind::Ichimoku,
        StrategyKind::Ema200PriceAction,
        StrategyKind::KeltnerBreakout,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StrategyKind::RsiEma => "RSI_EMA",
            StrategyKind::Macd => "MACD",
            StrategyKind::BollingerRsi => "BOLLINGER_RSI",
            StrategyKind::SmaCross => "SMA_CROSS",
            StrategyKind::VolumeBreakout => "VOLUME_BREAKOUT",
            StrategyKind::BreakoutVolume => "BREAKOUT_VOLUME",
            StrategyKind::PsarMacd => "PSAR_MACD",
            StrategyKind::FibonacciReversal => "FIBONACCI_REVERSAL",
            StrategyKind::Trix => "TRIX",
            StrategyKind::HeikinAshiEma => "HEIKIN_ASHI_EMA",
            StrategyKind::SupertrendRsi => "SUPERTREND_RSI",
            StrategyKind::AdxEma => "ADX_EMA",
            StrategyKind::Ichimoku => "ICHIMOKU",
            StrategyKind::Ema200PriceAction => "EMA200_PRICE_ACTION",
            StrategyKind::KeltnerBreakout => "KELTNER_BREAKOUT",
        }
    }

    /// Config with every parameter at its default.
    pub fn default_config(&self) -> StrategyConfig {
        match self {
            StrategyKind::RsiEma => StrategyConfig::RsiEma(Default::default()),
            StrategyKind::Macd => StrategyConfig::Macd(Default::default()),
            StrategyKind::BollingerRsi => StrategyConfig::BollingerRsi(Default::default()),
            StrategyKind::SmaCross => StrategyConfig::SmaCross(Default::default()),
            StrategyKind::VolumeBreakout => StrategyConfig::VolumeBreakout(Default::default()),
            StrategyKind::BreakoutVolume => StrategyConfig::BreakoutVolume(Default::default()),
            StrategyKind::PsarMacd => StrategyConfig::PsarMacd(Default::default()),
            StrategyKind::FibonacciReversal => {
                StrategyConfig::FibonacciReversal(Default::default())
            }
            StrategyKind::Trix => StrategyConfig::Trix(Default::default()),
            StrategyKind::HeikinAshiEma => StrategyConfig::HeikinAshiEma(Default::default()),
            StrategyKind::SupertrendRsi => StrategyConfig::SupertrendRsi(Default::default()),
            StrategyKind::AdxEma => StrategyConfig::AdxEma(Default::default()),
            StrategyKind::Ichimoku => StrategyConfig::Ichimoku(Default::default()),
            StrategyKind::Ema200PriceAction => {
                StrategyConfig::Ema200PriceAction(Default::default())
            }
            StrategyKind::KeltnerBreakout => StrategyConfig::KeltnerBreakout(Default::default()),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StrategyKind {
    type Err = StrategyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        StrategyKind::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| StrategyError::UnknownStrategy(s.to_string()))
    }
}

// ─── Shared rule helpers ─────────────────────────────────────────────

/// Resolve a bar's long/short conditions. A short condition overrides a long one.
pub(crate) fn decide(long: bool, short: bool) -> Signal {
    if short {
        Signal::Short
    } else if long {
        Signal::Long
    } else {
        Signal::Flat
    }
}

/// True when every value is defined.
pub(crate) fn defined(values: &[f64]) -> bool {
    values.iter().all(|v| !v.is_nan())
}

/// `Long` where `a > b`, `Short` where `a < b`, `Flat` on ties and warm-up.
pub(crate) fn sign_of_spread(a: &[f64], b: &[f64]) -> Vec<Signal> {
    a.iter()
        .zip(b)
        .map(|(&x, &y)| Signal::from_sign(x - y))
        .collect()
}

pub(crate) fn check_window(
    strategy: &'static str,
    field: &'static str,
    value: usize,
) -> Result<(), StrategyError> {
    if value == 0 {
        return Err(StrategyError::InvalidParams {
            strategy,
            field,
            reason: "window must be >= 1".into(),
        });
    }
    Ok(())
}

pub(crate) fn check_finite(
    strategy: &'static str,
    field: &'static str,
    value: f64,
) -> Result<(), StrategyError> {
    if !value.is_finite() {
        return Err(StrategyError::InvalidParams {
            strategy,
            field,
            reason: format!("must be finite, got {value}"),
        });
    }
    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::domain::Bar;
    use chrono::{Duration, NaiveDate};

    /// Bars with a given close path; high/low one unit around open/close.
    pub fn bars_from_closes(closes: &[f64]) -> Vec<Bar> {
        let base = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| {
                let open = if i == 0 { close } else { closes[i - 1] };
                Bar {
                    timestamp: base + Duration::hours(i as i64),
                    open,
                    high: open.max(close) + 1.0,
                    low: open.min(close) - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect()
    }

    /// A deterministic oscillating-with-drift price path.
    pub fn wave(n: usize) -> Vec<f64> {
        (0..n)
            .map(|i| 100.0 + (i as f64 * 0.15).sin() * 12.0 + (i as f64 * 0.05).cos() * 4.0)
            .collect()
    }
}
