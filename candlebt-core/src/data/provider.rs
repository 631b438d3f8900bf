//! Data provider trait and structured error types.
//!
//! The `DataProvider` trait abstracts over candle sources (Binance, the
//! synthetic generator) so the runner can swap them and tests can mock them.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Interval;
use crate::domain::Bar;

#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("unsupported interval: {0}")]
    UnsupportedInterval(String),

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("cache error: {0}")]
    CacheError(String),

    #[error("validation error: {0}")]
    ValidationError(String),

    #[error("no cached data for {symbol} {interval}; run `download` first")]
    NoCachedData { symbol: String, interval: Interval },

    #[error("data error: {0}")]
    Other(String),
}

/// Where a bar series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Binance,
    Cache,
    Synthetic,
}

/// A source of historical candles.
///
/// Implementations return bars whose open time lies in `[start, end]`, sorted
/// ascending. Gaps in the exchange history are passed through untouched. The
/// cache sits above this trait; providers know nothing about it.
pub trait DataProvider: Send + Sync {
    fn name(&self) -> &str;

    fn source(&self) -> DataSource;

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, DataError>;

    /// False while the provider refuses requests (e.g. circuit breaker open).
    fn is_available(&self) -> bool {
        true
    }
}
