//! Binance spot klines provider.
//!
//! Fetches `/api/v3/klines` 1000 rows at a time, walking `startTime` forward
//! until the end of the window. Each page is retried with exponential backoff
//! and the endpoint is guarded by a [`CircuitBreaker`].

use chrono::{DateTime, NaiveDateTime};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, DataProvider, DataSource};
use super::Interval;
use crate::domain::Bar;

pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

/// Rows per page; the exchange maximum.
const PAGE_LIMIT: usize = 1000;

/// Binance error body, e.g. `{"code": -1121, "msg": "Invalid symbol."}`.
#[derive(Debug, serde::Deserialize)]
struct ApiError {
    code: i64,
    msg: String,
}

const INVALID_SYMBOL: i64 = -1121;

pub struct BinanceProvider {
    client: reqwest::blocking::Client,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
    page_pause: Duration,
}

impl BinanceProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        Self::with_base_url(DEFAULT_BASE_URL, circuit_breaker)
    }

    pub fn with_base_url(
        base_url: impl Into<String>,
        circuit_breaker: Arc<CircuitBreaker>,
    ) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("candlebt/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
            page_pause: Duration::from_millis(200),
        })
    }

    fn klines_url(&self) -> String {
        format!("{}/api/v3/klines", self.base_url.trim_end_matches('/'))
    }

    /// One page of raw kline rows with retry and circuit breaker logic.
    fn fetch_page(
        &self,
        symbol: &str,
        interval: Interval,
        start_ms: i64,
        end_ms: i64,
    ) -> Result<Vec<Vec<Value>>, DataError> {
        let url = self.klines_url();
        let limit = PAGE_LIMIT.to_string();
        let start = start_ms.to_string();
        let end = end_ms.to_string();
        let query = [
            ("symbol", symbol),
            ("interval", interval.code()),
            ("limit", limit.as_str()),
            ("startTime", start.as_str()),
            ("endTime", end.as_str()),
        ];
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                debug!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying klines page");
                std::thread::sleep(delay);
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).query(&query).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN || status.as_u16() == 418 {
                // 418 is Binance's IP-ban status
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!(symbol, retry_after, "rate limited by exchange");
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if status.is_server_error() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let body = resp.text().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to read body for {symbol}: {e}"))
            })?;
            if !status.is_success() {
                return Err(classify_client_error(symbol, status.as_u16(), &body));
            }
            let rows: Vec<Vec<Value>> = serde_json::from_str(&body).map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse klines for {symbol}: {e}"))
            })?;
            self.circuit_breaker.record_success();
            return Ok(rows);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

fn classify_client_error(symbol: &str, status: u16, body: &str) -> DataError {
    match serde_json::from_str::<ApiError>(body) {
        Ok(err) if err.code == INVALID_SYMBOL => DataError::SymbolNotFound {
            symbol: symbol.to_string(),
        },
        Ok(err) => DataError::Other(format!("HTTP {status} ({}): {}", err.code, err.msg)),
        Err(_) => DataError::Other(format!("HTTP {status} for {symbol}")),
    }
}

fn to_millis(t: NaiveDateTime) -> i64 {
    t.and_utc().timestamp_millis()
}

fn number(row: &[Value], idx: usize) -> Result<f64, DataError> {
    let value = row
        .get(idx)
        .ok_or_else(|| DataError::ResponseFormatChanged(format!("kline row missing column {idx}")))?;
    match value {
        Value::String(s) => s.parse::<f64>().map_err(|e| {
            DataError::ResponseFormatChanged(format!("column {idx} not numeric ({s}): {e}"))
        }),
        Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| DataError::ResponseFormatChanged(format!("column {idx} out of range"))),
        other => Err(DataError::ResponseFormatChanged(format!(
            "column {idx} has unexpected type: {other}"
        ))),
    }
}

/// Convert raw kline rows `[open_time_ms, "open", "high", "low", "close",
/// "volume", close_time, ...]` into bars.
pub fn parse_klines(rows: &[Vec<Value>]) -> Result<Vec<Bar>, DataError> {
    rows.iter()
        .map(|row| {
            let open_ms = row
                .first()
                .and_then(Value::as_i64)
                .ok_or_else(|| DataError::ResponseFormatChanged("kline open time missing".into()))?;
            let timestamp = DateTime::from_timestamp_millis(open_ms)
                .map(|dt| dt.naive_utc())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {open_ms}"))
                })?;
            Ok(Bar {
                timestamp,
                open: number(row, 1)?,
                high: number(row, 2)?,
                low: number(row, 3)?,
                close: number(row, 4)?,
                volume: number(row, 5)?,
            })
        })
        .collect()
}

fn open_time(row: &[Value]) -> Option<i64> {
    row.first().and_then(Value::as_i64)
}

impl DataProvider for BinanceProvider {
    fn name(&self) -> &str {
        "binance"
    }

    fn source(&self) -> DataSource {
        DataSource::Binance
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, DataError> {
        let symbol = symbol.to_ascii_uppercase();
        let end_ms = to_millis(end);
        let mut start_ms = to_millis(start);
        let mut rows = Vec::new();
        let mut pages = 0usize;

        while start_ms <= end_ms {
            let page = self.fetch_page(&symbol, interval, start_ms, end_ms)?;
            pages += 1;
            let Some(last) = page.last().and_then(|r| open_time(r)) else {
                break;
            };
            let full = page.len() >= PAGE_LIMIT;
            rows.extend(page);
            if last >= end_ms || !full {
                break;
            }
            start_ms = last + 1;
            std::thread::sleep(self.page_pause);
        }

        let bars = parse_klines(&rows)?;
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound { symbol });
        }
        info!(symbol = %symbol, %interval, pages, bars = bars.len(), "fetched klines");
        Ok(bars)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}
