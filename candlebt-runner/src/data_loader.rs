//! Bar resolution for the runner.
//!
//! For one symbol and window, the fallback policy is:
//! 1. Cache covers the window (and no `force`): use it
//! 2. Otherwise, unless offline: fetch from the provider, ingest, merge into
//!    the cached series and write it back
//! 3. If still nothing and `synthetic` is set: generate synthetic bars
//! 4. Otherwise fail with a clear error
//!
//! Synthetic bars are a development aid. Results built on them carry
//! `DataSource::Synthetic`.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::{info, warn};

use candlebt_core::data::{
    ingest, synthetic_bars, BarCache, CoverageResult, DataError, DataProvider, DataSource,
    Interval,
};
use candlebt_core::domain::Bar;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error(
        "no cached data for {symbol} {interval} and network access is disabled (use --synthetic for synthetic data)"
    )]
    NoCachedDataOffline { symbol: String, interval: Interval },

    #[error("no cached data for {symbol} {interval} and download failed: {reason}")]
    DownloadFailed {
        symbol: String,
        interval: Interval,
        reason: String,
    },

    #[error("data error: {0}")]
    Data(#[from] DataError),
}

#[derive(Debug, Clone)]
pub struct LoadOptions {
    pub interval: Interval,
    /// Earliest candle open time to include.
    pub start: NaiveDateTime,
    /// Latest candle open time to include.
    pub end: NaiveDateTime,
    /// Never make network requests.
    pub offline: bool,
    /// Generate synthetic bars when real data is unavailable.
    pub synthetic: bool,
    /// Re-download even when the cache covers the window.
    pub force: bool,
}

#[derive(Debug, Clone)]
pub struct LoadedBars {
    pub symbol: String,
    pub bars: Vec<Bar>,
    pub source: DataSource,
    /// BLAKE3 over the symbol and every bar in the window.
    pub dataset_hash: String,
}

pub fn load_bars(
    symbol: &str,
    cache: &BarCache,
    provider: Option<&dyn DataProvider>,
    opts: &LoadOptions,
) -> Result<LoadedBars, LoadError> {
    let symbol = symbol.to_ascii_uppercase();
    let loaded = |bars: Vec<Bar>, source: DataSource| LoadedBars {
        dataset_hash: dataset_hash(&symbol, &bars),
        symbol: symbol.clone(),
        bars,
        source,
    };

    if !opts.force
        && cache.covers_range(&symbol, opts.interval, opts.start, opts.end)
            == CoverageResult::FullyCovered
    {
        let bars = cache.load_range(&symbol, opts.interval, opts.start, opts.end)?;
        if !bars.is_empty() {
            info!(symbol = %symbol, interval = %opts.interval, bars = bars.len(), "loaded from cache");
            return Ok(loaded(bars, DataSource::Cache));
        }
    }

    let mut failure = None;
    if !opts.offline {
        match provider {
            Some(p) if p.is_available() => {
                match download(&symbol, cache, p, opts) {
                    Ok(bars) if !bars.is_empty() => return Ok(loaded(bars, p.source())),
                    Ok(_) => failure = Some("provider returned no bars in window".to_string()),
                    // A blocked provider is a hard stop, never papered over.
                    Err(e @ DataError::CircuitBreakerTripped) => return Err(e.into()),
                    Err(e) => {
                        warn!(symbol = %symbol, error = %e, "download failed");
                        failure = Some(e.to_string());
                    }
                }
            }
            Some(p) => failure = Some(format!("{} is unavailable", p.name())),
            None => failure = Some("no provider configured".to_string()),
        }
    }

    if opts.synthetic {
        warn!(symbol = %symbol, "generating synthetic data; results will be tagged as synthetic");
        let bars = synthetic_bars(&symbol, opts.interval, opts.start, opts.end);
        return Ok(loaded(bars, DataSource::Synthetic));
    }

    match failure {
        None => Err(LoadError::NoCachedDataOffline {
            symbol,
            interval: opts.interval,
        }),
        Some(reason) => Err(LoadError::DownloadFailed {
            symbol,
            interval: opts.interval,
            reason,
        }),
    }
}

/// Fetch the window, merge it into the cached series, and return the window.
///
/// A cache file that exists but cannot be read is left untouched: the window
/// is still returned, but nothing is written over the unreadable history.
fn download(
    symbol: &str,
    cache: &BarCache,
    provider: &dyn DataProvider,
    opts: &LoadOptions,
) -> Result<Vec<Bar>, DataError> {
    let fetched = ingest(provider.fetch(symbol, opts.interval, opts.start, opts.end)?)?;
    let window = fetched.bars.clone();
    if window.is_empty() {
        return Ok(window);
    }

    let existing = match cache.load(symbol, opts.interval) {
        Ok(bars) => bars,
        Err(DataError::NoCachedData { .. }) => Vec::new(),
        Err(e) => {
            warn!(
                symbol = %symbol,
                interval = %opts.interval,
                path = %cache.path_for(symbol, opts.interval).display(),
                error = %e,
                "cached series unreadable; not overwriting it"
            );
            return Ok(window);
        }
    };
    let merged = merge_bars(existing, fetched.bars);
    cache.write(symbol, opts.interval, &merged)?;
    info!(
        symbol = %symbol,
        interval = %opts.interval,
        fetched = window.len(),
        cached = merged.len(),
        provider = provider.name(),
        "downloaded and cached"
    );
    Ok(window)
}

/// Union of two series keyed by open time; `fresh` wins on collisions.
pub fn merge_bars(existing: Vec<Bar>, fresh: Vec<Bar>) -> Vec<Bar> {
    let mut by_time: BTreeMap<NaiveDateTime, Bar> =
        existing.into_iter().map(|b| (b.timestamp, b)).collect();
    by_time.extend(fresh.into_iter().map(|b| (b.timestamp, b)));
    by_time.into_values().collect()
}

/// Deterministic BLAKE3 hash over a symbol's bars.
pub fn dataset_hash(symbol: &str, bars: &[Bar]) -> String {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.as_bytes());
    for bar in bars {
        hasher.update(&bar.timestamp.and_utc().timestamp_millis().to_le_bytes());
        hasher.update(&bar.open.to_le_bytes());
        hasher.update(&bar.high.to_le_bytes());
        hasher.update(&bar.low.to_le_bytes());
        hasher.update(&bar.close.to_le_bytes());
        hasher.update(&bar.volume.to_le_bytes());
    }
    hasher.finalize().to_hex().to_string()
}
