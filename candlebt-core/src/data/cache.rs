//! On-disk candle cache.
//!
//! Layout: `{cache_dir}/{SYMBOL}_{interval}.csv`, one file per series, written
//! with `csv` + `serde`. Writes are atomic (write to `.tmp`, rename into
//! place). A cached series covers a request when the request's start and end
//! both fall within the stored candles.

use chrono::NaiveDateTime;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use super::{DataError, Interval};
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct BarCache {
    cache_dir: PathBuf,
}

/// How well the cache covers a requested window.
#[derive(Debug, Clone, PartialEq)]
pub enum CoverageResult {
    NotCached,
    FullyCovered,
    PartiallyCovered {
        cached_start: NaiveDateTime,
        cached_end: NaiveDateTime,
    },
}

impl BarCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    pub fn path_for(&self, symbol: &str, interval: Interval) -> PathBuf {
        self.cache_dir
            .join(format!("{}_{}.csv", symbol.to_ascii_uppercase(), interval))
    }

    pub fn write(&self, symbol: &str, interval: Interval, bars: &[Bar]) -> Result<(), DataError> {
        if bars.is_empty() {
            return Err(DataError::CacheError("no bars to cache".into()));
        }
        fs::create_dir_all(&self.cache_dir)
            .map_err(|e| DataError::CacheError(format!("failed to create dir: {e}")))?;

        let path = self.path_for(symbol, interval);
        let tmp_path = path.with_extension("csv.tmp");
        let written = write_csv(&tmp_path, bars).and_then(|()| {
            fs::rename(&tmp_path, &path)
                .map_err(|e| DataError::CacheError(format!("atomic rename failed: {e}")))
        });
        if written.is_err() {
            let _ = fs::remove_file(&tmp_path);
        }
        written?;
        debug!(symbol, %interval, bars = bars.len(), path = %path.display(), "cached bars");
        Ok(())
    }

    /// Every cached bar for the series, ascending.
    pub fn load(&self, symbol: &str, interval: Interval) -> Result<Vec<Bar>, DataError> {
        let path = self.path_for(symbol, interval);
        if !path.exists() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
                interval,
            });
        }
        let mut reader = csv::Reader::from_path(&path)
            .map_err(|e| DataError::CacheError(format!("open {}: {e}", path.display())))?;
        let mut bars = Vec::new();
        for row in reader.deserialize::<Bar>() {
            let bar = row.map_err(|e| DataError::CacheError(format!("corrupt row: {e}")))?;
            bars.push(bar);
        }
        if bars.is_empty() {
            return Err(DataError::NoCachedData {
                symbol: symbol.to_string(),
                interval,
            });
        }
        bars.sort_by_key(|b| b.timestamp);
        Ok(bars)
    }

    /// Cached bars with open time in `[start, end]`.
    pub fn load_range(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, DataError> {
        let mut bars = self.load(symbol, interval)?;
        bars.retain(|b| b.timestamp >= start && b.timestamp <= end);
        Ok(bars)
    }

    pub fn covers_range(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> CoverageResult {
        let Ok(bars) = self.load(symbol, interval) else {
            return CoverageResult::NotCached;
        };
        // load() never returns an empty series
        let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
            return CoverageResult::NotCached;
        };
        let step = interval.duration();
        if first.timestamp < start + step && last.timestamp + step > end {
            CoverageResult::FullyCovered
        } else {
            CoverageResult::PartiallyCovered {
                cached_start: first.timestamp,
                cached_end: last.timestamp,
            }
        }
    }
}

fn write_csv(path: &Path, bars: &[Bar]) -> Result<(), DataError> {
    let mut writer = csv::Writer::from_path(path)
        .map_err(|e| DataError::CacheError(format!("create {}: {e}", path.display())))?;
    for bar in bars {
        writer
            .serialize(bar)
            .map_err(|e| DataError::CacheError(format!("write row: {e}")))?;
    }
    writer
        .flush()
        .map_err(|e| DataError::CacheError(format!("flush: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate};
    use tempfile::TempDir;

    fn at(hour: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(hour)
    }

    fn hourly(n: i64) -> Vec<Bar> {
        (0..n)
            .map(|h| Bar {
                timestamp: at(h),
                open: 100.0 + h as f64,
                high: 101.5 + h as f64,
                low: 99.25 + h as f64,
                close: 100.5 + h as f64,
                volume: 1234.5,
            })
            .collect()
    }

    #[test]
    fn write_then_load_preserves_bars() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        let bars = hourly(24);
        cache.write("btcusdt", Interval::H1, &bars).unwrap();

        assert!(dir.path().join("BTCUSDT_1h.csv").exists());
        assert_eq!(cache.load("BTCUSDT", Interval::H1).unwrap(), bars);
    }

    #[test]
    fn missing_series_is_no_cached_data() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        assert!(matches!(
            cache.load("ETHUSDT", Interval::M15),
            Err(DataError::NoCachedData { .. })
        ));
        assert_eq!(
            cache.covers_range("ETHUSDT", Interval::M15, at(0), at(1)),
            CoverageResult::NotCached
        );
    }

    #[test]
    fn coverage_and_range_filtering() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        cache.write("BTCUSDT", Interval::H1, &hourly(24)).unwrap();

        assert_eq!(
            cache.covers_range("BTCUSDT", Interval::H1, at(0), at(23)),
            CoverageResult::FullyCovered
        );
        assert_eq!(
            cache.covers_range("BTCUSDT", Interval::H1, at(0), at(48)),
            CoverageResult::PartiallyCovered {
                cached_start: at(0),
                cached_end: at(23)
            }
        );

        let slice = cache.load_range("BTCUSDT", Interval::H1, at(5), at(9)).unwrap();
        assert_eq!(slice.len(), 5);
        assert_eq!(slice[0].timestamp, at(5));
    }

    #[test]
    fn failed_rename_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        let path = cache.path_for("BTCUSDT", Interval::H1);
        fs::create_dir_all(path.join("occupied")).unwrap();

        assert!(cache.write("BTCUSDT", Interval::H1, &hourly(4)).is_err());
        assert!(!path.with_extension("csv.tmp").exists());
        assert!(path.is_dir());
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn failed_write_leaves_no_temp_file() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        let path = cache.path_for("BTCUSDT", Interval::H1);
        let tmp_path = path.with_extension("csv.tmp");
        // every write to /dev/full fails with ENOSPC
        std::os::unix::fs::symlink("/dev/full", &tmp_path).unwrap();

        let err = cache.write("BTCUSDT", Interval::H1, &hourly(4)).unwrap_err();
        assert!(matches!(err, DataError::CacheError(_)));
        assert!(tmp_path.symlink_metadata().is_err());
        assert!(!path.exists());
    }

    #[test]
    fn empty_write_is_rejected() {
        let dir = TempDir::new().unwrap();
        let cache = BarCache::new(dir.path());
        assert!(cache.write("BTCUSDT", Interval::H1, &[]).is_err());
    }
}
