//! Data pipeline: provider → ingest → cache → ranged load.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use candlebt_core::data::{
    ingest, BarCache, CoverageResult, DataProvider, DataSource, Interval, SyntheticProvider,
};
use tempfile::TempDir;

fn jan(day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, day)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

#[test]
fn synthetic_series_survives_the_cache() {
    let provider: Box<dyn DataProvider> = Box::new(SyntheticProvider);
    assert_eq!(provider.source(), DataSource::Synthetic);

    let raw = provider
        .fetch("BTCUSDT", Interval::M15, jan(1), jan(3))
        .unwrap();
    let report = ingest(raw).unwrap();
    assert_eq!(report.dropped_void, 0);
    assert_eq!(report.bars.len(), 2 * 96 + 1);

    let dir = TempDir::new().unwrap();
    let cache = BarCache::new(dir.path().join("data"));
    cache.write("BTCUSDT", Interval::M15, &report.bars).unwrap();

    assert_eq!(
        cache.covers_range("BTCUSDT", Interval::M15, jan(1), jan(3)),
        CoverageResult::FullyCovered
    );
    let day_two = cache
        .load_range("BTCUSDT", Interval::M15, jan(2), jan(2) + Duration::minutes(45))
        .unwrap();
    assert_eq!(day_two.len(), 4);
    assert_eq!(day_two[0], report.bars[96]);
}

#[test]
fn intervals_are_cached_separately() {
    let dir = TempDir::new().unwrap();
    let cache = BarCache::new(dir.path());
    let hourly = SyntheticProvider
        .fetch("ETHUSDT", Interval::H1, jan(1), jan(2))
        .unwrap();
    cache.write("ETHUSDT", Interval::H1, &hourly).unwrap();

    assert_eq!(
        cache.covers_range("ETHUSDT", Interval::H4, jan(1), jan(2)),
        CoverageResult::NotCached
    );
    assert_eq!(cache.load("ETHUSDT", Interval::H1).unwrap().len(), 25);
}
