//! Failure paths: every one surfaces as a typed error, never a panic or a
//! silently empty result.

use std::fs;

use chrono::NaiveDate;

use candlebt_core::data::{BarCache, Interval};
use candlebt_core::engine::SimulationParams;
use candlebt_core::signals::StrategyKind;
use candlebt_runner::config::{BacktestConfig, ConfigError, SweepConfig};
use candlebt_runner::data_loader::LoadError;
use candlebt_runner::runner::{run_backtest_from_bars, run_single_backtest, RunError};
use candlebt_runner::sweep::{run_sweep, SweepError};

fn january(kind: StrategyKind) -> BacktestConfig {
    BacktestConfig::with_defaults(
        "BTCUSDT",
        Interval::H1,
        NaiveDate::from_ymd_opt(2025, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        kind,
    )
}

#[test]
fn offline_without_cache_is_a_data_error() {
    let dir = tempfile::tempdir().unwrap();
    let cache = BarCache::new(dir.path());
    let err = run_single_backtest(&january(StrategyKind::Macd), &cache, None, true, false)
        .unwrap_err();
    assert!(matches!(
        err,
        RunError::Data(LoadError::NoCachedDataOffline { .. })
    ));
    assert!(err.to_string().contains("--synthetic"));
}

#[test]
fn missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BacktestConfig::from_file(&dir.path().join("nope.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Io { .. }));
}

#[test]
fn unknown_strategy_type_is_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("bad.toml");
    fs::write(
        &path,
        "[backtest]\nsymbol = \"BTCUSDT\"\nstart = \"2025-01-01\"\nend = \"2025-02-01\"\n\n[strategy]\ntype = \"MOON\"\n",
    )
    .unwrap();
    assert!(matches!(
        BacktestConfig::from_file(&path),
        Err(ConfigError::Parse(_))
    ));
}

#[test]
fn invalid_parameters_fail_config_validation() {
    let mut config = january(StrategyKind::SmaCross);
    config.strategy = serde_json::from_str(r#"{"type": "SMA_CROSS", "long_window": 0}"#).unwrap();
    let dir = tempfile::tempdir().unwrap();
    let err = run_single_backtest(&config, &BarCache::new(dir.path()), None, true, true)
        .unwrap_err();
    assert!(matches!(err, RunError::Config(ConfigError::Strategy(_))));
}

#[test]
fn negative_balance_is_rejected() {
    let mut config = january(StrategyKind::Trix);
    config.backtest.initial_balance = -5.0;
    assert!(matches!(config.validate(), Err(ConfigError::Execution(_))));
}

#[test]
fn empty_bar_series_is_rejected() {
    let err = run_backtest_from_bars(
        &StrategyKind::Ichimoku.default_config(),
        &[],
        "BTCUSDT",
        &SimulationParams::default(),
    )
    .unwrap_err();
    assert!(matches!(err, RunError::EmptyData { .. }));
}

#[test]
fn sweep_without_any_data_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = SweepConfig {
        strategies: vec![StrategyKind::Trix],
        ..SweepConfig::default()
    };
    let err = run_sweep(&config, &BarCache::new(dir.path()), None, true, false).unwrap_err();
    assert!(matches!(err, SweepError::NoData { .. }));
}
