//! Sweep over synthetic data: loads once per symbol, ranks, exports.

use std::fs;

use candlebt_core::data::BarCache;
use candlebt_core::signals::StrategyKind;
use candlebt_runner::config::SweepConfig;
use candlebt_runner::export::{load_sweep_results, save_sweep_results};
use candlebt_runner::sweep::run_sweep;

fn small_sweep() -> SweepConfig {
    SweepConfig::from_toml(
        r#"
symbols = ["BTCUSDT", "ETHUSDT"]
strategies = ["SMA_CROSS", "RSI_EMA", "KELTNER_BREAKOUT"]
interval = "1h"
start = "2025-01-01"
end = "2025-01-21"

[[grid]]
type = "SMA_CROSS"
short_window = 5
long_window = 20

[[grid]]
type = "SMA_CROSS"
short_window = 10
long_window = 40
"#,
    )
    .unwrap()
}

#[test]
fn synthetic_sweep_keeps_one_winner_per_strategy() {
    let dir = tempfile::tempdir().unwrap();
    let cache = BarCache::new(dir.path().join("data"));
    let config = small_sweep();

    let outcome = run_sweep(&config, &cache, None, false, true).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.best.len(), 3);
    for kind in [StrategyKind::SmaCross, StrategyKind::RsiEma, StrategyKind::KeltnerBreakout] {
        let entry = &outcome.best[kind.as_str()];
        assert!(config.symbols.contains(&entry.symbol));
    }
    let sma = &outcome.best["SMA_CROSS"];
    let short = sma.params["short_window"].as_u64().unwrap();
    assert!(short == 5 || short == 10);
}

#[test]
fn sweep_is_deterministic() {
    let dir = tempfile::tempdir().unwrap();
    let cache = BarCache::new(dir.path());
    let config = small_sweep();
    let a = run_sweep(&config, &cache, None, false, true).unwrap();
    let b = run_sweep(&config, &cache, None, false, true).unwrap();
    assert_eq!(a, b);
}

#[test]
fn exported_results_are_ranked() {
    let dir = tempfile::tempdir().unwrap();
    let cache = BarCache::new(dir.path().join("data"));
    let config = small_sweep();
    let outcome = run_sweep(&config, &cache, None, false, true).unwrap();

    let out = dir.path().join("logs").join("optimizer");
    let path = save_sweep_results(&outcome, &config, &out).unwrap();
    assert!(out.join("meta.json").exists());

    let rows = load_sweep_results(&path).unwrap();
    assert_eq!(rows.len(), 3);
    assert!(rows.windows(2).all(|w| w[0].total_return >= w[1].total_return));

    let meta = fs::read_to_string(out.join("meta.json")).unwrap();
    assert!(meta.contains("\"KELTNER_BREAKOUT\""));
}
