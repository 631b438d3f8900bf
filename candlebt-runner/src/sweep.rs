//! Parameter sweep: best parameter set per strategy across symbols.
//!
//! Enumeration order is strategy → parameter set → symbol. Every combination
//! runs independently on the rayon pool; results are collected in
//! enumeration order and folded sequentially, so the highest total return
//! wins and ties keep the earliest combination.

use std::collections::BTreeMap;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use candlebt_core::data::{BarCache, DataProvider};
use candlebt_core::engine::SimulationParams;
use candlebt_core::signals::{
    AdxEmaStrategy, BollingerRsiStrategy, BreakoutVolumeStrategy, Ema200PriceActionStrategy,
    FibonacciReversalStrategy, HeikinAshiEmaStrategy, IchimokuStrategy, KeltnerBreakoutStrategy,
    MacdStrategy, PsarMacdStrategy, RsiEmaStrategy, SmaCrossStrategy, StrategyConfig,
    StrategyKind, SupertrendRsiStrategy, TrixStrategy, VolumeBreakoutStrategy,
};

use crate::config::{ConfigError, SweepConfig};
use crate::data_loader::{load_bars, LoadOptions, LoadedBars};
use crate::metrics::Stats;
use crate::runner::run_backtest_from_bars;

/// Parameter sets to try, per strategy.
pub type ParamGrids = BTreeMap<StrategyKind, Vec<StrategyConfig>>;

#[derive(Debug, Error)]
pub enum SweepError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("no data could be loaded for any of {symbols:?}")]
    NoData { symbols: Vec<String> },
}

/// The winning run of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepEntry {
    pub strategy: String,
    pub symbol: String,
    pub params: serde_json::Value,
    pub stats: Stats,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepFailure {
    pub strategy: String,
    pub symbol: String,
    pub params: serde_json::Value,
    pub error: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SweepOutcome {
    /// Strategy name → best run.
    pub best: BTreeMap<String, SweepEntry>,
    pub failures: Vec<SweepFailure>,
    /// Symbols dropped because no bars could be loaded, with the reason.
    pub skipped_symbols: Vec<(String, String)>,
}

impl SweepOutcome {
    /// Best entries ordered by total return, highest first.
    pub fn ranked(&self) -> Vec<&SweepEntry> {
        let mut entries: Vec<&SweepEntry> = self.best.values().collect();
        entries.sort_by(|a, b| {
            b.stats
                .total_return_pct
                .total_cmp(&a.stats.total_return_pct)
        });
        entries
    }
}

// ─── Grids ──────────────────────────────────────────────────────────

/// The optimizer's built-in grids.
pub fn default_param_grids() -> ParamGrids {
    let mut grids = ParamGrids::new();

    let mut rsi_ema = Vec::new();
    for rsi_period in [7, 14] {
        for ema_period in [20, 50] {
            for rsi_buy in [30.0, 40.0, 45.0] {
                for rsi_sell in [55.0, 60.0, 70.0] {
                    rsi_ema.push(StrategyConfig::RsiEma(RsiEmaStrategy {
                        rsi_period,
                        ema_period,
                        rsi_buy,
                        rsi_sell,
                        ..Default::default()
                    }));
                }
            }
        }
    }
    grids.insert(StrategyKind::RsiEma, rsi_ema);

    let mut macd = Vec::new();
    for window_fast in [8, 12] {
        for window_slow in [24, 26, 35] {
            for window_sign in [9, 12] {
                for ema200_span in [100, 200] {
                    if window_fast < window_slow {
                        macd.push(StrategyConfig::Macd(MacdStrategy {
                            window_fast,
                            window_slow,
                            window_sign,
                            ema200_span,
                        }));
                    }
                }
            }
        }
    }
    grids.insert(StrategyKind::Macd, macd);

    let mut sma_cross = Vec::new();
    for short_window in [20, 50] {
        for long_window in [100, 200] {
            if short_window < long_window {
                sma_cross.push(StrategyConfig::SmaCross(SmaCrossStrategy {
                    short_window,
                    long_window,
                }));
            }
        }
    }
    grids.insert(StrategyKind::SmaCross, sma_cross);

    grids.insert(
        StrategyKind::Ema200PriceAction,
        [100, 200]
            .map(|ema_span| {
                StrategyConfig::Ema200PriceAction(Ema200PriceActionStrategy {
                    ema_span,
                    ..Default::default()
                })
            })
            .to_vec(),
    );

    grids.insert(
        StrategyKind::Trix,
        [5, 9, 14]
            .map(|signal_window| StrategyConfig::Trix(TrixStrategy { signal_window }))
            .to_vec(),
    );

    let mut bollinger = Vec::new();
    for bb_window in [14, 20] {
        for bb_std in [1.5, 2.0] {
            for rsi_buy in [25.0, 30.0] {
                for rsi_sell in [70.0, 75.0] {
                    bollinger.push(StrategyConfig::BollingerRsi(BollingerRsiStrategy {
                        bb_window,
                        bb_std,
                        rsi_window: 14,
                        rsi_buy,
                        rsi_sell,
                    }));
                }
            }
        }
    }
    grids.insert(StrategyKind::BollingerRsi, bollinger);

    let mut volume_breakout = Vec::new();
    for avg_window in [20, 30] {
        for min_change in [0.0, 0.005] {
            for min_vol_mult in [1.0, 1.5] {
                volume_breakout.push(StrategyConfig::VolumeBreakout(VolumeBreakoutStrategy {
                    avg_window,
                    min_change,
                    min_vol_mult,
                }));
            }
        }
    }
    grids.insert(StrategyKind::VolumeBreakout, volume_breakout);

    let mut breakout_volume = Vec::new();
    for breakout_window in [20, 50] {
        for min_vol_mult in [1.0, 1.5] {
            breakout_volume.push(StrategyConfig::BreakoutVolume(BreakoutVolumeStrategy {
                breakout_window,
                min_vol_mult,
            }));
        }
    }
    grids.insert(StrategyKind::BreakoutVolume, breakout_volume);

    let mut psar_macd = Vec::new();
    for psar_step in [0.02, 0.03] {
        for window_fast in [8, 12] {
            for window_slow in [24, 26] {
                psar_macd.push(StrategyConfig::PsarMacd(PsarMacdStrategy {
                    psar_step,
                    psar_max: 0.2,
                    window_fast,
                    window_slow,
                    window_sign: 9,
                }));
            }
        }
    }
    grids.insert(StrategyKind::PsarMacd, psar_macd);

    let mut fibonacci = Vec::new();
    for lookback in [50, 100] {
        for retrace in [0.5, 0.618] {
            fibonacci.push(StrategyConfig::FibonacciReversal(FibonacciReversalStrategy {
                lookback,
                retrace,
            }));
        }
    }
    grids.insert(StrategyKind::FibonacciReversal, fibonacci);

    grids.insert(
        StrategyKind::HeikinAshiEma,
        [20, 50]
            .map(|ema_span| {
                StrategyConfig::HeikinAshiEma(HeikinAshiEmaStrategy {
                    ema_span,
                    ..Default::default()
                })
            })
            .to_vec(),
    );

    let mut supertrend_rsi = Vec::new();
    for rsi_buy in [25.0, 30.0] {
        for rsi_sell in [70.0, 75.0] {
            supertrend_rsi.push(StrategyConfig::SupertrendRsi(SupertrendRsiStrategy {
                stc_fast: 23,
                stc_slow: 50,
                stc_cycle: 10,
                stc_buy: 50.0,
                stc_sell: 50.0,
                rsi_window: 14,
                rsi_buy,
                rsi_sell,
            }));
        }
    }
    grids.insert(StrategyKind::SupertrendRsi, supertrend_rsi);

    let mut adx_ema = Vec::new();
    for ema_span in [20, 50] {
        for adx_threshold in [20.0, 25.0, 30.0] {
            adx_ema.push(StrategyConfig::AdxEma(AdxEmaStrategy {
                ema_span,
                adx_threshold,
                ..Default::default()
            }));
        }
    }
    grids.insert(StrategyKind::AdxEma, adx_ema);

    grids.insert(
        StrategyKind::Ichimoku,
        [26, 34]
            .map(|window2| StrategyConfig::Ichimoku(IchimokuStrategy { window1: 9, window2 }))
            .to_vec(),
    );

    let mut keltner = Vec::new();
    for window in [20, 30] {
        for window_atr in [10, 20] {
            for original in [false, true] {
                keltner.push(StrategyConfig::KeltnerBreakout(KeltnerBreakoutStrategy {
                    window,
                    window_atr,
                    original,
                }));
            }
        }
    }
    grids.insert(StrategyKind::KeltnerBreakout, keltner);

    grids
}

/// Default grids with `overrides` replacing the grid of every strategy they name.
pub fn grids_with_overrides(overrides: &[StrategyConfig]) -> ParamGrids {
    let mut grids = default_param_grids();
    let mut replaced: ParamGrids = ParamGrids::new();
    for config in overrides {
        replaced.entry(config.kind()).or_default().push(config.clone());
    }
    grids.extend(replaced);
    grids
}

/// Parameter sets for `kind`; a strategy without a grid runs its defaults once.
pub fn grid_for(grids: &ParamGrids, kind: StrategyKind) -> Vec<StrategyConfig> {
    match grids.get(&kind) {
        Some(grid) if !grid.is_empty() => grid.clone(),
        _ => vec![kind.default_config()],
    }
}

// ─── Sweep ──────────────────────────────────────────────────────────

/// Evaluate every (strategy, parameter set, symbol) combination over
/// pre-loaded bars and keep the best per strategy.
pub fn best_per_strategy(
    strategies: &[StrategyKind],
    grids: &ParamGrids,
    series: &[LoadedBars],
    params: &SimulationParams,
) -> SweepOutcome {
    let jobs: Vec<(StrategyConfig, &LoadedBars)> = strategies
        .iter()
        .flat_map(|&kind| grid_for(grids, kind))
        .flat_map(|config| series.iter().map(move |s| (config.clone(), s)))
        .collect();
    info!(
        strategies = strategies.len(),
        symbols = series.len(),
        runs = jobs.len(),
        "starting sweep"
    );

    let results: Vec<Result<SweepEntry, SweepFailure>> = jobs
        .par_iter()
        .map(|(config, loaded)| {
            run_backtest_from_bars(config, &loaded.bars, &loaded.symbol, params)
                .map(|r| SweepEntry {
                    strategy: r.strategy,
                    symbol: r.symbol,
                    params: r.params,
                    stats: r.stats,
                })
                .map_err(|e| SweepFailure {
                    strategy: config.name().to_string(),
                    symbol: loaded.symbol.clone(),
                    params: config.params_json(),
                    error: e.to_string(),
                })
        })
        .collect();

    let mut outcome = SweepOutcome::default();
    for result in results {
        match result {
            Ok(entry) => {
                let better = outcome
                    .best
                    .get(&entry.strategy)
                    .map_or(true, |best| entry.stats.total_return_pct > best.stats.total_return_pct);
                if better {
                    outcome.best.insert(entry.strategy.clone(), entry);
                }
            }
            Err(failure) => {
                warn!(
                    strategy = %failure.strategy,
                    symbol = %failure.symbol,
                    error = %failure.error,
                    "sweep run failed"
                );
                outcome.failures.push(failure);
            }
        }
    }
    outcome
}

/// Load each symbol once, then sweep every configured strategy.
pub fn run_sweep(
    config: &SweepConfig,
    cache: &BarCache,
    provider: Option<&dyn DataProvider>,
    offline: bool,
    synthetic: bool,
) -> Result<SweepOutcome, SweepError> {
    config.validate()?;
    let (start, end) = config.window();
    let opts = LoadOptions {
        interval: config.interval,
        start,
        end,
        offline,
        synthetic,
        force: false,
    };

    let mut series = Vec::with_capacity(config.symbols.len());
    let mut skipped = Vec::new();
    for symbol in &config.symbols {
        match load_bars(symbol, cache, provider, &opts) {
            Ok(loaded) if !loaded.bars.is_empty() => series.push(loaded),
            Ok(_) => skipped.push((symbol.clone(), "no bars in window".to_string())),
            Err(e) => {
                warn!(symbol = %symbol, error = %e, "skipping symbol");
                skipped.push((symbol.clone(), e.to_string()));
            }
        }
    }
    if series.is_empty() {
        return Err(SweepError::NoData {
            symbols: config.symbols.clone(),
        });
    }

    let grids = grids_with_overrides(&config.grid);
    let mut outcome = best_per_strategy(
        &config.strategy_kinds(),
        &grids,
        &series,
        &config.simulation_params(),
    );
    outcome.skipped_symbols = skipped;
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use candlebt_core::data::{synthetic_bars, DataSource, Interval};
    use chrono::NaiveDate;

    fn loaded(symbol: &str, hours: i64) -> LoadedBars {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars = synthetic_bars(symbol, Interval::H1, start, start + chrono::Duration::hours(hours));
        LoadedBars {
            symbol: symbol.to_string(),
            dataset_hash: String::new(),
            bars,
            source: DataSource::Synthetic,
        }
    }

    #[test]
    fn default_grid_sizes() {
        let grids = default_param_grids();
        let size = |k: StrategyKind| grids[&k].len();
        assert_eq!(grids.len(), 15);
        assert_eq!(size(StrategyKind::RsiEma), 36);
        assert_eq!(size(StrategyKind::Macd), 24);
        assert_eq!(size(StrategyKind::SmaCross), 4);
        assert_eq!(size(StrategyKind::Ema200PriceAction), 2);
        assert_eq!(size(StrategyKind::Trix), 3);
        assert_eq!(size(StrategyKind::BollingerRsi), 16);
        assert_eq!(size(StrategyKind::VolumeBreakout), 8);
        assert_eq!(size(StrategyKind::BreakoutVolume), 4);
        assert_eq!(size(StrategyKind::PsarMacd), 8);
        assert_eq!(size(StrategyKind::FibonacciReversal), 4);
        assert_eq!(size(StrategyKind::HeikinAshiEma), 2);
        assert_eq!(size(StrategyKind::SupertrendRsi), 4);
        assert_eq!(size(StrategyKind::AdxEma), 6);
        assert_eq!(size(StrategyKind::Ichimoku), 2);
        assert_eq!(size(StrategyKind::KeltnerBreakout), 8);
    }

    #[test]
    fn every_default_grid_entry_is_valid() {
        for (kind, grid) in default_param_grids() {
            for config in grid {
                assert_eq!(config.kind(), kind);
                config.validate().unwrap();
            }
        }
    }

    #[test]
    fn overrides_replace_only_named_strategies() {
        let custom = StrategyConfig::SmaCross(SmaCrossStrategy {
            short_window: 5,
            long_window: 10,
        });
        let grids = grids_with_overrides(&[custom.clone()]);
        assert_eq!(grids[&StrategyKind::SmaCross], vec![custom]);
        assert_eq!(grids[&StrategyKind::Trix].len(), 3);
    }

    #[test]
    fn missing_grid_runs_defaults_once() {
        let grid = grid_for(&ParamGrids::new(), StrategyKind::Macd);
        assert_eq!(grid, vec![StrategyKind::Macd.default_config()]);
    }

    #[test]
    fn best_is_the_maximum_total_return() {
        let series = [loaded("BTCUSDT", 400), loaded("ETHUSDT", 400)];
        let grids = default_param_grids();
        let kinds = [StrategyKind::SmaCross, StrategyKind::Trix];
        let params = SimulationParams::default();
        let outcome = best_per_strategy(&kinds, &grids, &series, &params);

        assert!(outcome.failures.is_empty());
        for kind in kinds {
            let best = &outcome.best[kind.as_str()];
            for config in &grids[&kind] {
                for s in &series {
                    let r = run_backtest_from_bars(config, &s.bars, &s.symbol, &params).unwrap();
                    assert!(r.stats.total_return_pct <= best.stats.total_return_pct);
                }
            }
        }
    }

    #[test]
    fn ties_keep_the_earliest_combination() {
        // Too short for any SMA_CROSS setting to trade: every run returns 0.
        let series = [loaded("BTCUSDT", 10), loaded("ETHUSDT", 10)];
        let outcome = best_per_strategy(
            &[StrategyKind::SmaCross],
            &default_param_grids(),
            &series,
            &SimulationParams::default(),
        );
        let best = &outcome.best["SMA_CROSS"];
        assert_eq!(best.symbol, "BTCUSDT");
        assert_eq!(best.params["short_window"], 20);
        assert_eq!(best.params["long_window"], 100);
        assert_eq!(best.stats.total_return_pct, 0.0);
    }

    #[test]
    fn ranked_orders_by_total_return() {
        let series = [loaded("BTCUSDT", 600)];
        let outcome = best_per_strategy(
            &StrategyKind::ALL,
            &ParamGrids::new(),
            &series,
            &SimulationParams::default(),
        );
        assert_eq!(outcome.best.len(), 15);
        let ranked = outcome.ranked();
        assert!(ranked
            .windows(2)
            .all(|w| w[0].stats.total_return_pct >= w[1].stats.total_return_pct));
    }
}
