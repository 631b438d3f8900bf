//! CandleBT Runner: backtest orchestration, statistics, parameter sweep,
//! artifact export.
//!
//! This crate builds on `candlebt-core` to provide:
//! - TOML configuration for single runs and sweeps
//! - Bar loading with cache/download/synthetic fallback
//! - Single-backtest runner with trade consolidation and statistics
//! - Parallel best-per-strategy parameter sweep
//! - CSV, text and JSON artifacts

pub mod config;
pub mod data_loader;
pub mod export;
pub mod metrics;
pub mod runner;
pub mod sweep;

pub use config::{BacktestConfig, BacktestSection, ConfigError, RunId, SweepConfig};
pub use data_loader::{dataset_hash, load_bars, LoadError, LoadOptions, LoadedBars};
pub use export::{
    import_json, load_sweep_results, save_artifacts, save_sweep_results, SweepMeta, SweepRow,
};
pub use metrics::{compute_stats, Stats};
pub use runner::{
    run_backtest_from_bars, run_single_backtest, BacktestResult, RunError, SCHEMA_VERSION,
};
pub use sweep::{
    best_per_strategy, default_param_grids, run_sweep, ParamGrids, SweepEntry, SweepError,
    SweepFailure, SweepOutcome,
};

#[cfg(test)]
mod send_sync_checks {
    use super::*;

    fn assert_send<T: Send>() {}
    fn assert_sync<T: Sync>() {}

    #[test]
    fn stats_is_send_sync() {
        assert_send::<Stats>();
        assert_sync::<Stats>();
    }

    #[test]
    fn backtest_result_is_send_sync() {
        assert_send::<BacktestResult>();
        assert_sync::<BacktestResult>();
    }

    #[test]
    fn config_types_are_send_sync() {
        assert_send::<BacktestConfig>();
        assert_sync::<BacktestConfig>();
        assert_send::<SweepConfig>();
        assert_sync::<SweepConfig>();
        assert_send::<LoadOptions>();
        assert_sync::<LoadOptions>();
    }

    #[test]
    fn sweep_types_are_send_sync() {
        assert_send::<LoadedBars>();
        assert_sync::<LoadedBars>();
        assert_send::<SweepOutcome>();
        assert_sync::<SweepOutcome>();
    }

    #[test]
    fn error_types_are_send_sync() {
        assert_send::<RunError>();
        assert_sync::<RunError>();
        assert_send::<SweepError>();
        assert_sync::<SweepError>();
    }
}
