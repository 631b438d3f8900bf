//! Backtest runner: wires strategy, simulator and statistics together.
//!
//! Two entry points:
//! - `run_single_backtest()`: resolves bars through the loader, then runs. Used by the CLI.
//! - `run_backtest_from_bars()`: takes pre-loaded bars, no I/O. Used by the sweep.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use candlebt_core::data::{BarCache, DataProvider, DataSource};
use candlebt_core::domain::{signal_counts, Bar, ConsolidatedTrade, EquityPoint, TradeEvent};
use candlebt_core::engine::{consolidate, simulate, EngineError, SimulationParams};
use candlebt_core::signals::{StrategyConfig, StrategyError};

use crate::config::{BacktestConfig, ConfigError};
use crate::data_loader::{dataset_hash, load_bars, LoadError, LoadOptions, LoadedBars};
use crate::metrics::{compute_stats, Stats};

#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error: {0}")]
    Data(#[from] LoadError),
    #[error("strategy error: {0}")]
    Strategy(#[from] StrategyError),
    #[error("engine error: {0}")]
    Engine(#[from] EngineError),
    #[error("no bars for '{symbol}' in the requested window")]
    EmptyData { symbol: String },
}

/// Current schema version for persisted artifacts.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Complete result of one backtest run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestResult {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub symbol: String,
    pub strategy: String,
    /// Strategy parameters without the type tag.
    pub params: serde_json::Value,
    /// Open time of the first bar.
    pub start: NaiveDateTime,
    /// Open time of the last bar.
    pub end: NaiveDateTime,
    pub bar_count: usize,
    pub warmup_bars: usize,
    pub simulation: SimulationParams,
    /// `None` when the caller supplied the bars directly.
    pub data_source: Option<DataSource>,
    pub dataset_hash: String,
    pub stats: Stats,
    pub trades: Vec<ConsolidatedTrade>,
    pub ledger: Vec<TradeEvent>,
    pub equity_curve: Vec<EquityPoint>,
}

impl BacktestResult {
    pub fn is_synthetic(&self) -> bool {
        self.data_source == Some(DataSource::Synthetic)
    }
}

/// Load bars for the config's symbol and window, then run.
pub fn run_single_backtest(
    config: &BacktestConfig,
    cache: &BarCache,
    provider: Option<&dyn DataProvider>,
    offline: bool,
    synthetic: bool,
) -> Result<BacktestResult, RunError> {
    config.validate()?;
    let (start, end) = config.window();
    let opts = LoadOptions {
        interval: config.backtest.interval,
        start,
        end,
        offline,
        synthetic,
        force: false,
    };
    let LoadedBars {
        symbol,
        bars,
        source,
        dataset_hash,
    } = load_bars(&config.backtest.symbol, cache, provider, &opts)?;

    let mut result = run_backtest_from_bars(
        &config.strategy,
        &bars,
        &symbol,
        &config.simulation_params(),
    )?;
    result.data_source = Some(source);
    result.dataset_hash = dataset_hash;
    Ok(result)
}

/// Run a backtest over pre-loaded bars, no I/O.
pub fn run_backtest_from_bars(
    strategy: &StrategyConfig,
    bars: &[Bar],
    symbol: &str,
    params: &SimulationParams,
) -> Result<BacktestResult, RunError> {
    let (Some(first), Some(last)) = (bars.first(), bars.last()) else {
        return Err(RunError::EmptyData {
            symbol: symbol.to_string(),
        });
    };

    let source = strategy.build()?;
    let signals = source.generate(bars);
    let (short, flat, long) = signal_counts(&signals);
    debug!(symbol, strategy = strategy.name(), long, short, flat, "signals generated");
    let output = simulate(bars, &signals, params)?;
    let trades = consolidate(&output.ledger, symbol, strategy.name());
    let stats = compute_stats(&output.equity_curve, &trades, params.initial_balance);

    info!(
        symbol,
        strategy = strategy.name(),
        bars = bars.len(),
        trades = trades.len(),
        total_return_pct = stats.total_return_pct,
        "backtest complete"
    );

    Ok(BacktestResult {
        schema_version: SCHEMA_VERSION,
        symbol: symbol.to_string(),
        strategy: strategy.name().to_string(),
        params: strategy.params_json(),
        start: first.timestamp,
        end: last.timestamp,
        bar_count: bars.len(),
        warmup_bars: source.warmup_bars(),
        simulation: *params,
        data_source: None,
        dataset_hash: dataset_hash(symbol, bars),
        stats,
        trades,
        ledger: output.ledger,
        equity_curve: output.equity_curve,
    })
}
