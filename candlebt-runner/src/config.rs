//! TOML configuration for single backtests and parameter sweeps.
//!
//! ```toml
//! [backtest]
//! symbol = "BTCUSDT"
//! interval = "1h"
//! start = "2025-01-01"
//! end = "2025-02-01"
//!
//! [strategy]
//! type = "RSI_EMA"
//! rsi_period = 14
//! ```
//!
//! Omitted execution settings take the simulator defaults (balance 1000,
//! fee 0.1%, slippage 0.05%). Unknown keys are rejected.

use std::path::{Path, PathBuf};

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use candlebt_core::data::Interval;
use candlebt_core::engine::state::{
    DEFAULT_FEE_RATE, DEFAULT_INITIAL_BALANCE, DEFAULT_SLIPPAGE_RATE,
};
use candlebt_core::engine::{EngineError, SimulationParams};
use candlebt_core::signals::{StrategyConfig, StrategyError, StrategyKind};

/// Content hash identifying a configuration.
pub type RunId = String;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid strategy: {0}")]
    Strategy(#[from] StrategyError),
    #[error("invalid execution settings: {0}")]
    Execution(#[from] EngineError),
    #[error("{0}")]
    Invalid(String),
}

fn default_initial_balance() -> f64 {
    DEFAULT_INITIAL_BALANCE
}

fn default_fee_rate() -> f64 {
    DEFAULT_FEE_RATE
}

fn default_slippage_rate() -> f64 {
    DEFAULT_SLIPPAGE_RATE
}

/// Midnight opening `date`; window bounds are candle open times.
pub fn day_start(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

fn check_window(start: NaiveDate, end: NaiveDate) -> Result<(), ConfigError> {
    if end <= start {
        return Err(ConfigError::Invalid(format!(
            "end {end} must be after start {start}"
        )));
    }
    Ok(())
}

fn read(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn content_hash<T: Serialize>(value: &T) -> RunId {
    // Plain data with string keys; serialization cannot fail.
    let json = serde_json::to_vec(value).unwrap_or_default();
    blake3::hash(&json).to_hex().to_string()
}

// ─── Single backtest ────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestConfig {
    pub backtest: BacktestSection,
    pub strategy: StrategyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BacktestSection {
    pub symbol: String,
    #[serde(default)]
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    #[serde(default = "default_initial_balance")]
    pub initial_balance: f64,
    #[serde(default = "default_fee_rate")]
    pub fee_rate: f64,
    #[serde(default = "default_slippage_rate")]
    pub slippage_rate: f64,
}

impl BacktestConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read(path)?)
    }

    /// Config for `strategy` with default parameters and execution settings.
    pub fn with_defaults(
        symbol: &str,
        interval: Interval,
        start: NaiveDate,
        end: NaiveDate,
        strategy: StrategyKind,
    ) -> Self {
        Self {
            backtest: BacktestSection {
                symbol: symbol.to_ascii_uppercase(),
                interval,
                start,
                end,
                initial_balance: DEFAULT_INITIAL_BALANCE,
                fee_rate: DEFAULT_FEE_RATE,
                slippage_rate: DEFAULT_SLIPPAGE_RATE,
            },
            strategy: strategy.default_config(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.backtest.symbol.trim().is_empty() {
            return Err(ConfigError::Invalid("symbol must not be empty".into()));
        }
        check_window(self.backtest.start, self.backtest.end)?;
        self.simulation_params().validate()?;
        self.strategy.validate()?;
        Ok(())
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams::new(
            self.backtest.initial_balance,
            self.backtest.fee_rate,
            self.backtest.slippage_rate,
        )
    }

    /// `(start, end)` as candle open times.
    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (day_start(self.backtest.start), day_start(self.backtest.end))
    }

    /// BLAKE3 hash of the serialized configuration.
    pub fn run_id(&self) -> RunId {
        content_hash(self)
    }
}

// ─── Parameter sweep ────────────────────────────────────────────────

/// Sweep settings.
///
/// `strategies` empty means every strategy. Each `[[grid]]` entry is one
/// parameter set; entries for a strategy replace its default grid.
///
/// ```toml
/// symbols = ["BTCUSDT"]
/// strategies = ["SMA_CROSS"]
///
/// [[grid]]
/// type = "SMA_CROSS"
/// short_window = 10
/// long_window = 30
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SweepConfig {
    pub symbols: Vec<String>,
    pub strategies: Vec<StrategyKind>,
    pub interval: Interval,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub initial_balance: f64,
    pub fee_rate: f64,
    pub slippage_rate: f64,
    pub grid: Vec<StrategyConfig>,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            symbols: vec!["BTCUSDT".into(), "ETHUSDT".into()],
            strategies: Vec::new(),
            interval: Interval::H1,
            start: NaiveDate::from_ymd_opt(2025, 1, 1).unwrap_or_default(),
            end: NaiveDate::from_ymd_opt(2025, 2, 1).unwrap_or_default(),
            initial_balance: DEFAULT_INITIAL_BALANCE,
            fee_rate: DEFAULT_FEE_RATE,
            slippage_rate: DEFAULT_SLIPPAGE_RATE,
            grid: Vec::new(),
        }
    }
}

impl SweepConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        Self::from_toml(&read(path)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.symbols.is_empty() {
            return Err(ConfigError::Invalid("at least one symbol is required".into()));
        }
        check_window(self.start, self.end)?;
        self.simulation_params().validate()?;
        for entry in &self.grid {
            entry.validate()?;
        }
        Ok(())
    }

    /// The strategies to sweep, in enumeration order.
    pub fn strategy_kinds(&self) -> Vec<StrategyKind> {
        if self.strategies.is_empty() {
            StrategyKind::ALL.to_vec()
        } else {
            self.strategies.clone()
        }
    }

    pub fn simulation_params(&self) -> SimulationParams {
        SimulationParams::new(self.initial_balance, self.fee_rate, self.slippage_rate)
    }

    pub fn window(&self) -> (NaiveDateTime, NaiveDateTime) {
        (day_start(self.start), day_start(self.end))
    }

    pub fn run_id(&self) -> RunId {
        content_hash(self)
    }
}
