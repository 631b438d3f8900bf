//! Artifact export: CSV, plain-text summary and schema-versioned JSON.
//!
//! Single runs land in `{dir}/{strategy}/`:
//! - `equity.csv`: time, equity
//! - `trades.csv`: one row per round trip
//! - `summary.txt`: statistics with two decimals
//! - `result.json`: the full `BacktestResult`
//!
//! Sweeps write `optimizer_results.csv` and `meta.json`. Unknown schema
//! versions are rejected on load.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use candlebt_core::domain::{ConsolidatedTrade, EquityPoint};

use crate::config::SweepConfig;
use crate::runner::{BacktestResult, SCHEMA_VERSION};
use crate::sweep::SweepOutcome;

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub const SWEEP_RESULTS_FILE: &str = "optimizer_results.csv";
pub const SWEEP_META_FILE: &str = "meta.json";

// ─── JSON ───────────────────────────────────────────────────────────

pub fn export_json(result: &BacktestResult) -> Result<String> {
    serde_json::to_string_pretty(result).context("failed to serialize BacktestResult to JSON")
}

/// Deserialize a `BacktestResult`, rejecting newer schema versions.
pub fn import_json(json: &str) -> Result<BacktestResult> {
    let result: BacktestResult =
        serde_json::from_str(json).context("failed to deserialize BacktestResult from JSON")?;
    if result.schema_version > SCHEMA_VERSION {
        bail!(
            "unsupported schema version {} (max supported: {})",
            result.schema_version,
            SCHEMA_VERSION
        );
    }
    Ok(result)
}

// ─── CSV / text ─────────────────────────────────────────────────────

pub fn export_equity_csv(equity_curve: &[EquityPoint]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["time", "equity"])?;
    for point in equity_curve {
        wtr.write_record([
            point.timestamp.format(TIME_FORMAT).to_string(),
            point.equity.to_string(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

/// Columns: time, symbol, side, entry, exit, pnl, strategy. Missing values are empty.
pub fn export_trades_csv(trades: &[ConsolidatedTrade]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);
    wtr.write_record(["time", "symbol", "side", "entry", "exit", "pnl", "strategy"])?;
    for t in trades {
        wtr.write_record([
            t.open_time.format(TIME_FORMAT).to_string(),
            t.symbol.clone(),
            t.side.to_string(),
            t.entry_price.map(|p| p.to_string()).unwrap_or_default(),
            t.exit_price.to_string(),
            t.pnl.map(|p| p.to_string()).unwrap_or_default(),
            t.strategy.clone(),
        ])?;
    }
    let data = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(data).context("CSV output is not valid UTF-8")
}

pub fn render_summary(result: &BacktestResult) -> String {
    let mut out = format!(
        "Backtest Summary - {}\nStrategy: {}\nTime Period: {} to {}\n\n",
        result.symbol,
        result.strategy,
        result.start.format("%Y-%m-%d"),
        result.end.format("%Y-%m-%d"),
    );
    for (label, value) in result.stats.rows() {
        out.push_str(&format!("{label}: {value:.2}\n"));
    }
    out
}

// ─── Artifact bundle ────────────────────────────────────────────────

/// Write the artifact set for one run and return the directory it went to.
pub fn save_artifacts(result: &BacktestResult, output_dir: &Path) -> Result<PathBuf> {
    let dir = output_dir.join(&result.strategy);
    fs::create_dir_all(&dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;

    write_file(&dir.join("equity.csv"), &export_equity_csv(&result.equity_curve)?)?;
    write_file(&dir.join("trades.csv"), &export_trades_csv(&result.trades)?)?;
    write_file(&dir.join("summary.txt"), &render_summary(result))?;
    write_file(&dir.join("result.json"), &export_json(result)?)?;

    info!(dir = %dir.display(), strategy = %result.strategy, "saved artifacts");
    Ok(dir)
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

// ─── Sweep results ──────────────────────────────────────────────────

/// One row of `optimizer_results.csv`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepRow {
    pub strategy: String,
    pub symbol: String,
    #[serde(rename = "totalReturn")]
    pub total_return: f64,
    #[serde(rename = "maxDD")]
    pub max_drawdown: f64,
    #[serde(rename = "winRate")]
    pub win_rate: f64,
    pub sharpe: f64,
    /// Parameters as a JSON object string.
    pub params: String,
}

/// Contents of the sweep's `meta.json`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SweepMeta {
    pub interval: String,
    pub start: String,
    pub end: String,
    pub symbols: Vec<String>,
    pub strategies: Vec<String>,
}

impl SweepMeta {
    pub fn from_config(config: &SweepConfig) -> Self {
        Self {
            interval: config.interval.to_string(),
            start: config.start.to_string(),
            end: config.end.to_string(),
            symbols: config.symbols.clone(),
            strategies: config
                .strategy_kinds()
                .iter()
                .map(|k| k.as_str().to_string())
                .collect(),
        }
    }
}

/// Write the best run per strategy, ranked by total return, plus the sweep metadata.
pub fn save_sweep_results(
    outcome: &SweepOutcome,
    config: &SweepConfig,
    output_dir: &Path,
) -> Result<PathBuf> {
    fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create output directory {}", output_dir.display()))?;

    let path = output_dir.join(SWEEP_RESULTS_FILE);
    let mut wtr = csv::Writer::from_path(&path)
        .with_context(|| format!("failed to create {}", path.display()))?;
    for entry in outcome.ranked() {
        wtr.serialize(SweepRow {
            strategy: entry.strategy.clone(),
            symbol: entry.symbol.clone(),
            total_return: entry.stats.total_return_pct,
            max_drawdown: entry.stats.max_drawdown_pct,
            win_rate: entry.stats.win_rate_pct,
            sharpe: entry.stats.sharpe_ratio,
            params: entry.params.to_string(),
        })?;
    }
    wtr.flush()
        .with_context(|| format!("failed to flush {}", path.display()))?;

    let meta = serde_json::to_string_pretty(&SweepMeta::from_config(config))
        .context("failed to serialize sweep metadata")?;
    write_file(&output_dir.join(SWEEP_META_FILE), &meta)?;

    info!(path = %path.display(), strategies = outcome.best.len(), "saved sweep results");
    Ok(path)
}

/// Read `optimizer_results.csv`, ranked by total return (highest first).
pub fn load_sweep_results(path: &Path) -> Result<Vec<SweepRow>> {
    let mut rdr = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;
    let mut rows = Vec::new();
    for row in rdr.deserialize() {
        let row: SweepRow = row.with_context(|| format!("malformed row in {}", path.display()))?;
        rows.push(row);
    }
    rows.sort_by(|a, b| b.total_return.total_cmp(&a.total_return));
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::Stats;
    use crate::runner::run_backtest_from_bars;
    use crate::sweep::SweepEntry;
    use candlebt_core::domain::Bar;
    use candlebt_core::engine::SimulationParams;
    use candlebt_core::signals::StrategyKind;
    use chrono::{Duration, NaiveDate};

    fn sample_result() -> BacktestResult {
        let start = NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let bars: Vec<Bar> = (0..120)
            .map(|i| {
                let close = 100.0 + (i as f64 * 0.3).sin() * 10.0;
                Bar {
                    timestamp: start + Duration::hours(i),
                    open: close,
                    high: close + 1.0,
                    low: close - 1.0,
                    close,
                    volume: 1000.0,
                }
            })
            .collect();
        run_backtest_from_bars(
            &StrategyKind::RsiEma.default_config(),
            &bars,
            "BTCUSDT",
            &SimulationParams::default(),
        )
        .unwrap()
    }

    #[test]
    fn json_round_trip() {
        let result = sample_result();
        let back = import_json(&export_json(&result).unwrap()).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn json_keeps_every_bit_of_a_float() {
        let mut result = sample_result();
        result.stats.max_drawdown_pct = -19.13050199845227;
        result.stats.final_balance = 97.15724209550172;
        let back = import_json(&export_json(&result).unwrap()).unwrap();
        assert_eq!(back.stats.max_drawdown_pct.to_bits(), (-19.13050199845227f64).to_bits());
        assert_eq!(back.stats.final_balance.to_bits(), 97.15724209550172f64.to_bits());
    }

    #[test]
    fn newer_schema_is_rejected() {
        let mut result = sample_result();
        result.schema_version = SCHEMA_VERSION + 1;
        let json = serde_json::to_string(&result).unwrap();
        assert!(import_json(&json).is_err());
    }

    #[test]
    fn summary_lists_stats_with_two_decimals() {
        let mut result = sample_result();
        result.stats = Stats {
            final_balance: 846.3594107396027,
            total_return_pct: -15.364058926039728,
            win_rate_pct: 0.0,
            sharpe_ratio: -4.731352853592075,
            max_drawdown_pct: -23.01976450500249,
        };
        let text = render_summary(&result);
        assert!(text.starts_with(
            "Backtest Summary - BTCUSDT\nStrategy: RSI_EMA\nTime Period: 2025-01-01 to 2025-01-05\n\n"
        ));
        assert!(text.contains("Final Balance: 846.36\n"));
        assert!(text.contains("Total Return (%): -15.36\n"));
        assert!(text.contains("Win Rate (%): 0.00\n"));
        assert!(text.contains("Sharpe Ratio: -4.73\n"));
        assert!(text.ends_with("Max Drawdown (%): -23.02\n"));
    }

    #[test]
    fn trades_csv_has_one_row_per_trade() {
        let result = sample_result();
        let csv = export_trades_csv(&result.trades).unwrap();
        let mut lines = csv.lines();
        assert_eq!(lines.next().unwrap(), "time,symbol,side,entry,exit,pnl,strategy");
        assert_eq!(lines.count(), result.trades.len());
    }

    #[test]
    fn save_artifacts_writes_bundle() {
        let dir = tempfile::tempdir().unwrap();
        let result = sample_result();
        let out = save_artifacts(&result, dir.path()).unwrap();
        assert_eq!(out, dir.path().join("RSI_EMA"));
        for name in ["equity.csv", "trades.csv", "summary.txt", "result.json"] {
            assert!(out.join(name).exists(), "{name} missing");
        }
        let equity = fs::read_to_string(out.join("equity.csv")).unwrap();
        assert_eq!(equity.lines().count(), result.equity_curve.len() + 1);
        assert!(equity.starts_with("time,equity\n2025-01-01 00:00:00,"));
    }

    #[test]
    fn sweep_results_round_trip_ranked() {
        let dir = tempfile::tempdir().unwrap();
        let entry = |strategy: &str, total: f64| SweepEntry {
            strategy: strategy.into(),
            symbol: "BTCUSDT".into(),
            params: serde_json::json!({"ema_span": 20}),
            stats: Stats {
                total_return_pct: total,
                ..Stats::idle(1000.0)
            },
        };
        let mut outcome = SweepOutcome::default();
        outcome.best.insert("ADX_EMA".into(), entry("ADX_EMA", -3.0));
        outcome.best.insert("TRIX".into(), entry("TRIX", 7.5));

        let config = SweepConfig::default();
        let path = save_sweep_results(&outcome, &config, dir.path()).unwrap();
        let header = fs::read_to_string(&path).unwrap();
        assert!(header.starts_with("strategy,symbol,totalReturn,maxDD,winRate,sharpe,params\n"));

        let rows = load_sweep_results(&path).unwrap();
        assert_eq!(rows[0].strategy, "TRIX");
        assert_eq!(rows[1].strategy, "ADX_EMA");
        assert_eq!(rows[1].params, r#"{"ema_span":20}"#);

        let meta: SweepMeta =
            serde_json::from_str(&fs::read_to_string(dir.path().join(SWEEP_META_FILE)).unwrap())
                .unwrap();
        assert_eq!(meta.interval, "1h");
        assert_eq!(meta.start, "2025-01-01");
        assert_eq!(meta.symbols, vec!["BTCUSDT", "ETHUSDT"]);
        assert_eq!(meta.strategies.len(), 15);
    }
}
