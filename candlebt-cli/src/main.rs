//! CandleBT CLI: download, run, sweep and inspection commands.
//!
//! Commands:
//! - `download`: fetch Binance klines and cache them as CSV
//! - `run`: execute a backtest from a TOML config or a strategy name
//! - `sweep`: best parameter set per strategy across symbols
//! - `results`: print saved sweep results, best first
//! - `strategies`: list strategies and their default parameters
//! - `cache status`: report cached series and their ranges

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use candlebt_core::data::{
    BarCache, BinanceProvider, CircuitBreaker, DataProvider, DataSource, Interval,
};
use candlebt_core::signals::{StrategyConfig, StrategyKind};
use candlebt_runner::config::{day_start, BacktestConfig, SweepConfig};
use candlebt_runner::data_loader::{load_bars, LoadOptions};
use candlebt_runner::export::{
    load_sweep_results, save_artifacts, save_sweep_results, SWEEP_RESULTS_FILE,
};
use candlebt_runner::runner::{run_single_backtest, BacktestResult};
use candlebt_runner::sweep::{run_sweep, SweepOutcome};

#[derive(Parser)]
#[command(name = "candlebt", about = "CandleBT, a single-position crypto backtester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Download klines from Binance and cache them as CSV.
    Download {
        /// Symbols to download (e.g., BTCUSDT ETHUSDT).
        #[arg(required = true)]
        symbols: Vec<String>,

        /// Candle interval (1m, 5m, 1h, 4h, 1d, ...).
        #[arg(long, default_value = "1h")]
        interval: Interval,

        /// Start date (YYYY-MM-DD).
        #[arg(long, default_value = "2025-01-01")]
        start: NaiveDate,

        /// End date (YYYY-MM-DD), inclusive of its midnight candle.
        #[arg(long, default_value = "2025-02-01")]
        end: NaiveDate,

        /// Re-download even if cached.
        #[arg(long, default_value_t = false)]
        force: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
    /// Execute a backtest from a TOML config file or a strategy name.
    Run {
        /// Path to a TOML config file.
        #[arg(long, conflicts_with = "strategy")]
        config: Option<PathBuf>,

        /// Strategy name with default parameters (e.g., RSI_EMA).
        #[arg(long)]
        strategy: Option<StrategyKind>,

        #[arg(long, default_value = "BTCUSDT")]
        symbol: String,

        #[arg(long, default_value = "1h")]
        interval: Interval,

        #[arg(long, default_value = "2025-01-01")]
        start: NaiveDate,

        #[arg(long, default_value = "2025-02-01")]
        end: NaiveDate,

        /// Offline mode: no network access.
        #[arg(long, default_value_t = false)]
        offline: bool,

        /// Use synthetic data as fallback.
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        /// Artifacts go to `{output_dir}/{strategy}/`.
        #[arg(long, default_value = "logs")]
        output_dir: PathBuf,
    },
    /// Find the best parameter set per strategy.
    Sweep {
        /// Path to a sweep TOML config. Flags below override it.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Symbols to sweep (comma-separated).
        #[arg(long, value_delimiter = ',')]
        symbols: Vec<String>,

        /// Strategies to sweep (comma-separated). Defaults to all.
        #[arg(long, value_delimiter = ',')]
        strategies: Vec<StrategyKind>,

        #[arg(long)]
        interval: Option<Interval>,

        #[arg(long)]
        start: Option<NaiveDate>,

        #[arg(long)]
        end: Option<NaiveDate>,

        #[arg(long, default_value_t = false)]
        offline: bool,

        #[arg(long, default_value_t = false)]
        synthetic: bool,

        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,

        #[arg(long, default_value = "logs/optimizer")]
        output_dir: PathBuf,
    },
    /// Print saved sweep results ranked by total return.
    Results {
        #[arg(long, default_value = "logs/optimizer")]
        dir: PathBuf,
    },
    /// List strategies and their default parameters.
    Strategies,
    /// Cache inspection.
    Cache {
        #[command(subcommand)]
        action: CacheAction,
    },
}

#[derive(Subcommand)]
enum CacheAction {
    /// Report cached series with bar counts and ranges.
    Status {
        #[arg(long, default_value = "data")]
        cache_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Download {
            symbols,
            interval,
            start,
            end,
            force,
            cache_dir,
        } => run_download(&symbols, interval, start, end, force, &cache_dir),
        Commands::Run {
            config,
            strategy,
            symbol,
            interval,
            start,
            end,
            offline,
            synthetic,
            cache_dir,
            output_dir,
        } => {
            let config = match (config, strategy) {
                (Some(path), _) => BacktestConfig::from_file(&path)?,
                (None, Some(kind)) => {
                    let config = BacktestConfig::with_defaults(&symbol, interval, start, end, kind);
                    config.validate()?;
                    config
                }
                (None, None) => bail!("one of --config or --strategy is required"),
            };
            run_backtest_cmd(&config, offline, synthetic, &cache_dir, &output_dir)
        }
        Commands::Sweep {
            config,
            symbols,
            strategies,
            interval,
            start,
            end,
            offline,
            synthetic,
            cache_dir,
            output_dir,
        } => {
            let mut sweep = match config {
                Some(path) => SweepConfig::from_file(&path)?,
                None => SweepConfig::default(),
            };
            if !symbols.is_empty() {
                sweep.symbols = symbols.iter().map(|s| s.to_ascii_uppercase()).collect();
            }
            if !strategies.is_empty() {
                sweep.strategies = strategies;
            }
            if let Some(interval) = interval {
                sweep.interval = interval;
            }
            if let Some(start) = start {
                sweep.start = start;
            }
            if let Some(end) = end {
                sweep.end = end;
            }
            sweep.validate()?;
            run_sweep_cmd(&sweep, offline, synthetic, &cache_dir, &output_dir)
        }
        Commands::Results { dir } => run_results(&dir),
        Commands::Strategies => run_strategies(),
        Commands::Cache { action } => match action {
            CacheAction::Status { cache_dir } => run_cache_status(&cache_dir),
        },
    }
}

fn binance() -> Result<BinanceProvider> {
    let circuit_breaker = Arc::new(CircuitBreaker::for_exchange());
    Ok(BinanceProvider::new(circuit_breaker)?)
}

fn run_download(
    symbols: &[String],
    interval: Interval,
    start: NaiveDate,
    end: NaiveDate,
    force: bool,
    cache_dir: &Path,
) -> Result<()> {
    if end <= start {
        bail!("end {end} must be after start {start}");
    }
    let provider = binance()?;
    let cache = BarCache::new(cache_dir);
    let opts = LoadOptions {
        interval,
        start: day_start(start),
        end: day_start(end),
        offline: false,
        synthetic: false,
        force,
    };

    let mut failed = 0;
    for (i, symbol) in symbols.iter().enumerate() {
        match load_bars(symbol, &cache, Some(&provider), &opts) {
            Ok(loaded) => println!(
                "[{}/{}] {} {}: {} bars ({})",
                i + 1,
                symbols.len(),
                loaded.symbol,
                interval,
                loaded.bars.len(),
                source_label(loaded.source),
            ),
            Err(e) => {
                failed += 1;
                eprintln!("[{}/{}] {symbol}: {e}", i + 1, symbols.len());
            }
        }
    }

    if failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

fn run_backtest_cmd(
    config: &BacktestConfig,
    offline: bool,
    synthetic: bool,
    cache_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let cache = BarCache::new(cache_dir);
    let provider = if offline { None } else { Some(binance()?) };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);

    let result = run_single_backtest(config, &cache, provider_ref, offline, synthetic)?;
    print_summary(&result);

    let run_dir = save_artifacts(&result, output_dir)?;
    println!("Artifacts saved to: {}", run_dir.display());
    Ok(())
}

fn run_sweep_cmd(
    config: &SweepConfig,
    offline: bool,
    synthetic: bool,
    cache_dir: &Path,
    output_dir: &Path,
) -> Result<()> {
    let cache = BarCache::new(cache_dir);
    let provider = if offline { None } else { Some(binance()?) };
    let provider_ref = provider.as_ref().map(|p| p as &dyn DataProvider);

    let outcome = run_sweep(config, &cache, provider_ref, offline, synthetic)?;
    print_sweep(&outcome);

    let path = save_sweep_results(&outcome, config, output_dir)?;
    println!("Results saved to: {}", path.display());
    Ok(())
}

fn run_results(dir: &Path) -> Result<()> {
    let path = dir.join(SWEEP_RESULTS_FILE);
    let rows = load_sweep_results(&path)?;
    if rows.is_empty() {
        println!("No results in {}", path.display());
        return Ok(());
    }
    println!(
        "{:<20} {:<10} {:>12} {:>10} {:>9} {:>8}  Params",
        "Strategy", "Symbol", "Return (%)", "MaxDD (%)", "Win (%)", "Sharpe"
    );
    println!("{}", "-".repeat(90));
    for row in &rows {
        println!(
            "{:<20} {:<10} {:>12.2} {:>10.2} {:>9.2} {:>8.2}  {}",
            row.strategy,
            row.symbol,
            row.total_return,
            row.max_drawdown,
            row.win_rate,
            row.sharpe,
            row.params
        );
    }
    Ok(())
}

fn run_strategies() -> Result<()> {
    for kind in StrategyKind::ALL {
        let config: StrategyConfig = kind.default_config();
        println!(
            "{:<20} warmup {:>4}  {}",
            kind.as_str(),
            config.warmup_bars(),
            config.params_json()
        );
    }
    Ok(())
}

fn run_cache_status(cache_dir: &Path) -> Result<()> {
    if !cache_dir.exists() {
        println!("Cache directory does not exist: {}", cache_dir.display());
        return Ok(());
    }

    let cache = BarCache::new(cache_dir);
    let mut rows: Vec<(String, Interval, usize, String)> = Vec::new();
    let entries = std::fs::read_dir(cache_dir)
        .with_context(|| format!("failed to read {}", cache_dir.display()))?;
    for entry in entries {
        let name = entry?.file_name().to_string_lossy().to_string();
        let Some((symbol, interval)) = parse_cache_file_name(&name) else {
            continue;
        };
        let (count, range) = match cache.load(&symbol, interval) {
            Ok(bars) => match (bars.first(), bars.last()) {
                (Some(first), Some(last)) => {
                    (bars.len(), format!("{} to {}", first.timestamp, last.timestamp))
                }
                _ => (0, "(empty)".to_string()),
            },
            Err(e) => (0, format!("(unreadable: {e})")),
        };
        rows.push((symbol, interval, count, range));
    }

    if rows.is_empty() {
        println!("Cache is empty: {}", cache_dir.display());
        return Ok(());
    }
    rows.sort_by(|a, b| (&a.0, a.1.minutes()).cmp(&(&b.0, b.1.minutes())));

    println!("Cache: {}", cache_dir.display());
    println!("Series: {}", rows.len());
    println!();
    println!("{:<12} {:<6} {:>8}  Range", "Symbol", "Int", "Bars");
    println!("{}", "-".repeat(70));
    for (symbol, interval, count, range) in &rows {
        println!("{symbol:<12} {:<6} {count:>8}  {range}", interval.code());
    }
    Ok(())
}

/// `BTCUSDT_1h.csv` → `("BTCUSDT", Interval::H1)`.
fn parse_cache_file_name(name: &str) -> Option<(String, Interval)> {
    let stem = name.strip_suffix(".csv")?;
    let (symbol, code) = stem.rsplit_once('_')?;
    let interval = code.parse().ok()?;
    Some((symbol.to_string(), interval))
}

fn source_label(source: DataSource) -> &'static str {
    match source {
        DataSource::Binance => "downloaded",
        DataSource::Cache => "cached",
        DataSource::Synthetic => "synthetic",
    }
}

fn print_summary(result: &BacktestResult) {
    println!();
    println!("=== Backtest Summary - {} ===", result.symbol);
    println!("Strategy:     {} {}", result.strategy, result.params);
    println!("Period:       {} to {}", result.start, result.end);
    println!("Bars:         {} (warmup {})", result.bar_count, result.warmup_bars);
    if let Some(source) = result.data_source {
        println!("Data:         {}", source_label(source));
    }
    if result.is_synthetic() {
        println!("WARNING:      results are based on synthetic data");
    }
    println!("Trades:       {}", result.trades.len());
    println!();
    for (label, value) in result.stats.rows() {
        println!("{label:<18} {value:>12.2}");
    }
    println!();
}

fn print_sweep(outcome: &SweepOutcome) {
    println!();
    println!(
        "{:<20} {:<10} {:>12} {:>10} {:>9} {:>8}",
        "Strategy", "Symbol", "Return (%)", "MaxDD (%)", "Win (%)", "Sharpe"
    );
    println!("{}", "-".repeat(74));
    for entry in outcome.ranked() {
        println!(
            "{:<20} {:<10} {:>12.2} {:>10.2} {:>9.2} {:>8.2}",
            entry.strategy,
            entry.symbol,
            entry.stats.total_return_pct,
            entry.stats.max_drawdown_pct,
            entry.stats.win_rate_pct,
            entry.stats.sharpe_ratio
        );
    }
    for (symbol, reason) in &outcome.skipped_symbols {
        eprintln!("skipped {symbol}: {reason}");
    }
    if !outcome.failures.is_empty() {
        eprintln!("{} run(s) failed", outcome.failures.len());
    }
    println!();
}
