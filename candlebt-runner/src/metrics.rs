//! Performance statistics: pure functions of an equity curve and a trade list.
//!
//! No dependencies on the runner, data pipeline, or simulator state.

use serde::{Deserialize, Serialize};
use candlebt_core::domain::{equity_values, ConsolidatedTrade, EquityPoint};

/// Periods per year used to annualize the Sharpe ratio.
pub const ANNUALIZATION_PERIODS: f64 = 252.0;

/// Summary statistics of one backtest run. Percentages are in percent units.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Stats {
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub win_rate_pct: f64,
    pub sharpe_ratio: f64,
    pub max_drawdown_pct: f64,
}

impl Stats {
    /// Statistics of a run that never traded.
    pub fn idle(initial_balance: f64) -> Self {
        Self {
            final_balance: initial_balance,
            total_return_pct: 0.0,
            win_rate_pct: 0.0,
            sharpe_ratio: 0.0,
            max_drawdown_pct: 0.0,
        }
    }

    /// `(label, value)` pairs in display order.
    pub fn rows(&self) -> [(&'static str, f64); 5] {
        [
            ("Final Balance", self.final_balance),
            ("Total Return (%)", self.total_return_pct),
            ("Win Rate (%)", self.win_rate_pct),
            ("Sharpe Ratio", self.sharpe_ratio),
            ("Max Drawdown (%)", self.max_drawdown_pct),
        ]
    }
}

/// Compute all statistics. A run with no trades reports the initial balance
/// and zeros everywhere else, whatever the equity curve says.
pub fn compute_stats(
    equity_curve: &[EquityPoint],
    trades: &[ConsolidatedTrade],
    initial_balance: f64,
) -> Stats {
    if trades.is_empty() {
        return Stats::idle(initial_balance);
    }
    let equity = equity_values(equity_curve);
    let final_balance = equity.last().copied().unwrap_or(initial_balance);
    Stats {
        final_balance,
        total_return_pct: total_return_pct(final_balance, initial_balance),
        win_rate_pct: win_rate_pct(trades),
        sharpe_ratio: sharpe_ratio(&equity),
        max_drawdown_pct: max_drawdown_pct(&equity),
    }
}

// ─── Individual metric functions ────────────────────────────────────

pub fn total_return_pct(final_balance: f64, initial_balance: f64) -> f64 {
    if initial_balance == 0.0 {
        return 0.0;
    }
    (final_balance - initial_balance) / initial_balance * 100.0
}

/// Share of winning trades among trades with a known pnl. `pnl <= 0` is a loss.
pub fn win_rate_pct(trades: &[ConsolidatedTrade]) -> f64 {
    let (wins, decided) = trades
        .iter()
        .filter_map(|t| t.pnl)
        .fold((0usize, 0usize), |(w, n), pnl| (w + usize::from(pnl > 0.0), n + 1));
    if decided == 0 {
        return 0.0;
    }
    wins as f64 / decided as f64 * 100.0
}

/// Simple per-bar returns. A zero previous equity yields a zero return.
pub fn bar_returns(equity: &[f64]) -> Vec<f64> {
    equity
        .windows(2)
        .map(|w| if w[0] == 0.0 { 0.0 } else { w[1] / w[0] - 1.0 })
        .collect()
}

/// Annualized Sharpe ratio: √252 · mean / sample std of bar returns.
///
/// 0.0 with fewer than two returns or a (numerically) zero deviation.
pub fn sharpe_ratio(equity: &[f64]) -> f64 {
    let returns = bar_returns(equity);
    if returns.len() < 2 {
        return 0.0;
    }
    let std = std_dev(&returns);
    if std < 1e-15 {
        return 0.0;
    }
    ANNUALIZATION_PERIODS.sqrt() * mean_f64(&returns) / std
}

/// Deepest fall below the running peak, in percent (≤ 0).
///
/// Points whose running peak is not positive are skipped.
pub fn max_drawdown_pct(equity: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut worst = 0.0_f64;
    for &e in equity {
        peak = peak.max(e);
        if peak <= 0.0 {
            continue;
        }
        worst = worst.min(e / peak - 1.0);
    }
    worst * 100.0
}

// ─── Helpers ────────────────────────────────────────────────────────

fn mean_f64(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample standard deviation (n − 1 denominator).
fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = mean_f64(values);
    let var = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    var.sqrt()
}
