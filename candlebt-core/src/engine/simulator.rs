//! Position simulator: turns a per-bar signal series into a trade ledger
//! and an equity curve.
//!
//! One position at a time (flat, long or short). Each bar:
//! 1. Transition: open from flat, or flip on an opposing signal
//! 2. Mark-to-market: record equity at the bar's close
//!
//! After the last bar any open position is liquidated at the last close and
//! one extra equity point is appended.

use tracing::debug;

use crate::domain::{Bar, PositionSide, Signal};

use super::state::{SimulationContext, SimulationOutput, SimulationParams};
use super::EngineError;

/// Run one simulation over `bars` with the aligned `signals`.
///
/// Pure function of its inputs: identical inputs produce identical output.
pub fn simulate(
    bars: &[Bar],
    signals: &[Signal],
    params: &SimulationParams,
) -> Result<SimulationOutput, EngineError> {
    if bars.is_empty() {
        return Err(EngineError::InvalidInput("price series is empty".into()));
    }
    if bars.len() != signals.len() {
        return Err(EngineError::InvalidInput(format!(
            "price series has {} bars but signal series has {} entries",
            bars.len(),
            signals.len()
        )));
    }
    params.validate()?;

    let mut ctx = SimulationContext::new(*params, bars.len());

    for (bar_index, (bar, &signal)) in bars.iter().zip(signals).enumerate() {
        step(&mut ctx, bar_index, bar, signal)?;
    }

    liquidate(&mut ctx, bars.len() - 1, &bars[bars.len() - 1])?;

    let output = ctx.finish();
    debug!(
        bars = bars.len(),
        events = output.ledger.len(),
        round_trips = output.exit_count(),
        final_balance = output.final_balance,
        "simulation complete"
    );
    Ok(output)
}

/// Process one bar: apply the signal transition, then record equity.
///
/// Equity on a flip bar is marked against the newly opened position's entry.
pub fn step(
    ctx: &mut SimulationContext,
    bar_index: usize,
    bar: &Bar,
    signal: Signal,
) -> Result<(), EngineError> {
    let close = bar.close;
    if !close.is_finite() {
        return Err(EngineError::NumericInstability {
            bar_index,
            reason: format!("close price is {close}"),
        });
    }

    match (ctx.position, signal) {
        (PositionSide::Flat, Signal::Long) => ctx.open(PositionSide::Long, close, bar.timestamp),
        (PositionSide::Flat, Signal::Short) => ctx.open(PositionSide::Short, close, bar.timestamp),
        (PositionSide::Long, Signal::Short) => {
            ctx.close(close, bar.timestamp);
            ctx.open(PositionSide::Short, close, bar.timestamp);
        }
        (PositionSide::Short, Signal::Long) => {
            ctx.close(close, bar.timestamp);
            ctx.open(PositionSide::Long, close, bar.timestamp);
        }
        _ => {}
    }

    let equity = ctx.mark_to_market(close);
    check_finite(bar_index, "balance", ctx.balance)?;
    check_finite(bar_index, "equity", equity)?;
    ctx.record_equity(bar.timestamp, equity);
    Ok(())
}

/// Force-close an open position at the last bar and append the realized balance.
fn liquidate(
    ctx: &mut SimulationContext,
    bar_index: usize,
    last: &Bar,
) -> Result<(), EngineError> {
    if ctx.close(last.close, last.timestamp).is_some() {
        check_finite(bar_index, "balance", ctx.balance)?;
        let balance = ctx.balance;
        ctx.record_equity(last.timestamp, balance);
    }
    Ok(())
}

fn check_finite(bar_index: usize, what: &str, value: f64) -> Result<(), EngineError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::NumericInstability {
            bar_index,
            reason: format!("{what} is {value}"),
        })
    }
}
