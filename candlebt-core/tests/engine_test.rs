//! End-to-end simulator scenarios with hand-computed expected values.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use candlebt_core::domain::{equity_values, Bar, Signal, TradeKind, TradeSide};
use candlebt_core::engine::{consolidate, simulate, EngineError, SimulationParams};

const EPS: f64 = 1e-9;

fn t(i: i64) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
        + Duration::hours(i)
}

fn bars(closes: &[f64]) -> Vec<Bar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| Bar {
            timestamp: t(i as i64),
            open: c,
            high: c,
            low: c,
            close: c,
            volume: 1.0,
        })
        .collect()
}

fn signals(raw: &[i64]) -> Vec<Signal> {
    raw.iter().map(|&s| Signal::try_from(s).unwrap()).collect()
}

fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPS,
        "expected {expected}, got {actual}"
    );
}

/// Long at 100, flip short at 90, liquidate at 95.
fn golden() -> (Vec<Bar>, Vec<Signal>, SimulationParams) {
    (
        bars(&[100.0, 110.0, 90.0, 95.0]),
        signals(&[1, 0, -1, 0]),
        SimulationParams::new(1000.0, 0.001, 0.0005),
    )
}

#[test]
fn golden_ledger() {
    let (bars, sigs, params) = golden();
    let out = simulate(&bars, &sigs, &params).unwrap();

    let kinds: Vec<TradeKind> = out.ledger.iter().map(|e| e.kind).collect();
    assert_eq!(
        kinds,
        vec![
            TradeKind::LongEntry,
            TradeKind::LongExit,
            TradeKind::ShortEntry,
            TradeKind::ShortExit
        ]
    );
    let prices: Vec<f64> = out.ledger.iter().map(|e| e.price).collect();
    for (actual, expected) in prices.iter().zip([100.05, 89.955, 89.955, 95.0475]) {
        assert_close(*actual, expected);
    }
    let times: Vec<NaiveDateTime> = out.ledger.iter().map(|e| e.timestamp).collect();
    assert_eq!(times, vec![t(0), t(2), t(2), t(3)]);

    assert_close(out.ledger[1].pnl.unwrap(), -0.10089955022488754);
    assert_close(out.ledger[3].pnl.unwrap(), -0.0566116391529098);
    assert_eq!(out.ledger[3].entry_price, Some(out.ledger[2].price));
    assert!(out.ledger[0].pnl.is_none());
}

#[test]
fn golden_equity_and_balance() {
    let (bars, sigs, params) = golden();
    let out = simulate(&bars, &sigs, &params).unwrap();

    let expected = [
        999.5002498750625,
        1099.4502748625687,
        897.6511749127937,
        847.7317457662698,
        846.3594107396027,
    ];
    let equity = equity_values(&out.equity_curve);
    assert_eq!(equity.len(), expected.len());
    for (a, e) in equity.iter().zip(expected) {
        assert_close(*a, e);
    }
    assert_close(out.final_balance, 846.3594107396027);
    // The liquidation point reuses the last bar's timestamp.
    assert_eq!(out.equity_curve[4].timestamp, t(3));
}

#[test]
fn golden_consolidated_trades() {
    let (bars, sigs, params) = golden();
    let out = simulate(&bars, &sigs, &params).unwrap();
    let trades = consolidate(&out.ledger, "BTCUSDT", "TEST");

    assert_eq!(trades.len(), 2);
    assert_eq!(trades[0].side, TradeSide::Long);
    assert_eq!(trades[0].open_time, t(0));
    assert_close(trades[0].entry_price.unwrap(), 100.05);
    assert_close(trades[0].exit_price, 89.955);
    assert_eq!(trades[1].side, TradeSide::Short);
    assert_eq!(trades[1].open_time, t(2));
    assert_close(trades[1].exit_price, 95.0475);
    assert!(trades.iter().all(|tr| tr.pnl.unwrap() < 0.0));
    assert!(trades.iter().all(|tr| tr.symbol == "BTCUSDT" && tr.strategy == "TEST"));
}

#[test]
fn single_bar_long_is_opened_and_liquidated() {
    let out = simulate(
        &bars(&[100.0]),
        &signals(&[1]),
        &SimulationParams::new(1000.0, 0.001, 0.0),
    )
    .unwrap();
    assert_eq!(out.ledger.len(), 2);
    assert_eq!(out.equity_curve.len(), 2);
    // Zero pnl, only the exit fee.
    assert_close(out.final_balance, 999.0);
}

#[test]
fn out_of_range_raw_signal_is_invalid_input() {
    let err: EngineError = Signal::try_from(2i64).unwrap_err().into();
    assert!(matches!(err, EngineError::InvalidInput(_)));
}

#[test]
fn short_side_profit() {
    let out = simulate(
        &bars(&[100.0, 80.0]),
        &signals(&[-1, 0]),
        &SimulationParams::frictionless(1000.0),
    )
    .unwrap();
    assert_close(out.final_balance, 1200.0);
    assert_close(out.equity_curve[1].equity, 1200.0);
}
