//! Trade extraction: folds the entry/exit ledger into round-trip trades.
//!
//! Post-processes the ledger after the bar loop completes. Pure function:
//! ledger + symbol + strategy name → consolidated trades, one per exit.

use crate::domain::{ConsolidatedTrade, TradeEvent, TradeSide};
use chrono::NaiveDateTime;

/// An entry waiting for its exit.
#[derive(Debug, Clone, Copy)]
struct OpenEntry {
    price: f64,
    time: NaiveDateTime,
}

/// Pair each exit with the most recent unmatched entry of the same side.
///
/// The ledger is stably sorted by timestamp first, so same-bar flips keep
/// their exit-then-entry order. An exit with no open entry falls back to the
/// `entry_price` it carries and its own timestamp as open time. A pnl carried
/// on the exit wins over the recomputed one.
pub fn consolidate(ledger: &[TradeEvent], symbol: &str, strategy: &str) -> Vec<ConsolidatedTrade> {
    let mut events: Vec<&TradeEvent> = ledger.iter().collect();
    events.sort_by_key(|e| e.timestamp);

    let mut open_long: Option<OpenEntry> = None;
    let mut open_short: Option<OpenEntry> = None;
    let mut trades = Vec::with_capacity(events.len() / 2 + 1);

    for event in events {
        let side = event.kind.side();
        let slot = match side {
            TradeSide::Long => &mut open_long,
            TradeSide::Short => &mut open_short,
        };

        if event.kind.is_entry() {
            *slot = Some(OpenEntry {
                price: event.price,
                time: event.timestamp,
            });
            continue;
        }

        let (entry_price, open_time) = match slot.take() {
            Some(open) => (Some(open.price), open.time),
            None => (event.entry_price, event.timestamp),
        };

        let pnl = event.pnl.or_else(|| {
            entry_price
                .filter(|&p| p != 0.0)
                .map(|p| side.pnl_fraction(p, event.price))
        });

        trades.push(ConsolidatedTrade {
            open_time,
            symbol: symbol.to_string(),
            side,
            entry_price,
            exit_price: event.price,
            pnl,
            strategy: strategy.to_string(),
        });
    }

    trades
}
