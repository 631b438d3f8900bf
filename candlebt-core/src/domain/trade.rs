//! Trade ledger events and consolidated round-trip trades.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of a single execution in the trade ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TradeKind {
    LongEntry,
    LongExit,
    ShortEntry,
    ShortExit,
}

impl TradeKind {
    pub fn is_entry(&self) -> bool {
        matches!(self, TradeKind::LongEntry | TradeKind::ShortEntry)
    }

    pub fn is_exit(&self) -> bool {
        !self.is_entry()
    }

    pub fn side(&self) -> TradeSide {
        match self {
            TradeKind::LongEntry | TradeKind::LongExit => TradeSide::Long,
            TradeKind::ShortEntry | TradeKind::ShortExit => TradeSide::Short,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TradeKind::LongEntry => "LONG_ENTRY",
            TradeKind::LongExit => "LONG_EXIT",
            TradeKind::ShortEntry => "SHORT_ENTRY",
            TradeKind::ShortExit => "SHORT_EXIT",
        }
    }
}

impl fmt::Display for TradeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Direction of a round-trip trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TradeSide {
    Long,
    Short,
}

impl TradeSide {
    /// Return of a round trip as a fraction of the entry price.
    pub fn pnl_fraction(&self, entry_price: f64, exit_price: f64) -> f64 {
        match self {
            TradeSide::Long => (exit_price - entry_price) / entry_price,
            TradeSide::Short => (entry_price - exit_price) / entry_price,
        }
    }
}

impl fmt::Display for TradeSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TradeSide::Long => f.write_str("Long"),
            TradeSide::Short => f.write_str("Short"),
        }
    }
}

/// One immutable execution in the append-only ledger.
///
/// `pnl` is only present on exits. Exits emitted by the simulator also carry
/// the entry price of the position they closed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeEvent {
    pub kind: TradeKind,
    pub price: f64,
    pub timestamp: NaiveDateTime,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pnl: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_price: Option<f64>,
}

impl TradeEvent {
    pub fn entry(kind: TradeKind, price: f64, timestamp: NaiveDateTime) -> Self {
        Self {
            kind,
            price,
            timestamp,
            pnl: None,
            entry_price: None,
        }
    }

    pub fn exit(
        kind: TradeKind,
        price: f64,
        timestamp: NaiveDateTime,
        pnl: f64,
        entry_price: f64,
    ) -> Self {
        Self {
            kind,
            price,
            timestamp,
            pnl: Some(pnl),
            entry_price: Some(entry_price),
        }
    }
}

/// A completed round trip: one row per exit event.
///
/// `entry_price` and `pnl` are absent only when an exit could not be matched
/// to an entry and carried no fallback values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsolidatedTrade {
    pub open_time: NaiveDateTime,
    pub symbol: String,
    pub side: TradeSide,
    pub entry_price: Option<f64>,
    pub exit_price: f64,
    pub pnl: Option<f64>,
    pub strategy: String,
}

impl ConsolidatedTrade {
    pub fn is_winner(&self) -> bool {
        self.pnl.is_some_and(|p| p > 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    #[test]
    fn kind_classification() {
        assert!(TradeKind::LongEntry.is_entry());
        assert!(TradeKind::ShortExit.is_exit());
        assert_eq!(TradeKind::ShortEntry.side(), TradeSide::Short);
        assert_eq!(TradeKind::LongExit.to_string(), "LONG_EXIT");
    }

    #[test]
    fn pnl_fraction_by_side() {
        assert!((TradeSide::Long.pnl_fraction(100.0, 105.0) - 0.05).abs() < 1e-12);
        assert!((TradeSide::Short.pnl_fraction(100.0, 105.0) + 0.05).abs() < 1e-12);
    }

    #[test]
    fn event_serializes_kind_in_ledger_form() {
        let ev = TradeEvent::entry(TradeKind::LongEntry, 100.05, ts());
        let json = serde_json::to_string(&ev).unwrap();
        assert!(json.contains("\"LONG_ENTRY\""));
        assert!(!json.contains("pnl"));
    }

    #[test]
    fn winner_requires_positive_pnl() {
        let mut trade = ConsolidatedTrade {
            open_time: ts(),
            symbol: "BTCUSDT".into(),
            side: TradeSide::Long,
            entry_price: Some(100.0),
            exit_price: 101.0,
            pnl: Some(0.01),
            strategy: "RSI_EMA".into(),
        };
        assert!(trade.is_winner());
        trade.pnl = Some(0.0);
        assert!(!trade.is_winner());
        trade.pnl = None;
        assert!(!trade.is_winner());
    }
}
