//! Ingest pipeline: turns raw provider output into a series the simulator
//! can trust.
//!
//! 1. Drop rows with a non-finite OHLCV field (logged as warnings)
//! 2. Stable-sort ascending by timestamp
//! 3. Reject duplicate timestamps

use tracing::warn;

use super::DataError;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct IngestReport {
    pub bars: Vec<Bar>,
    /// Rows removed because a field was NaN or infinite.
    pub dropped_void: usize,
    /// Finite rows that fail the OHLC sanity check. Kept, only counted.
    pub insane: usize,
}

pub fn ingest(raw: Vec<Bar>) -> Result<IngestReport, DataError> {
    let total = raw.len();
    let mut bars: Vec<Bar> = raw.into_iter().filter(|b| !b.is_void()).collect();
    let dropped_void = total - bars.len();
    if dropped_void > 0 {
        warn!(dropped = dropped_void, total, "dropped bars with non-finite fields");
    }

    bars.sort_by_key(|b| b.timestamp);
    if let Some(pair) = bars.windows(2).find(|w| w[0].timestamp == w[1].timestamp) {
        return Err(DataError::ValidationError(format!(
            "duplicate timestamp {}",
            pair[0].timestamp
        )));
    }

    let insane = bars.iter().filter(|b| !b.is_sane()).count();
    if insane > 0 {
        warn!(count = insane, "bars fail OHLC sanity check");
    }

    Ok(IngestReport {
        bars,
        dropped_void,
        insane,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, NaiveDate, NaiveDateTime};

    fn at(hour: i64) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
            + Duration::hours(hour)
    }

    fn bar(hour: i64, close: f64) -> Bar {
        Bar {
            timestamp: at(hour),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 10.0,
        }
    }

    #[test]
    fn sorts_out_of_order_rows() {
        let report = ingest(vec![bar(2, 3.0), bar(0, 1.0), bar(1, 2.0)]).unwrap();
        let closes: Vec<f64> = report.bars.iter().map(|b| b.close).collect();
        assert_eq!(closes, vec![1.0, 2.0, 3.0]);
    }

    #[test]
    fn drops_non_finite_rows() {
        let mut broken = bar(1, 2.0);
        broken.volume = f64::INFINITY;
        let report = ingest(vec![bar(0, 1.0), broken, bar(2, 3.0)]).unwrap();
        assert_eq!(report.bars.len(), 2);
        assert_eq!(report.dropped_void, 1);
    }

    #[test]
    fn rejects_duplicate_timestamps() {
        let err = ingest(vec![bar(0, 1.0), bar(1, 2.0), bar(0, 1.5)]).unwrap_err();
        assert!(matches!(err, DataError::ValidationError(_)));
    }

    #[test]
    fn counts_but_keeps_insane_rows() {
        let mut odd = bar(1, 2.0);
        odd.high = 0.5;
        let report = ingest(vec![bar(0, 1.0), odd]).unwrap();
        assert_eq!(report.bars.len(), 2);
        assert_eq!(report.insane, 1);
    }
}
