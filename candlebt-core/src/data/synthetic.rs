//! Deterministic synthetic candles for offline development.
//!
//! A bounded random walk seeded by BLAKE3(symbol, interval), so the same
//! request always yields the same series. Never used unless asked for.

use chrono::NaiveDateTime;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, DataProvider, DataSource};
use super::Interval;
use crate::domain::Bar;

const START_PRICE: f64 = 100.0;

fn rng_for(symbol: &str, interval: Interval) -> StdRng {
    let mut hasher = blake3::Hasher::new();
    hasher.update(symbol.to_ascii_uppercase().as_bytes());
    hasher.update(b"/");
    hasher.update(interval.code().as_bytes());
    StdRng::from_seed(*hasher.finalize().as_bytes())
}

/// One bar per interval step with open time in `[start, end]`.
pub fn synthetic_bars(
    symbol: &str,
    interval: Interval,
    start: NaiveDateTime,
    end: NaiveDateTime,
) -> Vec<Bar> {
    let mut rng = rng_for(symbol, interval);
    let step = interval.duration();
    let mut bars = Vec::new();
    let mut price = START_PRICE;
    let mut current = start;

    while current <= end {
        let ret: f64 = rng.gen_range(-0.02..0.02);
        let open = price;
        let close = price * (1.0 + ret);
        let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.005));
        let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.005));
        let volume = rng.gen_range(100.0..10_000.0);
        bars.push(Bar {
            timestamp: current,
            open,
            high,
            low,
            close,
            volume,
        });
        price = close;
        current += step;
    }
    bars
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SyntheticProvider;

impl DataProvider for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn source(&self) -> DataSource {
        DataSource::Synthetic
    }

    fn fetch(
        &self,
        symbol: &str,
        interval: Interval,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Bar>, DataError> {
        if end < start {
            return Err(DataError::ValidationError(format!(
                "end {end} is before start {start}"
            )));
        }
        Ok(synthetic_bars(symbol, interval, start, end))
    }
}
