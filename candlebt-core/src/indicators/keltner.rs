//! Keltner Channel.
//!
//! Two constructions, selected by `original`:
//! - `false`: middle = EMA(close, window), bands = middle ± 2 × ATR(window_atr).
//! - `true`: middle = SMA(typical price, window),
//!   upper = SMA((4h − 2l + c)/3, window), lower = SMA((−2h + 4l + c)/3, window).
//!
//! Lookback: max(window - 1, window_atr) for the ATR form, window - 1 otherwise.

use super::atr::Atr;
use super::ema::ema_of_series;
use super::rolling::sma_of_series;
use super::Indicator;
use crate::domain::{closes, Bar};

const ATR_MULTIPLIER: f64 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeltnerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Keltner {
    window: usize,
    window_atr: usize,
    original: bool,
    band: KeltnerBand,
    name: String,
}

impl Keltner {
    pub fn new(window: usize, window_atr: usize, original: bool, band: KeltnerBand) -> Self {
        let tag = match band {
            KeltnerBand::Upper => "upper",
            KeltnerBand::Middle => "middle",
            KeltnerBand::Lower => "lower",
        };
        let form = if original { "_orig" } else { "" };
        Self {
            window: window.max(1),
            window_atr: window_atr.max(1),
            original,
            band,
            name: format!("keltner{form}_{tag}_{window}_{window_atr}"),
        }
    }

    pub fn upper(window: usize, window_atr: usize, original: bool) -> Self {
        Self::new(window, window_atr, original, KeltnerBand::Upper)
    }

    pub fn lower(window: usize, window_atr: usize, original: bool) -> Self {
        Self::new(window, window_atr, original, KeltnerBand::Lower)
    }

    fn compute_original(&self, bars: &[Bar]) -> Vec<f64> {
        let price: Vec<f64> = bars
            .iter()
            .map(|b| match self.band {
                KeltnerBand::Middle => (b.high + b.low + b.close) / 3.0,
                KeltnerBand::Upper => (4.0 * b.high - 2.0 * b.low + b.close) / 3.0,
                KeltnerBand::Lower => (-2.0 * b.high + 4.0 * b.low + b.close) / 3.0,
            })
            .collect();
        sma_of_series(&price, self.window)
    }

    fn compute_atr_bands(&self, bars: &[Bar]) -> Vec<f64> {
        let middle = ema_of_series(&closes(bars), self.window);
        let sign = match self.band {
            KeltnerBand::Middle => return middle,
            KeltnerBand::Upper => 1.0,
            KeltnerBand::Lower => -1.0,
        };
        let atr = Atr::new(self.window_atr).compute(bars);
        middle
            .iter()
            .zip(&atr)
            .map(|(m, a)| m + sign * ATR_MULTIPLIER * a)
            .collect()
    }
}

impl Indicator for Keltner {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        if self.original || self.band == KeltnerBand::Middle {
            self.window - 1
        } else {
            (self.window - 1).max(self.window_atr)
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        if self.original {
            self.compute_original(bars)
        } else {
            self.compute_atr_bands(bars)
        }
    }
}
