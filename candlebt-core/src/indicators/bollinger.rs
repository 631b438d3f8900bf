//! Bollinger Bands: SMA ± multiplier × rolling standard deviation.
//!
//! Uses the sample standard deviation (divide by N - 1).
//! Lookback: period - 1.

use super::rolling::{rolling_std, sma_of_series};
use super::Indicator;
use crate::domain::{closes, Bar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BollingerBand {
    Upper,
    Middle,
    Lower,
}

#[derive(Debug, Clone)]
pub struct Bollinger {
    period: usize,
    multiplier: f64,
    band: BollingerBand,
    name: String,
}

impl Bollinger {
    pub fn new(period: usize, multiplier: f64, band: BollingerBand) -> Self {
        let tag = match band {
            BollingerBand::Upper => "upper",
            BollingerBand::Middle => "middle",
            BollingerBand::Lower => "lower",
        };
        Self {
            period: period.max(1),
            multiplier,
            band,
            name: format!("bollinger_{tag}_{period}_{multiplier}"),
        }
    }

    pub fn upper(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Upper)
    }

    pub fn lower(period: usize, multiplier: f64) -> Self {
        Self::new(period, multiplier, BollingerBand::Lower)
    }
}

impl Indicator for Bollinger {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.period - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let closes = closes(bars);
        let middle = sma_of_series(&closes, self.period);
        let sign = match self.band {
            BollingerBand::Middle => return middle,
            BollingerBand::Upper => 1.0,
            BollingerBand::Lower => -1.0,
        };
        let std = rolling_std(&closes, self.period);
        middle
            .iter()
            .zip(&std)
            .map(|(m, s)| m + sign * self.multiplier * s)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, make_bars, DEFAULT_EPSILON};

    #[test]
    fn bands_bracket_middle() {
        let bars = make_bars(&[10.0, 12.0, 11.0, 13.0, 12.0]);
        let up = Bollinger::upper(3, 2.0).compute(&bars);
        let mid = Bollinger::new(3, 2.0, BollingerBand::Middle).compute(&bars);
        let lo = Bollinger::lower(3, 2.0).compute(&bars);
        // window [10, 12, 11]: mean 11, sample std 1
        assert_approx(mid[2], 11.0, DEFAULT_EPSILON);
        assert_approx(up[2], 13.0, DEFAULT_EPSILON);
        assert_approx(lo[2], 9.0, DEFAULT_EPSILON);
        assert!(up[1].is_nan());
    }
}
