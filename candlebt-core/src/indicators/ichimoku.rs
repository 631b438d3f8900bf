//! Ichimoku conversion (tenkan) and base (kijun) lines.
//!
//! line = (highest high + lowest low) / 2 over the line's window.
//! Conversion uses `window1`, base uses `window2`.

use super::rolling::{rolling_max, rolling_min};
use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IchimokuLine {
    Conversion,
    Base,
}

#[derive(Debug, Clone)]
pub struct Ichimoku {
    window: usize,
    line: IchimokuLine,
    name: String,
}

impl Ichimoku {
    pub fn new(window1: usize, window2: usize, line: IchimokuLine) -> Self {
        let (window, tag) = match line {
            IchimokuLine::Conversion => (window1, "conversion"),
            IchimokuLine::Base => (window2, "base"),
        };
        Self {
            window: window.max(1),
            line,
            name: format!("ichimoku_{tag}_{window}"),
        }
    }

    pub fn line(&self) -> IchimokuLine {
        self.line
    }
}

impl Indicator for Ichimoku {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        self.window - 1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
        let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
        let hi = rolling_max(&highs, self.window);
        let lo = rolling_min(&lows, self.window);
        hi.iter().zip(&lo).map(|(h, l)| (h + l) / 2.0).collect()
    }
}
