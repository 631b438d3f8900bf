//! MACD: Moving Average Convergence/Divergence.
//!
//! line = EMA(close, fast) − EMA(close, slow)
//! signal = EMA(line, sign)
//! histogram = line − signal
//!
//! Lookback: slow - 1 for the line, slow + sign - 2 for signal and histogram.

use super::ema::ema_of_series;
use super::Indicator;
use crate::domain::{closes, Bar};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MacdLine {
    Macd,
    Signal,
    Histogram,
}

/// All three MACD series computed together.
#[derive(Debug, Clone)]
pub struct MacdLines {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

pub fn macd_lines(values: &[f64], fast: usize, slow: usize, sign: usize) -> MacdLines {
    let fast_ema = ema_of_series(values, fast);
    let slow_ema = ema_of_series(values, slow);
    let macd: Vec<f64> = fast_ema.iter().zip(&slow_ema).map(|(f, s)| f - s).collect();
    let signal = ema_of_series(&macd, sign);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();
    MacdLines {
        macd,
        signal,
        histogram,
    }
}

#[derive(Debug, Clone)]
pub struct Macd {
    fast: usize,
    slow: usize,
    sign: usize,
    line: MacdLine,
    name: String,
}

impl Macd {
    pub fn new(fast: usize, slow: usize, sign: usize, line: MacdLine) -> Self {
        let tag = match line {
            MacdLine::Macd => "macd",
            MacdLine::Signal => "macd_signal",
            MacdLine::Histogram => "macd_hist",
        };
        Self {
            fast: fast.max(1),
            slow: slow.max(1),
            sign: sign.max(1),
            line,
            name: format!("{tag}_{fast}_{slow}_{sign}"),
        }
    }
}

impl Indicator for Macd {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        let line = self.fast.max(self.slow) - 1;
        match self.line {
            MacdLine::Macd => line,
            MacdLine::Signal | MacdLine::Histogram => line + self.sign - 1,
        }
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let lines = macd_lines(&closes(bars), self.fast, self.slow, self.sign);
        match self.line {
            MacdLine::Macd => lines.macd,
            MacdLine::Signal => lines.signal,
            MacdLine::Histogram => lines.histogram,
        }
    }
}
