//! Ichimoku conversion/base line cross.

use serde::{Deserialize, Serialize};

use super::{check_window, sign_of_spread, SignalSource, StrategyError};
use crate::domain::{Bar, Signal};
use crate::indicators::{Ichimoku, IchimokuLine, Indicator};

const NAME: &str = "ICHIMOKU";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IchimokuStrategy {
    pub window1: usize,
    pub window2: usize,
}

impl Default for IchimokuStrategy {
    fn default() -> Self {
        Self {
            window1: 9,
            window2: 26,
        }
    }
}

impl IchimokuStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "window1", self.window1)?;
        check_window(NAME, "window2", self.window2)
    }
}

impl SignalSource for IchimokuStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.window1.max(self.window2).saturating_sub(1)
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let conversion =
            Ichimoku::new(self.window1, self.window2, IchimokuLine::Conversion).compute(bars);
        let base = Ichimoku::new(self.window1, self.window2, IchimokuLine::Base).compute(bars);
        sign_of_spread(&conversion, &base)
    }
}
