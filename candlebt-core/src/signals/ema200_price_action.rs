//! Price action around a long EMA: long above it, short below it.

use serde::{Deserialize, Serialize};

use super::{check_window, sign_of_spread, SignalSource, StrategyError};
use crate::domain::{closes, Bar, Signal};
use crate::indicators::{Ema, EmaSeed, Indicator};

const NAME: &str = "EMA200_PRICE_ACTION";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Ema200PriceActionStrategy {
    pub ema_span: usize,
    pub ema_seed: EmaSeed,
}

impl Default for Ema200PriceActionStrategy {
    fn default() -> Self {
        Self {
            ema_span: 200,
            ema_seed: EmaSeed::Sma,
        }
    }
}

impl Ema200PriceActionStrategy {
    pub fn validate(&self) -> Result<(), StrategyError> {
        check_window(NAME, "ema_span", self.ema_span)
    }

    fn ema(&self) -> Ema {
        Ema::with_seed(self.ema_span, self.ema_seed)
    }
}

impl SignalSource for Ema200PriceActionStrategy {
    fn name(&self) -> &str {
        NAME
    }

    fn warmup_bars(&self) -> usize {
        self.ema().lookback()
    }

    fn generate(&self, bars: &[Bar]) -> Vec<Signal> {
        let ema = self.ema().compute(bars);
        sign_of_spread(&closes(bars), &ema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::test_support::bars_from_closes;

    #[test]
    fn sides_of_the_ema() {
        let closes = [10.0, 10.0, 10.0, 13.0, 7.0, 10.0];
        let s = Ema200PriceActionStrategy {
            ema_span: 3,
            ..Default::default()
        };
        let signals = s.generate(&bars_from_closes(&closes));
        // EMA: seed 10 at bar 2, then 11.5, 9.25, 9.625
        assert_eq!(
            signals,
            vec![
                Signal::Flat,
                Signal::Flat,
                Signal::Flat,
                Signal::Long,
                Signal::Short,
                Signal::Long
            ]
        );
    }

    #[test]
    fn first_seeded_ema_trades_from_the_second_bar() {
        let closes = [10.0, 12.0, 8.0, 13.0];
        let s = Ema200PriceActionStrategy {
            ema_span: 3,
            ema_seed: EmaSeed::First,
        };
        assert_eq!(s.warmup_bars(), 0);
        let signals = s.generate(&bars_from_closes(&closes));
        // EMA: 10, 11, 9.5, 11.25; the first bar sits on its own EMA
        assert_eq!(
            signals,
            vec![Signal::Flat, Signal::Long, Signal::Short, Signal::Long]
        );
    }
}
