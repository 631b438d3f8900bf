//! Parabolic SAR: Wilder's stop-and-reverse system.
//!
//! Sequential: carries trend direction, extreme point (EP) and acceleration
//! factor (AF) from bar to bar. The direction is seeded from the first two
//! closes. Lookback: 1.

use super::Indicator;
use crate::domain::Bar;

#[derive(Debug, Clone)]
pub struct ParabolicSar {
    af_start: f64,
    af_step: f64,
    af_max: f64,
    name: String,
}

#[derive(Debug, Clone, Copy)]
struct SarState {
    rising: bool,
    sar: f64,
    ep: f64,
    af: f64,
}

impl ParabolicSar {
    pub fn new(af_start: f64, af_step: f64, af_max: f64) -> Self {
        Self {
            af_start,
            af_step,
            af_max,
            name: format!("psar_{af_start}_{af_step}_{af_max}"),
        }
    }

    /// Single `step` used both as starting AF and increment.
    pub fn with_step(step: f64, max_step: f64) -> Self {
        Self::new(step, step, max_step)
    }

    fn advance(&self, st: &mut SarState, bar: &Bar, prev: &Bar, prev2: &Bar) {
        let mut sar = st.sar + st.af * (st.ep - st.sar);
        if st.rising {
            sar = sar.min(prev.low).min(prev2.low);
            if bar.low < sar {
                st.rising = false;
                sar = st.ep;
                st.ep = bar.low;
                st.af = self.af_start;
            } else if bar.high > st.ep {
                st.ep = bar.high;
                st.af = (st.af + self.af_step).min(self.af_max);
            }
        } else {
            sar = sar.max(prev.high).max(prev2.high);
            if bar.high > sar {
                st.rising = true;
                sar = st.ep;
                st.ep = bar.high;
                st.af = self.af_start;
            } else if bar.low < st.ep {
                st.ep = bar.low;
                st.af = (st.af + self.af_step).min(self.af_max);
            }
        }
        st.sar = sar;
    }
}

impl Indicator for ParabolicSar {
    fn name(&self) -> &str {
        &self.name
    }

    fn lookback(&self) -> usize {
        1
    }

    fn compute(&self, bars: &[Bar]) -> Vec<f64> {
        let n = bars.len();
        let mut result = vec![f64::NAN; n];
        if n < 2 || bars[0].is_void() || bars[1].is_void() {
            return result;
        }

        let rising = bars[1].close >= bars[0].close;
        let mut st = SarState {
            rising,
            sar: if rising { bars[0].low } else { bars[0].high },
            ep: if rising { bars[1].high } else { bars[1].low },
            af: self.af_start,
        };
        result[1] = st.sar;

        for i in 2..n {
            if bars[i].is_void() {
                // State is frozen; later bars cannot be trusted either.
                return result;
            }
            self.advance(&mut st, &bars[i], &bars[i - 1], &bars[i - 2]);
            result[i] = st.sar;
        }
        result
    }
}
