//! Signal: the per-bar directional preference emitted by a strategy.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Discrete directional preference attached to one bar.
///
/// `Long` prefers long exposure, `Short` prefers short exposure and `Flat`
/// expresses no change preference: the simulator holds its current state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "i8", into = "i8")]
pub enum Signal {
    Short,
    #[default]
    Flat,
    Long,
}

/// A raw signal value outside {-1, 0, 1}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("signal value {0} is not one of -1, 0, 1")]
pub struct InvalidSignal(pub i64);

impl Signal {
    pub fn as_i8(self) -> i8 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }

    /// Signal from the sign of a difference; NaN maps to `Flat`.
    pub fn from_sign(value: f64) -> Self {
        if value > 0.0 {
            Signal::Long
        } else if value < 0.0 {
            Signal::Short
        } else {
            Signal::Flat
        }
    }
}

impl TryFrom<i64> for Signal {
    type Error = InvalidSignal;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            other => Err(InvalidSignal(other)),
        }
    }
}

impl TryFrom<i8> for Signal {
    type Error = InvalidSignal;

    fn try_from(value: i8) -> Result<Self, Self::Error> {
        Signal::try_from(i64::from(value))
    }
}

impl From<Signal> for i8 {
    fn from(signal: Signal) -> i8 {
        signal.as_i8()
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_i8())
    }
}

/// Count of (short, flat, long) signals in a series.
pub fn signal_counts(signals: &[Signal]) -> (usize, usize, usize) {
    signals
        .iter()
        .fold((0, 0, 0), |(s, f, l), sig| match sig {
            Signal::Short => (s + 1, f, l),
            Signal::Flat => (s, f + 1, l),
            Signal::Long => (s, f, l + 1),
        })
}
