//! Strategy configuration: a tagged union of typed parameter sets.
//!
//! Serialized with an internal `type` tag, e.g. in TOML:
//!
//! ```toml
//! [strategy]
//! type = "RSI_EMA"
//! rsi_period = 14
//! ```
//!
//! Omitted parameters take their defaults; unknown parameter names are a
//! deserialization error.

use serde::{Deserialize, Serialize};

use super::{
    AdxEmaStrategy, BollingerRsiStrategy, BreakoutVolumeStrategy, Ema200PriceActionStrategy,
    FibonacciReversalStrategy, HeikinAshiEmaStrategy, IchimokuStrategy, KeltnerBreakoutStrategy,
    MacdStrategy, PsarMacdStrategy, RsiEmaStrategy, SignalSource, SmaCrossStrategy, StrategyError,
    StrategyKind, SupertrendRsiStrategy, TrixStrategy, VolumeBreakoutStrategy,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StrategyConfig {
    RsiEma(RsiEmaStrategy),
    Macd(MacdStrategy),
    BollingerRsi(BollingerRsiStrategy),
    SmaCross(SmaCrossStrategy),
    VolumeBreakout(VolumeBreakoutStrategy),
    BreakoutVolume(BreakoutVolumeStrategy),
    PsarMacd(PsarMacdStrategy),
    FibonacciReversal(FibonacciReversalStrategy),
    Trix(TrixStrategy),
    HeikinAshiEma(HeikinAshiEmaStrategy),
    SupertrendRsi(SupertrendRsiStrategy),
    AdxEma(AdxEmaStrategy),
    Ichimoku(IchimokuStrategy),
    Ema200PriceAction(Ema200PriceActionStrategy),
    KeltnerBreakout(KeltnerBreakoutStrategy),
}

impl StrategyConfig {
    pub fn kind(&self) -> StrategyKind {
        match self {
            StrategyConfig::RsiEma(_) => StrategyKind::RsiEma,
            StrategyConfig::Macd(_) => StrategyKind::Macd,
            StrategyConfig::BollingerRsi(_) => StrategyKind::BollingerRsi,
            StrategyConfig::SmaCross(_) => StrategyKind::SmaCross,
            StrategyConfig::VolumeBreakout(_) => StrategyKind::VolumeBreakout,
            StrategyConfig::BreakoutVolume(_) => StrategyKind::BreakoutVolume,
            StrategyConfig::PsarMacd(_) => StrategyKind::PsarMacd,
            StrategyConfig::FibonacciReversal(_) => StrategyKind::FibonacciReversal,
            StrategyConfig::Trix(_) => StrategyKind::Trix,
            StrategyConfig::HeikinAshiEma(_) => StrategyKind::HeikinAshiEma,
            StrategyConfig::SupertrendRsi(_) => StrategyKind::SupertrendRsi,
            StrategyConfig::AdxEma(_) => StrategyKind::AdxEma,
            StrategyConfig::Ichimoku(_) => StrategyKind::Ichimoku,
            StrategyConfig::Ema200PriceAction(_) => StrategyKind::Ema200PriceAction,
            StrategyConfig::KeltnerBreakout(_) => StrategyKind::KeltnerBreakout,
        }
    }

    pub fn name(&self) -> &'static str {
        self.kind().as_str()
    }

    fn source(&self) -> &dyn SignalSource {
        match self {
            StrategyConfig::RsiEma(s) => s,
            StrategyConfig::Macd(s) => s,
            StrategyConfig::BollingerRsi(s) => s,
            StrategyConfig::SmaCross(s) => s,
            StrategyConfig::VolumeBreakout(s) => s,
            StrategyConfig::BreakoutVolume(s) => s,
            StrategyConfig::PsarMacd(s) => s,
            StrategyConfig::FibonacciReversal(s) => s,
            StrategyConfig::Trix(s) => s,
            StrategyConfig::HeikinAshiEma(s) => s,
            StrategyConfig::SupertrendRsi(s) => s,
            StrategyConfig::AdxEma(s) => s,
            StrategyConfig::Ichimoku(s) => s,
            StrategyConfig::Ema200PriceAction(s) => s,
            StrategyConfig::KeltnerBreakout(s) => s,
        }
    }

    pub fn validate(&self) -> Result<(), StrategyError> {
        match self {
            StrategyConfig::RsiEma(s) => s.validate(),
            StrategyConfig::Macd(s) => s.validate(),
            StrategyConfig::BollingerRsi(s) => s.validate(),
            StrategyConfig::SmaCross(s) => s.validate(),
            StrategyConfig::VolumeBreakout(s) => s.validate(),
            StrategyConfig::BreakoutVolume(s) => s.validate(),
            StrategyConfig::PsarMacd(s) => s.validate(),
            StrategyConfig::FibonacciReversal(s) => s.validate(),
            StrategyConfig::Trix(s) => s.validate(),
            StrategyConfig::HeikinAshiEma(s) => s.validate(),
            StrategyConfig::SupertrendRsi(s) => s.validate(),
            StrategyConfig::AdxEma(s) => s.validate(),
            StrategyConfig::Ichimoku(s) => s.validate(),
            StrategyConfig::Ema200PriceAction(s) => s.validate(),
            StrategyConfig::KeltnerBreakout(s) => s.validate(),
        }
    }

    /// Bars needed before the strategy's indicators are all defined.
    pub fn warmup_bars(&self) -> usize {
        self.source().warmup_bars()
    }

    /// Validate the parameters and produce a ready-to-run signal source.
    pub fn build(&self) -> Result<Box<dyn SignalSource>, StrategyError> {
        self.validate()?;
        let boxed: Box<dyn SignalSource> = match self.clone() {
            StrategyConfig::RsiEma(s) => Box::new(s),
            StrategyConfig::Macd(s) => Box::new(s),
            StrategyConfig::BollingerRsi(s) => Box::new(s),
            StrategyConfig::SmaCross(s) => Box::new(s),
            StrategyConfig::VolumeBreakout(s) => Box::new(s),
            StrategyConfig::BreakoutVolume(s) => Box::new(s),
            StrategyConfig::PsarMacd(s) => Box::new(s),
            StrategyConfig::FibonacciReversal(s) => Box::new(s),
            StrategyConfig::Trix(s) => Box::new(s),
            StrategyConfig::HeikinAshiEma(s) => Box::new(s),
            StrategyConfig::SupertrendRsi(s) => Box::new(s),
            StrategyConfig::AdxEma(s) => Box::new(s),
            StrategyConfig::Ichimoku(s) => Box::new(s),
            StrategyConfig::Ema200PriceAction(s) => Box::new(s),
            StrategyConfig::KeltnerBreakout(s) => Box::new(s),
        };
        Ok(boxed)
    }

    /// Parameters as a flat JSON object, without the `type` tag.
    pub fn params_json(&self) -> serde_json::Value {
        let mut value = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
        if let Some(map) = value.as_object_mut() {
            map.remove("type");
        }
        value
    }
}
