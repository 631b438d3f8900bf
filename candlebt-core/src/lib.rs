//! CandleBT Core: domain types, position simulator, trade consolidation,
//! indicators, strategies, and historical data.
//!
//! - Domain types (bars, signals, positions, trade events, equity points)
//! - Bar-by-bar single-position simulator with slippage and exit fees
//! - Trade consolidation (entry/exit pairing)
//! - Indicator library and the closed set of signal strategies
//! - Binance klines provider, ingest validation, CSV cache

pub mod data;
pub mod domain;
pub mod engine;
pub mod indicators;
pub mod signals;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: everything the sweep moves across rayon threads is
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        // Domain types
        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::Signal>();
        require_sync::<domain::Signal>();
        require_send::<domain::TradeEvent>();
        require_sync::<domain::TradeEvent>();
        require_send::<domain::ConsolidatedTrade>();
        require_sync::<domain::ConsolidatedTrade>();
        require_send::<domain::EquityPoint>();
        require_sync::<domain::EquityPoint>();

        // Engine types
        require_send::<engine::SimulationParams>();
        require_sync::<engine::SimulationParams>();
        require_send::<engine::SimulationOutput>();
        require_sync::<engine::SimulationOutput>();
        require_send::<engine::EngineError>();
        require_sync::<engine::EngineError>();

        // Strategy types
        require_send::<signals::StrategyConfig>();
        require_sync::<signals::StrategyConfig>();
        require_send::<signals::StrategyKind>();
        require_sync::<signals::StrategyKind>();
        require_send::<Box<dyn signals::SignalSource>>();
        require_sync::<Box<dyn signals::SignalSource>>();

        // Data types
        require_send::<data::DataError>();
        require_sync::<data::DataError>();
        require_send::<data::BinanceProvider>();
        require_sync::<data::BinanceProvider>();
        require_send::<data::BarCache>();
        require_sync::<data::BarCache>();
    }

    /// Architecture contract: strategies see bars only, never simulator state.
    #[test]
    fn signal_source_has_no_simulator_parameter() {
        fn _check_trait_object_builds(
            source: &dyn signals::SignalSource,
            bars: &[domain::Bar],
        ) -> Vec<domain::Signal> {
            source.generate(bars)
        }
    }
}
