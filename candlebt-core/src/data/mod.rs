//! Historical candles: providers, ingest validation, and the on-disk cache.

pub mod binance;
pub mod cache;
pub mod circuit_breaker;
pub mod ingest;
pub mod interval;
pub mod provider;
pub mod synthetic;

pub use binance::BinanceProvider;
pub use cache::{BarCache, CoverageResult};
pub use circuit_breaker::CircuitBreaker;
pub use ingest::{ingest, IngestReport};
pub use interval::Interval;
pub use provider::{DataError, DataProvider, DataSource};
pub use synthetic::{synthetic_bars, SyntheticProvider};
