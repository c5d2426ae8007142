//! Market data: sources, retry, cleaning and the ticker universe

pub mod circuit_breaker;
pub mod clean;
pub mod provider;
pub mod retry;
pub mod synthetic;
pub mod universe;
pub mod yahoo;

pub use circuit_breaker::CircuitBreaker;
pub use clean::clean_rows;
pub use provider::{DataError, FetchRequest, Interval, MarketDataSource, RawBar};
pub use retry::{fetch_series, RetryPolicy};
pub use synthetic::SyntheticProvider;
pub use universe::{normalize_symbol, Universe, UniverseError};
pub use yahoo::YahooProvider;
