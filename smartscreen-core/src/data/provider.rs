//! Market data source trait and structured error types.
//!
//! The `MarketDataSource` trait abstracts over where bars come from (Yahoo
//! Finance, the synthetic generator, test doubles) so the pipeline never
//! touches HTTP directly.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One provider row before cleaning.
///
/// Providers occasionally deliver rows with holes (a missing close on the
/// current session, a null volume). Holes are kept as `None` here and dropped
/// by [`clean_rows`](super::clean::clean_rows) after the fetch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawBar {
    pub date: NaiveDate,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub close: Option<f64>,
    pub volume: Option<u64>,
}

/// Bar granularity requested from a provider.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Interval {
    #[default]
    Daily,
    Weekly,
}

impl Interval {
    /// Provider token for this interval.
    pub fn as_token(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::Weekly => "1wk",
        }
    }
}

/// What to fetch for every symbol of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    /// Trailing window in calendar days.
    pub period_days: u32,
    pub interval: Interval,
}

impl Default for FetchRequest {
    fn default() -> Self {
        Self {
            period_days: 365,
            interval: Interval::Daily,
        }
    }
}

/// Structured error types for data operations.
///
/// Every variant means "data unavailable" for the ticker concerned; the
/// pipeline logs it and moves on.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("HTTP {status} for {symbol}")]
    Http { status: u16, symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("no usable bars for {symbol} after dropping incomplete rows")]
    EmptySeries { symbol: String },

    #[error("data error: {0}")]
    Other(String),
}

impl DataError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        !matches!(
            self,
            DataError::CircuitBreakerTripped | DataError::EmptySeries { .. }
        )
    }
}

/// Trait for market data sources.
///
/// Implementations make a single attempt per call. Retrying lives in
/// [`fetch_series`](super::retry::fetch_series) so every source gets the same
/// backoff contract.
pub trait MarketDataSource: Send + Sync {
    /// Human-readable name of this source.
    fn name(&self) -> &str;

    /// Fetch bars for `symbol` covering the trailing `period_days` calendar days.
    fn fetch(
        &self,
        symbol: &str,
        period_days: u32,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError>;

    /// Whether the source is currently accepting requests.
    fn is_available(&self) -> bool {
        true
    }
}
