//! Per-ticker fetch with a fixed-backoff retry.
//!
//! Contract: one attempt, and on failure a single retry after a fixed pause
//! (10 seconds by default). If the retry fails too, the ticker is reported as
//! unavailable and the caller skips it. An open circuit breaker is not
//! retried, the provider has already refused us.

use std::time::Duration;

use super::clean::clean_rows;
use super::provider::{DataError, FetchRequest, MarketDataSource};
use crate::domain::SeriesWindow;

/// Attempt budget and pause between attempts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first one (at least 1).
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff: Duration::from_secs(10),
        }
    }
}

impl RetryPolicy {
    /// No pause between attempts; used by tests and offline sources.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            backoff: Duration::ZERO,
        }
    }
}

/// Fetch `symbol` through `source` under `policy`, then clean the rows.
///
/// Returns `DataError::EmptySeries` if every fetched row was incomplete.
pub fn fetch_series(
    source: &dyn MarketDataSource,
    symbol: &str,
    request: FetchRequest,
    policy: &RetryPolicy,
) -> Result<SeriesWindow, DataError> {
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    let raw = loop {
        match source.fetch(symbol, request.period_days, request.interval) {
            Ok(raw) => break raw,
            Err(e) if e.is_retryable() && attempt < attempts => {
                tracing::warn!(
                    symbol,
                    attempt,
                    backoff_secs = policy.backoff.as_secs_f64(),
                    error = %e,
                    "fetch failed, retrying"
                );
                if !policy.backoff.is_zero() {
                    std::thread::sleep(policy.backoff);
                }
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    };

    let window = clean_rows(symbol, raw);
    if window.is_empty() {
        return Err(DataError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }
    Ok(window)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{Interval, RawBar};
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Fails the first `failures` calls, then returns `rows`.
    struct Flaky {
        failures: u32,
        calls: AtomicU32,
        error: fn() -> DataError,
        rows: Vec<RawBar>,
    }

    impl Flaky {
        fn new(failures: u32, rows: Vec<RawBar>) -> Self {
            Self {
                failures,
                calls: AtomicU32::new(0),
                error: || DataError::NetworkUnreachable("connection reset".into()),
                rows,
            }
        }

        fn calls(&self) -> u32 {
            self.calls.load(Ordering::SeqCst)
        }
    }

    impl MarketDataSource for Flaky {
        fn name(&self) -> &str {
            "flaky"
        }

        fn fetch(&self, _: &str, _: u32, _: Interval) -> Result<Vec<RawBar>, DataError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if n < self.failures {
                Err((self.error)())
            } else {
                Ok(self.rows.clone())
            }
        }
    }

    fn rows(closes: &[Option<f64>]) -> Vec<RawBar> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| RawBar {
                date: start + chrono::Duration::days(i as i64),
                open: Some(1.0),
                high: Some(1.0),
                low: Some(1.0),
                close,
                volume: Some(1),
            })
            .collect()
    }

    #[test]
    fn first_attempt_success() {
        let source = Flaky::new(0, rows(&[Some(1.0), Some(2.0)]));
        let window =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2))
                .unwrap();
        assert_eq!(window.len(), 2);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn single_failure_is_retried_once() {
        let source = Flaky::new(1, rows(&[Some(1.0)]));
        let window =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2))
                .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn two_failures_give_up() {
        let source = Flaky::new(2, rows(&[Some(1.0)]));
        let result =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2));
        assert!(matches!(result, Err(DataError::NetworkUnreachable(_))));
        assert_eq!(source.calls(), 2);
    }

    #[test]
    fn breaker_error_is_not_retried() {
        let mut source = Flaky::new(5, Vec::new());
        source.error = || DataError::CircuitBreakerTripped;
        let result =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2));
        assert!(matches!(result, Err(DataError::CircuitBreakerTripped)));
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn incomplete_rows_are_dropped_after_fetch() {
        let source = Flaky::new(0, rows(&[Some(1.0), None, Some(3.0)]));
        let window =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2))
                .unwrap();
        assert_eq!(window.closes(), vec![1.0, 3.0]);
        assert_eq!(source.calls(), 1);
    }

    #[test]
    fn all_incomplete_rows_is_empty_series() {
        let source = Flaky::new(0, rows(&[None, None]));
        let result =
            fetch_series(&source, "A.NS", FetchRequest::default(), &RetryPolicy::immediate(2));
        assert!(matches!(result, Err(DataError::EmptySeries { .. })));
    }

    #[test]
    fn default_policy_matches_contract() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts, 2);
        assert_eq!(policy.backoff, Duration::from_secs(10));
    }
}
