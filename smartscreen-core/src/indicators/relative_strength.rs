//! Relative strength against a benchmark.
//!
//! RS = (close[n-1] / close[n-lookback]) / benchmark_return - 1
//!
//! Positive RS means the ticker outperformed the benchmark over the lookback.

use super::{Degeneracy, Outcome};

/// Trailing return ratio `close[n-1] / close[n-lookback]`.
///
/// `lookback` counts the latest close, so `lookback = 1` compares the last
/// close with itself.
pub fn trailing_return(closes: &[f64], lookback: usize) -> Outcome<f64> {
    let n = closes.len();
    if lookback == 0 || lookback > n {
        return Outcome::Degenerate(Degeneracy::InsufficientHistory {
            needed: lookback.max(1),
            available: n,
        });
    }

    let base = closes[n - lookback];
    let last = closes[n - 1];
    if !(base > 0.0 && base.is_finite() && last.is_finite()) {
        return Outcome::Degenerate(Degeneracy::NonPositiveBase);
    }
    Outcome::Computed(last / base)
}

/// Relative strength of `closes` over `lookback` against `benchmark_return`.
pub fn relative_strength(closes: &[f64], benchmark_return: f64, lookback: usize) -> Outcome<f64> {
    if !(benchmark_return > 0.0 && benchmark_return.is_finite()) {
        return Outcome::Degenerate(Degeneracy::DegenerateBenchmark);
    }
    trailing_return(closes, lookback).map(|ticker_return| ticker_return / benchmark_return - 1.0)
}
