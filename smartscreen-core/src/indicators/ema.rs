//! Exponential Moving Average (EMA).
//!
//! Recursive: EMA[t] = alpha * close[t] + (1 - alpha) * EMA[t-1], alpha = 2 / (window + 1)
//! Seed: EMA[window-1] = SMA of the first `window` closes.

use super::{Degeneracy, Outcome};

/// Observations between the latest EMA value and the lagged one (about one trading month).
pub const EMA_LAG: usize = 21;

/// Latest EMA value and the value `lag` observations earlier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EmaPair {
    pub latest: f64,
    pub lagged: f64,
}

impl EmaPair {
    /// Neutral pair used when the EMA could not be computed.
    pub const ZERO: EmaPair = EmaPair {
        latest: 0.0,
        lagged: 0.0,
    };
}

/// Full EMA series over `values`. Entries before the seed are NaN, and a NaN
/// input taints every value from that point on.
pub fn ema_series(values: &[f64], window: usize) -> Vec<f64> {
    let n = values.len();
    let mut result = vec![f64::NAN; n];

    if n < window || window == 0 {
        return result;
    }

    let alpha = 2.0 / (window as f64 + 1.0);

    let mut sum = 0.0;
    for &v in values.iter().take(window) {
        if v.is_nan() {
            return result;
        }
        sum += v;
    }
    let seed = sum / window as f64;
    result[window - 1] = seed;

    let mut prev = seed;
    for i in window..n {
        if values[i].is_nan() {
            // Everything from `i` on is still NaN.
            return result;
        }
        let ema = alpha * values[i] + (1.0 - alpha) * prev;
        result[i] = ema;
        prev = ema;
    }

    result
}

/// EMA of `closes` over `window`: latest value and the value `lag` observations earlier.
///
/// Degenerate when there is not enough history for the lagged value to sit
/// at or after the seed, or when either value is not finite.
pub fn ema(closes: &[f64], window: usize, lag: usize) -> Outcome<EmaPair> {
    if window == 0 {
        return Outcome::Degenerate(Degeneracy::ZeroWindow);
    }
    let needed = window + lag;
    let n = closes.len();
    if n < needed {
        return Outcome::Degenerate(Degeneracy::InsufficientHistory {
            needed,
            available: n,
        });
    }

    let series = ema_series(closes, window);
    let pair = EmaPair {
        latest: series[n - 1],
        lagged: series[n - 1 - lag],
    };
    if pair.latest.is_finite() && pair.lagged.is_finite() {
        Outcome::Computed(pair)
    } else {
        Outcome::Degenerate(Degeneracy::NonFinite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{assert_approx, DEFAULT_EPSILON};

    #[test]
    fn ema_window_1_equals_close() {
        let result = ema_series(&[100.0, 200.0, 300.0], 1);
        assert_approx(result[0], 100.0, DEFAULT_EPSILON);
        assert_approx(result[1], 200.0, DEFAULT_EPSILON);
        assert_approx(result[2], 300.0, DEFAULT_EPSILON);
    }

    #[test]
    fn ema_3_known_values() {
        // alpha = 0.5, seed at index 2 = SMA(10,11,12) = 11
        // EMA[3] = 0.5*13 + 0.5*11 = 12, EMA[4] = 0.5*14 + 0.5*12 = 13
        let result = ema_series(&[10.0, 11.0, 12.0, 13.0, 14.0], 3);
        assert!(result[0].is_nan());
        assert!(result[1].is_nan());
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert_approx(result[3], 12.0, DEFAULT_EPSILON);
        assert_approx(result[4], 13.0, DEFAULT_EPSILON);
    }

    #[test]
    fn nan_in_seed_produces_all_nan() {
        let result = ema_series(&[10.0, f64::NAN, 12.0, 13.0], 3);
        assert!(result.iter().all(|v| v.is_nan()));
    }

    #[test]
    fn nan_after_seed_propagates() {
        let result = ema_series(&[10.0, 11.0, 12.0, f64::NAN, 14.0], 3);
        assert_approx(result[2], 11.0, DEFAULT_EPSILON);
        assert!(result[3].is_nan());
        assert!(result[4].is_nan());
    }

    #[test]
    fn pair_reads_latest_and_lagged() {
        // window 3 over 10..=16, lag 2: latest = EMA[6], lagged = EMA[4]
        let closes: Vec<f64> = (10..=16).map(f64::from).collect();
        let series = ema_series(&closes, 3);
        let pair = ema(&closes, 3, 2).computed().unwrap();
        assert_approx(pair.latest, series[6], DEFAULT_EPSILON);
        assert_approx(pair.lagged, series[4], DEFAULT_EPSILON);
        assert!(pair.latest > pair.lagged);
    }

    #[test]
    fn short_series_is_degenerate() {
        let closes = vec![1.0; 49];
        let outcome = ema(&closes, 50, EMA_LAG);
        assert_eq!(
            outcome,
            Outcome::Degenerate(Degeneracy::InsufficientHistory {
                needed: 71,
                available: 49
            })
        );
        assert_eq!(outcome.value_or(EmaPair::ZERO), EmaPair::ZERO);
    }

    #[test]
    fn lag_before_seed_is_degenerate() {
        // Enough for the seed but not for the lagged value.
        let closes = vec![1.0; 60];
        assert!(ema(&closes, 50, EMA_LAG).is_degenerate());
        let closes = vec![1.0; 71];
        assert!(!ema(&closes, 50, EMA_LAG).is_degenerate());
    }

    #[test]
    fn zero_window_is_degenerate() {
        assert_eq!(ema(&[1.0, 2.0], 0, 0), Outcome::Degenerate(Degeneracy::ZeroWindow));
    }
}
