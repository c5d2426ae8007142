//! Trend and momentum indicators.
//!
//! Every indicator returns an [`Outcome`]: either a computed value or a
//! tagged degenerate case (too little history, a zero benchmark return).
//! Degenerate values never raise. At the pipeline boundary they collapse to a
//! neutral 0 so the ticker is still evaluated, and naturally fails the
//! trend template.

pub mod ema;
pub mod high_52w;
pub mod relative_strength;

pub use ema::{ema, ema_series, EmaPair, EMA_LAG};
pub use high_52w::{rolling_52w_high, HighSeries, HISTORY_LEN, HIGH_WINDOW};
pub use relative_strength::{relative_strength, trailing_return};

use serde::{Deserialize, Serialize};

use crate::domain::SeriesWindow;

/// Why an indicator could not be computed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Degeneracy {
    InsufficientHistory { needed: usize, available: usize },
    DegenerateBenchmark,
    NonPositiveBase,
    NonFinite,
    ZeroWindow,
}

/// Result of an indicator computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Outcome<T> {
    Computed(T),
    Degenerate(Degeneracy),
}

impl<T> Outcome<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Computed(v) => Outcome::Computed(f(v)),
            Outcome::Degenerate(d) => Outcome::Degenerate(d),
        }
    }

    /// The computed value, or `fallback` for a degenerate outcome.
    pub fn value_or(self, fallback: T) -> T {
        match self {
            Outcome::Computed(v) => v,
            Outcome::Degenerate(_) => fallback,
        }
    }

    pub fn computed(self) -> Option<T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::Degenerate(_) => None,
        }
    }

    pub fn is_degenerate(&self) -> bool {
        matches!(self, Outcome::Degenerate(_))
    }
}

/// Lookbacks used to derive an [`IndicatorSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndicatorParams {
    /// Relative-strength lookback in bars.
    pub rs_period: usize,
    pub short_ema: usize,
    pub long_ema: usize,
    /// Bars between the latest EMA value and the lagged one.
    pub ema_lag: usize,
    /// Trailing window of the 52-week high.
    pub high_window: usize,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rs_period: 100,
            short_ema: 50,
            long_ema: 200,
            ema_lag: EMA_LAG,
            high_window: HIGH_WINDOW,
        }
    }
}

/// Which indicators of a set fell back to their neutral value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DegenerateFlags {
    pub relative_strength: bool,
    pub short_ema: bool,
    pub long_ema: bool,
}

impl DegenerateFlags {
    pub fn any(&self) -> bool {
        self.relative_strength || self.short_ema || self.long_ema
    }
}

/// Indicators derived from one ticker's series, with degenerate values already collapsed to 0.
#[derive(Debug, Clone, PartialEq)]
pub struct IndicatorSet {
    /// Latest close; 0 for an empty window.
    pub last_close: f64,
    pub relative_strength: f64,
    pub ema_50_now: f64,
    pub ema_50_lag21: f64,
    pub ema_200_now: f64,
    pub ema_200_lag21: f64,
    pub is_52w_high: bool,
    pub recent_52w_high_flags: [u8; HISTORY_LEN],
    pub degenerate: DegenerateFlags,
}

/// Binds [`IndicatorParams`] to the indicator functions.
#[derive(Debug, Clone, Copy, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    pub fn new(params: IndicatorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    /// Benchmark return ratio over the relative-strength lookback.
    pub fn benchmark_return(&self, benchmark: &SeriesWindow) -> Outcome<f64> {
        trailing_return(&benchmark.closes(), self.params.rs_period)
    }

    /// Derive the full indicator set of `window`. Pure, never fails.
    pub fn evaluate(&self, window: &SeriesWindow, benchmark_return: f64) -> IndicatorSet {
        let p = &self.params;
        let closes = window.closes();

        let rs = relative_strength(&closes, benchmark_return, p.rs_period);
        let short = ema(&closes, p.short_ema, p.ema_lag);
        let long = ema(&closes, p.long_ema, p.ema_lag);
        let highs = rolling_52w_high(&closes, p.high_window);

        let degenerate = DegenerateFlags {
            relative_strength: rs.is_degenerate(),
            short_ema: short.is_degenerate(),
            long_ema: long.is_degenerate(),
        };
        let short = short.value_or(EmaPair::ZERO);
        let long = long.value_or(EmaPair::ZERO);

        IndicatorSet {
            last_close: window.last_close().unwrap_or(0.0),
            relative_strength: rs.value_or(0.0),
            ema_50_now: short.latest,
            ema_50_lag21: short.lagged,
            ema_200_now: long.latest,
            ema_200_lag21: long.lagged,
            is_52w_high: highs.latest_is_high(),
            recent_52w_high_flags: highs.recent_flags::<HISTORY_LEN>(),
            degenerate,
        }
    }
}

/// Build a window from close prices for testing, one bar per calendar day.
#[cfg(test)]
pub fn make_window(closes: &[f64]) -> SeriesWindow {
    use crate::domain::Bar;
    let base_date = chrono::NaiveDate::from_ymd_opt(2024, 1, 2).unwrap();
    let bars = closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Bar {
            date: base_date + chrono::Duration::days(i as i64),
            open: close,
            high: close + 1.0,
            low: close - 1.0,
            close,
            volume: 1000,
        })
        .collect();
    SeriesWindow::new("TEST.NS", bars)
}

/// Assert two f64 values are approximately equal (within epsilon).
#[cfg(test)]
pub fn assert_approx(actual: f64, expected: f64, epsilon: f64) {
    assert!(
        (actual - expected).abs() < epsilon,
        "assert_approx failed: actual={actual}, expected={expected}, diff={}, epsilon={epsilon}",
        (actual - expected).abs()
    );
}

/// Default epsilon for indicator tests.
#[cfg(test)]
pub const DEFAULT_EPSILON: f64 = 1e-10;

#[cfg(test)]
mod tests {
    use super::*;

    fn rising(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn rising_series_full_set() {
        let window = make_window(&rising(260));
        let engine = IndicatorEngine::default();
        let set = engine.evaluate(&window, 1.0);

        assert!(!set.degenerate.any());
        assert!(set.relative_strength > 0.0);
        assert!(set.ema_50_now > set.ema_200_now);
        assert!(set.ema_200_now > set.ema_200_lag21);
        assert!(set.ema_50_now > set.ema_50_lag21);
        assert!(set.is_52w_high);
        assert_eq!(set.recent_52w_high_flags, [1; HISTORY_LEN]);
        assert_eq!(set.last_close, 359.0);
    }

    #[test]
    fn empty_window_is_all_zero() {
        let set = IndicatorEngine::default().evaluate(&make_window(&[]), 1.0);
        assert_eq!(set.last_close, 0.0);
        assert_eq!(set.relative_strength, 0.0);
        assert!(set.degenerate.any());
        assert!(!set.is_52w_high);
    }

    #[test]
    fn short_history_collapses_to_zero() {
        let window = make_window(&rising(120));
        let set = IndicatorEngine::default().evaluate(&window, 1.0);

        assert!(!set.degenerate.relative_strength);
        assert!(!set.degenerate.short_ema);
        assert!(set.degenerate.long_ema);
        assert_eq!(set.ema_200_now, 0.0);
        assert_eq!(set.ema_200_lag21, 0.0);
    }

    #[test]
    fn degenerate_benchmark_flags_relative_strength() {
        let window = make_window(&rising(150));
        let set = IndicatorEngine::default().evaluate(&window, 0.0);
        assert!(set.degenerate.relative_strength);
        assert_eq!(set.relative_strength, 0.0);
    }

    #[test]
    fn benchmark_return_over_rs_period() {
        let engine = IndicatorEngine::new(IndicatorParams {
            rs_period: 3,
            ..IndicatorParams::default()
        });
        let window = make_window(&[90.0, 100.0, 105.0, 110.0]);
        assert_approx(engine.benchmark_return(&window).computed().unwrap(), 1.1, DEFAULT_EPSILON);
    }

    #[test]
    fn outcome_combinators() {
        let ok: Outcome<f64> = Outcome::Computed(2.0);
        assert_eq!(ok.map(|v| v * 2.0).computed(), Some(4.0));
        let bad: Outcome<f64> = Outcome::Degenerate(Degeneracy::ZeroWindow);
        assert_eq!(bad.map(|v| v * 2.0).value_or(0.0), 0.0);
        assert!(bad.is_degenerate());
    }
}
