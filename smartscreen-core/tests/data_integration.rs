//! Integration tests for the data path: synthetic source, retry and cleaning.

use chrono::{Datelike, NaiveDate, Weekday};
use smartscreen_core::data::{
    fetch_series, DataError, FetchRequest, Interval, MarketDataSource, RawBar, RetryPolicy,
    SyntheticProvider, Universe,
};
use smartscreen_core::indicators::IndicatorEngine;
use smartscreen_core::rule::TrendTemplate;

fn end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 28).unwrap()
}

#[test]
fn synthetic_series_is_clean_and_sorted() {
    let source = SyntheticProvider::new(end_date());
    let window = fetch_series(
        &source,
        "RELIANCE.NS",
        FetchRequest::default(),
        &RetryPolicy::immediate(1),
    )
    .unwrap();

    assert_eq!(window.symbol(), "RELIANCE.NS");
    assert!(window.len() > 250);
    assert!(window.bars().windows(2).all(|w| w[0].date < w[1].date));
    assert!(window
        .bars()
        .iter()
        .all(|b| !matches!(b.date.weekday(), Weekday::Sat | Weekday::Sun)));
    assert!(window.bars().iter().all(|b| b.close > 0.0));
}

#[test]
fn weekly_interval_spaces_bars_a_week_apart() {
    let source = SyntheticProvider::new(end_date());
    let request = FetchRequest {
        period_days: 365,
        interval: Interval::Weekly,
    };
    let window = fetch_series(&source, "TCS.NS", request, &RetryPolicy::immediate(1)).unwrap();
    assert!(window.len() >= 50 && window.len() <= 53);
    assert!(window
        .bars()
        .windows(2)
        .all(|w| (w[1].date - w[0].date).num_days() == 7));
}

#[test]
fn steady_uptrend_passes_the_template() {
    let source = SyntheticProvider::new(end_date())
        .with_drift(0.004)
        .with_volatility(0.0);
    let benchmark = SyntheticProvider::new(end_date())
        .with_drift(0.001)
        .with_volatility(0.0);
    let policy = RetryPolicy::immediate(1);

    let engine = IndicatorEngine::default();
    let index = fetch_series(&benchmark, "^NSEI", FetchRequest::default(), &policy).unwrap();
    let benchmark_return = engine.benchmark_return(&index).computed().unwrap();

    let window = fetch_series(&source, "UP.NS", FetchRequest::default(), &policy).unwrap();
    let set = engine.evaluate(&window, benchmark_return);
    assert!(!set.degenerate.any());
    assert!(set.is_52w_high);
    assert!(TrendTemplate.passes(&set));
}

/// Source that always returns rows with a missing close.
struct Holey;

impl MarketDataSource for Holey {
    fn name(&self) -> &str {
        "holey"
    }

    fn fetch(
        &self,
        _symbol: &str,
        _period_days: u32,
        _interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        Ok(vec![RawBar {
            date: end_date(),
            open: Some(1.0),
            high: Some(1.0),
            low: Some(1.0),
            close: None,
            volume: Some(10),
        }])
    }
}

#[test]
fn all_incomplete_rows_is_an_empty_series() {
    let err = fetch_series(
        &Holey,
        "HOLE.NS",
        FetchRequest::default(),
        &RetryPolicy::immediate(3),
    )
    .unwrap_err();
    assert!(matches!(err, DataError::EmptySeries { .. }));
}

#[test]
fn universe_symbols_feed_the_source() {
    let universe = Universe::from_symbols(["infy", " tcs ", ""], ".NS");
    assert_eq!(universe.symbols(), ["INFY.NS", "TCS.NS"]);

    let source = SyntheticProvider::new(end_date());
    for symbol in universe.symbols() {
        let bars = source.fetch(symbol, 30, Interval::Daily).unwrap();
        assert!(!bars.is_empty());
    }
}
