//! Criterion benchmarks for the per-ticker indicator path.
//!
//! Benchmarks:
//! 1. Row cleaning (raw provider rows to a series window)
//! 2. Single indicators (EMA pair, rolling 52-week high)
//! 3. Full indicator set + trend template for one ticker

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use smartscreen_core::data::{clean_rows, RawBar};
use smartscreen_core::domain::SeriesWindow;
use smartscreen_core::indicators::{ema, rolling_52w_high, IndicatorEngine, EMA_LAG, HIGH_WINDOW};
use smartscreen_core::rule::TrendTemplate;

// ── Helpers ──────────────────────────────────────────────────────────

fn make_raw_bars(n: usize) -> Vec<RawBar> {
    let base_date = chrono::NaiveDate::from_ymd_opt(2020, 1, 2).unwrap();
    (0..n)
        .map(|i| {
            let close = 100.0 + (i as f64 * 0.1).sin() * 10.0 + i as f64 * 0.05;
            RawBar {
                date: base_date + chrono::Duration::days(i as i64),
                open: Some(close - 0.3),
                high: Some(close + 1.5),
                low: Some(close - 1.5),
                // Every 50th row is incomplete, like a provider hole.
                close: (i % 50 != 49).then_some(close),
                volume: Some(1_000_000 + (i as u64 % 500_000)),
            }
        })
        .collect()
}

fn make_window(n: usize) -> SeriesWindow {
    clean_rows("BENCH.NS", make_raw_bars(n))
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_cleaning(c: &mut Criterion) {
    let mut group = c.benchmark_group("clean_rows");
    for &bar_count in &[252, 1260] {
        let raw = make_raw_bars(bar_count);
        group.bench_with_input(BenchmarkId::from_parameter(bar_count), &raw, |b, raw| {
            b.iter(|| clean_rows("BENCH.NS", black_box(raw.clone())));
        });
    }
    group.finish();
}

fn bench_indicators(c: &mut Criterion) {
    let mut group = c.benchmark_group("indicators");
    for &bar_count in &[252, 1260, 2520] {
        let closes = make_window(bar_count).closes();
        group.bench_with_input(BenchmarkId::new("ema_200", bar_count), &closes, |b, closes| {
            b.iter(|| ema(black_box(closes), 200, EMA_LAG));
        });
        group.bench_with_input(BenchmarkId::new("high_52w", bar_count), &closes, |b, closes| {
            b.iter(|| rolling_52w_high(black_box(closes), HIGH_WINDOW));
        });
    }
    group.finish();
}

fn bench_ticker_evaluation(c: &mut Criterion) {
    let window = make_window(252);
    let engine = IndicatorEngine::default();
    c.bench_function("ticker_evaluation_252", |b| {
        b.iter(|| {
            let set = engine.evaluate(black_box(&window), black_box(1.05));
            TrendTemplate.passes(&set)
        });
    });
}

criterion_group!(benches, bench_cleaning, bench_indicators, bench_ticker_evaluation);
criterion_main!(benches);
