//! Screening pipeline: fetch, evaluate and filter every ticker of a universe.
//!
//! Tickers are independent. Each one is fetched through the retry policy,
//! turned into an indicator set and run through the trend template. A data
//! failure skips the ticker and never aborts the batch. With
//! `max_concurrency > 1` tickers run on a private rayon pool; results are
//! collected in universe order either way.

use std::sync::Arc;

use rayon::prelude::*;
use serde::Serialize;

use smartscreen_core::data::{fetch_series, normalize_symbol, DataError, MarketDataSource, Universe};
use smartscreen_core::domain::SeriesWindow;
use smartscreen_core::indicators::{IndicatorEngine, IndicatorSet};
use smartscreen_core::rule::TrendTemplate;

use crate::config::PipelineConfig;
use crate::result::{chart_link, ScreenResult};
use crate::run::RunError;

/// What happened to one ticker.
#[derive(Debug)]
pub enum TickerOutcome {
    Passed(ScreenResult),
    /// Fetched and evaluated, but failed the template.
    Rejected,
    /// No usable data.
    Skipped(DataError),
}

/// Counts over one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScreenSummary {
    pub universe: usize,
    pub fetched: usize,
    pub skipped: usize,
    /// Skipped because the provider's circuit breaker refused the request.
    /// Counted in `skipped` too.
    pub refused: usize,
    pub passed: usize,
}

impl ScreenSummary {
    /// Every ticker got its fetch attempts. False when the breaker cut the run short.
    pub fn is_complete(&self) -> bool {
        self.refused == 0
    }
}

/// Passing rows in universe order, plus counts.
#[derive(Debug, Clone, Default)]
pub struct ScreenReport {
    pub rows: Vec<ScreenResult>,
    pub summary: ScreenSummary,
}

pub struct ScreeningPipeline {
    config: PipelineConfig,
    engine: IndicatorEngine,
    template: TrendTemplate,
    source: Arc<dyn MarketDataSource>,
}

impl ScreeningPipeline {
    pub fn new(config: PipelineConfig, source: Arc<dyn MarketDataSource>) -> Self {
        Self {
            engine: IndicatorEngine::new(config.params),
            template: TrendTemplate,
            config,
            source,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// Fetch a series with the configured request and retry policy.
    pub fn fetch(&self, symbol: &str) -> Result<SeriesWindow, DataError> {
        fetch_series(
            self.source.as_ref(),
            symbol,
            self.config.request,
            &self.config.retry,
        )
    }

    /// Screen one ticker against a precomputed benchmark return.
    pub fn screen_ticker(&self, symbol: &str, benchmark_return: f64) -> TickerOutcome {
        let symbol = normalize_symbol(symbol);

        let window = match self.fetch(&symbol) {
            Ok(window) => window,
            Err(e) => {
                tracing::warn!(symbol = %symbol, error = %e, "skipping ticker");
                return TickerOutcome::Skipped(e);
            }
        };

        let set = self.engine.evaluate(&window, benchmark_return);
        if set.degenerate.any() {
            tracing::debug!(symbol = %symbol, bars = window.len(), flags = ?set.degenerate, "degenerate indicators");
        }

        let verdict = self.template.evaluate(&set);
        if !verdict.passes() {
            tracing::debug!(symbol = %symbol, failed = ?verdict.failures(), "rejected");
            return TickerOutcome::Rejected;
        }

        TickerOutcome::Passed(self.to_result(&symbol, &set))
    }

    fn to_result(&self, symbol: &str, set: &IndicatorSet) -> ScreenResult {
        ScreenResult {
            ticker: symbol.to_string(),
            relative_strength: set.relative_strength,
            close: set.last_close,
            new_high: set.is_52w_high,
            chart_link: chart_link(symbol, &self.config.exchange),
            recent_52w_high_flags: set.recent_52w_high_flags,
        }
    }

    /// Screen every ticker of `universe`.
    pub fn run(&self, universe: &Universe, benchmark_return: f64) -> Result<ScreenReport, RunError> {
        let symbols = universe.symbols();
        tracing::info!(
            tickers = symbols.len(),
            source = self.source.name(),
            concurrency = self.config.max_concurrency,
            "screening universe"
        );

        let outcomes: Vec<TickerOutcome> = if self.config.max_concurrency > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.config.max_concurrency)
                .build()
                .map_err(|e| RunError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                symbols
                    .par_iter()
                    .map(|symbol| self.screen_ticker(symbol, benchmark_return))
                    .collect()
            })
        } else {
            symbols
                .iter()
                .map(|symbol| self.screen_ticker(symbol, benchmark_return))
                .collect()
        };

        let mut report = ScreenReport {
            rows: Vec::new(),
            summary: ScreenSummary {
                universe: symbols.len(),
                ..ScreenSummary::default()
            },
        };
        for outcome in outcomes {
            match outcome {
                TickerOutcome::Passed(row) => {
                    report.summary.fetched += 1;
                    report.summary.passed += 1;
                    report.rows.push(row);
                }
                TickerOutcome::Rejected => report.summary.fetched += 1,
                TickerOutcome::Skipped(e) => {
                    report.summary.skipped += 1;
                    if matches!(e, DataError::CircuitBreakerTripped) {
                        report.summary.refused += 1;
                    }
                }
            }
        }

        tracing::info!(
            fetched = report.summary.fetched,
            skipped = report.summary.skipped,
            refused = report.summary.refused,
            passed = report.summary.passed,
            "screen complete"
        );
        Ok(report)
    }
}
