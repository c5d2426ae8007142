//! Screen orchestration: benchmark, refresh decision, pipeline, persistence.
//!
//! Order of effects for a stale run:
//! 1. fetch the benchmark (fatal if unavailable)
//! 2. decide fresh/stale from the benchmark's latest date and the marker
//! 3. load the universe and run the pipeline
//! 4. save the result cache
//! 5. advance the refresh marker
//!
//! A failure anywhere before step 5 leaves the marker untouched. So does a
//! run cut short by the provider's circuit breaker: the partial rows are
//! returned in the error and neither the cache nor the marker move.

use std::sync::Arc;

use chrono::NaiveDate;
use thiserror::Error;

use smartscreen_core::data::{DataError, MarketDataSource, Universe, UniverseError};

use crate::cache::{CacheError, ResultCache};
use crate::config::{ConfigError, ScreenerConfig};
use crate::pipeline::{ScreenSummary, ScreeningPipeline};
use crate::refresh::{Freshness, RefreshPolicy, RefreshState, StateError};
use crate::result::ScreenResult;

/// Errors that abort a screen.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("universe error: {0}")]
    Universe(#[from] UniverseError),
    #[error("benchmark '{symbol}' unavailable: {source}")]
    Benchmark {
        symbol: String,
        #[source]
        source: DataError,
    },
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
    #[error("state error: {0}")]
    State(#[from] StateError),
    #[error("failed to build worker pool: {0}")]
    ThreadPool(String),
    #[error("data source '{0}' is unavailable (circuit breaker open)")]
    SourceUnavailable(String),
    #[error(
        "screen incomplete: {} of {} ticker(s) refused by the circuit breaker",
        .summary.refused,
        .summary.universe
    )]
    Incomplete {
        summary: ScreenSummary,
        rows: Vec<ScreenResult>,
    },
}

#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    /// Screen even when the cache is fresh.
    pub force: bool,
}

/// Rows of a screen and where they came from.
#[derive(Debug, Clone)]
pub struct ScreenRun {
    pub rows: Vec<ScreenResult>,
    /// The benchmark's latest trading date.
    pub as_of: NaiveDate,
    /// True when the rows were served from the cache.
    pub from_cache: bool,
    /// Present when the pipeline ran.
    pub summary: Option<ScreenSummary>,
}

/// Run a screen with `config` against `source`, serving from the cache when fresh.
pub fn run_screen(
    config: &ScreenerConfig,
    source: Arc<dyn MarketDataSource>,
    options: RunOptions,
) -> Result<ScreenRun, RunError> {
    config.validate()?;
    if !source.is_available() {
        return Err(RunError::SourceUnavailable(source.name().to_string()));
    }
    let pipeline = ScreeningPipeline::new(config.pipeline_config(), source);

    let benchmark = pipeline
        .fetch(&config.benchmark)
        .map_err(|source| RunError::Benchmark {
            symbol: config.benchmark.clone(),
            source,
        })?;
    let as_of = benchmark.last_date().ok_or_else(|| RunError::Benchmark {
        symbol: config.benchmark.clone(),
        source: DataError::EmptySeries {
            symbol: config.benchmark.clone(),
        },
    })?;

    let mut state = RefreshState::load(&config.state_file);
    let cache = ResultCache::new(&config.cache_file);

    let decision = if options.force {
        Freshness::Stale { refresh_to: as_of }
    } else {
        RefreshPolicy::decide(as_of, &state, cache.is_present())
    };
    tracing::info!(
        benchmark = %config.benchmark,
        latest = %as_of,
        marker = %state.refresh_date,
        force = options.force,
        fresh = decision.is_fresh(),
        "refresh decision"
    );

    if decision.is_fresh() {
        if let Some(rows) = cache.load() {
            return Ok(ScreenRun {
                rows,
                as_of,
                from_cache: true,
                summary: None,
            });
        }
        tracing::warn!("cache unusable despite fresh marker, screening again");
    }

    let benchmark_return = match pipeline.engine().benchmark_return(&benchmark).computed() {
        Some(r) => r,
        None => {
            tracing::warn!(
                benchmark = %config.benchmark,
                bars = benchmark.len(),
                "degenerate benchmark return, relative strength will be 0"
            );
            0.0
        }
    };

    let universe = Universe::from_csv(&config.universe_file, &config.market_suffix)?;
    let report = pipeline.run(&universe, benchmark_return)?;

    if !report.summary.is_complete() {
        tracing::error!(
            refused = report.summary.refused,
            universe = report.summary.universe,
            "circuit breaker cut the screen short, keeping cache and marker"
        );
        return Err(RunError::Incomplete {
            summary: report.summary,
            rows: report.rows,
        });
    }

    cache.save(&report.rows)?;
    state.commit(as_of, &config.state_file)?;

    Ok(ScreenRun {
        rows: report.rows,
        as_of,
        from_cache: false,
        summary: Some(report.summary),
    })
}
