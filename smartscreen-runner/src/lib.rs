//! SmartScreen Runner: screening pipeline, refresh policy and result cache.
//!
//! This crate builds on `smartscreen-core` to provide:
//! - Screener configuration (TOML, every field defaulted)
//! - The screening pipeline over a ticker universe, on a bounded rayon pool
//! - The refresh marker and fresh/stale decision
//! - The CSV result cache with a BLAKE3 digest sidecar
//! - Run orchestration and logging setup for the CLI

mod atomic;
pub mod cache;
pub mod config;
pub mod logging;
pub mod pipeline;
pub mod refresh;
pub mod result;
pub mod run;

pub use cache::{CacheError, CacheMeta, ResultCache};
pub use config::{ConfigError, PipelineConfig, ScreenerConfig};
pub use pipeline::{ScreenReport, ScreenSummary, ScreeningPipeline, TickerOutcome};
pub use refresh::{Freshness, RefreshPolicy, RefreshState, StateError};
pub use result::{chart_link, ScreenResult};
pub use run::{run_screen, RunError, RunOptions, ScreenRun};
