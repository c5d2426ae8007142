//! Screener configuration.
//!
//! `ScreenerConfig` is the on-disk TOML document (`smartscreen.toml`); every
//! field has a default, so an empty or missing file is a valid config.
//! `PipelineConfig` is the resolved, runtime view handed to the pipeline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use smartscreen_core::data::{FetchRequest, Interval, RetryPolicy};
use smartscreen_core::indicators::{IndicatorParams, EMA_LAG, HIGH_WINDOW};

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "smartscreen.toml";

/// Errors from loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config '{path}': {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Top-level screener configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScreenerConfig {
    /// Benchmark index symbol, used as-is (no suffix).
    pub benchmark: String,
    /// Suffix appended to every universe symbol.
    pub market_suffix: String,
    /// Exchange prefix of the chart link.
    pub exchange: String,
    pub universe_file: PathBuf,
    /// JSON document holding the refresh marker.
    pub state_file: PathBuf,
    pub cache_file: PathBuf,
    pub pipeline: PipelineSettings,
    pub retry: RetrySettings,
}

impl Default for ScreenerConfig {
    fn default() -> Self {
        Self {
            benchmark: "^NSEI".into(),
            market_suffix: ".NS".into(),
            exchange: "NSE".into(),
            universe_file: PathBuf::from("data/NIFTY500_List.csv"),
            state_file: PathBuf::from("data/config.json"),
            cache_file: PathBuf::from("data/minervini_results.csv"),
            pipeline: PipelineSettings::default(),
            retry: RetrySettings::default(),
        }
    }
}

/// `[pipeline]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PipelineSettings {
    pub rs_period: usize,
    /// Calendar days of history requested per ticker.
    pub period_days: u32,
    pub short_ema: usize,
    pub long_ema: usize,
    pub ema_lag: usize,
    pub high_window: usize,
    /// Tickers in flight at once. 1 runs sequentially.
    pub max_concurrency: usize,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            rs_period: 100,
            period_days: 365,
            short_ema: 50,
            long_ema: 200,
            ema_lag: EMA_LAG,
            high_window: HIGH_WINDOW,
            max_concurrency: 4,
        }
    }
}

/// `[retry]` table.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RetrySettings {
    pub max_attempts: u32,
    pub backoff_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_secs: 10,
        }
    }
}

impl ScreenerConfig {
    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` if given, else `smartscreen.toml` if it exists, else defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_FILE);
                if default_path.exists() {
                    Self::from_file(default_path)
                } else {
                    tracing::debug!("no {DEFAULT_CONFIG_FILE} found, using defaults");
                    Ok(Self::default())
                }
            }
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let p = &self.pipeline;
        if self.benchmark.trim().is_empty() {
            return Err(ConfigError::Invalid("benchmark must not be empty".into()));
        }
        if p.rs_period == 0 || p.short_ema == 0 || p.long_ema == 0 || p.high_window == 0 {
            return Err(ConfigError::Invalid(
                "rs_period, short_ema, long_ema and high_window must be positive".into(),
            ));
        }
        if p.short_ema >= p.long_ema {
            return Err(ConfigError::Invalid(format!(
                "short_ema ({}) must be below long_ema ({})",
                p.short_ema, p.long_ema
            )));
        }
        if p.max_concurrency == 0 {
            return Err(ConfigError::Invalid("max_concurrency must be at least 1".into()));
        }
        if self.retry.max_attempts == 0 {
            return Err(ConfigError::Invalid("retry.max_attempts must be at least 1".into()));
        }
        Ok(())
    }

    /// Runtime view of this config.
    pub fn pipeline_config(&self) -> PipelineConfig {
        let p = &self.pipeline;
        PipelineConfig {
            params: IndicatorParams {
                rs_period: p.rs_period,
                short_ema: p.short_ema,
                long_ema: p.long_ema,
                ema_lag: p.ema_lag,
                high_window: p.high_window,
            },
            request: FetchRequest {
                period_days: p.period_days,
                interval: Interval::Daily,
            },
            retry: RetryPolicy {
                max_attempts: self.retry.max_attempts,
                backoff: Duration::from_secs(self.retry.backoff_secs),
            },
            max_concurrency: p.max_concurrency,
            exchange: self.exchange.clone(),
        }
    }
}

/// Everything the screening pipeline needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub params: IndicatorParams,
    pub request: FetchRequest,
    pub retry: RetryPolicy,
    pub max_concurrency: usize,
    /// Exchange prefix of chart links.
    pub exchange: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        ScreenerConfig::default().pipeline_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_document_is_all_defaults() {
        let config = ScreenerConfig::from_toml("").unwrap();
        assert_eq!(config, ScreenerConfig::default());
        assert_eq!(config.benchmark, "^NSEI");
        assert_eq!(config.pipeline.rs_period, 100);
        assert_eq!(config.retry.backoff_secs, 10);
    }

    #[test]
    fn partial_tables_keep_other_defaults() {
        let config = ScreenerConfig::from_toml(
            r#"
            benchmark = "^GSPC"
            market_suffix = ""

            [pipeline]
            max_concurrency = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.benchmark, "^GSPC");
        assert_eq!(config.market_suffix, "");
        assert_eq!(config.pipeline.max_concurrency, 8);
        assert_eq!(config.pipeline.long_ema, 200);
        assert_eq!(config.retry.max_attempts, 2);
    }

    #[test]
    fn toml_roundtrip() {
        let config = ScreenerConfig::default();
        let text = toml::to_string_pretty(&config).unwrap();
        assert_eq!(ScreenerConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn from_file_rejects_invalid_values() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[pipeline]\nshort_ema = 200\nlong_ema = 50").unwrap();
        let err = ScreenerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn from_file_reports_parse_errors() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "benchmark = ").unwrap();
        let err = ScreenerConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = ScreenerConfig::from_file(Path::new("/nonexistent/smartscreen.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn pipeline_config_carries_settings() {
        let mut config = ScreenerConfig::default();
        config.pipeline.max_concurrency = 1;
        config.retry.backoff_secs = 0;
        let pipeline = config.pipeline_config();
        assert_eq!(pipeline.max_concurrency, 1);
        assert_eq!(pipeline.retry.backoff, Duration::ZERO);
        assert_eq!(pipeline.params, IndicatorParams::default());
        assert_eq!(pipeline.request.period_days, 365);
        assert_eq!(pipeline.exchange, "NSE");
    }
}
