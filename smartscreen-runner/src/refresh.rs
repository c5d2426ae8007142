//! Refresh marker and the fresh/stale decision.
//!
//! The marker is the benchmark's latest trading date as of the last completed
//! screen, persisted as `{"refresh_date": "YYYY-MM-DD", ...}`. It is advanced
//! only after a run has finished and its results were saved, so an
//! interrupted run is simply repeated next time.

use std::path::{Path, PathBuf};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic::write_atomic;

/// Marker assumed when no state file exists.
pub fn default_refresh_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2023, 10, 1).unwrap_or_default()
}

#[derive(Debug, Error)]
pub enum StateError {
    #[error("failed to serialize refresh state: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write refresh state '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Persisted refresh state. Keys other than `refresh_date` are kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshState {
    #[serde(default = "default_refresh_date")]
    pub refresh_date: NaiveDate,
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Default for RefreshState {
    fn default() -> Self {
        Self {
            refresh_date: default_refresh_date(),
            extra: serde_json::Map::new(),
        }
    }
}

impl RefreshState {
    /// Load the state at `path`. Missing or malformed files yield the default state.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "no refresh state, using default");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "unreadable refresh state, using default");
                return Self::default();
            }
        };
        match serde_json::from_str(&content) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "malformed refresh state, using default");
                Self::default()
            }
        }
    }

    /// Set the marker to `date` and persist the whole document.
    pub fn commit(&mut self, date: NaiveDate, path: &Path) -> Result<(), StateError> {
        self.refresh_date = date;
        let json = serde_json::to_string_pretty(self)?;
        write_atomic(path, json.as_bytes()).map_err(|source| StateError::Write {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!(refresh_date = %date, "refresh marker advanced");
        Ok(())
    }
}

/// Whether cached results still describe the latest trading day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Freshness {
    Fresh,
    Stale { refresh_to: NaiveDate },
}

impl Freshness {
    pub fn is_fresh(&self) -> bool {
        matches!(self, Freshness::Fresh)
    }
}

pub struct RefreshPolicy;

impl RefreshPolicy {
    /// Fresh iff the benchmark has no newer trading day than the marker and a cache exists.
    pub fn decide(benchmark_latest: NaiveDate, state: &RefreshState, cache_present: bool) -> Freshness {
        if benchmark_latest == state.refresh_date && cache_present {
            Freshness::Fresh
        } else {
            Freshness::Stale {
                refresh_to: benchmark_latest,
            }
        }
    }
}
