//! Result cache: the last screen's passing rows as CSV.
//!
//! Layout:
//! ```text
//! data/minervini_results.csv            Ticker,RS,Close,New High,52W History,TradingView
//! data/minervini_results.csv.meta.json  {"digest": "<blake3 of the csv>", "saved_at": ..., "rows": N}
//! ```
//!
//! Both files are replaced atomically. A body whose digest does not match the
//! sidecar is treated as corrupt. A CSV without a sidecar is still accepted.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::atomic::write_atomic;
use crate::result::{flags_from_str, flags_to_string, ScreenResult};

pub const HEADER: [&str; 6] = ["Ticker", "RS", "Close", "New High", "52W History", "TradingView"];

const NEW_HIGH_MARK: &str = "Y";

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("csv encoding error: {0}")]
    Csv(#[from] csv::Error),
    #[error("failed to serialize cache metadata: {0}")]
    Meta(#[from] serde_json::Error),
    #[error("failed to write cache '{path}': {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Sidecar metadata written next to the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheMeta {
    /// BLAKE3 hex digest of the CSV bytes.
    pub digest: String,
    pub saved_at: DateTime<Utc>,
    pub rows: usize,
}

/// On-disk row shape.
#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Ticker")]
    ticker: String,
    #[serde(rename = "RS")]
    rs: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "New High")]
    new_high: String,
    #[serde(rename = "52W History")]
    history: String,
    #[serde(rename = "TradingView")]
    chart_link: String,
}

impl From<&ScreenResult> for CsvRow {
    fn from(r: &ScreenResult) -> Self {
        Self {
            ticker: r.ticker.clone(),
            rs: r.relative_strength,
            close: r.close,
            new_high: if r.new_high { NEW_HIGH_MARK.into() } else { String::new() },
            history: flags_to_string(&r.recent_52w_high_flags),
            chart_link: r.chart_link.clone(),
        }
    }
}

impl CsvRow {
    fn into_result(self) -> Option<ScreenResult> {
        Some(ScreenResult {
            recent_52w_high_flags: flags_from_str(&self.history)?,
            new_high: self.new_high.trim() == NEW_HIGH_MARK,
            ticker: self.ticker,
            relative_strength: self.rs,
            close: self.close,
            chart_link: self.chart_link,
        })
    }
}

#[derive(Debug, Clone)]
pub struct ResultCache {
    path: PathBuf,
}

impl ResultCache {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn meta_path(&self) -> PathBuf {
        let mut name = self.path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        name.push(".meta.json");
        self.path.with_file_name(name)
    }

    pub fn is_present(&self) -> bool {
        self.path.is_file()
    }

    /// Sidecar metadata, if present and readable.
    pub fn meta(&self) -> Option<CacheMeta> {
        let content = std::fs::read_to_string(self.meta_path()).ok()?;
        serde_json::from_str(&content).ok()
    }

    /// Cached rows. `None` if the cache is absent or corrupt.
    pub fn load(&self) -> Option<Vec<ScreenResult>> {
        let body = match std::fs::read(&self.path) {
            Ok(body) => body,
            Err(e) => {
                tracing::debug!(path = %self.path.display(), error = %e, "no result cache");
                return None;
            }
        };

        if self.meta_path().exists() {
            match self.meta() {
                Some(meta) if meta.digest == blake3::hash(&body).to_hex().as_str() => {}
                Some(_) => {
                    tracing::warn!(path = %self.path.display(), "result cache digest mismatch, ignoring cache");
                    return None;
                }
                None => {
                    tracing::warn!(path = %self.path.display(), "unreadable cache metadata, ignoring cache");
                    return None;
                }
            }
        }

        match parse_rows(&body) {
            Some(rows) => {
                tracing::debug!(path = %self.path.display(), rows = rows.len(), "loaded result cache");
                Some(rows)
            }
            None => {
                tracing::warn!(path = %self.path.display(), "malformed result cache, ignoring cache");
                None
            }
        }
    }

    /// Overwrite the cache with `rows`. An empty set writes the header only.
    pub fn save(&self, rows: &[ScreenResult]) -> Result<(), CacheError> {
        let body = encode_rows(rows)?;
        let meta = CacheMeta {
            digest: blake3::hash(&body).to_hex().to_string(),
            saved_at: Utc::now(),
            rows: rows.len(),
        };
        let meta_json = serde_json::to_string_pretty(&meta)?;

        // Body first: a stale sidecar makes the new body look corrupt, never the reverse.
        write_atomic(&self.path, &body).map_err(|source| CacheError::Write {
            path: self.path.clone(),
            source,
        })?;
        let meta_path = self.meta_path();
        write_atomic(&meta_path, meta_json.as_bytes()).map_err(|source| CacheError::Write {
            path: meta_path.clone(),
            source,
        })?;

        tracing::info!(path = %self.path.display(), rows = rows.len(), "result cache saved");
        Ok(())
    }
}

fn encode_rows(rows: &[ScreenResult]) -> Result<Vec<u8>, CacheError> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());
    writer.write_record(HEADER)?;
    for row in rows {
        writer.serialize(CsvRow::from(row))?;
    }
    writer
        .into_inner()
        .map_err(|e| CacheError::Csv(csv::Error::from(e.into_error())))
}

fn parse_rows(body: &[u8]) -> Option<Vec<ScreenResult>> {
    let mut reader = csv::Reader::from_reader(body);
    let headers = reader.headers().ok()?;
    if headers.iter().ne(HEADER) {
        return None;
    }
    reader
        .deserialize::<CsvRow>()
        .map(|row| row.ok()?.into_result())
        .collect()
}
