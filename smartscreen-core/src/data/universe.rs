//! Ticker universe: the fixed list of symbols a screen walks through.
//!
//! The universe file is an index constituent list (CSV) with a `Symbol`
//! column; every other column is ignored. Each symbol is trimmed, uppercased
//! and suffixed with the market identifier (e.g. `.NS`) to form the symbol the
//! data provider expects.

use polars::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Column holding the exchange symbol in the universe file.
pub const SYMBOL_COLUMN: &str = "Symbol";

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("universe file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read universe file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("universe file {} has no 'Symbol' column", .0.display())]
    MissingSymbolColumn(PathBuf),
}

/// Trim and uppercase a user- or file-supplied symbol.
pub fn normalize_symbol(symbol: &str) -> String {
    symbol.trim().to_uppercase()
}

/// Ordered list of provider symbols.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Universe {
    symbols: Vec<String>,
}

impl Universe {
    /// Build a universe from bare exchange symbols, appending `suffix`.
    ///
    /// Blank entries are skipped and symbols already carrying the suffix are
    /// left as they are. Order is preserved.
    pub fn from_symbols<I, S>(symbols: I, suffix: &str) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let suffix = normalize_symbol(suffix);
        let symbols = symbols
            .into_iter()
            .map(|s| normalize_symbol(s.as_ref()))
            .filter(|s| !s.is_empty())
            .map(|s| {
                if suffix.is_empty() || s.ends_with(&suffix) {
                    s
                } else {
                    format!("{s}{suffix}")
                }
            })
            .collect();
        Self { symbols }
    }

    /// Load the `Symbol` column of a CSV constituent list.
    pub fn from_csv(path: &Path, suffix: &str) -> Result<Self, UniverseError> {
        if !path.exists() {
            return Err(UniverseError::NotFound(path.to_path_buf()));
        }

        let read_err = |source| UniverseError::Read {
            path: path.to_path_buf(),
            source,
        };

        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .finish()
            .and_then(|lf| lf.collect())
            .map_err(read_err)?;

        let column = df
            .column(SYMBOL_COLUMN)
            .map_err(|_| UniverseError::MissingSymbolColumn(path.to_path_buf()))?
            .cast(&DataType::String)
            .map_err(read_err)?;
        let symbols = column.str().map_err(read_err)?;

        Ok(Self::from_symbols(symbols.into_iter().flatten(), suffix))
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }
}
