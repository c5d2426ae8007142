//! SeriesWindow: the trailing bar history of one ticker.

use chrono::NaiveDate;

use super::Bar;

/// Ordered (ascending by date) bars for a single symbol.
///
/// A window is owned by the pipeline task that fetched it and is never
/// shared or mutated across tickers.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesWindow {
    symbol: String,
    bars: Vec<Bar>,
}

impl SeriesWindow {
    /// Build a window, sorting bars by date if the source delivered them out of order.
    pub fn new(symbol: impl Into<String>, mut bars: Vec<Bar>) -> Self {
        if !bars.windows(2).all(|w| w[0].date <= w[1].date) {
            bars.sort_by_key(|b| b.date);
        }
        Self {
            symbol: symbol.into(),
            bars,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn bars(&self) -> &[Bar] {
        &self.bars
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// Close prices in date order.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| b.close).collect()
    }

    pub fn last_close(&self) -> Option<f64> {
        self.bars.last().map(|b| b.close)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.bars.last().map(|b| b.date)
    }
}
