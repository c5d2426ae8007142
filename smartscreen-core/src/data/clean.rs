//! Post-fetch cleaning: raw provider rows to a `SeriesWindow`.
//!
//! Rows with any missing or non-finite field are dropped, as are rows with a
//! non-positive close. The rest are sorted by date and de-duplicated (first
//! row per date wins). Cleaning never fails; an all-bad fetch simply yields an
//! empty window.

use super::provider::RawBar;
use crate::domain::{Bar, SeriesWindow};

/// Convert one raw row into a bar, or `None` if it is incomplete.
pub fn complete_bar(raw: &RawBar) -> Option<Bar> {
    let bar = Bar {
        date: raw.date,
        open: raw.open?,
        high: raw.high?,
        low: raw.low?,
        close: raw.close?,
        volume: raw.volume?,
    };
    let finite = [bar.open, bar.high, bar.low, bar.close]
        .iter()
        .all(|v| v.is_finite());
    (finite && bar.close > 0.0).then_some(bar)
}

/// Drop incomplete rows and build the window for `symbol`.
pub fn clean_rows(symbol: &str, raw: Vec<RawBar>) -> SeriesWindow {
    let fetched = raw.len();
    let mut bars: Vec<Bar> = raw.iter().filter_map(complete_bar).collect();
    bars.sort_by_key(|b| b.date);
    bars.dedup_by_key(|b| b.date);

    let dropped = fetched - bars.len();
    if dropped > 0 {
        tracing::debug!(symbol, fetched, dropped, "dropped incomplete rows");
    }

    SeriesWindow::new(symbol, bars)
}
