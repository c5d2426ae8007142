//! Rolling 52-week closing high.
//!
//! `highs[i]` is the maximum close over the trailing `window` bars ending at
//! `i` (inclusive; shorter at the start of the series). A bar is flagged as a
//! new high when its close equals that maximum exactly, so ties with an older
//! high count as hits.

use std::collections::VecDeque;

/// Trading days standing in for "52 weeks" in the trailing-high window.
pub const HIGH_WINDOW: usize = 200;

/// Number of most recent flags kept in the history summary.
pub const HISTORY_LEN: usize = 10;

/// Per-bar high-water mark and new-high flag.
#[derive(Debug, Clone, PartialEq)]
pub struct HighSeries {
    pub highs: Vec<f64>,
    pub flags: Vec<bool>,
}

impl HighSeries {
    /// Whether the latest bar closed at its trailing high. False for an empty series.
    pub fn latest_is_high(&self) -> bool {
        self.flags.last().copied().unwrap_or(false)
    }

    /// The `N` most recent flags as 0/1, oldest first, left-padded with 0.
    pub fn recent_flags<const N: usize>(&self) -> [u8; N] {
        let mut out = [0u8; N];
        let take = self.flags.len().min(N);
        let recent = &self.flags[self.flags.len() - take..];
        for (slot, &flag) in out[N - take..].iter_mut().zip(recent) {
            *slot = u8::from(flag);
        }
        out
    }
}

/// Rolling maximum of `closes` over `window` bars and the exact-equality flag per bar.
///
/// Uses a monotonic deque of indices, so the whole series is O(n).
pub fn rolling_52w_high(closes: &[f64], window: usize) -> HighSeries {
    let window = window.max(1);
    let mut highs = Vec::with_capacity(closes.len());
    let mut flags = Vec::with_capacity(closes.len());
    let mut candidates: VecDeque<usize> = VecDeque::new();

    for (i, &close) in closes.iter().enumerate() {
        while candidates.front().is_some_and(|&j| j + window <= i) {
            candidates.pop_front();
        }
        while candidates.back().is_some_and(|&j| closes[j] <= close) {
            candidates.pop_back();
        }
        candidates.push_back(i);

        let high = closes[candidates[0]];
        highs.push(high);
        flags.push(close == high);
    }

    HighSeries { highs, flags }
}
