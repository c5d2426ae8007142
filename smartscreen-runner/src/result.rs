//! Screen result rows.

use serde::{Deserialize, Serialize};

use smartscreen_core::indicators::HISTORY_LEN;

/// One ticker that passed the trend template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenResult {
    /// Full provider symbol, e.g. `RELIANCE.NS`.
    pub ticker: String,
    pub relative_strength: f64,
    /// Latest close.
    pub close: f64,
    /// Latest close sits at its rolling 52-week high.
    pub new_high: bool,
    pub chart_link: String,
    /// New-high flags of the most recent bars, oldest first.
    pub recent_52w_high_flags: [u8; HISTORY_LEN],
}

impl ScreenResult {
    /// Flags as a digit string, e.g. `0000110111`.
    pub fn history_string(&self) -> String {
        flags_to_string(&self.recent_52w_high_flags)
    }
}

/// Symbol up to the first `.`: `RELIANCE.NS` -> `RELIANCE`.
pub fn base_symbol(symbol: &str) -> &str {
    symbol.split('.').next().unwrap_or(symbol)
}

/// TradingView chart link for `symbol` on `exchange`.
pub fn chart_link(symbol: &str, exchange: &str) -> String {
    format!(
        "https://in.tradingview.com/chart/?symbol={exchange}%3A{}",
        base_symbol(symbol)
    )
}

pub fn flags_to_string(flags: &[u8]) -> String {
    flags.iter().map(|&f| if f > 0 { '1' } else { '0' }).collect()
}

/// Parse a digit string back into flags. Shorter strings are left-padded with 0.
pub fn flags_from_str(s: &str) -> Option<[u8; HISTORY_LEN]> {
    let s = s.trim();
    if s.len() > HISTORY_LEN {
        return None;
    }
    let mut flags = [0u8; HISTORY_LEN];
    let offset = HISTORY_LEN - s.len();
    for (i, c) in s.chars().enumerate() {
        flags[offset + i] = match c {
            '0' => 0,
            '1' => 1,
            _ => return None,
        };
    }
    Some(flags)
}
