//! Trend template: the pass/fail rule applied to every ticker.
//!
//! A ticker passes when all three hold:
//! 1. it outperformed the benchmark (`relative_strength > 0`),
//! 2. the short EMA is above the long EMA,
//! 3. the long EMA is higher than it was `ema_lag` bars ago.
//!
//! Degenerate indicators arrive as 0 and fail the strict comparisons.

use crate::indicators::IndicatorSet;

/// Per-criterion outcome of the trend template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateVerdict {
    pub outperforms_benchmark: bool,
    pub short_above_long: bool,
    pub long_trend_rising: bool,
}

impl TemplateVerdict {
    pub fn passes(&self) -> bool {
        self.outperforms_benchmark && self.short_above_long && self.long_trend_rising
    }

    /// Names of the criteria that failed, for logging.
    pub fn failures(&self) -> Vec<&'static str> {
        let mut failed = Vec::new();
        if !self.outperforms_benchmark {
            failed.push("relative_strength");
        }
        if !self.short_above_long {
            failed.push("short_above_long");
        }
        if !self.long_trend_rising {
            failed.push("long_trend_rising");
        }
        failed
    }
}

/// Minervini-style trend template.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrendTemplate;

impl TrendTemplate {
    pub fn evaluate(&self, set: &IndicatorSet) -> TemplateVerdict {
        TemplateVerdict {
            outperforms_benchmark: set.relative_strength > 0.0,
            short_above_long: set.ema_50_now > set.ema_200_now,
            long_trend_rising: set.ema_200_now > set.ema_200_lag21,
        }
    }

    pub fn passes(&self, set: &IndicatorSet) -> bool {
        self.evaluate(set).passes()
    }
}
