//! Quarterly fundamentals: EPS and sales growth.
//!
//! Growth is reported as a percentage rounded to two decimals. Quarter over
//! quarter compares the latest quarter with the one before it; year over year
//! compares it with the same quarter four reports earlier.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::data::DataError;

/// One reported quarterly value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyPoint {
    pub period_end: NaiveDate,
    pub value: f64,
}

/// Quarterly income statement lines used by the growth summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuarterlyIncome {
    pub diluted_eps: Vec<QuarterlyPoint>,
    pub total_revenue: Vec<QuarterlyPoint>,
}

/// Source of quarterly income statements.
pub trait FundamentalsSource: Send + Sync {
    fn quarterly_income(&self, symbol: &str) -> Result<QuarterlyIncome, DataError>;
}

/// QoQ / YoY growth of EPS and sales, in percent.
///
/// A field is `None` when the history is too short or the base value is zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct FundamentalGrowth {
    pub qoq_eps: Option<f64>,
    pub qoq_sales: Option<f64>,
    pub yoy_eps: Option<f64>,
    pub yoy_sales: Option<f64>,
}

impl FundamentalGrowth {
    pub fn from_quarterly(income: &QuarterlyIncome) -> Self {
        let eps = sorted_values(&income.diluted_eps);
        let sales = sorted_values(&income.total_revenue);
        Self {
            qoq_eps: growth_back(&eps, 1),
            qoq_sales: growth_back(&sales, 1),
            yoy_eps: growth_back(&eps, 4),
            yoy_sales: growth_back(&sales, 4),
        }
    }
}

fn sorted_values(points: &[QuarterlyPoint]) -> Vec<f64> {
    let mut points = points.to_vec();
    points.sort_by_key(|p| p.period_end);
    points.into_iter().map(|p| p.value).collect()
}

/// Percent change of the latest value against the value `quarters` reports earlier.
fn growth_back(values: &[f64], quarters: usize) -> Option<f64> {
    let n = values.len();
    if n <= quarters {
        return None;
    }
    pct_change(values[n - 1], values[n - 1 - quarters])
}

fn pct_change(latest: f64, base: f64) -> Option<f64> {
    if base == 0.0 || !base.is_finite() || !latest.is_finite() {
        return None;
    }
    let pct = (latest / base - 1.0) * 100.0;
    Some((pct * 100.0).round() / 100.0)
}
