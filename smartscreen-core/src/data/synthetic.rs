//! Deterministic synthetic data source for offline runs and tests.
//!
//! Produces a weekday-only random walk per symbol. The walk is seeded from a
//! BLAKE3 hash of the symbol, so the same symbol always yields the same bars
//! and different symbols yield different ones. Results screened on synthetic
//! data are for development only.

use chrono::{Datelike, NaiveDate};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::provider::{DataError, Interval, MarketDataSource, RawBar};

#[derive(Debug, Clone)]
pub struct SyntheticProvider {
    /// Last calendar day generated.
    end: NaiveDate,
    /// Mean daily return.
    drift: f64,
    /// Half-width of the uniform daily return noise.
    volatility: f64,
}

impl SyntheticProvider {
    pub fn new(end: NaiveDate) -> Self {
        Self {
            end,
            drift: 0.0005,
            volatility: 0.02,
        }
    }

    /// Synthetic source ending today.
    pub fn ending_today() -> Self {
        Self::new(chrono::Local::now().date_naive())
    }

    pub fn with_drift(mut self, drift: f64) -> Self {
        self.drift = drift;
        self
    }

    pub fn with_volatility(mut self, volatility: f64) -> Self {
        self.volatility = volatility.abs();
        self
    }

    fn rng_for(symbol: &str) -> StdRng {
        StdRng::from_seed(*blake3::hash(symbol.as_bytes()).as_bytes())
    }

    fn generate(&self, symbol: &str, period_days: u32, interval: Interval) -> Vec<RawBar> {
        let mut rng = Self::rng_for(symbol);
        let start = self.end - chrono::Duration::days(i64::from(period_days));
        let step = match interval {
            Interval::Daily => 1,
            Interval::Weekly => 7,
        };

        let mut bars = Vec::new();
        let mut price = rng.gen_range(50.0..500.0_f64);
        let mut current = start;

        while current <= self.end {
            let weekday = current.weekday();
            if weekday == chrono::Weekday::Sat || weekday == chrono::Weekday::Sun {
                current += chrono::Duration::days(1);
                continue;
            }

            let noise = if self.volatility > 0.0 {
                rng.gen_range(-self.volatility..self.volatility)
            } else {
                0.0
            };
            let open = price;
            let close = (price * (1.0 + self.drift + noise)).max(0.01);
            let high = open.max(close) * (1.0 + rng.gen_range(0.0..0.01));
            let low = open.min(close) * (1.0 - rng.gen_range(0.0..0.01));
            let volume = rng.gen_range(100_000..5_000_000u64);

            bars.push(RawBar {
                date: current,
                open: Some(open),
                high: Some(high),
                low: Some(low),
                close: Some(close),
                volume: Some(volume),
            });

            price = close;
            current += chrono::Duration::days(step);
        }

        bars
    }
}

impl MarketDataSource for SyntheticProvider {
    fn name(&self) -> &str {
        "synthetic"
    }

    fn fetch(
        &self,
        symbol: &str,
        period_days: u32,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        let bars = self.generate(symbol, period_days, interval);
        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(bars)
    }
}
