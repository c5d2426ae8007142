//! Yahoo Finance data source.
//!
//! Fetches daily bars from Yahoo's v8 chart API and quarterly income lines
//! from the fundamentals time-series API. One blocking `reqwest` client is
//! shared by every fetch of a run, so connections are pooled and the
//! provider can be used from several worker threads at once.
//!
//! Yahoo Finance has no official API and is subject to unannounced format changes.

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, Interval, MarketDataSource, RawBar};
use crate::fundamentals::{FundamentalsSource, QuarterlyIncome, QuarterlyPoint};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

const CHART_BASE: &str = "https://query2.finance.yahoo.com/v8/finance/chart";
const TIMESERIES_BASE: &str =
    "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Fundamentals time-series response. Each result carries one statement line
/// under a key named after its type, so entries are read as raw JSON.
#[derive(Debug, Deserialize)]
struct TimeseriesResponse {
    timeseries: TimeseriesResult,
}

#[derive(Debug, Deserialize)]
struct TimeseriesResult {
    #[serde(default)]
    result: Vec<serde_json::Map<String, serde_json::Value>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TimeseriesEntry {
    as_of_date: NaiveDate,
    reported_value: ReportedValue,
}

#[derive(Debug, Deserialize)]
struct ReportedValue {
    raw: f64,
}

const EPS_KEY: &str = "quarterlyDilutedEPS";
const REVENUE_KEY: &str = "quarterlyTotalRevenue";

/// Yahoo Finance data source.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
        })
    }

    /// Index symbols start with `^`, which Yahoo expects percent-encoded in the path.
    fn encode_symbol(symbol: &str) -> String {
        symbol.replace('^', "%5E")
    }

    /// Build the chart API URL for a trailing window ending now.
    fn chart_url(symbol: &str, period_days: u32, interval: Interval, now: i64) -> String {
        let start_ts = now - i64::from(period_days) * 86_400;
        format!(
            "{CHART_BASE}/{}?period1={start_ts}&period2={now}&interval={}&events=history",
            Self::encode_symbol(symbol),
            interval.as_token(),
        )
    }

    fn timeseries_url(symbol: &str, now: i64) -> String {
        // Five years covers the five quarters the YoY comparison needs, with slack
        // for late filings.
        let start_ts = now - 5 * 365 * 86_400;
        format!(
            "{TIMESERIES_BASE}/{sym}?symbol={sym}&type={EPS_KEY},{REVENUE_KEY}\
             &period1={start_ts}&period2={now}",
            sym = Self::encode_symbol(symbol),
        )
    }

    /// Parse the chart API response into raw rows.
    ///
    /// Rows where every field is missing are non-trading days and are skipped
    /// here; rows with only some fields missing are kept for the cleaner.
    fn parse_chart(symbol: &str, resp: ChartResponse) -> Result<Vec<RawBar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        // A symbol without trades in the window comes back without timestamps.
        let Some(timestamps) = data.timestamp else {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        };

        let quote = data.indicators.quote.into_iter().next().unwrap_or_default();

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let date = chrono::DateTime::from_timestamp(ts, 0)
                .map(|dt| dt.naive_utc().date())
                .ok_or_else(|| {
                    DataError::ResponseFormatChanged(format!("invalid timestamp: {ts}"))
                })?;

            let row = RawBar {
                date,
                open: quote.open.get(i).copied().flatten(),
                high: quote.high.get(i).copied().flatten(),
                low: quote.low.get(i).copied().flatten(),
                close: quote.close.get(i).copied().flatten(),
                volume: quote.volume.get(i).copied().flatten(),
            };

            if row.open.is_none()
                && row.high.is_none()
                && row.low.is_none()
                && row.close.is_none()
                && row.volume.is_none()
            {
                continue;
            }
            bars.push(row);
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        Ok(bars)
    }

    fn parse_timeseries(resp: TimeseriesResponse) -> QuarterlyIncome {
        let mut income = QuarterlyIncome::default();
        for result in resp.timeseries.result {
            for (key, target) in [
                (EPS_KEY, &mut income.diluted_eps),
                (REVENUE_KEY, &mut income.total_revenue),
            ] {
                let Some(serde_json::Value::Array(entries)) = result.get(key) else {
                    continue;
                };
                // Quarters Yahoo has no figure for are `null`; skip them.
                target.extend(entries.iter().filter_map(|entry| {
                    serde_json::from_value::<TimeseriesEntry>(entry.clone())
                        .ok()
                        .map(|e| QuarterlyPoint {
                            period_end: e.as_of_date,
                            value: e.reported_value.raw,
                        })
                }));
            }
        }
        income
    }

    /// Single GET with circuit-breaker bookkeeping. Returns the successful response.
    fn get(&self, symbol: &str, url: &str) -> Result<reqwest::blocking::Response, DataError> {
        if !self.circuit_breaker.is_allowed() {
            tracing::debug!(
                symbol,
                cooldown_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                "circuit breaker open, request refused"
            );
            return Err(DataError::CircuitBreakerTripped);
        }

        let resp = self.client.get(url).send().map_err(|e| {
            self.circuit_breaker.record_failure();
            DataError::NetworkUnreachable(e.to_string())
        })?;

        let status = resp.status();
        if status == reqwest::StatusCode::FORBIDDEN {
            self.circuit_breaker.trip();
            tracing::warn!(
                symbol,
                cooldown_secs = self.circuit_breaker.remaining_cooldown().as_secs(),
                "HTTP 403, circuit breaker tripped"
            );
            return Err(DataError::CircuitBreakerTripped);
        }
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            self.circuit_breaker.record_failure();
            let retry_after_secs = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(DataError::RateLimited { retry_after_secs });
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        if !status.is_success() {
            self.circuit_breaker.record_failure();
            return Err(DataError::Http {
                status: status.as_u16(),
                symbol: symbol.to_string(),
            });
        }

        self.circuit_breaker.record_success();
        Ok(resp)
    }
}

impl MarketDataSource for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(
        &self,
        symbol: &str,
        period_days: u32,
        interval: Interval,
    ) -> Result<Vec<RawBar>, DataError> {
        let now = chrono::Utc::now().timestamp();
        let url = Self::chart_url(symbol, period_days, interval, now);
        let chart: ChartResponse = self.get(symbol, &url)?.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!("failed to parse chart for {symbol}: {e}"))
        })?;
        Self::parse_chart(symbol, chart)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

impl FundamentalsSource for YahooProvider {
    fn quarterly_income(&self, symbol: &str) -> Result<QuarterlyIncome, DataError> {
        let now = chrono::Utc::now().timestamp();
        let url = Self::timeseries_url(symbol, now);
        let resp: TimeseriesResponse = self.get(symbol, &url)?.json().map_err(|e| {
            DataError::ResponseFormatChanged(format!(
                "failed to parse fundamentals for {symbol}: {e}"
            ))
        })?;
        let income = Self::parse_timeseries(resp);
        if income.diluted_eps.is_empty() && income.total_revenue.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }
        Ok(income)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(json: &str) -> Result<Vec<RawBar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_chart("TEST.NS", resp)
    }

    #[test]
    fn chart_url_encodes_index_symbols() {
        let url = YahooProvider::chart_url("^NSEI", 365, Interval::Daily, 1_700_000_000);
        assert!(url.contains("/chart/%5ENSEI?"));
        assert!(url.contains("period1=1668464000"));
        assert!(url.contains("period2=1700000000"));
        assert!(url.contains("interval=1d"));
    }

    #[test]
    fn parse_keeps_partial_rows_and_skips_empty_ones() {
        let json = r#"{"chart":{"result":[{
            "timestamp":[1704182400,1704268800,1704355200],
            "indicators":{"quote":[{
                "open":[100.0,null,102.0],
                "high":[101.0,null,103.0],
                "low":[99.0,null,101.0],
                "close":[100.5,null,null],
                "volume":[1000,null,1200]
            }]}
        }],"error":null}}"#;
        let bars = parse(json).unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(bars[0].close, Some(100.5));
        assert_eq!(bars[1].close, None);
        assert_eq!(bars[1].volume, Some(1200));
    }

    #[test]
    fn parse_not_found_error() {
        let json = r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found, symbol may be delisted"}}}"#;
        assert!(matches!(parse(json), Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn parse_missing_timestamps_is_not_found() {
        let json = r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#;
        assert!(matches!(parse(json), Err(DataError::SymbolNotFound { .. })));
    }

    #[test]
    fn parse_timeseries_collects_both_lines() {
        let json = r#"{"timeseries":{"result":[
            {"meta":{"type":["quarterlyDilutedEPS"]},"timestamp":[1],
             "quarterlyDilutedEPS":[
                {"asOfDate":"2024-03-31","periodType":"3M","reportedValue":{"raw":12.5,"fmt":"12.50"}},
                null,
                {"asOfDate":"2024-06-30","periodType":"3M","reportedValue":{"raw":13.0,"fmt":"13.00"}}
             ]},
            {"meta":{"type":["quarterlyTotalRevenue"]},"timestamp":[1],
             "quarterlyTotalRevenue":[
                {"asOfDate":"2024-06-30","periodType":"3M","reportedValue":{"raw":5.0e9,"fmt":"5B"}}
             ]}
        ],"error":null}}"#;
        let resp: TimeseriesResponse = serde_json::from_str(json).unwrap();
        let income = YahooProvider::parse_timeseries(resp);
        assert_eq!(income.diluted_eps.len(), 2);
        assert_eq!(income.diluted_eps[1].value, 13.0);
        assert_eq!(income.total_revenue.len(), 1);
    }
}
