use crate::error::SourceError;
use crate::sources::{DEFAULT_TIMEOUT, http_client};
use crate::traits::MarketDataSource;
use async_trait::async_trait;
use serde::Deserialize;
use std::fmt::Write;
use std::time::Duration;

const USER_AGENT: &str = "Mozilla/5.0 (compatible; tickerscope/0.1)";

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<Quote>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

/// Daily bars for the last seven days from the Yahoo Finance chart endpoint.
pub struct YahooFinanceSource {
    client: reqwest::Client,
    base_url: String,
}

impl Default for YahooFinanceSource {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooFinanceSource {
    pub fn new() -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            base_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    /// The ticker is pushed as a single path segment, so `/`, `?` and `#`
    /// are percent-encoded.
    fn chart_url(&self, ticker: &str) -> Result<reqwest::Url, SourceError> {
        let invalid_base = || SourceError::Malformed(format!("invalid base URL: {}", self.base_url));
        let mut url = reqwest::Url::parse(&self.base_url).map_err(|_| invalid_base())?;
        url.path_segments_mut()
            .map_err(|_| invalid_base())?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", ticker]);
        Ok(url)
    }
}

#[async_trait]
impl MarketDataSource for YahooFinanceSource {
    async fn fetch(&self, ticker: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .get(self.chart_url(ticker)?)
            .query(&[("range", "7d"), ("interval", "1d")])
            .header("User-Agent", USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        render_chart(ticker, status.as_u16(), &body)
    }
}

fn render_chart(ticker: &str, status: u16, body: &str) -> Result<String, SourceError> {
    let envelope: ChartEnvelope = match serde_json::from_str(body) {
        Ok(envelope) => envelope,
        Err(_) if !(200..300).contains(&status) => {
            return Err(SourceError::Api {
                status,
                body: body.to_string(),
            });
        }
        Err(e) => return Err(SourceError::Malformed(e.to_string())),
    };

    if let Some(error) = envelope.chart.error {
        return Err(SourceError::Api {
            status,
            body: format!("{}: {}", error.code, error.description),
        });
    }

    let rows = envelope
        .chart
        .result
        .and_then(|results| results.into_iter().next())
        .map(|result| format_rows(&result))
        .unwrap_or_default();

    if rows.is_empty() {
        return Ok(format!(
            "Yahoo Finance: No market data found for {ticker} in the last week."
        ));
    }

    let mut out = format!("Yahoo Finance: Last week's market data for {ticker}:\n");
    let _ = writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Date", "Open", "High", "Low", "Close", "Volume"
    );
    out.push_str(&rows.join("\n"));
    Ok(out)
}

fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

fn format_rows(result: &ChartResult) -> Vec<String> {
    let Some(quote) = result.indicators.quote.first() else {
        return vec![];
    };

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, &ts)| {
            let close = at(&quote.close, i)?;
            let date = chrono::DateTime::from_timestamp(ts, 0)?.format("%Y-%m-%d");
            let cell = |v: Option<f64>| v.map_or_else(|| "-".to_string(), |v| format!("{v:.2}"));
            let volume = quote
                .volume
                .get(i)
                .copied()
                .flatten()
                .map_or_else(|| "-".to_string(), |v| v.to_string());
            Some(format!(
                "{:<10} {:>10} {:>10} {:>10} {:>10.2} {:>12}",
                date.to_string(),
                cell(at(&quote.open, i)),
                cell(at(&quote.high, i)),
                cell(at(&quote.low, i)),
                close,
                volume
            ))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const CHART: &str = r#"{
        "chart": {
            "result": [{
                "timestamp": [1739491200, 1739577600, 1739836800],
                "indicators": {
                    "quote": [{
                        "open":   [345.0, 355.5, null],
                        "high":   [358.69, 360.0, null],
                        "low":    [342.85, 350.1, null],
                        "close":  [355.84, 356.0, null],
                        "volume": [70000000, 65000000, null]
                    }]
                }
            }],
            "error": null
        }
    }"#;

    #[test]
    fn renders_daily_rows() {
        let out = render_chart("TSLA", 200, CHART).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Yahoo Finance: Last week's market data for TSLA:");
        assert!(lines[1].starts_with("Date"));
        assert_eq!(lines.len(), 4);
        assert!(lines[2].starts_with("2025-02-14"));
        assert!(lines[2].contains("355.84"));
        assert!(lines[2].ends_with("70000000"));
    }

    #[test]
    fn empty_result_is_no_data_text() {
        let body = r#"{"chart": {"result": [{"timestamp": [], "indicators": {"quote": [{}]}}], "error": null}}"#;
        assert_eq!(
            render_chart("ZZZZ", 200, body).unwrap(),
            "Yahoo Finance: No market data found for ZZZZ in the last week."
        );
    }

    #[test]
    fn chart_error_is_source_error() {
        let body = r#"{"chart": {"result": null, "error": {"code": "Not Found", "description": "No data found, symbol may be delisted"}}}"#;
        let err = render_chart("NOPE", 404, body).unwrap_err();
        assert_eq!(
            err.to_string(),
            "HTTP 404: Not Found: No data found, symbol may be delisted"
        );
    }

    #[test]
    fn garbage_body_is_malformed() {
        assert!(matches!(
            render_chart("TSLA", 200, "<html>"),
            Err(SourceError::Malformed(_))
        ));
        assert!(matches!(
            render_chart("TSLA", 503, "<html>"),
            Err(SourceError::Api { status: 503, .. })
        ));
    }

    #[test]
    fn chart_url_targets_ticker_path() {
        let url = YahooFinanceSource::new().chart_url("TSLA").unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v8/finance/chart/TSLA");
    }

    #[test]
    fn chart_url_encodes_reserved_characters_in_ticker() {
        let source = YahooFinanceSource::new().with_base_url("http://127.0.0.1:9/");
        let url = source.chart_url("BRK/B?range=max#x").unwrap();
        assert_eq!(
            url.as_str(),
            "http://127.0.0.1:9/v8/finance/chart/BRK%2FB%3Frange=max%23x"
        );
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }
}
