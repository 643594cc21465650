use crate::tools::extract_string_arg;
use crate::traits::{MarketDataSource, Tool};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

pub struct YahooFinanceTool {
    source: Arc<dyn MarketDataSource>,
}

impl YahooFinanceTool {
    pub fn new(source: Arc<dyn MarketDataSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for YahooFinanceTool {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn description(&self) -> &str {
        "Fetches current stock data for a given ticker from Yahoo Finance. \
         Provides recent pricing, volume, and market trends. \
         Use this tool when you need quantitative data about a stock."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "The stock ticker symbol (e.g., TSLA)."
                }
            },
            "required": ["ticker"]
        })
    }

    async fn execute(&self, input: &Value) -> anyhow::Result<String> {
        let ticker = extract_string_arg(input, "ticker")?;

        match self.source.fetch(&ticker).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Yahoo Finance lookup failed");
                Ok(format!("Error fetching Yahoo Finance data: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSource, StubMarketData};

    #[tokio::test]
    async fn returns_source_summary() {
        let tool = YahooFinanceTool::new(Arc::new(StubMarketData));
        let out = tool.execute(&json!({"ticker": "TSLA"})).await.unwrap();
        assert_eq!(out, StubMarketData::OUTPUT);
    }

    #[tokio::test]
    async fn source_failure_becomes_text() {
        let tool = YahooFinanceTool::new(Arc::new(FailingSource));
        let out = tool.execute(&json!({"ticker": "TSLA"})).await.unwrap();
        assert_eq!(
            out,
            "Error fetching Yahoo Finance data: HTTP 503: upstream unavailable"
        );
    }
}
