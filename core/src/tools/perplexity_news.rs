use crate::tools::extract_string_arg;
use crate::traits::{NewsSource, Tool};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

pub struct PerplexityNewsTool {
    source: Arc<dyn NewsSource>,
}

impl PerplexityNewsTool {
    pub fn new(source: Arc<dyn NewsSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl Tool for PerplexityNewsTool {
    fn name(&self) -> &str {
        "perplexity_news"
    }

    fn description(&self) -> &str {
        "Fetches recent news and financial reports for a given stock ticker using the Perplexity API. \
         Use this tool to retrieve the latest headlines and summaries related to the stock."
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
            Ok(news) => Ok(news),
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Perplexity news lookup failed");
                Ok(format!("Error fetching Perplexity news: {e}"))
            }
        }
    }
}
