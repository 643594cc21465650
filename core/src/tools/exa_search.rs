use crate::agent::context::parse_date;
use crate::tools::{extract_string_arg, extract_usize_arg_opt};
use crate::traits::{ContentSearchSource, DEFAULT_SEARCH_LIMIT, SearchQuery, Tool};
use anyhow::bail;
use async_trait::async_trait;
use serde_json::{Value, json};
use std::sync::Arc;
use tracing::warn;

pub struct ExaSearchTool {
    source: Arc<dyn ContentSearchSource>,
}

impl ExaSearchTool {
    pub fn new(source: Arc<dyn ContentSearchSource>) -> Self {
        Self { source }
    }

    fn parse_query(input: &Value) -> anyhow::Result<SearchQuery> {
        let ticker = extract_string_arg(input, "ticker")?;
        let start = extract_string_arg(input, "start_date")?;
        let end = extract_string_arg(input, "end_date")?;

        if parse_date(&start)? > parse_date(&end)? {
            bail!("start_date {start} is after end_date {end}");
        }

        Ok(SearchQuery {
            ticker,
            start,
            end,
            limit: extract_usize_arg_opt(input, "num_results", DEFAULT_SEARCH_LIMIT).max(1),
        })
    }
}

#[async_trait]
impl Tool for ExaSearchTool {
    fn name(&self) -> &str {
        "exa_search"
    }

    fn description(&self) -> &str {
        "Performs a detailed search for financial news and reports on a given stock ticker using the Exa AI Search API. \
         Use this tool when you need to fetch comprehensive search results, including reports within a specific date range."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "ticker": {
                    "type": "string",
                    "description": "The stock ticker symbol (e.g., TSLA)."
                },
                "start_date": {
                    "type": "string",
                    "description": "The start date for the search in ISO format."
                },
                "end_date": {
                    "type": "string",
                    "description": "The end date for the search in ISO format."
                },
                "num_results": {
                    "type": "integer",
                    "description": "The number of search results to return.",
                    "default": DEFAULT_SEARCH_LIMIT
                }
            },
            "required": ["ticker", "start_date", "end_date"]
        })
    }

    async fn execute(&self, input: &Value) -> anyhow::Result<String> {
        let query = Self::parse_query(input)?;

        match self.source.search(&query).await {
            Ok(results) => Ok(results),
            Err(e) => {
                warn!(ticker = %query.ticker, error = %e, "Exa search failed");
                Ok(format!("Error fetching Exa Search results: {e}"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FailingSource, StubContentSearch};

    fn input() -> Value {
        json!({
            "ticker": "TSLA",
            "start_date": "2024-01-15T08:00:00.000Z",
            "end_date": "2025-02-15T07:59:59.999Z"
        })
    }

    #[test]
    fn defaults_to_five_results() {
        let query = ExaSearchTool::parse_query(&input()).unwrap();
        assert_eq!(query.limit, 5);
        assert_eq!(query.start, "2024-01-15T08:00:00.000Z");
    }

    #[test]
    fn honours_explicit_limit() {
        let mut input = input();
        input["num_results"] = json!(2);
        assert_eq!(ExaSearchTool::parse_query(&input).unwrap().limit, 2);
        input["num_results"] = json!(0);
        assert_eq!(ExaSearchTool::parse_query(&input).unwrap().limit, 1);
    }

    #[test]
    fn rejects_unparseable_or_inverted_dates() {
        let mut input = input();
        input["start_date"] = json!("last tuesday");
        assert!(ExaSearchTool::parse_query(&input).is_err());

        let mut input = self::input();
        input["start_date"] = json!("2026-01-01T00:00:00Z");
        assert!(ExaSearchTool::parse_query(&input).is_err());
    }

    #[tokio::test]
    async fn returns_search_results() {
        let tool = ExaSearchTool::new(Arc::new(StubContentSearch));
        let out = tool.execute(&input()).await.unwrap();
        assert_eq!(out, StubContentSearch::OUTPUT);
    }

    #[tokio::test]
    async fn source_failure_becomes_text() {
        let tool = ExaSearchTool::new(Arc::new(FailingSource));
        let out = tool.execute(&input()).await.unwrap();
        assert!(out.starts_with("Error fetching Exa Search results: "));
    }

    #[tokio::test]
    async fn accepts_date_only_range_and_forwards_it_verbatim() {
        let input = json!({
            "ticker": "TSLA",
            "start_date": "2024-01-15",
            "end_date": "2025-02-15"
        });
        let query = ExaSearchTool::parse_query(&input).unwrap();
        assert_eq!(query.start, "2024-01-15");
        assert_eq!(query.end, "2025-02-15");

        let tool = ExaSearchTool::new(Arc::new(StubContentSearch));
        assert_eq!(tool.execute(&input).await.unwrap(), StubContentSearch::OUTPUT);
    }
}
