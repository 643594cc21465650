use crate::error::SourceError;
use crate::sources::{DEFAULT_TIMEOUT, http_client, read_body};
use crate::traits::{ContentSearchSource, SearchQuery};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://api.exa.ai";
const EXCERPT_MAX_CHARS: usize = 2_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExaRequest<'a> {
    query: String,
    num_results: usize,
    start_published_date: &'a str,
    end_published_date: &'a str,
    include_text: [&'a str; 1],
    contents: ExaContents,
}

#[derive(Debug, Serialize)]
struct ExaContents {
    text: bool,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExaResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    published_date: Option<String>,
    #[serde(default)]
    text: Option<String>,
}

/// Date-ranged financial news search with page contents via Exa.
pub struct ExaSearchSource {
    client: reqwest::Client,
    api_key: String,
}

impl ExaSearchSource {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(DEFAULT_TIMEOUT),
            api_key: api_key.into(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }
}

fn build_request(query: &SearchQuery) -> ExaRequest<'_> {
    ExaRequest {
        query: format!("financial news and reports on {}", query.ticker),
        num_results: query.limit,
        start_published_date: &query.start,
        end_published_date: &query.end,
        include_text: [query.ticker.as_str()],
        contents: ExaContents { text: true },
    }
}

#[async_trait]
impl ContentSearchSource for ExaSearchSource {
    async fn search(&self, query: &SearchQuery) -> Result<String, SourceError> {
        let response = self
            .client
            .post(format!("{BASE_URL}/search"))
            .header("x-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&build_request(query))
            .send()
            .await?;

        let body = read_body(response).await?;
        render_results(&query.ticker, &body)
    }
}

fn render_results(ticker: &str, body: &str) -> Result<String, SourceError> {
    let response: ExaResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    if response.results.is_empty() {
        return Ok(format!(
            "Exa Search: No results found for {ticker} in the given period."
        ));
    }

    let entries: Vec<String> = response.results.iter().map(format_entry).collect();

    Ok(format!(
        "Exa Search: Found {} results:\n{}",
        entries.len(),
        entries.join("\n\n")
    ))
}

fn format_entry(result: &ExaResult) -> String {
    let title = non_empty(&result.title)
        .or_else(|| non_empty(&result.url))
        .unwrap_or("No title");
    let published = non_empty(&result.published_date).unwrap_or("N/A");
    let content = non_empty(&result.text).unwrap_or("No content available.");

    let excerpt = if content.chars().count() > EXCERPT_MAX_CHARS {
        let truncated: String = content.chars().take(EXCERPT_MAX_CHARS).collect();
        format!("{truncated}...")
    } else {
        content.to_string()
    };

    format!("Title: {title}\nPublished: {published}\nContent: {excerpt}")
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|s| !s.trim().is_empty())
}
