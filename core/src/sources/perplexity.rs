use crate::error::SourceError;
use crate::sources::{DEFAULT_TIMEOUT, http_client, read_body};
use crate::traits::NewsSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const BASE_URL: &str = "https://api.perplexity.ai";
const MODEL: &str = "sonar";

#[derive(Debug, Serialize)]
struct PerplexityRequest<'a> {
    model: &'a str,
    messages: [PerplexityMessage<'a>; 2],
    max_tokens: u32,
    temperature: f64,
    top_p: f64,
    stream: bool,
    frequency_penalty: f64,
    search_recency_filter: &'a str,
}

#[derive(Debug, Serialize)]
struct PerplexityMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct PerplexityResponse {
    #[serde(default)]
    choices: Vec<PerplexityChoice>,
}

#[derive(Debug, Deserialize)]
struct PerplexityChoice {
    message: PerplexityResponseMessage,
}

#[derive(Debug, Deserialize)]
struct PerplexityResponseMessage {
    #[serde(default)]
    content: String,
}

/// Week-recent headlines through Perplexity's search-backed chat model.
pub struct PerplexityNewsSource {
    client: reqwest::Client,
    api_key: String,
}

impl PerplexityNewsSource {
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

    fn build_request<'a>(&'a self, ticker: &str) -> PerplexityRequest<'a> {
        PerplexityRequest {
            model: MODEL,
            messages: [
                PerplexityMessage {
                    role: "system",
                    content: "Be precise and concise.".to_string(),
                },
                PerplexityMessage {
                    role: "user",
                    content: format!(
                        "Provide the latest news headlines and summaries for {ticker}."
                    ),
                },
            ],
            max_tokens: 500,
            temperature: 0.2,
            top_p: 0.9,
            stream: false,
            frequency_penalty: 1.0,
            search_recency_filter: "week",
        }
    }
}

#[async_trait]
impl NewsSource for PerplexityNewsSource {
    async fn fetch(&self, ticker: &str) -> Result<String, SourceError> {
        let response = self
            .client
            .post(format!("{BASE_URL}/chat/completions"))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(&self.build_request(ticker))
            .send()
            .await?;

        let body = read_body(response).await?;
        extract_answer(&body)
    }
}

fn extract_answer(body: &str) -> Result<String, SourceError> {
    let response: PerplexityResponse =
        serde_json::from_str(body).map_err(|e| SourceError::Malformed(e.to_string()))?;

    let answer = response
        .choices
        .into_iter()
        .next()
        .map(|c| c.message.content)
        .unwrap_or_default();

    Ok(format!("Perplexity News: {answer}"))
}
