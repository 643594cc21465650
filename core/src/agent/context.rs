use crate::traits::ToolSpec;
use anyhow::{Context, Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
use std::fmt::Write;

/// The input that triggers exactly one agent run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisRequest {
    pub ticker: String,
    pub start_date: String,
    pub end_date: String,
}

impl AnalysisRequest {
    /// Normalizes the ticker to upper case and checks both dates parse with
    /// `start_date` not after `end_date`.
    pub fn new(
        ticker: impl AsRef<str>,
        start_date: impl Into<String>,
        end_date: impl Into<String>,
    ) -> Result<Self> {
        let ticker = ticker.as_ref().trim().to_uppercase();
        if ticker.is_empty() {
            bail!("Ticker must not be empty");
        }

        let start_date = start_date.into();
        let end_date = end_date.into();
        let start = parse_date(&start_date)?;
        let end = parse_date(&end_date)?;
        if start > end {
            bail!("Start date {start_date} is after end date {end_date}");
        }

        Ok(Self {
            ticker,
            start_date,
            end_date,
        })
    }
}

/// Parses an RFC 3339 timestamp or a plain `YYYY-MM-DD` date, the latter as
/// midnight UTC. Only used for ordering; callers keep the original text.
pub fn parse_date(value: &str) -> Result<DateTime<FixedOffset>> {
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(value) {
        return Ok(timestamp);
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map(|date| date.and_time(NaiveTime::MIN).and_utc().fixed_offset())
        .with_context(|| format!("'{value}' is not an ISO-8601 date or timestamp"))
}

pub struct ContextBuilder {
    pub tool_specs: Vec<ToolSpec>,
}

impl ContextBuilder {
    pub fn new(tool_specs: Vec<ToolSpec>) -> Self {
        Self { tool_specs }
    }

    pub fn build_system_prompt(&self) -> String {
        let mut parts = vec![
            "You are an investment analysis assistant. Your task is to provide a comprehensive \
             investment assessment for a given stock."
                .to_string(),
        ];

        if let Some(instructions) = self.get_tool_instructions() {
            parts.push(instructions);
        }

        parts.push(self.get_runtime_context());
        parts.push(
            "When you are done, stop using tools and just provide your final verdict.".to_string(),
        );

        parts.join("\n\n")
    }

    fn get_tool_instructions(&self) -> Option<String> {
        if self.tool_specs.is_empty() {
            return None;
        }

        let mut instructions = String::from("Use the following tools as needed:\n");
        for (i, tool) in self.tool_specs.iter().enumerate() {
            let _ = write!(instructions, "\n{}. {}: {}", i + 1, tool.name, tool.description);
        }
        instructions.push_str("\n\nCall one tool at a time and wait for its result.");

        Some(instructions)
    }

    fn get_runtime_context(&self) -> String {
        let today = chrono::Utc::now().format("%Y-%m-%d (%A)");
        format!("Today's date: {today}")
    }

    /// The seed user turn for a run.
    pub fn build_task(&self, request: &AnalysisRequest) -> String {
        let ticker = &request.ticker;
        format!(
            "Please provide a comprehensive investment assessment for {ticker}. \
             Include an analysis of the current stock data, recent news, and any additional \
             financial reports if available. \
             Use the available tools as needed: use 'yahoo_finance' for current market data, \
             'perplexity_news' for recent news, 'exa_search' for a detailed search over the \
             period from {start} to {end}, and 'calculator' for any necessary arithmetic. \
             Make sure to use the calculator at least two times to generate accurate numerical \
             results.",
            start = request.start_date,
            end = request.end_date,
        )
    }
}
