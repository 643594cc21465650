//! Scripted model, stub sources and recording sink for in-crate tests.

use crate::agent::{AgentEvent, EventSink};
use crate::error::SourceError;
use crate::traits::{
    CompletionRequest, ContentBlock, ContentSearchSource, MarketDataSource, ModelProvider,
    NewsSource, SearchQuery, Tool, ToolSpec, Turn,
};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::VecDeque;
use std::sync::Mutex;

pub fn reply_text(text: &str) -> Turn {
    Turn::assistant(vec![ContentBlock::text(text)])
}

pub fn reply_tool(id: &str, name: &str, input: Value) -> Turn {
    Turn::assistant(vec![
        ContentBlock::text(format!("Calling {name}.")),
        ContentBlock::tool_use(id, name, input),
    ])
}

#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub system: String,
    pub tools: Vec<ToolSpec>,
    pub messages: Vec<Turn>,
}

/// Replies with queued turns in order; errors once the queue is empty.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Turn>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: Vec<Turn>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn calls(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl ModelProvider for ScriptedModel {
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<Turn> {
        self.requests.lock().unwrap().push(RecordedRequest {
            system: request.system.to_string(),
            tools: request.tools.to_vec(),
            messages: request.messages.to_vec(),
        });
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("No scripted reply left"))
    }

    fn model_id(&self) -> &str {
        "scripted"
    }
}

#[derive(Default)]
pub struct RecordingSink {
    events: Mutex<Vec<AgentEvent>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn progress(&self) -> Vec<u8> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                AgentEvent::Progress { percent } => Some(percent),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: AgentEvent) {
        self.events.lock().unwrap().push(event);
    }
}

pub struct StubMarketData;

impl StubMarketData {
    pub const OUTPUT: &'static str = "Yahoo Finance: Last week's market data for TSLA:\n\
                                      Date Close\n2025-02-14 355.84";
}

#[async_trait]
impl MarketDataSource for StubMarketData {
    async fn fetch(&self, _ticker: &str) -> Result<String, SourceError> {
        Ok(Self::OUTPUT.to_string())
    }
}

pub struct StubNews;

impl StubNews {
    pub const OUTPUT: &'static str = "Perplexity News: Tesla deliveries beat estimates.";
}

#[async_trait]
impl NewsSource for StubNews {
    async fn fetch(&self, _ticker: &str) -> Result<String, SourceError> {
        Ok(Self::OUTPUT.to_string())
    }
}

pub struct StubContentSearch;

impl StubContentSearch {
    pub const OUTPUT: &'static str = "Exa Search: Found 1 results:\n\
                                      Title: Q4 report\nPublished: 2025-01-29\nContent: Revenue up.";
}

#[async_trait]
impl ContentSearchSource for StubContentSearch {
    async fn search(&self, _query: &SearchQuery) -> Result<String, SourceError> {
        Ok(Self::OUTPUT.to_string())
    }
}

/// Every lookup fails with an upstream 503.
pub struct FailingSource;

fn unavailable() -> SourceError {
    SourceError::Api {
        status: 503,
        body: "upstream unavailable".into(),
    }
}

#[async_trait]
impl MarketDataSource for FailingSource {
    async fn fetch(&self, _ticker: &str) -> Result<String, SourceError> {
        Err(unavailable())
    }
}

#[async_trait]
impl NewsSource for FailingSource {
    async fn fetch(&self, _ticker: &str) -> Result<String, SourceError> {
        Err(unavailable())
    }
}

#[async_trait]
impl ContentSearchSource for FailingSource {
    async fn search(&self, _query: &SearchQuery) -> Result<String, SourceError> {
        Err(unavailable())
    }
}

pub struct EchoTool {
    name: String,
}

impl EchoTool {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
        }
    }
}

#[async_trait]
impl Tool for EchoTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Echoes its input"
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {"value": {"type": "string"}},
            "required": ["value"]
        })
    }

    async fn execute(&self, input: &Value) -> anyhow::Result<String> {
        let value = crate::tools::extract_string_arg(input, "value")?;
        Ok(format!("{}: {}", self.name, value))
    }
}

pub struct FailingTool;

#[async_trait]
impl Tool for FailingTool {
    fn name(&self) -> &str {
        "failing"
    }

    fn description(&self) -> &str {
        "Always fails"
    }

    fn input_schema(&self) -> Value {
        json!({"type": "object", "properties": {}})
    }

    async fn execute(&self, _input: &Value) -> anyhow::Result<String> {
        anyhow::bail!("boom")
    }
}
