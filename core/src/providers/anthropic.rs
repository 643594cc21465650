use crate::sources::http_client;
use crate::traits::{
    CompletionRequest, ContentBlock, MessageContent, ModelProvider, Role, ToolSpec, Turn,
};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::time::Duration;

const ANTHROPIC_VERSION: &str = "2023-06-01";

#[derive(Debug, Serialize)]
struct AnthropicRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<AnthropicMessage<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct AnthropicMessage<'a> {
    role: Role,
    content: AnthropicContent<'a>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum AnthropicContent<'a> {
    Text(&'a str),
    Blocks(Vec<&'a ContentBlock>),
}

#[derive(Debug, Serialize)]
struct AnthropicTool<'a> {
    name: &'a str,
    description: &'a str,
    input_schema: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    r#type: &'static str,
    disable_parallel_tool_use: bool,
}

#[derive(Debug, Deserialize)]
struct AnthropicResponse {
    content: Vec<AnthropicBlock>,
    #[serde(default)]
    stop_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum AnthropicBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    #[serde(other)]
    Other,
}

pub struct AnthropicProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
    max_tokens: u32,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: http_client(Duration::from_secs(120)),
            api_key: api_key.into(),
            model: "claude-3-5-sonnet-20241022".to_string(),
            base_url: "https://api.anthropic.com/v1".to_string(),
            max_tokens: 4096,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = http_client(timeout);
        self
    }

    fn build_request<'a>(&'a self, request: &CompletionRequest<'a>) -> AnthropicRequest<'a> {
        let tools = (!request.tools.is_empty()).then(|| convert_tools(request.tools));
        let tool_choice = tools.as_ref().map(|_| ToolChoice {
            r#type: "auto",
            disable_parallel_tool_use: true,
        });

        AnthropicRequest {
            model: &self.model,
            max_tokens: self.max_tokens,
            system: request.system,
            messages: convert_messages(request.messages),
            tools,
            tool_choice,
        }
    }
}

fn convert_tools(tools: &[ToolSpec]) -> Vec<AnthropicTool<'_>> {
    tools
        .iter()
        .map(|t| AnthropicTool {
            name: &t.name,
            description: &t.description,
            input_schema: &t.input_schema,
        })
        .collect()
}

/// The API requires every `tool_use` to be answered in the next turn. Only
/// the first tool use of a reply is ever answered, so the rest are left out
/// of the replayed transcript.
fn convert_messages(messages: &[Turn]) -> Vec<AnthropicMessage<'_>> {
    messages
        .iter()
        .enumerate()
        .map(|(i, turn)| {
            let content = match &turn.content {
                MessageContent::Text(text) => AnthropicContent::Text(text),
                MessageContent::Blocks(blocks) => {
                    let answered: Option<HashSet<&str>> = match (turn.role, messages.get(i + 1)) {
                        (Role::Assistant, Some(next)) => Some(next.tool_result_ids().collect()),
                        _ => None,
                    };
                    AnthropicContent::Blocks(
                        blocks
                            .iter()
                            .filter(|block| match (block, &answered) {
                                (ContentBlock::ToolUse { id, .. }, Some(answered)) => {
                                    answered.contains(id.as_str())
                                }
                                _ => true,
                            })
                            .collect(),
                    )
                }
            };
            AnthropicMessage {
                role: turn.role,
                content,
            }
        })
        .collect()
}

fn normalize_response(response: AnthropicResponse) -> Turn {
    let blocks = response
        .content
        .into_iter()
        .filter_map(|block| match block {
            AnthropicBlock::Text { text } => Some(ContentBlock::Text { text }),
            AnthropicBlock::ToolUse { id, name, input } => {
                Some(ContentBlock::ToolUse { id, name, input })
            }
            AnthropicBlock::Other => None,
        })
        .collect();
    Turn::assistant(blocks)
}

#[async_trait]
impl ModelProvider for AnthropicProvider {
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<Turn> {
        let anthropic_request = self.build_request(&request);

        let response = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("Content-Type", "application/json")
            .json(&anthropic_request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!(
                "Anthropic API error {}: {}",
                status,
                error_text
            ));
        }

        let anthropic_response: AnthropicResponse = response.json().await?;
        tracing::debug!(
            stop_reason = anthropic_response.stop_reason.as_deref().unwrap_or("none"),
            blocks = anthropic_response.content.len(),
            "Anthropic reply received"
        );

        Ok(normalize_response(anthropic_response))
    }

    fn model_id(&self) -> &str {
        &self.model
    }
}
