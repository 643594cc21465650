use crate::traits::ToolSpec;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
    ToolResult {
        tool_use_id: String,
        content: String,
    },
}

impl ContentBlock {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    pub fn tool_use(
        id: impl Into<String>,
        name: impl Into<String>,
        input: serde_json::Value,
    ) -> Self {
        Self::ToolUse {
            id: id.into(),
            name: name.into(),
            input,
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::ToolResult {
            tool_use_id: tool_use_id.into(),
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Blocks(Vec<ContentBlock>),
}

/// A borrowed view of a tool invocation inside an assistant turn.
#[derive(Debug, Clone, Copy)]
pub struct ToolUseRef<'a> {
    pub id: &'a str,
    pub name: &'a str,
    pub input: &'a serde_json::Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: MessageContent,
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Text(text.into()),
        }
    }

    pub fn assistant(blocks: Vec<ContentBlock>) -> Self {
        Self {
            role: Role::Assistant,
            content: MessageContent::Blocks(blocks),
        }
    }

    pub fn tool_result(tool_use_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: MessageContent::Blocks(vec![ContentBlock::tool_result(tool_use_id, content)]),
        }
    }

    pub fn blocks(&self) -> &[ContentBlock] {
        match &self.content {
            MessageContent::Blocks(blocks) => blocks,
            MessageContent::Text(_) => &[],
        }
    }

    pub fn tool_uses(&self) -> impl Iterator<Item = ToolUseRef<'_>> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolUse { id, name, input } => Some(ToolUseRef { id, name, input }),
            _ => None,
        })
    }

    pub fn first_tool_use(&self) -> Option<ToolUseRef<'_>> {
        self.tool_uses().next()
    }

    pub fn tool_result_ids(&self) -> impl Iterator<Item = &str> {
        self.blocks().iter().filter_map(|block| match block {
            ContentBlock::ToolResult { tool_use_id, .. } => Some(tool_use_id.as_str()),
            _ => None,
        })
    }

    /// Every text block joined in order, or the plain-text content.
    pub fn text(&self) -> String {
        match &self.content {
            MessageContent::Text(text) => text.clone(),
            MessageContent::Blocks(blocks) => blocks
                .iter()
                .filter_map(|block| match block {
                    ContentBlock::Text { text } => Some(text.as_str()),
                    _ => None,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub struct CompletionRequest<'a> {
    pub system: &'a str,
    pub tools: &'a [ToolSpec],
    pub messages: &'a [Turn],
}

#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Returns the assistant turn replying to `request.messages`.
    async fn complete(&self, request: CompletionRequest<'_>) -> anyhow::Result<Turn>;

    fn model_id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn text_concatenates_blocks_in_order() {
        let turn = Turn::assistant(vec![
            ContentBlock::text("Buy "),
            ContentBlock::tool_use("t1", "calculator", json!({"expression": "1+1"})),
            ContentBlock::text("rating."),
        ]);
        assert_eq!(turn.text(), "Buy rating.");
    }

    #[test]
    fn first_tool_use_picks_earliest_block() {
        let turn = Turn::assistant(vec![
            ContentBlock::text("checking"),
            ContentBlock::tool_use("a", "yahoo_finance", json!({"ticker": "TSLA"})),
            ContentBlock::tool_use("b", "perplexity_news", json!({"ticker": "TSLA"})),
        ]);
        let first = turn.first_tool_use().unwrap();
        assert_eq!(first.id, "a");
        assert_eq!(first.name, "yahoo_finance");
        assert_eq!(turn.tool_uses().count(), 2);
    }

    #[test]
    fn serializes_in_messages_api_shape() {
        let turn = Turn::tool_result("toolu_1", "4");
        assert_eq!(
            serde_json::to_value(&turn).unwrap(),
            json!({
                "role": "user",
                "content": [{"type": "tool_result", "tool_use_id": "toolu_1", "content": "4"}]
            })
        );

        let seed = Turn::user("hello");
        assert_eq!(
            serde_json::to_value(&seed).unwrap(),
            json!({"role": "user", "content": "hello"})
        );
    }
}
