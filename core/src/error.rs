use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    #[error("Unknown tool {0}")]
    UnknownTool(String),

    #[error("Tool '{0}' is already registered")]
    DuplicateTool(String),

    #[error("Invalid input for tool '{tool}': {reason}")]
    InvalidInput { tool: String, reason: String },
}

impl ToolError {
    pub fn invalid_input(tool: &str, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            tool: tool.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure inside a market, news or search source. Tools turn these into
/// result text; they never reach the agent loop.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status}: {body}")]
    Api { status: u16, body: String },

    #[error("malformed response: {0}")]
    Malformed(String),
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConversationError {
    #[error("tool result '{tool_use_id}' does not answer a tool use in the preceding assistant turn")]
    OrphanToolResult { tool_use_id: String },

    #[error("tool use '{tool_use_id}' was already answered")]
    DuplicateToolResult { tool_use_id: String },
}
