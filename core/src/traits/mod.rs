pub mod provider;
pub mod source;
pub mod tool;

pub use provider::{
    CompletionRequest, ContentBlock, MessageContent, ModelProvider, Role, ToolUseRef, Turn,
};
pub use source::{ContentSearchSource, DEFAULT_SEARCH_LIMIT, MarketDataSource, NewsSource, SearchQuery};
pub use tool::{Tool, ToolSpec};
