pub mod anthropic;
pub mod factory;

pub use anthropic::AnthropicProvider;
pub use factory::{create_provider, create_tool_catalog, create_tool_registry};
