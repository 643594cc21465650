use crate::agent::ToolRegistry;
use crate::error::ToolError;
use crate::traits::{ContentSearchSource, MarketDataSource, NewsSource};
use serde_json::Value;
use std::sync::Arc;

pub mod calculator;
pub mod exa_search;
pub mod expr;
pub mod perplexity_news;
pub mod yahoo_finance;

pub use calculator::CalculatorTool;
pub use exa_search::ExaSearchTool;
pub use perplexity_news::PerplexityNewsTool;
pub use yahoo_finance::YahooFinanceTool;

/// The four analysis tools, in the order the model sees them.
pub fn build_registry(
    market: Arc<dyn MarketDataSource>,
    news: Arc<dyn NewsSource>,
    search: Arc<dyn ContentSearchSource>,
) -> Result<ToolRegistry, ToolError> {
    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(YahooFinanceTool::new(market)))?;
    registry.register(Arc::new(PerplexityNewsTool::new(news)))?;
    registry.register(Arc::new(ExaSearchTool::new(search)))?;
    registry.register(Arc::new(CalculatorTool))?;
    Ok(registry)
}

pub fn extract_string_arg(args: &Value, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_usize_arg_opt(args: &Value, key: &str, default: usize) -> usize {
    args.get(key)
        .and_then(|v| v.as_u64())
        .map(|v| v as usize)
        .unwrap_or(default)
}
