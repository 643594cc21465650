use crate::error::SourceError;
use async_trait::async_trait;

pub const DEFAULT_SEARCH_LIMIT: usize = 5;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub ticker: String,
    /// ISO-8601 publication window.
    pub start: String,
    pub end: String,
    pub limit: usize,
}

/// Recent price and volume history for a ticker.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// An empty dataset is reported as text, not as an error.
    async fn fetch(&self, ticker: &str) -> Result<String, SourceError>;
}

/// Latest headlines and summaries for a ticker.
#[async_trait]
pub trait NewsSource: Send + Sync {
    async fn fetch(&self, ticker: &str) -> Result<String, SourceError>;
}

#[async_trait]
pub trait ContentSearchSource: Send + Sync {
    async fn search(&self, query: &SearchQuery) -> Result<String, SourceError>;
}
