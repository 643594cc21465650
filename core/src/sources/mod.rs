pub mod exa;
pub mod perplexity;
pub mod yahoo;

pub use exa::ExaSearchSource;
pub use perplexity::PerplexityNewsSource;
pub use yahoo::YahooFinanceSource;

use crate::error::SourceError;
use std::time::Duration;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

pub(crate) fn http_client(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(30))
        .build()
        .unwrap_or_default()
}

/// Reads the body, turning a non-success status into [`SourceError::Api`].
pub(crate) async fn read_body(response: reqwest::Response) -> Result<String, SourceError> {
    let status = response.status();
    let body = response.text().await?;
    if !status.is_success() {
        return Err(SourceError::Api {
            status: status.as_u16(),
            body,
        });
    }
    Ok(body)
}
