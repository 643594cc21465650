use crate::agent::ToolRegistry;
use crate::config::Config;
use crate::providers::AnthropicProvider;
use crate::sources::{ExaSearchSource, PerplexityNewsSource, YahooFinanceSource};
use crate::tools;
use crate::traits::ModelProvider;
use anyhow::{Context, Result, anyhow};
use std::sync::Arc;

pub fn create_provider(config: &Config) -> Result<Arc<dyn ModelProvider>> {
    let api_key = resolve_api_key_with_fallback(
        &["ANTHROPIC_API_KEY", "TICKERSCOPE_ANTHROPIC_API_KEY"],
        &config.anthropic_api_key,
    )
    .context("Anthropic API key is required")?;

    let mut provider = AnthropicProvider::new(api_key)
        .with_model(config.model.clone())
        .with_max_tokens(config.max_tokens)
        .with_timeout(config.request_timeout());
    if let Some(base_url) = &config.anthropic_base_url {
        provider = provider.with_base_url(base_url.clone());
    }
    Ok(Arc::new(provider))
}

/// Builds the live data sources and registers the analysis tools over them.
pub fn create_tool_registry(config: &Config) -> Result<ToolRegistry> {
    let perplexity_key = resolve_api_key_with_fallback(
        &["PERPLEXITY_API_KEY", "TICKERSCOPE_PERPLEXITY_API_KEY"],
        &config.perplexity_api_key,
    )
    .context("Perplexity API key is required")?;
    let exa_key = resolve_api_key_with_fallback(
        &["EXA_API_KEY", "TICKERSCOPE_EXA_API_KEY"],
        &config.exa_api_key,
    )
    .context("Exa API key is required")?;

    let timeout = config.request_timeout();
    let registry = tools::build_registry(
        Arc::new(YahooFinanceSource::new().with_timeout(timeout)),
        Arc::new(PerplexityNewsSource::new(perplexity_key).with_timeout(timeout)),
        Arc::new(ExaSearchSource::new(exa_key).with_timeout(timeout)),
    )?;
    Ok(registry)
}

/// Registry for describing the tools only. No API keys are needed because
/// nothing is fetched.
pub fn create_tool_catalog() -> Result<ToolRegistry> {
    let registry = tools::build_registry(
        Arc::new(YahooFinanceSource::new()),
        Arc::new(PerplexityNewsSource::new(String::new())),
        Arc::new(ExaSearchSource::new(String::new())),
    )?;
    Ok(registry)
}

fn resolve_api_key_with_fallback(env_vars: &[&str], config_key: &str) -> Result<String> {
    for var_name in env_vars {
        if let Ok(key) = resolve_api_key_from_env(var_name) {
            return Ok(key);
        }
    }
    if !config_key.is_empty() {
        Ok(config_key.to_string())
    } else {
        Err(anyhow!("No API key found (set {})", env_vars.join(" or ")))
    }
}

fn resolve_api_key_from_env(var_name: &str) -> Result<String> {
    std::env::var(var_name)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| anyhow!("Environment variable {} not set", var_name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn falls_back_to_config_key() {
        let key = resolve_api_key_with_fallback(
            &["TICKERSCOPE_TEST_UNSET_KEY_1"],
            "from-config",
        )
        .unwrap();
        assert_eq!(key, "from-config");
    }

    #[test]
    fn missing_key_is_an_error() {
        let err = resolve_api_key_with_fallback(&["TICKERSCOPE_TEST_UNSET_KEY_2"], "").unwrap_err();
        assert!(err.to_string().contains("TICKERSCOPE_TEST_UNSET_KEY_2"));
    }

    #[test]
    fn builds_registry_from_config_keys() {
        let config = Config {
            perplexity_api_key: "p".into(),
            exa_api_key: "e".into(),
            ..Config::default()
        };
        let registry = create_tool_registry(&config).unwrap();
        let names: Vec<String> = registry.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            ["yahoo_finance", "perplexity_news", "exa_search", "calculator"]
        );
    }

    #[test]
    fn tool_catalog_needs_no_keys() {
        let catalog = create_tool_catalog().unwrap();
        let names: Vec<String> = catalog.list_tools().into_iter().map(|t| t.name).collect();
        assert_eq!(
            names,
            ["yahoo_finance", "perplexity_news", "exa_search", "calculator"]
        );
    }
}
