use anyhow::{Context, Result};
use console::style;
use dialoguer::{Input, Password, Select};
use tickerscope_core::config::{Config, get_config_path};

const BANNER: &str = r"
    -------------------------------------

      t i c k e r s c o p e
      agentic investment assessments

    -------------------------------------
";

const MODELS: &[&str] = &[
    "claude-3-5-sonnet-20241022",
    "claude-3-5-haiku-20241022",
    "claude-sonnet-4-20250514",
];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn prompt_key(label: &str, env_var: &str, current: &str) -> Result<String> {
    if std::env::var(env_var).is_ok_and(|v| !v.trim().is_empty()) {
        println!(
            "  {} {} found in environment",
            style("✓").green().bold(),
            env_var
        );
        return Ok(current.to_string());
    }

    let key: String = Password::new()
        .with_prompt(format!("{label} (leave empty to use ${env_var})"))
        .allow_empty_password(true)
        .interact()
        .with_context(|| format!("Failed to read {label}"))?;

    Ok(if key.trim().is_empty() {
        current.to_string()
    } else {
        key.trim().to_string()
    })
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan());

    let mut config = Config::load_or_init()?;
    let total = 3;

    print_step(1, total, "Model");
    config.anthropic_api_key =
        prompt_key("Anthropic API key", "ANTHROPIC_API_KEY", &config.anthropic_api_key)?;
    let current = MODELS.iter().position(|m| *m == config.model).unwrap_or(0);
    let choice = Select::new()
        .with_prompt("Model")
        .items(MODELS)
        .default(current)
        .interact()
        .context("Failed to select model")?;
    config.model = MODELS[choice].to_string();

    print_step(2, total, "Data sources");
    config.perplexity_api_key = prompt_key(
        "Perplexity API key",
        "PERPLEXITY_API_KEY",
        &config.perplexity_api_key,
    )?;
    config.exa_api_key = prompt_key("Exa API key", "EXA_API_KEY", &config.exa_api_key)?;

    print_step(3, total, "Run defaults");
    config.defaults.ticker = Input::new()
        .with_prompt("Default ticker")
        .default(config.defaults.ticker.clone())
        .interact_text()
        .context("Failed to read ticker")?;
    config.max_iterations = Input::new()
        .with_prompt("Maximum iterations per run")
        .default(config.max_iterations)
        .interact_text()
        .context("Failed to read iteration cap")?;

    println!();
    println!(
        "{} Configuration will be saved to {}",
        style("✓").green().bold(),
        get_config_path().display()
    );

    Ok(config)
}
