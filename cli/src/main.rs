use anyhow::Result;
use clap::{Parser, Subcommand};
use console::style;
use std::process::ExitCode;
use std::sync::Arc;
use tickerscope_core::{AgentLoop, AnalysisRequest, RunOutcome, config, providers};
use tracing_subscriber::EnvFilter;

mod onboard;
mod render;

#[derive(Parser)]
#[command(name = "tickerscope")]
#[command(about = "tickerscope - agentic investment assessments for a stock ticker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive setup of API keys and defaults
    Onboard,
    /// Run one analysis for a ticker
    Analyze {
        /// Stock ticker symbol, e.g. TSLA
        ticker: Option<String>,
        /// Start of the news search window (ISO-8601)
        #[arg(long)]
        start: Option<String>,
        /// End of the news search window (ISO-8601)
        #[arg(long)]
        end: Option<String>,
        #[arg(long)]
        max_iterations: Option<usize>,
    },
    /// List the tools offered to the model
    Tools,
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Exit status for a finished run. Exhaustion is not a success.
fn exit_status(outcome: &RunOutcome) -> u8 {
    match outcome {
        RunOutcome::FinalAnswer(_) => 0,
        RunOutcome::IterationExhausted => 2,
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    init_logging();
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Onboard
        } else {
            Commands::Analyze {
                ticker: None,
                start: None,
                end: None,
                max_iterations: None,
            }
        }
    });

    match command {
        Commands::Onboard => {
            let onboard_config = onboard::run_onboard().map_err(|e| {
                eprintln!("❌ Onboarding failed: {}", e);
                anyhow::anyhow!("Onboarding failed: {}", e)
            })?;
            config::save_config(&onboard_config)?;
        }
        Commands::Analyze {
            ticker,
            start,
            end,
            max_iterations,
        } => {
            let config = config::Config::load_or_init()?;
            let defaults = &config.defaults;

            let request = AnalysisRequest::new(
                ticker.as_deref().unwrap_or(&defaults.ticker),
                start.unwrap_or_else(|| defaults.start_date.clone()),
                end.unwrap_or_else(|| defaults.end_date.clone()),
            )?;

            let provider = providers::create_provider(&config)?;
            let registry = Arc::new(providers::create_tool_registry(&config)?);
            let agent_loop = AgentLoop::new(provider, registry)
                .with_max_iterations(max_iterations.unwrap_or(config.max_iterations))
                .with_iteration_delay(config.iteration_delay());

            println!(
                "{} Analyzing {} ({} → {}, up to {} iterations)",
                style("→").cyan(),
                style(&request.ticker).white().bold(),
                request.start_date,
                request.end_date,
                agent_loop.max_iterations()
            );

            match agent_loop.run(&request, &render::TerminalSink).await {
                Ok(report) => return Ok(ExitCode::from(exit_status(&report.outcome))),
                Err(e) => {
                    eprintln!("❌ Error: {:#}", e);
                    anyhow::bail!("Analysis failed: {}", e);
                }
            }
        }
        Commands::Tools => {
            let registry = providers::create_tool_catalog()?;

            for spec in registry.list_tools() {
                println!("{}", style(&spec.name).white().bold());
                println!("  {}", spec.description);
                println!("  required: {}", spec.required_fields().join(", "));
                println!();
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}
