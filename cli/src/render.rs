use console::style;
use tickerscope_core::{AgentEvent, ContentBlock, EventSink, Turn};

const BAR_WIDTH: usize = 20;

/// Streams a run to the terminal as it happens.
pub struct TerminalSink;

impl TerminalSink {
    fn print_reply(turn: &Turn) {
        println!("{}", style("Assistant response:").bold());
        for block in turn.blocks() {
            match block {
                ContentBlock::Text { text } => println!("{}", text.trim()),
                ContentBlock::ToolUse { name, .. } => {
                    println!("{}", style(format!("[tool_use: {name}]")).dim())
                }
                ContentBlock::ToolResult { .. } => {}
            }
        }
        if turn.blocks().is_empty() {
            println!("{}", turn.text());
        }
    }
}

impl EventSink for TerminalSink {
    fn emit(&self, event: AgentEvent) {
        match event {
            AgentEvent::IterationStarted { number } => {
                println!();
                println!("{}", style(format!("Iteration {number}")).cyan().bold());
            }
            AgentEvent::AssistantReply { turn } => Self::print_reply(&turn),
            AgentEvent::ToolCall { name, input } => {
                println!(
                    "{} {} with input: {}",
                    style("[Agent requests tool call]").yellow().bold(),
                    style(&name).white().bold(),
                    serde_json::to_string(&input).unwrap_or_default()
                );
            }
            AgentEvent::ToolResult { name, output } => {
                println!("{}", style(format!("[Tool '{name}' result]")).green().bold());
                println!("{}", style(output.trim()).dim());
            }
            AgentEvent::Progress { percent } => println!("{}", progress_bar(percent)),
            AgentEvent::FinalAnswer { text } => {
                println!();
                println!(
                    "{}",
                    style("Final Investment Assessment").magenta().bold()
                );
                println!();
                termimad::print_text(&text);
            }
            AgentEvent::Exhausted { message } => {
                println!();
                println!("{} {}", style("!").yellow().bold(), message);
            }
        }
    }
}

fn progress_bar(percent: u8) -> String {
    let filled = usize::from(percent.min(100)) * BAR_WIDTH / 100;
    format!(
        "[{}{}] {:>3}%",
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        percent
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_scales_to_width() {
        assert_eq!(progress_bar(0), format!("[{}]   0%", "-".repeat(20)));
        assert_eq!(
            progress_bar(50),
            format!("[{}{}]  50%", "#".repeat(10), "-".repeat(10))
        );
        assert_eq!(progress_bar(100), format!("[{}] 100%", "#".repeat(20)));
    }
}
