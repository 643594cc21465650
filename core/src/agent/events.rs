use crate::traits::Turn;
use serde_json::Value;
use tokio::sync::mpsc;

pub const EXHAUSTED_MESSAGE: &str = "Maximum iterations reached without a finalized response.";

/// What the agent loop reports while a run is in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentEvent {
    /// `number` is 1-based.
    IterationStarted { number: usize },
    AssistantReply { turn: Turn },
    ToolCall { name: String, input: Value },
    ToolResult { name: String, output: String },
    /// Percentage complete, never above 100.
    Progress { percent: u8 },
    FinalAnswer { text: String },
    Exhausted { message: String },
}

pub trait EventSink: Send + Sync {
    fn emit(&self, event: AgentEvent);
}

/// Discards every event.
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: AgentEvent) {}
}

impl EventSink for mpsc::UnboundedSender<AgentEvent> {
    fn emit(&self, event: AgentEvent) {
        // Receiver gone means nobody is watching; the run still completes.
        let _ = self.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn channel_sink_forwards_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        tx.emit(AgentEvent::Progress { percent: 10 });
        assert_eq!(rx.recv().await, Some(AgentEvent::Progress { percent: 10 }));
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        tx.emit(AgentEvent::Progress { percent: 10 });
    }
}
