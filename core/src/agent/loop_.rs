use crate::agent::events::EXHAUSTED_MESSAGE;
use crate::agent::{
    AgentEvent, AnalysisRequest, ContextBuilder, Conversation, EventSink, ToolDispatcher,
    ToolRegistry,
};
use crate::traits::{CompletionRequest, ModelProvider, Role, ToolSpec, Turn};
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};
use uuid::Uuid;

pub const DEFAULT_MAX_ITERATIONS: usize = 10;
pub const DEFAULT_ITERATION_DELAY: Duration = Duration::from_secs(1);
const PROGRESS_STEP: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopPhase {
    AwaitingModel,
    ToolRequested,
    FinalAnswer,
    IterationExhausted,
}

/// Per-run bookkeeping. Lives only for the duration of [`AgentLoop::run`].
#[derive(Debug, Clone)]
pub struct LoopState {
    pub iteration: usize,
    pub max_iterations: usize,
    pub terminated: bool,
    pub final_answer: Option<String>,
    pub phase: LoopPhase,
}

impl LoopState {
    fn new(max_iterations: usize) -> Self {
        Self {
            iteration: 0,
            max_iterations,
            terminated: false,
            final_answer: None,
            phase: LoopPhase::AwaitingModel,
        }
    }

    /// Completed iterations as a percentage, in steps of ten.
    fn progress(&self) -> u8 {
        // Capped at 100, so the cast is lossless.
        (self.iteration * PROGRESS_STEP).min(100) as u8
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    FinalAnswer(String),
    IterationExhausted,
}

#[derive(Debug)]
pub struct RunReport {
    pub outcome: RunOutcome,
    pub iterations: usize,
    pub conversation: Conversation,
}

pub struct AgentLoop {
    provider: Arc<dyn ModelProvider>,
    dispatcher: ToolDispatcher,
    max_iterations: usize,
    iteration_delay: Duration,
}

impl AgentLoop {
    pub fn new(provider: Arc<dyn ModelProvider>, tool_registry: Arc<ToolRegistry>) -> Self {
        Self {
            provider,
            dispatcher: ToolDispatcher::new(tool_registry),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            iteration_delay: DEFAULT_ITERATION_DELAY,
        }
    }

    pub fn with_max_iterations(mut self, max: usize) -> Self {
        self.max_iterations = max;
        self
    }

    pub fn with_iteration_delay(mut self, delay: Duration) -> Self {
        self.iteration_delay = delay;
        self
    }

    pub fn max_iterations(&self) -> usize {
        self.max_iterations
    }

    /// Runs one analysis to completion, streaming progress to `sink`.
    ///
    /// Tool failures never end a run; they are fed back to the model as
    /// result text. A failed model call aborts the run with an error.
    pub async fn run(&self, request: &AnalysisRequest, sink: &dyn EventSink) -> Result<RunReport> {
        let run_id = Uuid::new_v4();
        let tools = self.dispatcher.registry().list_tools();
        let context = ContextBuilder::new(tools.clone());
        let system_prompt = context.build_system_prompt();

        let mut conversation = Conversation::seeded(context.build_task(request));
        let mut state = LoopState::new(self.max_iterations);

        info!(
            %run_id,
            ticker = %request.ticker,
            model = self.provider.model_id(),
            max_iterations = self.max_iterations,
            "Starting analysis run"
        );

        while state.iteration < state.max_iterations {
            sink.emit(AgentEvent::IterationStarted {
                number: state.iteration + 1,
            });

            self.step(&system_prompt, &tools, &mut conversation, &mut state, sink)
                .await
                .with_context(|| format!("Iteration {} failed", state.iteration + 1))?;

            state.iteration += 1;
            sink.emit(AgentEvent::Progress {
                percent: state.progress(),
            });

            if !self.iteration_delay.is_zero() {
                tokio::time::sleep(self.iteration_delay).await;
            }

            if state.terminated {
                break;
            }
        }

        let outcome = match state.final_answer.take() {
            Some(answer) => {
                sink.emit(AgentEvent::FinalAnswer {
                    text: answer.clone(),
                });
                RunOutcome::FinalAnswer(answer)
            }
            None => {
                state.phase = LoopPhase::IterationExhausted;
                state.terminated = true;
                sink.emit(AgentEvent::Exhausted {
                    message: EXHAUSTED_MESSAGE.to_string(),
                });
                RunOutcome::IterationExhausted
            }
        };

        info!(
            %run_id,
            iterations = state.iteration,
            phase = ?state.phase,
            turns = conversation.len(),
            "Analysis run finished"
        );

        Ok(RunReport {
            outcome,
            iterations: state.iteration,
            conversation,
        })
    }

    async fn step(
        &self,
        system_prompt: &str,
        tools: &[ToolSpec],
        conversation: &mut Conversation,
        state: &mut LoopState,
        sink: &dyn EventSink,
    ) -> Result<()> {
        state.phase = LoopPhase::AwaitingModel;

        let request = CompletionRequest {
            system: system_prompt,
            tools,
            messages: conversation.snapshot(),
        };
        let mut reply = self
            .provider
            .complete(request)
            .await
            .context("Model call failed")?;
        reply.role = Role::Assistant;

        conversation.append(reply.clone())?;
        sink.emit(AgentEvent::AssistantReply {
            turn: reply.clone(),
        });

        // One tool per reply; later tool uses in the same reply are not run.
        let Some(tool_use) = reply.first_tool_use() else {
            state.phase = LoopPhase::FinalAnswer;
            state.final_answer = Some(reply.text());
            state.terminated = true;
            debug!(iteration = state.iteration, "Model produced final answer");
            return Ok(());
        };

        state.phase = LoopPhase::ToolRequested;
        let skipped = reply.tool_uses().count() - 1;
        debug!(
            iteration = state.iteration,
            tool = tool_use.name,
            skipped,
            "Model requested tool"
        );

        sink.emit(AgentEvent::ToolCall {
            name: tool_use.name.to_string(),
            input: tool_use.input.clone(),
        });

        let output = self.dispatcher.invoke(tool_use.name, tool_use.input).await;

        sink.emit(AgentEvent::ToolResult {
            name: tool_use.name.to_string(),
            output: output.clone(),
        });

        conversation.append(Turn::tool_result(tool_use.id, output))?;
        Ok(())
    }
}
