pub mod context;
pub mod conversation;
pub mod dispatcher;
pub mod events;
pub mod loop_;
pub mod registry;

pub use context::{AnalysisRequest, ContextBuilder};
pub use conversation::Conversation;
pub use dispatcher::ToolDispatcher;
pub use events::{AgentEvent, EXHAUSTED_MESSAGE, EventSink, NullSink};
pub use loop_::{AgentLoop, LoopPhase, LoopState, RunOutcome, RunReport};
pub use registry::ToolRegistry;
