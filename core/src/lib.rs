pub mod agent;
pub mod config;
pub mod error;
pub mod providers;
pub mod sources;
pub mod tools;
pub mod traits;

#[cfg(test)]
pub(crate) mod testing;

pub use agent::{
    AgentEvent, AgentLoop, AnalysisRequest, Conversation, EventSink, RunOutcome, RunReport,
    ToolDispatcher, ToolRegistry,
};
pub use config::*;
pub use error::{ConversationError, SourceError, ToolError};
pub use providers::*;
pub use traits::*;
