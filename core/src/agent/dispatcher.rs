use crate::agent::ToolRegistry;
use crate::error::ToolError;
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

/// Executes one tool call and always produces result text for the model.
#[derive(Clone)]
pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub async fn invoke(&self, name: &str, input: &Value) -> String {
        let tool = match self.registry.get(name) {
            Ok(tool) => tool,
            Err(e) => {
                warn!(tool = name, "Model requested an unregistered tool");
                return format!("Error: {e}");
            }
        };

        if let Err(e) = self.registry.validate(name, input) {
            warn!(tool = name, error = %e, "Rejected tool input");
            return format!("Error: {e}");
        }

        debug!(tool = name, %input, "Dispatching tool call");

        match tool.execute(input).await {
            Ok(output) => output,
            Err(e) => {
                warn!(tool = name, error = %e, "Tool execution failed");
                format!("Error: {}", ToolError::invalid_input(name, e.to_string()))
            }
        }
    }
}
