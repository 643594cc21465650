use crate::error::ToolError;
use crate::traits::{Tool, ToolSpec};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Tools in registration order. Built once at startup and shared read-only.
#[derive(Default)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, tool: Arc<dyn Tool>) -> Result<(), ToolError> {
        let name = tool.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ToolError::DuplicateTool(name));
        }
        self.index.insert(name, self.tools.len());
        self.tools.push(tool);
        Ok(())
    }

    pub fn list_tools(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn resolve(&self, name: &str) -> Result<ToolSpec, ToolError> {
        self.get(name).map(|t| t.spec())
    }

    /// Checks `input` against the named tool's schema.
    pub fn validate(&self, name: &str, input: &Value) -> Result<(), ToolError> {
        self.resolve(name)?.validate(input)
    }

    pub fn get(&self, name: &str) -> Result<&Arc<dyn Tool>, ToolError> {
        self.index
            .get(name)
            .map(|&i| &self.tools[i])
            .ok_or_else(|| ToolError::UnknownTool(name.to_string()))
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::EchoTool;
    use serde_json::json;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(Arc::new(EchoTool::new("zeta"))).unwrap();
        registry.register(Arc::new(EchoTool::new("alpha"))).unwrap();
        registry.register(Arc::new(EchoTool::new("mid"))).unwrap();
        registry
    }

    #[test]
    fn lists_in_registration_order() {
        let names: Vec<String> = registry().list_tools().into_iter().map(|s| s.name).collect();
        assert_eq!(names, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn listing_is_stable_across_calls() {
        let registry = registry();
        assert_eq!(registry.list_tools(), registry.list_tools());
    }

    #[test]
    fn resolve_unknown_fails() {
        let err = registry().resolve("missing").unwrap_err();
        assert_eq!(err, ToolError::UnknownTool("missing".into()));
    }

    #[test]
    fn resolve_known_returns_spec() {
        let spec = registry().resolve("alpha").unwrap();
        assert_eq!(spec.name, "alpha");
    }

    #[test]
    fn rejects_duplicate_names() {
        let mut registry = registry();
        let err = registry.register(Arc::new(EchoTool::new("mid"))).unwrap_err();
        assert_eq!(err, ToolError::DuplicateTool("mid".into()));
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn validates_against_named_schema() {
        let registry = registry();
        assert!(registry.validate("alpha", &json!({"value": "x"})).is_ok());
        assert!(matches!(
            registry.validate("alpha", &json!({})),
            Err(ToolError::InvalidInput { .. })
        ));
        assert!(matches!(
            registry.validate("omega", &json!({"value": "x"})),
            Err(ToolError::UnknownTool(_))
        ));
    }
}
