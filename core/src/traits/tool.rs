use crate::error::ToolError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

impl ToolSpec {
    pub fn required_fields(&self) -> Vec<&str> {
        self.input_schema
            .get("required")
            .and_then(|r| r.as_array())
            .map(|fields| fields.iter().filter_map(|f| f.as_str()).collect())
            .unwrap_or_default()
    }

    /// Checks `input` against the schema: an object carrying every required
    /// field, with each declared property matching its JSON type.
    pub fn validate(&self, input: &Value) -> Result<(), ToolError> {
        let Some(object) = input.as_object() else {
            return Err(ToolError::invalid_input(
                &self.name,
                "input must be a JSON object",
            ));
        };

        for field in self.required_fields() {
            if object.get(field).is_none_or(Value::is_null) {
                return Err(ToolError::invalid_input(
                    &self.name,
                    format!("missing required field '{field}'"),
                ));
            }
        }

        let Some(properties) = self.input_schema.get("properties").and_then(|p| p.as_object())
        else {
            return Ok(());
        };

        for (key, value) in object {
            let Some(expected) = properties
                .get(key)
                .and_then(|p| p.get("type"))
                .and_then(|t| t.as_str())
            else {
                continue;
            };

            if value.is_null() && !self.required_fields().contains(&key.as_str()) {
                continue;
            }

            if !matches_json_type(value, expected) {
                return Err(ToolError::invalid_input(
                    &self.name,
                    format!("field '{key}' must be of type {expected}"),
                ));
            }
        }

        Ok(())
    }
}

fn matches_json_type(value: &Value, expected: &str) -> bool {
    match expected {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        _ => true,
    }
}

/// A callable capability exposed to the model.
///
/// `execute` returns the text fed back as the tool result. Failures a model
/// can reason about (empty datasets, upstream errors, bad expressions) are
/// returned as `Ok` text; `Err` is reserved for malformed arguments and is
/// rendered by the dispatcher.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn input_schema(&self) -> Value;

    async fn execute(&self, input: &Value) -> anyhow::Result<String>;

    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: self.input_schema(),
        }
    }
}
