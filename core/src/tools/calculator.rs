use crate::tools::expr::{evaluate, format_number};
use crate::tools::extract_string_arg;
use crate::traits::Tool;
use async_trait::async_trait;
use serde_json::{Value, json};
use tracing::debug;

pub const INVALID_EXPRESSION: &str = "Error: Invalid expression";

pub struct CalculatorTool;

/// Evaluates `expression`, returning the fixed error text on any failure.
pub fn calculate(expression: &str) -> String {
    match evaluate(expression) {
        Ok(value) => format_number(value),
        Err(e) => {
            debug!(expression, error = %e, "Rejected calculator expression");
            INVALID_EXPRESSION.to_string()
        }
    }
}

#[async_trait]
impl Tool for CalculatorTool {
    fn name(&self) -> &str {
        "calculator"
    }

    fn description(&self) -> &str {
        "A simple calculator that performs basic arithmetic operations. \
         Use this tool to perform any necessary calculations (e.g., computing ratios or adjusting numbers). \
         Supports numbers, + - * / and parentheses."
    }

    fn input_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "expression": {
                    "type": "string",
                    "description": "The mathematical expression to evaluate (e.g., '2 + 3 * 4')."
                }
            },
            "required": ["expression"]
        })
    }

    async fn execute(&self, input: &Value) -> anyhow::Result<String> {
        let expression = extract_string_arg(input, "expression")?;
        Ok(calculate(&expression))
    }
}
