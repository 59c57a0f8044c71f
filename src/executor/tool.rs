// Tool trait and shared helpers
#![allow(dead_code)]

use crate::executor::config::ExecutorConfig;
use crate::executor::{ExecutorError, Result, ToolDefinition, ToolKind, ToolOutput};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// Internal trait for tool implementations
#[async_trait]
pub trait ToolImpl: Send + Sync {
    /// Which tool this is
    fn kind(&self) -> ToolKind;

    /// Get the tool definition (name, description, input_schema)
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with JSON arguments
    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput>;

    /// Get tool name
    fn name(&self) -> &'static str {
        self.kind().name()
    }
}

/// Deserialize a tool's arguments into its typed input
pub fn parse_input<T: DeserializeOwned>(kind: ToolKind, input: Map<String, Value>) -> Result<T> {
    serde_json::from_value(Value::Object(input))
        .map_err(|e| ExecutorError::InvalidInput(kind, e.to_string()))
}

/// Build a definition, preferring a description from the config file
pub fn definition(
    config: &ExecutorConfig,
    kind: ToolKind,
    default_description: &str,
    input_schema: Value,
) -> ToolDefinition {
    ToolDefinition {
        name: kind.name().to_string(),
        description: config
            .description_for(kind)
            .unwrap_or(default_description)
            .to_string(),
        input_schema,
    }
}

/// Reject empty required string arguments
pub fn require(value: &str, what: &'static str) -> Result<()> {
    if value.is_empty() {
        Err(ExecutorError::MissingArgument(what))
    } else {
        Ok(())
    }
}
