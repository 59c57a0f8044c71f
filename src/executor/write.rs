// Write tool implementation

use crate::executor::config::ExecutorConfig;
use crate::executor::text::line_count;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput, WriteOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

const DESCRIPTION: &str = "Write text to a file, creating parent directories as needed and \
replacing any existing content. Only paths under the home directory or the working directory \
are writable.";

#[derive(Debug, Deserialize)]
struct WriteInput {
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    content: String,
}

/// Write tool implementation
pub struct WriteTool {
    config: Arc<ExecutorConfig>,
}

impl WriteTool {
    pub fn new(config: Arc<ExecutorConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolImpl for WriteTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Write
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Write,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the file to write"
                    },
                    "content": {
                        "type": "string",
                        "description": "Full text to write"
                    }
                },
                "required": ["file_path", "content"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let WriteInput { file_path, content } = parse_input(ToolKind::Write, input)?;
        require(&file_path, "file path")?;
        require(&content, "content")?;

        let path = self.config.resolve_path(&file_path);
        if !self.config.is_writable(&path) {
            warn!(path = %path.display(), "write rejected outside sandbox roots");
            return Err(ExecutorError::SandboxViolation);
        }

        debug!(path = %path.display(), bytes = content.len(), "writing file");

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| ExecutorError::from_io(e, &file_path, ExecutorError::WriteFailed))?;
        }
        fs::write(&path, &content)
            .await
            .map_err(|e| ExecutorError::from_io(e, &file_path, ExecutorError::WriteFailed))?;

        let output = WriteOutput {
            success: true,
            path: path.display().to_string(),
            size: content.chars().count(),
            lines: line_count(&content),
        };

        info!(path = %output.path, size = output.size, "file written");

        Ok(ToolOutput::Write(output))
    }
}
