// Read tool implementation

use crate::executor::config::ExecutorConfig;
use crate::executor::text::line_count;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, ReadOutput, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

const DESCRIPTION: &str = "Read a UTF-8 text file and return its full content. \
Relative paths are resolved against the working directory and `~` expands to the home directory. \
Files larger than the read limit are refused.";

#[derive(Debug, Deserialize)]
struct ReadInput {
    #[serde(default)]
    file_path: String,
}

/// Read tool implementation
pub struct ReadTool {
    config: Arc<ExecutorConfig>,
}

impl ReadTool {
    pub fn new(config: Arc<ExecutorConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolImpl for ReadTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Read
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Read,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the file to read"
                    }
                },
                "required": ["file_path"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let ReadInput { file_path } = parse_input(ToolKind::Read, input)?;
        require(&file_path, "file path")?;

        let path = self.config.resolve_path(&file_path);
        debug!(path = %path.display(), "reading file");

        let metadata = match fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ExecutorError::FileNotFound(file_path));
            }
            Err(e) => return Err(ExecutorError::from_io(e, &file_path, ExecutorError::ReadFailed)),
        };

        if !metadata.is_file() {
            return Err(ExecutorError::NotAFile(file_path));
        }

        let size = metadata.len();
        let limit = self.config.limits.max_file_size_bytes;
        if size > limit {
            return Err(ExecutorError::FileTooLarge { size, limit });
        }

        let bytes = fs::read(&path)
            .await
            .map_err(|e| ExecutorError::from_io(e, &file_path, ExecutorError::ReadFailed))?;
        let content = String::from_utf8(bytes).map_err(|_| ExecutorError::BinaryFile {
            path: path.display().to_string(),
            size,
        })?;

        let output = ReadOutput {
            size: content.chars().count(),
            lines: line_count(&content),
            path: path.display().to_string(),
            content,
        };

        info!(
            path = %output.path,
            size = output.size,
            lines = output.lines,
            "file read"
        );

        Ok(ToolOutput::Read(output))
    }
}
