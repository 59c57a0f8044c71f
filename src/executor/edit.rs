// Edit tool implementation

use crate::executor::config::ExecutorConfig;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    EditOutput, ExecutorError, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::io::ErrorKind;
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info};

const DESCRIPTION: &str = "Replace one exact occurrence of old_string with new_string in a file. \
old_string must appear exactly once; include surrounding lines to make it unique. \
An empty new_string deletes the match.";

#[derive(Debug, Deserialize)]
struct EditInput {
    #[serde(default)]
    file_path: String,
    #[serde(default)]
    old_string: String,
    #[serde(default)]
    new_string: String,
}

/// Edit tool implementation
pub struct EditTool {
    config: Arc<ExecutorConfig>,
}

impl EditTool {
    pub fn new(config: Arc<ExecutorConfig>) -> Self {
        Self { config }
    }
}

#[async_trait]
impl ToolImpl for EditTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Edit
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Edit,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "file_path": {
                        "type": "string",
                        "description": "Path of the file to edit"
                    },
                    "old_string": {
                        "type": "string",
                        "description": "Exact text to replace; must occur once"
                    },
                    "new_string": {
                        "type": "string",
                        "description": "Replacement text (default: empty)"
                    }
                },
                "required": ["file_path", "old_string"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let EditInput {
            file_path,
            old_string,
            new_string,
        } = parse_input(ToolKind::Edit, input)?;
        require(&file_path, "file path")?;
        require(&old_string, "old_string")?;

        let path = self.config.resolve_path(&file_path);
        match fs::metadata(&path).await {
            Ok(_) => {}
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ExecutorError::FileNotFound(file_path));
            }
            Err(e) => return Err(ExecutorError::EditFailed(e.to_string())),
        }

        let content = fs::read_to_string(&path)
            .await
            .map_err(|e| ExecutorError::EditFailed(e.to_string()))?;

        let count = content.matches(old_string.as_str()).count();
        debug!(path = %path.display(), occurrences = count, "edit target located");
        match count {
            0 => return Err(ExecutorError::OldStringNotFound),
            1 => {}
            n => return Err(ExecutorError::AmbiguousMatch(n)),
        }

        let updated = content.replacen(old_string.as_str(), &new_string, 1);
        fs::write(&path, updated)
            .await
            .map_err(|e| ExecutorError::EditFailed(e.to_string()))?;

        info!(
            path = %path.display(),
            removed_chars = old_string.chars().count(),
            inserted_chars = new_string.chars().count(),
            "file edited"
        );

        Ok(ToolOutput::Edit(EditOutput {
            success: true,
            path: path.display().to_string(),
            replaced: true,
        }))
    }
}
