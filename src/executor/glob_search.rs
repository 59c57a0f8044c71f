// Glob tool implementation

use crate::executor::config::ExecutorConfig;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, GlobOutput, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
};
use async_trait::async_trait;
use glob::Pattern;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const DESCRIPTION: &str = "Find files and directories matching a glob pattern (e.g. `*.rs`, \
`**/*.toml`) relative to a directory. Results are split into files and directories and capped.";

#[derive(Debug, Deserialize)]
struct GlobInput {
    #[serde(default)]
    pattern: String,
    #[serde(default)]
    path: Option<String>,
}

/// Glob tool implementation
pub struct GlobTool {
    config: Arc<ExecutorConfig>,
}

impl GlobTool {
    pub fn new(config: Arc<ExecutorConfig>) -> Self {
        Self { config }
    }
}

/// Walk every match once, keeping the first `cap` and counting the rest.
fn collect_matches(root: &Path, pattern: &str, cap: usize) -> Result<GlobOutput> {
    if Path::new(pattern).is_absolute() {
        return Err(ExecutorError::GlobFailed(
            "Non-relative patterns are unsupported".to_string(),
        ));
    }

    let full = PathBuf::from(Pattern::escape(&root.to_string_lossy())).join(pattern);
    let entries = glob::glob(&full.to_string_lossy())
        .map_err(|e| ExecutorError::GlobFailed(e.to_string()))?;

    let mut matched = 0usize;
    let mut files = Vec::new();
    let mut directories = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                matched += 1;
                if matched > cap {
                    continue;
                }
                if path.is_file() {
                    files.push(path.display().to_string());
                } else if path.is_dir() {
                    directories.push(path.display().to_string());
                }
            }
            Err(e) => {
                warn!(error = %e, "glob entry error");
            }
        }
    }

    Ok(GlobOutput {
        total: files.len() + directories.len(),
        files,
        directories,
        truncated: matched > cap,
    })
}

#[async_trait]
impl ToolImpl for GlobTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Glob
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Glob,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "pattern": {
                        "type": "string",
                        "description": "Glob pattern relative to path"
                    },
                    "path": {
                        "type": "string",
                        "description": "Directory to search (default: working directory)"
                    }
                },
                "required": ["pattern"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let GlobInput { pattern, path } = parse_input(ToolKind::Glob, input)?;
        require(&pattern, "pattern")?;

        let raw_path = path.unwrap_or_else(|| self.config.working_dir.display().to_string());
        let root = self.config.resolve_path(&raw_path);
        if !root.exists() {
            return Err(ExecutorError::PathNotFound(raw_path));
        }

        debug!(root = %root.display(), pattern = %pattern, "globbing");

        let cap = self.config.limits.max_glob_results;
        let walk_pattern = pattern.clone();
        let output = tokio::task::spawn_blocking(move || collect_matches(&root, &walk_pattern, cap))
            .await
            .map_err(|e| ExecutorError::GlobFailed(e.to_string()))??;

        info!(
            pattern = %pattern,
            total = output.total,
            truncated = output.truncated,
            "glob completed"
        );

        Ok(ToolOutput::Glob(output))
    }
}
