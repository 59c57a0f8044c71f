// Grep tool implementation and its content search provider

use crate::executor::config::ExecutorConfig;
use crate::executor::process::run_with_timeout;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, GrepOutput, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::process::Command;
use tracing::{debug, info};

const DESCRIPTION: &str = "Recursively search file contents for a pattern (grep basic regex) \
and return the paths of files containing at least one match.";

/// Finds files whose contents match a pattern
#[async_trait]
pub trait ContentSearchProvider: Send + Sync {
    /// Paths of files under `root` with at least one match, one entry per file
    async fn search(&self, pattern: &str, root: &Path) -> Result<Vec<String>>;
}

/// Default provider: shells out to `grep -r -l`
pub struct GrepCommandSearch {
    program: String,
    timeout: Duration,
}

impl GrepCommandSearch {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl ContentSearchProvider for GrepCommandSearch {
    async fn search(&self, pattern: &str, root: &Path) -> Result<Vec<String>> {
        let mut cmd = Command::new(&self.program);
        cmd.args(["-r", "-l", "-e"]).arg(pattern).arg(root);

        let output = run_with_timeout(cmd, self.timeout)
            .await
            .map_err(|e| ExecutorError::SearchFailed(e.to_string()))?
            .ok_or(ExecutorError::SearchTimeout)?;

        // grep exits 1 for "no match" and 2 for unreadable entries; either way
        // stdout still holds every file it did match. Only a complaint that is
        // not about some file under `root` (a bad pattern) fails the search.
        let stderr = String::from_utf8_lossy(&output.stderr);
        if output.status.code() == Some(2)
            && let Some(problem) = invocation_error(&stderr, root)
        {
            return Err(ExecutorError::SearchFailed(problem.to_string()));
        }
        if !output.stderr.is_empty() {
            debug!(
                status = ?output.status.code(),
                stderr = %stderr.trim(),
                "grep reported problems"
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout)
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// First grep diagnostic that does not name a path under `root`
fn invocation_error<'a>(stderr: &'a str, root: &Path) -> Option<&'a str> {
    let root = root.display().to_string();
    stderr
        .lines()
        .map(str::trim)
        .find(|line| !line.is_empty() && !line.contains(root.as_str()))
}

#[derive(Debug, Deserialize)]
struct GrepInput {
    #[serde(default)]
    pattern: String,
    #[serde(default)]
    path: Option<String>,
}

/// Grep tool implementation
pub struct GrepTool {
    config: Arc<ExecutorConfig>,
    provider: Arc<dyn ContentSearchProvider>,
}

impl GrepTool {
    pub fn new(config: Arc<ExecutorConfig>, provider: Arc<dyn ContentSearchProvider>) -> Self {
        Self { config, provider }
    }
}

#[async_trait]
impl ToolImpl for GrepTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Grep
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Grep,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "pattern": {
                        "type": "string",
                        "description": "Pattern to search for"
                    },
                    "path": {
                        "type": "string",
                        "description": "File or directory to search (default: working directory)"
                    }
                },
                "required": ["pattern"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let GrepInput { pattern, path } = parse_input(ToolKind::Grep, input)?;
        require(&pattern, "pattern")?;

        let raw_path = path.unwrap_or_else(|| self.config.working_dir.display().to_string());
        let root = self.config.resolve_path(&raw_path);
        if !root.exists() {
            return Err(ExecutorError::PathNotFound(raw_path));
        }

        debug!(root = %root.display(), pattern = %pattern, "searching contents");

        let mut matches = self
            .provider
            .search(&pattern, &root)
            .await
            .map_err(|e| match e {
                ExecutorError::SearchTimeout | ExecutorError::SearchFailed(_) => e,
                other => ExecutorError::SearchFailed(other.to_string()),
            })?;
        matches.truncate(self.config.limits.max_grep_matches);

        info!(pattern = %pattern, count = matches.len(), "content search completed");

        Ok(ToolOutput::Grep(GrepOutput {
            count: matches.len(),
            matches,
            pattern,
            path: root.display().to_string(),
        }))
    }
}
