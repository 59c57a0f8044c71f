// Bash tool implementation

use crate::executor::config::ExecutorConfig;
use crate::executor::process::{exit_code, run_with_timeout};
use crate::executor::text::truncate_chars;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    BashOutput, ExecutorError, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::process::Command;
use tracing::{debug, info, warn};

const DESCRIPTION: &str = r#"Execute a shell command via /bin/sh -c in the working directory.
Stdout and stderr are captured separately and the exit code is returned.
Commands are killed after the timeout. Destructive commands are refused."#;

/// Bash tool input parameters
#[derive(Debug, Deserialize)]
struct BashInput {
    #[serde(default)]
    command: String,
}

/// Bash tool implementation
pub struct BashTool {
    config: Arc<ExecutorConfig>,
}

impl BashTool {
    pub fn new(config: Arc<ExecutorConfig>) -> Self {
        Self { config }
    }
}

/// First blocklist entry contained in `command`, compared case-insensitively
pub fn find_blocked_pattern<'a>(patterns: &'a [String], command: &str) -> Option<&'a str> {
    let lowered = command.to_lowercase();
    patterns
        .iter()
        .find(|pattern| lowered.contains(&pattern.to_lowercase()))
        .map(String::as_str)
}

#[async_trait]
impl ToolImpl for BashTool {
    fn kind(&self) -> ToolKind {
        ToolKind::Bash
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::Bash,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "command": {
                        "type": "string",
                        "description": "The shell command to execute"
                    }
                },
                "required": ["command"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let start = Instant::now();

        // Parse input
        let BashInput { command } = parse_input(ToolKind::Bash, input)?;
        require(&command, "command")?;

        if let Some(pattern) = find_blocked_pattern(&self.config.dangerous_patterns, &command) {
            warn!(
                command = %command.chars().take(100).collect::<String>(),
                pattern = %pattern,
                "command blocked"
            );
            return Err(ExecutorError::CommandBlocked(pattern.to_string()));
        }

        debug!(command = %command, "executing bash command");

        let mut cmd = Command::new(&self.config.shell);
        cmd.arg("-c").arg(&command).current_dir(&self.config.working_dir);
        if let Some(home) = &self.config.home_dir {
            cmd.env("HOME", home);
        }

        let timeout_secs = self.config.limits.command_timeout_secs;
        let output = match run_with_timeout(cmd, self.config.limits.command_timeout()).await {
            Ok(Some(output)) => output,
            Ok(None) => {
                warn!(
                    command = %command.chars().take(100).collect::<String>(),
                    timeout_secs,
                    "bash command timed out"
                );
                return Err(ExecutorError::CommandTimeout(timeout_secs));
            }
            Err(e) => return Err(ExecutorError::CommandFailed(e.to_string())),
        };

        let duration_ms = start.elapsed().as_millis() as u64;

        let limits = &self.config.limits;
        let (stdout, truncated) =
            truncate_chars(&String::from_utf8_lossy(&output.stdout), limits.max_output_chars);
        let (stderr, _) =
            truncate_chars(&String::from_utf8_lossy(&output.stderr), limits.max_stderr_chars);
        let returncode = exit_code(&output.status);

        info!(
            command = %command.chars().take(100).collect::<String>(),
            duration_ms = duration_ms,
            exit_code = returncode,
            stdout_bytes = output.stdout.len(),
            stderr_bytes = output.stderr.len(),
            truncated = truncated,
            "bash command executed"
        );

        Ok(ToolOutput::Bash(BashOutput {
            stdout,
            stderr: (!stderr.is_empty()).then_some(stderr),
            returncode,
            success: returncode == 0,
            truncated,
        }))
    }
}
