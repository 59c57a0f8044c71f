// Main Executor implementation
#![allow(dead_code)]

use crate::executor::bash::BashTool;
use crate::executor::config::ExecutorConfig;
use crate::executor::edit::EditTool;
use crate::executor::error::ExecutorError;
use crate::executor::glob_search::GlobTool;
use crate::executor::grep_search::{ContentSearchProvider, GrepCommandSearch, GrepTool};
use crate::executor::read::ReadTool;
use crate::executor::tool::ToolImpl;
use crate::executor::types::{BatchEntry, ToolCall, ToolDefinition, ToolKind, ToolResult};
use crate::executor::web_fetch::{HttpFetcher, WebFetchProvider, WebFetchTool};
use crate::executor::web_search::{DuckDuckGoSearch, WebSearchProvider, WebSearchTool};
use crate::executor::write::WriteTool;
use futures::FutureExt;
use serde_json::{Map, Value};
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

/// Dispatches tool calls to their handlers.
///
/// `execute` never fails: every call yields exactly one [`ToolResult`].
pub struct Executor {
    config: Arc<ExecutorConfig>,
    read: ReadTool,
    write: WriteTool,
    edit: EditTool,
    bash: BashTool,
    glob: GlobTool,
    grep: GrepTool,
    web_search: WebSearchTool,
    web_fetch: WebFetchTool,
}

impl Executor {
    /// Create an executor with the default providers
    pub fn new(config: ExecutorConfig) -> Self {
        let config = Arc::new(config.normalized());

        debug!(
            working_dir = %config.working_dir.display(),
            home_dir = ?config.home_dir,
            timeout_secs = config.limits.command_timeout_secs,
            shell = %config.shell,
            "initializing executor"
        );

        let grep_provider: Arc<dyn ContentSearchProvider> = Arc::new(GrepCommandSearch::new(
            config.grep_program.clone(),
            config.limits.command_timeout(),
        ));

        let (search_provider, fetch_provider) = if config.web.enabled {
            (default_search_provider(&config), default_fetch_provider(&config))
        } else {
            info!("web providers disabled");
            (None, None)
        };

        let executor = Self {
            read: ReadTool::new(config.clone()),
            write: WriteTool::new(config.clone()),
            edit: EditTool::new(config.clone()),
            bash: BashTool::new(config.clone()),
            glob: GlobTool::new(config.clone()),
            grep: GrepTool::new(config.clone(), grep_provider),
            web_search: WebSearchTool::new(config.clone(), search_provider),
            web_fetch: WebFetchTool::new(config.clone(), fetch_provider),
            config,
        };

        info!(tool_count = ToolKind::ALL.len(), "executor initialized with tools");
        executor
    }

    /// Replace the content search backend used by Grep
    pub fn with_content_search(mut self, provider: Arc<dyn ContentSearchProvider>) -> Self {
        self.grep = GrepTool::new(self.config.clone(), provider);
        self
    }

    /// Replace (or remove, with `None`) the WebSearch backend
    pub fn with_web_search(mut self, provider: Option<Arc<dyn WebSearchProvider>>) -> Self {
        self.web_search = WebSearchTool::new(self.config.clone(), provider);
        self
    }

    /// Replace (or remove, with `None`) the WebFetch backend
    pub fn with_web_fetch(mut self, provider: Option<Arc<dyn WebFetchProvider>>) -> Self {
        self.web_fetch = WebFetchTool::new(self.config.clone(), provider);
        self
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    /// The resolved working directory
    pub fn working_dir(&self) -> &Path {
        &self.config.working_dir
    }

    fn tool(&self, kind: ToolKind) -> &dyn ToolImpl {
        match kind {
            ToolKind::Read => &self.read,
            ToolKind::Write => &self.write,
            ToolKind::Edit => &self.edit,
            ToolKind::Bash => &self.bash,
            ToolKind::Glob => &self.glob,
            ToolKind::Grep => &self.grep,
            ToolKind::WebSearch => &self.web_search,
            ToolKind::WebFetch => &self.web_fetch,
        }
    }

    /// Get all tool definitions, in advertised order
    pub fn tool_definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL
            .iter()
            .map(|kind| self.tool(*kind).definition())
            .collect()
    }

    /// Execute one tool call
    pub async fn execute(&self, call: &ToolCall) -> ToolResult {
        let kind = match call.tool.parse::<ToolKind>() {
            Ok(kind) => kind,
            Err(name) => {
                warn!(tool_name = %name, "unknown tool requested");
                return ToolResult::Error(ExecutorError::UnknownTool(name).into());
            }
        };

        info!(tool_name = %kind, "executing tool");
        let start = Instant::now();

        let outcome = AssertUnwindSafe(self.tool(kind).run(call.arguments.clone()))
            .catch_unwind()
            .await;

        let result = match outcome {
            Ok(Ok(output)) => ToolResult::Success(output),
            Ok(Err(err)) => {
                debug!(tool_name = %kind, error = %err, "tool returned error");
                ToolResult::Error(err.into())
            }
            Err(payload) => {
                let message = panic_message(payload);
                error!(tool_name = %kind, error = %message, "tool panicked");
                ToolResult::Error(ExecutorError::Panicked { tool: kind, message }.into())
            }
        };

        info!(
            tool_name = %kind,
            duration_ms = start.elapsed().as_millis() as u64,
            is_error = result.is_error(),
            "tool finished"
        );
        result
    }

    /// Execute calls strictly in order, pairing each with its result
    pub async fn execute_batch(&self, calls: Vec<ToolCall>) -> Vec<BatchEntry> {
        let calls = calls
            .into_iter()
            .map(|call| {
                let tool = Value::String(call.tool.clone());
                let arguments = Value::Object(call.arguments.clone());
                (tool, arguments, call)
            })
            .collect();
        self.run_batch(calls).await
    }

    /// Like [`Executor::execute_batch`] for calls still in JSON form. Each entry
    /// echoes the call's `tool` and `arguments` exactly as given, even when they
    /// are not usable.
    pub async fn execute_json_batch(&self, items: Vec<Value>) -> Vec<BatchEntry> {
        let calls = items
            .into_iter()
            .map(|item| {
                let tool = item.get("tool").cloned().unwrap_or(Value::Null);
                let arguments = item
                    .get("arguments")
                    .cloned()
                    .unwrap_or_else(|| Value::Object(Map::new()));
                (tool, arguments, ToolCall::from(item))
            })
            .collect();
        self.run_batch(calls).await
    }

    async fn run_batch(&self, calls: Vec<(Value, Value, ToolCall)>) -> Vec<BatchEntry> {
        info!(calls = calls.len(), "executing batch");

        let mut entries = Vec::with_capacity(calls.len());
        for (tool, arguments, call) in calls {
            let result = self.execute(&call).await;
            entries.push(BatchEntry {
                tool,
                arguments,
                result,
            });
        }

        let failed = entries.iter().filter(|e| e.result.is_error()).count();
        info!(calls = entries.len(), failed, "batch finished");
        entries
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new(ExecutorConfig::default())
    }
}

fn default_search_provider(config: &ExecutorConfig) -> Option<Arc<dyn WebSearchProvider>> {
    match DuckDuckGoSearch::new(&config.web) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "web search provider unavailable");
            None
        }
    }
}

fn default_fetch_provider(config: &ExecutorConfig) -> Option<Arc<dyn WebFetchProvider>> {
    match HttpFetcher::new(&config.web) {
        Ok(provider) => Some(Arc::new(provider)),
        Err(e) => {
            warn!(error = %e, "web fetch provider unavailable");
            None
        }
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "tool panicked".to_string()
    }
}
