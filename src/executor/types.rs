// Data types for Executor module
#![allow(dead_code)]

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// The closed set of tools the executor knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ToolKind {
    Read,
    Write,
    Edit,
    Bash,
    Glob,
    Grep,
    WebSearch,
    WebFetch,
}

impl ToolKind {
    /// Every tool, in the order they are advertised
    pub const ALL: [ToolKind; 8] = [
        ToolKind::Read,
        ToolKind::Write,
        ToolKind::Edit,
        ToolKind::Bash,
        ToolKind::Glob,
        ToolKind::Grep,
        ToolKind::WebSearch,
        ToolKind::WebFetch,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Read => "Read",
            ToolKind::Write => "Write",
            ToolKind::Edit => "Edit",
            ToolKind::Bash => "Bash",
            ToolKind::Glob => "Glob",
            ToolKind::Grep => "Grep",
            ToolKind::WebSearch => "WebSearch",
            ToolKind::WebFetch => "WebFetch",
        }
    }

    /// Names reported back when a caller asks for a tool that does not exist
    pub fn available_tools() -> Vec<String> {
        Self::ALL.iter().map(|kind| kind.name().to_string()).collect()
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ToolKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| name.to_string())
    }
}

/// A tool call as emitted by the planner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    #[serde(default)]
    pub tool: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(tool: impl Into<String>, arguments: Value) -> Self {
        let arguments = match arguments {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        Self {
            tool: tool.into(),
            arguments,
        }
    }
}

/// Lenient conversion: a missing or non-string `tool` becomes an empty name and
/// non-object `arguments` become empty, so malformed calls still get a result.
impl From<Value> for ToolCall {
    fn from(value: Value) -> Self {
        let tool = value
            .get("tool")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        let arguments = value
            .get("arguments")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        Self { tool, arguments }
    }
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Map<String, Value>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Tool definition advertised to the planner
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReadOutput {
    pub content: String,
    pub path: String,
    /// Character count of `content`
    pub size: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WriteOutput {
    pub success: bool,
    pub path: String,
    pub size: usize,
    pub lines: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EditOutput {
    pub success: bool,
    pub path: String,
    pub replaced: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BashOutput {
    pub stdout: String,
    /// `None` when the command wrote nothing to stderr
    pub stderr: Option<String>,
    pub returncode: i32,
    pub success: bool,
    /// Whether stdout was cut at the output ceiling
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobOutput {
    pub files: Vec<String>,
    pub directories: Vec<String>,
    pub total: usize,
    pub truncated: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GrepOutput {
    pub matches: Vec<String>,
    pub count: usize,
    pub pattern: String,
    pub path: String,
}

/// One web search hit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchOutput {
    pub results: Vec<SearchHit>,
    pub query: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebFetchOutput {
    pub content: String,
    pub url: String,
    pub title: Option<String>,
    pub length: usize,
}

/// Successful output of one tool, serialized as that tool's flat fields
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    Read(ReadOutput),
    Write(WriteOutput),
    Edit(EditOutput),
    Bash(BashOutput),
    Glob(GlobOutput),
    Grep(GrepOutput),
    WebSearch(WebSearchOutput),
    WebFetch(WebFetchOutput),
}

/// Failure reported back to the planner. `error` is always present; the
/// remaining fields only appear when they carry information.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocked: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_tools: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fix: Option<String>,
}

impl ToolFailure {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            ..Default::default()
        }
    }
}

/// The one result every tool call produces
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ToolResult {
    Success(ToolOutput),
    Error(ToolFailure),
}

impl ToolResult {
    pub fn is_error(&self) -> bool {
        matches!(self, ToolResult::Error(_))
    }

    /// The error message, if this is a failure
    pub fn error(&self) -> Option<&str> {
        match self {
            ToolResult::Error(failure) => Some(&failure.error),
            ToolResult::Success(_) => None,
        }
    }

    pub fn output(&self) -> Option<&ToolOutput> {
        match self {
            ToolResult::Success(output) => Some(output),
            ToolResult::Error(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolResult::Error(failure) => Some(failure),
            ToolResult::Success(_) => None,
        }
    }

    /// The JSON object handed back to the planner
    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }))
    }
}

/// One record of a batch run: the originating call, as submitted, paired with its result
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchEntry {
    pub tool: Value,
    pub arguments: Value,
    pub result: ToolResult,
}
