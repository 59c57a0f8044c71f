// Error types for Executor module
#![allow(dead_code)]

use crate::executor::types::{ToolFailure, ToolKind};
use std::path::PathBuf;
use thiserror::Error;

/// Executor error types
///
/// The `Display` text of each variant is the exact `error` string the planner sees.
#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Invalid arguments for {0}: {1}")]
    InvalidInput(ToolKind, String),

    #[error("No {0} provided")]
    MissingArgument(&'static str),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Path not found: {0}")]
    PathNotFound(String),

    #[error("Not a file: {0}")]
    NotAFile(String),

    #[error("File too large ({size} bytes). Max: {limit} bytes")]
    FileTooLarge { size: u64, limit: u64 },

    #[error("Binary file cannot be read as text")]
    BinaryFile { path: String, size: u64 },

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Cannot write outside home directory or working directory")]
    SandboxViolation,

    #[error("old_string not found in file")]
    OldStringNotFound,

    #[error("old_string found {0} times. Must be unique.")]
    AmbiguousMatch(usize),

    #[error("Command blocked for safety: contains '{0}'")]
    CommandBlocked(String),

    #[error("Command timed out after {0} seconds")]
    CommandTimeout(u64),

    #[error("Search timed out")]
    SearchTimeout,

    #[error("{0} provider not configured")]
    ProviderNotConfigured(&'static str),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Edit failed: {0}")]
    EditFailed(String),

    #[error("Command failed: {0}")]
    CommandFailed(String),

    #[error("Glob failed: {0}")]
    GlobFailed(String),

    #[error("Search failed: {0}")]
    SearchFailed(String),

    #[error("Web search failed: {0}")]
    WebSearchFailed(String),

    #[error("Web fetch failed: {0}")]
    WebFetchFailed(String),

    #[error("{message}")]
    Panicked { tool: ToolKind, message: String },

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, ExecutorError>;

impl ExecutorError {
    /// Map an IO error on a user-supplied path, keeping permission problems distinct
    pub fn from_io(err: std::io::Error, raw_path: &str, fallback: fn(String) -> Self) -> Self {
        if err.kind() == std::io::ErrorKind::PermissionDenied {
            ExecutorError::PermissionDenied(raw_path.to_string())
        } else {
            fallback(err.to_string())
        }
    }
}

impl From<ExecutorError> for ToolFailure {
    fn from(err: ExecutorError) -> Self {
        let mut failure = ToolFailure::new(err.to_string());
        match err {
            ExecutorError::UnknownTool(_) => {
                failure.available_tools = Some(ToolKind::available_tools());
            }
            ExecutorError::InvalidInput(tool, _) | ExecutorError::Panicked { tool, .. } => {
                failure.tool = Some(tool.to_string());
            }
            ExecutorError::FileTooLarge { .. } => {
                failure.suggestion = Some("Use Bash with head/tail to read portions".to_string());
            }
            ExecutorError::BinaryFile { path, size } => {
                failure.path = Some(path);
                failure.size = Some(size);
            }
            ExecutorError::OldStringNotFound => {
                failure.suggestion = Some("Check exact whitespace and characters".to_string());
            }
            ExecutorError::AmbiguousMatch(_) => {
                failure.suggestion = Some("Provide more context to make it unique".to_string());
            }
            ExecutorError::CommandBlocked(_) => failure.blocked = Some(true),
            ExecutorError::CommandTimeout(_) | ExecutorError::SearchTimeout => {
                failure.timeout = Some(true);
            }
            ExecutorError::ProviderNotConfigured(_) => {
                failure.fix = Some(
                    "Enable [web] in toolgate.toml or set TOOLGATE_WEB_ENABLED=true".to_string(),
                );
            }
            _ => {}
        }
        failure
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("TOML parse error in {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
