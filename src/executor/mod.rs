// Executor module - tool-call dispatch onto real filesystem, process and network effects
#![allow(unused_imports)]

pub mod bash;
pub mod config;
pub mod edit;
pub mod error;
pub mod glob_search;
pub mod grep_search;
pub mod html;
pub mod paths;
pub mod process;
pub mod read;
pub mod runner;
pub mod text;
pub mod tool;
pub mod types;
pub mod web_fetch;
pub mod web_search;
pub mod write;

pub use config::{ExecutorConfig, Limits, WebConfig};
pub use error::{ConfigError, ExecutorError, Result};
pub use grep_search::{ContentSearchProvider, GrepCommandSearch};
pub use runner::Executor;
pub use tool::ToolImpl;
pub use types::{
    BashOutput, BatchEntry, EditOutput, GlobOutput, GrepOutput, ReadOutput, SearchHit, ToolCall,
    ToolDefinition, ToolFailure, ToolKind, ToolOutput, ToolResult, WebFetchOutput,
    WebSearchOutput, WriteOutput,
};
pub use web_fetch::{HttpFetcher, WebFetchProvider};
pub use web_search::{DuckDuckGoSearch, WebSearchProvider};
