// Executor configuration
#![allow(dead_code)]

use crate::executor::error::ConfigError;
use crate::executor::paths;
use crate::executor::types::ToolKind;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

/// Default config file, relative to the process working directory
pub const DEFAULT_CONFIG_FILE: &str = "toolgate.toml";

/// Command substrings that are never executed. Matched case-insensitively, in order.
pub const DEFAULT_DANGEROUS_PATTERNS: [&str; 14] = [
    "rm -rf /",
    "rm -rf /*",
    "mkfs",
    "> /dev/sda",
    "dd if=/dev/zero",
    "dd if=/dev/random",
    ":(){:|:&};:",
    "chmod -R 777 /",
    "chown -R",
    "sudo rm",
    "wget | sh",
    "curl | sh",
    "wget | bash",
    "curl | bash",
];

/// Resource ceilings applied to every tool call
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest file Read will return, in bytes
    pub max_file_size_bytes: u64,
    /// Bash stdout ceiling, in characters
    pub max_output_chars: usize,
    /// Bash stderr ceiling, in characters
    pub max_stderr_chars: usize,
    /// Wall-clock limit for Bash and Grep subprocesses
    pub command_timeout_secs: u64,
    pub max_glob_results: usize,
    pub max_grep_matches: usize,
    /// Extracted page text ceiling for WebFetch, in characters
    pub max_fetch_chars: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_file_size_bytes: 50_000,
            max_output_chars: 10_000,
            max_stderr_chars: 2_000,
            command_timeout_secs: 30,
            max_glob_results: 100,
            max_grep_matches: 50,
            max_fetch_chars: 50_000,
        }
    }
}

impl Limits {
    pub fn command_timeout(&self) -> Duration {
        Duration::from_secs(self.command_timeout_secs)
    }
}

/// WebSearch / WebFetch provider settings
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// When false, neither web provider is installed
    pub enabled: bool,
    /// HTML search endpoint queried with `?q=`
    pub search_endpoint: String,
    pub user_agent: String,
    pub fetch_timeout_secs: u64,
    pub max_search_results: usize,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            search_endpoint: "https://html.duckduckgo.com/html/".to_string(),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)".to_string(),
            fetch_timeout_secs: 10,
            max_search_results: 5,
        }
    }
}

impl WebConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

/// Executor configuration
#[derive(Debug, Clone)]
pub struct ExecutorConfig {
    /// Root for relative paths, a permitted write root, and the cwd of subprocesses
    pub working_dir: PathBuf,
    /// The other permitted write root; also exported as `HOME` to commands
    pub home_dir: Option<PathBuf>,
    pub limits: Limits,
    pub dangerous_patterns: Vec<String>,
    /// Shell path for command execution
    pub shell: String,
    /// Program used by the default Grep provider
    pub grep_program: String,
    pub web: WebConfig,
    /// Per-tool description overrides, keyed by tool name
    pub tool_descriptions: HashMap<String, String>,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            working_dir: std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/")),
            home_dir: dirs::home_dir(),
            limits: Limits::default(),
            dangerous_patterns: DEFAULT_DANGEROUS_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            shell: String::from("/bin/sh"),
            grep_program: String::from("grep"),
            web: WebConfig::default(),
            tool_descriptions: HashMap::new(),
        }
    }
}

/// On-disk shape of `toolgate.toml`. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct FileConfig {
    working_dir: Option<PathBuf>,
    shell: Option<String>,
    grep_program: Option<String>,
    dangerous_patterns: Option<Vec<String>>,
    limits: Option<Limits>,
    web: Option<WebConfig>,
    tools: HashMap<String, ToolSection>,
}

#[derive(Debug, Default, Deserialize)]
struct ToolSection {
    description: Option<String>,
}

/// Parse an environment variable, logging a warning if the value is present but invalid.
fn parse_env_var<T: std::str::FromStr>(name: &str, default: T) -> T {
    match std::env::var(name) {
        Ok(v) => match v.parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                warn!(var = name, value = %v, "Invalid env var value, using default");
                default
            }
        },
        Err(_) => default,
    }
}

impl ExecutorConfig {
    /// Load from `.env`, the config file named by `TOOLGATE_CONFIG`, and environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(None)
    }

    /// Like [`ExecutorConfig::from_env`], with an explicit config file taking
    /// precedence over `TOOLGATE_CONFIG`. Environment variables override the file.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let path = match config_path {
            Some(path) => path.to_path_buf(),
            None => std::env::var("TOOLGATE_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE)),
        };

        let mut config = Self::default().with_file(&path)?;

        if let Ok(dir) = std::env::var("TOOLGATE_WORKING_DIR") {
            config.working_dir = PathBuf::from(dir);
        }
        if let Ok(shell) = std::env::var("TOOLGATE_SHELL") {
            config.shell = shell;
        }
        if let Ok(grep) = std::env::var("TOOLGATE_GREP") {
            config.grep_program = grep;
        }
        config.web.enabled = parse_env_var("TOOLGATE_WEB_ENABLED", config.web.enabled);
        config.limits.command_timeout_secs = parse_env_var(
            "TOOLGATE_COMMAND_TIMEOUT_SECS",
            config.limits.command_timeout_secs,
        );

        Ok(config)
    }

    /// Overlay values from a TOML file. A missing file leaves the config unchanged.
    pub fn with_file(mut self, path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(self);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: FileConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;

        if let Some(dir) = file.working_dir {
            self.working_dir = dir;
        }
        if let Some(shell) = file.shell {
            self.shell = shell;
        }
        if let Some(grep) = file.grep_program {
            self.grep_program = grep;
        }
        if let Some(patterns) = file.dangerous_patterns {
            self.dangerous_patterns = patterns;
        }
        if let Some(limits) = file.limits {
            self.limits = limits;
        }
        if let Some(web) = file.web {
            self.web = web;
        }
        for (name, section) in file.tools {
            if name.parse::<ToolKind>().is_err() {
                warn!(tool = %name, "ignoring description for unknown tool");
                continue;
            }
            if let Some(description) = section.description {
                self.tool_descriptions.insert(name, description);
            }
        }

        debug!(
            path = %path.display(),
            description_overrides = self.tool_descriptions.len(),
            "loaded config file"
        );
        Ok(self)
    }

    /// Reject settings no tool could run under
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.working_dir.is_dir() {
            return Err(ConfigError::Invalid(format!(
                "working directory {} is not a directory",
                self.working_dir.display()
            )));
        }
        if self.limits.command_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "limits.command_timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.web.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "web.fetch_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Make both sandbox roots absolute and symlink-free so they compare
    /// against resolved argument paths.
    pub fn normalized(mut self) -> Self {
        let absolute =
            std::path::absolute(&self.working_dir).unwrap_or_else(|_| self.working_dir.clone());
        self.working_dir = paths::canonicalize_lenient(&paths::normalize(&absolute));
        self.home_dir = self
            .home_dir
            .map(|home| paths::canonicalize_lenient(&paths::normalize(&home)));
        self
    }

    /// Resolve a path argument against the working directory
    pub fn resolve_path(&self, raw: &str) -> PathBuf {
        paths::resolve(raw, &self.working_dir, self.home_dir.as_deref())
    }

    /// Write sandbox: the path must sit under the home directory or the working directory
    pub fn is_writable(&self, path: &Path) -> bool {
        paths::is_within(path, &self.working_dir)
            || self
                .home_dir
                .as_deref()
                .is_some_and(|home| paths::is_within(path, home))
    }

    /// Description override for a tool, if the config file supplied one
    pub fn description_for(&self, kind: ToolKind) -> Option<&str> {
        self.tool_descriptions.get(kind.name()).map(String::as_str)
    }
}
