// WebFetch tool implementation and its page provider

use crate::executor::config::{ExecutorConfig, WebConfig};
use crate::executor::html;
use crate::executor::text::truncate_chars;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, Result, ToolDefinition, ToolImpl, ToolKind, ToolOutput, WebFetchOutput,
};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, info};

const DESCRIPTION: &str = "Fetch a web page and return its visible text and title. \
Scripts, styles, navigation, headers and footers are removed; long pages are truncated.";

const TRUNCATION_MARKER: &str = "\n... [truncated]";

/// Retrieves raw page bodies
#[async_trait]
pub trait WebFetchProvider: Send + Sync {
    /// GET `url` and return the body. Non-2xx statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String>;
}

/// Default provider: a plain reqwest GET with a browser user agent
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(web: &WebConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(web.fetch_timeout())
            .user_agent(web.user_agent.as_str())
            .build()?;
        Ok(Self { client })
    }
}

#[async_trait]
impl WebFetchProvider for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<String> {
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.text().await?)
    }
}

fn default_prompt() -> String {
    "Summarize this page".to_string()
}

#[derive(Debug, Deserialize)]
struct WebFetchInput {
    #[serde(default)]
    url: String,
    /// Carried for the caller's summarization step; fetching ignores it
    #[serde(default = "default_prompt")]
    prompt: String,
}

/// WebFetch tool implementation
pub struct WebFetchTool {
    config: Arc<ExecutorConfig>,
    provider: Option<Arc<dyn WebFetchProvider>>,
}

impl WebFetchTool {
    pub fn new(config: Arc<ExecutorConfig>, provider: Option<Arc<dyn WebFetchProvider>>) -> Self {
        Self { config, provider }
    }
}

#[async_trait]
impl ToolImpl for WebFetchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebFetch
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::WebFetch,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "url": {
                        "type": "string",
                        "description": "URL to fetch"
                    },
                    "prompt": {
                        "type": "string",
                        "description": "What to extract from the page (default: \"Summarize this page\")"
                    }
                },
                "required": ["url"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let WebFetchInput { url, prompt } = parse_input(ToolKind::WebFetch, input)?;
        require(&url, "URL")?;

        let provider = self
            .provider
            .as_ref()
            .ok_or(ExecutorError::ProviderNotConfigured("Web fetch"))?;

        debug!(url = %url, prompt = %prompt, "fetching page");

        let body = provider
            .fetch(&url)
            .await
            .map_err(|e| ExecutorError::WebFetchFailed(e.to_string()))?;

        let title = html::extract_title(&body);
        let (mut content, truncated) =
            truncate_chars(&html::extract_text(&body), self.config.limits.max_fetch_chars);
        if truncated {
            content.push_str(TRUNCATION_MARKER);
        }
        let length = content.chars().count();

        info!(
            url = %url,
            body_bytes = body.len(),
            length,
            truncated,
            "page fetched"
        );

        Ok(ToolOutput::WebFetch(WebFetchOutput {
            content,
            url,
            title,
            length,
        }))
    }
}
