// WebSearch tool implementation and its search provider

use crate::executor::config::{ExecutorConfig, WebConfig};
use crate::executor::html;
use crate::executor::tool::{definition, parse_input, require};
use crate::executor::{
    ExecutorError, Result, SearchHit, ToolDefinition, ToolImpl, ToolKind, ToolOutput,
    WebSearchOutput,
};
use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::{Arc, LazyLock};
use tracing::{debug, info};

const DESCRIPTION: &str = "Search the web and return the top results as title, url and snippet.";

/// Answers web search queries
#[async_trait]
pub trait WebSearchProvider: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}

/// Default provider: scrapes the DuckDuckGo HTML endpoint (no API key)
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(web: &WebConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(web.fetch_timeout())
            .user_agent(web.user_agent.as_str())
            .build()?;
        Ok(Self {
            client,
            endpoint: web.search_endpoint.clone(),
        })
    }
}

#[async_trait]
impl WebSearchProvider for DuckDuckGoSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        let body = self
            .client
            .get(&self.endpoint)
            .query(&[("q", query)])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;
        Ok(parse_results(&body, max_results))
    }
}

static RESULT_LINK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<a\b([^>]*\bclass="[^"]*\bresult__a\b[^"]*"[^>]*)>(.*?)</a>"#)
        .expect("valid result link regex")
});

static RESULT_SNIPPET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?s)<(a|div|td)\b[^>]*\bclass="[^"]*\bresult__snippet\b[^"]*"[^>]*>(.*?)</(?:a|div|td)>"#)
        .expect("valid snippet regex")
});

static HREF: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"\bhref="([^"]*)""#).expect("valid href regex"));

/// Pull result links and their snippets out of a DuckDuckGo HTML page
fn parse_results(body: &str, max_results: usize) -> Vec<SearchHit> {
    let links: Vec<_> = RESULT_LINK.captures_iter(body).collect();
    let mut hits = Vec::new();

    for (i, link) in links.iter().enumerate() {
        if hits.len() >= max_results {
            break;
        }
        let (Some(whole), Some(attrs), Some(title)) = (link.get(0), link.get(1), link.get(2))
        else {
            continue;
        };
        let Some(href) = HREF.captures(attrs.as_str()).and_then(|c| c.get(1)) else {
            continue;
        };

        let segment_end = links
            .get(i + 1)
            .and_then(|next| next.get(0))
            .map_or(body.len(), |next| next.start());
        let snippet = RESULT_SNIPPET
            .captures(&body[whole.end()..segment_end])
            .and_then(|c| c.get(2))
            .map(|m| html::inline_text(m.as_str()))
            .unwrap_or_default();

        hits.push(SearchHit {
            title: html::inline_text(title.as_str()),
            url: result_url(href.as_str()),
            snippet,
        });
    }

    hits
}

/// Unwrap DuckDuckGo's `/l/?uddg=<target>` redirect links
fn result_url(href: &str) -> String {
    let href = html::decode_entities(href);
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href
    };
    match reqwest::Url::parse(&absolute) {
        Ok(url) => url
            .query_pairs()
            .find(|(key, _)| key == "uddg")
            .map(|(_, target)| target.into_owned())
            .unwrap_or(absolute),
        Err(_) => absolute,
    }
}

#[derive(Debug, Deserialize)]
struct WebSearchInput {
    #[serde(default)]
    query: String,
}

/// WebSearch tool implementation
pub struct WebSearchTool {
    config: Arc<ExecutorConfig>,
    provider: Option<Arc<dyn WebSearchProvider>>,
}

impl WebSearchTool {
    pub fn new(config: Arc<ExecutorConfig>, provider: Option<Arc<dyn WebSearchProvider>>) -> Self {
        Self { config, provider }
    }
}

#[async_trait]
impl ToolImpl for WebSearchTool {
    fn kind(&self) -> ToolKind {
        ToolKind::WebSearch
    }

    fn definition(&self) -> ToolDefinition {
        definition(
            &self.config,
            ToolKind::WebSearch,
            DESCRIPTION,
            serde_json::json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "Search query"
                    }
                },
                "required": ["query"]
            }),
        )
    }

    async fn run(&self, input: Map<String, Value>) -> Result<ToolOutput> {
        let WebSearchInput { query } = parse_input(ToolKind::WebSearch, input)?;
        require(&query, "query")?;

        let provider = self
            .provider
            .as_ref()
            .ok_or(ExecutorError::ProviderNotConfigured("Web search"))?;

        debug!(query = %query, "searching the web");

        let results = provider
            .search(&query, self.config.web.max_search_results)
            .await
            .map_err(|e| ExecutorError::WebSearchFailed(e.to_string()))?;

        info!(query = %query, count = results.len(), "web search completed");

        Ok(ToolOutput::WebSearch(WebSearchOutput {
            count: results.len(),
            results,
            query,
        }))
    }
}
