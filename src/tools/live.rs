//! Real-time X (Twitter) search through the x.ai Live Search API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{string_arg, Tool, ToolKind};
use crate::config::DEFAULT_XAI_BASE_URL;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LiveSearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
}

#[derive(Debug, Deserialize)]
struct LiveResponse {
    #[serde(default)]
    results: Option<Vec<LiveHit>>,
}

#[derive(Debug, Deserialize)]
struct LiveHit {
    title: Option<String>,
    url: Option<String>,
    snippet: Option<String>,
}

/// x.ai Live Search client.
#[derive(Debug, Clone)]
pub struct LiveSearch {
    client: reqwest::Client,
    base_url: String,
}

impl LiveSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_XAI_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(
        &self,
        api_key: &str,
        query: &str,
    ) -> anyhow::Result<Vec<LiveSearchResult>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(api_key)
            .json(&json!({
                "query": query,
                "data_sources": ["x"],
                "search_depth": "advanced"
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("X.ai API error: {} - {}", status.as_u16(), error));
        }

        let data: LiveResponse = response.json().await?;
        let na = || "N/A".to_string();
        Ok(data
            .results
            .unwrap_or_default()
            .into_iter()
            .map(|hit| LiveSearchResult {
                title: hit.title.filter(|s| !s.is_empty()).unwrap_or_else(na),
                url: hit.url.filter(|s| !s.is_empty()).unwrap_or_else(na),
                snippet: hit.snippet.filter(|s| !s.is_empty()).unwrap_or_else(na),
            })
            .collect())
    }
}

/// Render Live Search results as a text block for the model.
pub fn format_live_results(results: &[LiveSearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found from Live Search for \"{}\"", query);
    }

    let mut formatted = format!("Live search results for \"{}\":\n\n", query);
    for result in results {
        formatted.push_str(&format!(
            "Title: {}\nURL: {}\nSnippet: {}\n\n",
            result.title, result.url, result.snippet
        ));
    }
    formatted.trim().to_string()
}

#[async_trait]
impl Tool for LiveSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::LiveSearch
    }

    fn description(&self) -> &str {
        "Perform a live search on X (formerly Twitter) using x.ai's Live Search API for real-time social media content."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for X/Twitter content."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>, api_key: &str) -> anyhow::Result<String> {
        let query = string_arg(args, "query")
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let results = self.search(api_key, &query).await?;
        Ok(format_live_results(&results, &query))
    }
}
