//! General web search through Exa.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{string_arg, Tool, ToolKind};
use crate::config::DEFAULT_EXA_BASE_URL;

const NUM_RESULTS: u32 = 3;

/// One normalized Exa hit.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ExaSearchResult {
    pub title: String,
    pub url: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
struct ExaResponse {
    #[serde(default)]
    results: Vec<ExaHit>,
}

#[derive(Debug, Deserialize)]
struct ExaHit {
    title: Option<String>,
    url: Option<String>,
    text: Option<String>,
}

/// Exa search client.
#[derive(Debug, Clone)]
pub struct ExaSearch {
    client: reqwest::Client,
    base_url: String,
}

impl ExaSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_EXA_BASE_URL)
    }

    pub fn with_base_url(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub async fn search(&self, api_key: &str, query: &str) -> anyhow::Result<Vec<ExaSearchResult>> {
        let response = self
            .client
            .post(format!("{}/search", self.base_url))
            .header("x-api-key", api_key)
            .json(&json!({
                "query": query,
                "useAutoprompt": true,
                "numResults": NUM_RESULTS,
                "contents": {
                    "text": {"includeHtmlTags": false}
                }
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("Exa API error: {} - {}", status.as_u16(), error));
        }

        let data: ExaResponse = response.json().await?;
        Ok(data
            .results
            .into_iter()
            .map(|hit| ExaSearchResult {
                title: hit.title.unwrap_or_else(|| "N/A".to_string()),
                url: hit.url.unwrap_or_else(|| "N/A".to_string()),
                text: hit.text.unwrap_or_default(),
            })
            .collect())
    }
}

/// Render Exa results as a text block for the model.
pub fn format_exa_results(results: &[ExaSearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No results found for \"{}\"", query);
    }

    let mut formatted = format!("Search results for \"{}\":\n\n", query);
    for result in results {
        formatted.push_str(&format!("Title: {}\n", result.title));
        formatted.push_str(&format!("URL: {}\n", result.url));
        formatted.push_str(&format!("Content: {}\n", result.text));
        formatted.push_str(&"-".repeat(20));
        formatted.push('\n');
    }
    formatted
}

#[async_trait]
impl Tool for ExaSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::ExaSearch
    }

    fn description(&self) -> &str {
        "Perform a web search using Exa.ai for recent and relevant information from across the web."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query to find information on the web."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>, api_key: &str) -> anyhow::Result<String> {
        let query = string_arg(args, "query")
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let results = self.search(api_key, &query).await?;
        Ok(format_exa_results(&results, &query))
    }
}
