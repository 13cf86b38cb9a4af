//! Video search through the YouTube Data API.

use async_trait::async_trait;
use chrono::DateTime;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

use super::{string_arg, Tool, ToolKind};
use crate::config::DEFAULT_YOUTUBE_BASE_URL;

pub const DEFAULT_MAX_RESULTS: u32 = 5;
pub const MAX_RESULTS_LIMIT: u32 = 50;

const DESCRIPTION_LIMIT: usize = 200;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct YoutubeSearchResult {
    pub title: String,
    pub video_id: String,
    pub channel_title: String,
    pub description: String,
    pub published_at: String,
    pub thumbnail_url: String,
}

#[derive(Debug, Deserialize)]
struct YoutubeResponse {
    #[serde(default)]
    items: Option<Vec<YoutubeItem>>,
    #[serde(default)]
    error: Option<YoutubeApiError>,
}

#[derive(Debug, Deserialize)]
struct YoutubeApiError {
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct YoutubeItem {
    #[serde(default)]
    id: ItemId,
    #[serde(default)]
    snippet: Snippet,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
    video_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct Snippet {
    title: String,
    description: String,
    channel_title: String,
    published_at: String,
    thumbnails: Thumbnails,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Thumbnails {
    default: Option<Thumbnail>,
    medium: Option<Thumbnail>,
}

#[derive(Debug, Deserialize)]
struct Thumbnail {
    url: String,
}

/// Interpret a requested result count.
///
/// Strings are read like a leading integer ("10 videos" is 10). Anything
/// unreadable, or zero, means the default; the result is clamped to 1..=50.
pub fn parse_max_results(value: Option<&Value>) -> u32 {
    let requested = match value {
        Some(Value::String(s)) => leading_integer(s),
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        _ => None,
    };

    match requested {
        None | Some(0) => DEFAULT_MAX_RESULTS,
        Some(n) => n.clamp(1, MAX_RESULTS_LIMIT as i64) as u32,
    }
}

fn leading_integer(s: &str) -> Option<i64> {
    let s = s.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let end = digits
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return None;
    }
    // Overlong digit strings saturate; they clamp to the limit anyway.
    let magnitude = digits[..end].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -magnitude } else { magnitude })
}

/// YouTube search client.
#[derive(Debug, Clone)]
pub struct YoutubeSearch {
    client: reqwest::Client,
    base_url: String,
}

impl YoutubeSearch {
    pub fn new(client: reqwest::Client) -> Self {
        Self::with_base_url(client, DEFAULT_YOUTUBE_BASE_URL)
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
        max_results: u32,
    ) -> anyhow::Result<Vec<YoutubeSearchResult>> {
        let max_results = max_results.clamp(1, MAX_RESULTS_LIMIT);
        let max_param = max_results.to_string();
        let response = self
            .client
            .get(format!("{}/search", self.base_url))
            .query(&[
                ("part", "snippet"),
                ("q", query),
                ("type", "video"),
                ("maxResults", max_param.as_str()),
                ("key", api_key),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error = response.text().await.unwrap_or_default();
            return Err(anyhow::anyhow!("YouTube API error: {} - {}", status.as_u16(), error));
        }

        let data: YoutubeResponse = response.json().await?;
        if let Some(error) = data.error {
            return Err(anyhow::anyhow!("YouTube API error: {}", error.message));
        }

        Ok(data
            .items
            .unwrap_or_default()
            .into_iter()
            .filter_map(|item| {
                let video_id = item.id.video_id.filter(|id| !id.is_empty())?;
                let snippet = item.snippet;
                let thumbnail_url = snippet
                    .thumbnails
                    .medium
                    .or(snippet.thumbnails.default)
                    .map(|t| t.url)
                    .unwrap_or_default();
                Some(YoutubeSearchResult {
                    title: snippet.title,
                    video_id,
                    channel_title: snippet.channel_title,
                    description: snippet.description,
                    published_at: snippet.published_at,
                    thumbnail_url,
                })
            })
            .take(max_results as usize)
            .collect())
    }
}

/// Render YouTube results as a text block for the model.
pub fn format_youtube_results(results: &[YoutubeSearchResult], query: &str) -> String {
    if results.is_empty() {
        return format!("No YouTube videos found for \"{}\"", query);
    }

    let mut formatted = format!("YouTube search results for \"{}\":\n\n", query);
    for result in results {
        formatted.push_str(&format!("Title: {}\n", result.title));
        formatted.push_str(&format!("Channel: {}\n", result.channel_title));
        formatted.push_str(&format!(
            "URL: https://www.youtube.com/watch?v={}\n",
            result.video_id
        ));
        formatted.push_str(&format!("Published: {}\n", format_date(&result.published_at)));
        formatted.push_str(&format!(
            "Description: {}\n",
            truncate_description(&result.description)
        ));
        formatted.push_str(&"-".repeat(20));
        formatted.push('\n');
    }
    formatted
}

fn format_date(published_at: &str) -> String {
    DateTime::parse_from_rfc3339(published_at)
        .map(|d| d.format("%-m/%-d/%Y").to_string())
        .unwrap_or_else(|_| published_at.to_string())
}

fn truncate_description(description: &str) -> String {
    match description.char_indices().nth(DESCRIPTION_LIMIT) {
        Some((cut, _)) => format!("{}...", &description[..cut]),
        None => description.to_string(),
    }
}

#[async_trait]
impl Tool for YoutubeSearch {
    fn kind(&self) -> ToolKind {
        ToolKind::YoutubeSearch
    }

    fn description(&self) -> &str {
        "Search YouTube for videos related to a topic. Returns video titles, channels, and descriptions."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query for YouTube videos."
                },
                "max_results": {
                    "type": "string",
                    "description": "Maximum number of results to return (1-50). Default is 5."
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(&self, args: &Map<String, Value>, api_key: &str) -> anyhow::Result<String> {
        let query = string_arg(args, "query")
            .ok_or_else(|| anyhow::anyhow!("Missing 'query' argument"))?;
        let max_results = parse_max_results(args.get("max_results"));
        let results = self.search(api_key, &query, max_results).await?;
        Ok(format_youtube_results(&results, &query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn item(video_id: Option<&str>, title: &str) -> Value {
        let mut id = json!({"kind": "youtube#video"});
        if let Some(video_id) = video_id {
            id["videoId"] = json!(video_id);
        }
        json!({
            "id": id,
            "snippet": {
                "title": title,
                "description": "desc",
                "channelTitle": "Channel",
                "publishedAt": "2024-01-15T10:30:00Z",
                "thumbnails": {
                    "default": {"url": "https://i.ytimg.com/default.jpg"},
                    "medium": {"url": "https://i.ytimg.com/medium.jpg"}
                }
            }
        })
    }

    #[test]
    fn max_results_parsing() {
        assert_eq!(parse_max_results(None), 5);
        assert_eq!(parse_max_results(Some(&json!("abc"))), 5);
        assert_eq!(parse_max_results(Some(&json!(""))), 5);
        assert_eq!(parse_max_results(Some(&json!("0"))), 5);
        assert_eq!(parse_max_results(Some(&json!("12"))), 12);
        assert_eq!(parse_max_results(Some(&json!(" 7 videos"))), 7);
        assert_eq!(parse_max_results(Some(&json!("500"))), 50);
        assert_eq!(parse_max_results(Some(&json!("-3"))), 1);
        assert_eq!(parse_max_results(Some(&json!(20))), 20);
        assert_eq!(parse_max_results(Some(&json!(3.9))), 3);
        assert_eq!(parse_max_results(Some(&json!(true))), 5);
        assert_eq!(parse_max_results(Some(&json!("99999999999999999999999"))), 50);
    }

    #[tokio::test]
    async fn search_filters_items_without_video_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("part", "snippet"))
            .and(query_param("type", "video"))
            .and(query_param("maxResults", "3"))
            .and(query_param("key", "yt-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    item(Some("abc123"), "First"),
                    item(None, "Channel result"),
                    item(Some("def456"), "Second")
                ]
            })))
            .mount(&server)
            .await;

        let yt = YoutubeSearch::with_base_url(reqwest::Client::new(), server.uri());
        let results = yt.search("yt-key", "rust", 3).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].video_id, "abc123");
        assert_eq!(results[0].thumbnail_url, "https://i.ytimg.com/medium.jpg");
        assert_eq!(results[1].title, "Second");
    }

    #[tokio::test]
    async fn output_never_exceeds_requested_count() {
        let server = MockServer::start().await;
        let items: Vec<Value> = (0..4)
            .map(|i| item(Some(format!("v{}", i).as_str()), "t"))
            .collect();
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": items})))
            .mount(&server)
            .await;

        let yt = YoutubeSearch::with_base_url(reqwest::Client::new(), server.uri());
        let results = yt.search("yt-key", "rust", 2).await.unwrap();
        assert_eq!(results.len(), 2);
    }

    #[tokio::test]
    async fn error_body_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "error": {"code": 400, "message": "API key not valid"}
            })))
            .mount(&server)
            .await;

        let yt = YoutubeSearch::with_base_url(reqwest::Client::new(), server.uri());
        let err = yt.search("bad", "rust", 5).await.unwrap_err();
        assert_eq!(err.to_string(), "YouTube API error: API key not valid");
    }

    #[tokio::test]
    async fn execute_uses_default_count_for_unparsable_input() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/search"))
            .and(query_param("maxResults", "5"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
            .expect(1)
            .mount(&server)
            .await;

        let yt = YoutubeSearch::with_base_url(reqwest::Client::new(), server.uri());
        let args = json!({"query": "cats", "max_results": "lots"})
            .as_object()
            .cloned()
            .unwrap();
        let out = yt.execute(&args, "yt-key").await.unwrap();
        assert_eq!(out, "No YouTube videos found for \"cats\"");
    }

    #[test]
    fn long_descriptions_are_truncated() {
        let result = YoutubeSearchResult {
            title: "T".to_string(),
            video_id: "abc".to_string(),
            channel_title: "C".to_string(),
            description: "é".repeat(250),
            published_at: "2024-01-15T10:30:00Z".to_string(),
            thumbnail_url: String::new(),
        };
        let out = format_youtube_results(&[result], "q");

        assert!(out.starts_with("YouTube search results for \"q\":\n\n"));
        assert!(out.contains("URL: https://www.youtube.com/watch?v=abc\n"));
        assert!(out.contains("Published: 1/15/2024\n"));
        assert!(out.contains(&format!("Description: {}...\n", "é".repeat(200))));
    }

    #[test]
    fn short_descriptions_are_untouched() {
        assert_eq!(truncate_description("short"), "short");
        assert_eq!(truncate_description(&"a".repeat(200)), "a".repeat(200));
        assert_eq!(format_date("not a date"), "not a date");
    }
}
