//! Search tools the model can call.
//!
//! The set of tools is closed: [`ToolKind`] names every tool and the
//! registry matches on it exhaustively. The model's free-text tool name is
//! checked against that enum before anything runs, and every failure past
//! that point (missing credential, bad arguments, provider error) comes back
//! as text so the model can react to it.

mod exa;
mod live;
mod youtube;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::config::{Credentials, Endpoints};
use crate::llm::ToolDefinition;

pub use exa::{format_exa_results, ExaSearch, ExaSearchResult};
pub use live::{format_live_results, LiveSearch, LiveSearchResult};
pub use youtube::{format_youtube_results, parse_max_results, YoutubeSearch, YoutubeSearchResult};

/// Every tool the assistant can offer the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolKind {
    ExaSearch,
    LiveSearch,
    YoutubeSearch,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [
        ToolKind::ExaSearch,
        ToolKind::LiveSearch,
        ToolKind::YoutubeSearch,
    ];

    /// Name the model uses to call the tool.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::ExaSearch => "exa_search",
            ToolKind::LiveSearch => "live_search",
            ToolKind::YoutubeSearch => "youtube_search",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.name() == name)
    }

    /// Configuration key holding the provider credential.
    pub fn credential_name(self) -> &'static str {
        match self {
            ToolKind::ExaSearch => "EXA_API_KEY",
            ToolKind::LiveSearch => "X_API_KEY",
            ToolKind::YoutubeSearch => "YOUTUBE_API_KEY",
        }
    }

    fn label(self) -> &'static str {
        match self {
            ToolKind::ExaSearch => "Exa",
            ToolKind::LiveSearch => "Live",
            ToolKind::YoutubeSearch => "YouTube",
        }
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A callable search capability.
#[async_trait]
pub trait Tool: Send + Sync {
    fn kind(&self) -> ToolKind;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn parameters_schema(&self) -> Value;

    /// Run the tool. Arguments have already been checked against
    /// [`Tool::parameters_schema`].
    async fn execute(&self, args: &Map<String, Value>, api_key: &str) -> anyhow::Result<String>;
}

/// Dispatches tool calls to the registered search tools.
pub struct ToolRegistry {
    tools: HashMap<ToolKind, Arc<dyn Tool>>,
    credentials: Credentials,
}

impl ToolRegistry {
    /// Registry backed by the real search providers.
    pub fn new(client: reqwest::Client, endpoints: &Endpoints, credentials: Credentials) -> Self {
        Self::with_tools(
            credentials,
            vec![
                Arc::new(ExaSearch::with_base_url(client.clone(), &endpoints.exa)) as Arc<dyn Tool>,
                Arc::new(LiveSearch::with_base_url(client.clone(), &endpoints.xai)),
                Arc::new(YoutubeSearch::with_base_url(client, &endpoints.youtube)),
            ],
        )
    }

    /// Registry over an explicit set of tools.
    pub fn with_tools(credentials: Credentials, tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools.into_iter().map(|tool| (tool.kind(), tool)).collect();
        Self { tools, credentials }
    }

    /// Schemas advertised to the model, in a stable order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        ToolKind::ALL
            .into_iter()
            .filter_map(|kind| self.tools.get(&kind))
            .map(|tool| {
                ToolDefinition::function(
                    tool.kind().name(),
                    tool.description(),
                    tool.parameters_schema(),
                )
            })
            .collect()
    }

    /// Execute a tool call by name. Never fails: errors are returned as text.
    pub async fn execute(&self, name: &str, args: &Map<String, Value>) -> String {
        let Some(tool) = ToolKind::from_name(name).and_then(|kind| self.tools.get(&kind)) else {
            tracing::warn!("Model requested unknown tool {}", name);
            return format!("Error: Unknown tool \"{}\"", name);
        };
        let kind = tool.kind();

        let Some(api_key) = self.credentials.for_tool(kind) else {
            tracing::warn!("{} called without {}", kind, kind.credential_name());
            return format!("Error: {} not configured.", kind.credential_name());
        };

        if let Err(reason) = validate_arguments(&tool.parameters_schema(), args) {
            return invalid_arguments(name, &reason);
        }

        let shown = Value::Object(args.clone());
        tracing::info!("Executing {} with args: {}", kind, shown);
        match tool.execute(args, api_key).await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!("{} failed: {:#}", kind, e);
                format!("Error performing {} search: {}", kind.label(), e)
            }
        }
    }
}

/// Parse the model's JSON-encoded arguments into an object.
pub fn parse_arguments(raw: &str) -> Result<Map<String, Value>, String> {
    // Some models send an empty string for tools without arguments.
    if raw.trim().is_empty() {
        return Ok(Map::new());
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected a JSON object, got {}", json_type(&other))),
        Err(e) => Err(format!("malformed JSON: {}", e)),
    }
}

/// Tool result text for arguments that failed to parse or validate.
pub fn invalid_arguments(name: &str, reason: &str) -> String {
    tracing::warn!("Invalid arguments for {}: {}", name, reason);
    format!("Error: Invalid arguments for \"{}\": {}", name, reason)
}

/// Check arguments against a tool's parameter schema.
///
/// Required parameters must be present and non-null. Declared parameters
/// must match their declared type, except that numbers are accepted where a
/// string is declared.
fn validate_arguments(schema: &Value, args: &Map<String, Value>) -> Result<(), String> {
    let required = schema["required"].as_array().into_iter().flatten();
    for name in required.filter_map(Value::as_str) {
        if args.get(name).map_or(true, Value::is_null) {
            return Err(format!("missing required parameter \"{}\"", name));
        }
    }

    let Some(properties) = schema["properties"].as_object() else {
        return Ok(());
    };
    for (name, value) in args {
        if value.is_null() {
            continue;
        }
        let Some(expected) = properties.get(name).and_then(|p| p["type"].as_str()) else {
            continue;
        };
        let ok = match expected {
            "string" => value.is_string() || value.is_number(),
            "integer" => value.is_i64() || value.is_u64(),
            "number" => value.is_number(),
            "boolean" => value.is_boolean(),
            "array" => value.is_array(),
            "object" => value.is_object(),
            _ => true,
        };
        if !ok {
            return Err(format!(
                "parameter \"{}\" must be a {}, got {}",
                name,
                expected,
                json_type(value)
            ));
        }
    }
    Ok(())
}

/// Read a string argument, accepting numbers as their decimal text.
fn string_arg(args: &Map<String, Value>, name: &str) -> Option<String> {
    match args.get(name)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Tool stub that records invocations instead of touching the network.
    struct RecordingTool {
        kind: ToolKind,
        calls: Arc<AtomicUsize>,
        outcome: Result<String, String>,
    }

    impl RecordingTool {
        fn ok(kind: ToolKind, output: &str) -> (Arc<dyn Tool>, Arc<AtomicUsize>) {
            Self::build(kind, Ok(output.to_string()))
        }

        fn failing(kind: ToolKind, error: &str) -> (Arc<dyn Tool>, Arc<AtomicUsize>) {
            Self::build(kind, Err(error.to_string()))
        }

        fn build(
            kind: ToolKind,
            outcome: Result<String, String>,
        ) -> (Arc<dyn Tool>, Arc<AtomicUsize>) {
            let calls = Arc::new(AtomicUsize::new(0));
            let tool: Arc<dyn Tool> = Arc::new(Self {
                kind,
                calls: calls.clone(),
                outcome,
            });
            (tool, calls)
        }
    }

    #[async_trait]
    impl Tool for RecordingTool {
        fn kind(&self) -> ToolKind {
            self.kind
        }

        fn description(&self) -> &str {
            "stub"
        }

        fn parameters_schema(&self) -> Value {
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string", "description": "q"},
                    "max_results": {"type": "string", "description": "n"}
                },
                "required": ["query"]
            })
        }

        async fn execute(
            &self,
            _args: &Map<String, Value>,
            _api_key: &str,
        ) -> anyhow::Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone().map_err(|e| anyhow::anyhow!(e))
        }
    }

    fn all_credentials() -> Credentials {
        Credentials {
            openrouter_api_key: Some("or".to_string()),
            exa_api_key: Some("exa".to_string()),
            x_api_key: Some("x".to_string()),
            youtube_api_key: Some("yt".to_string()),
        }
    }

    fn args(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn tool_names_round_trip() {
        for kind in ToolKind::ALL {
            assert_eq!(ToolKind::from_name(kind.name()), Some(kind));
        }
        assert_eq!(ToolKind::from_name("web_search"), None);
    }

    #[tokio::test]
    async fn unknown_tool_is_an_error_string() {
        let registry = ToolRegistry::with_tools(all_credentials(), Vec::new());
        let out = registry.execute("web_search", &Map::new()).await;
        assert_eq!(out, "Error: Unknown tool \"web_search\"");
    }

    #[tokio::test]
    async fn missing_credential_skips_the_adapter() {
        let (tool, calls) = RecordingTool::ok(ToolKind::ExaSearch, "results");
        let credentials = Credentials {
            exa_api_key: None,
            ..all_credentials()
        };
        let registry = ToolRegistry::with_tools(credentials, vec![tool]);

        let out = registry
            .execute("exa_search", &args(json!({"query": "rust"})))
            .await;

        assert_eq!(out, "Error: EXA_API_KEY not configured.");
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn adapter_failure_becomes_error_string() {
        let (tool, calls) =
            RecordingTool::failing(ToolKind::YoutubeSearch, "YouTube API error: 403 - quota");
        let registry = ToolRegistry::with_tools(all_credentials(), vec![tool]);

        let out = registry
            .execute("youtube_search", &args(json!({"query": "rust"})))
            .await;

        assert_eq!(
            out,
            "Error performing YouTube search: YouTube API error: 403 - quota"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn successful_dispatch_returns_tool_output() {
        let (exa, exa_calls) = RecordingTool::ok(ToolKind::ExaSearch, "exa results");
        let (live, live_calls) = RecordingTool::ok(ToolKind::LiveSearch, "live results");
        let registry = ToolRegistry::with_tools(all_credentials(), vec![exa, live]);

        let out = registry
            .execute("live_search", &args(json!({"query": "rust"})))
            .await;

        assert_eq!(out, "live results");
        assert_eq!(live_calls.load(Ordering::SeqCst), 1);
        assert_eq!(exa_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn invalid_arguments_skip_the_adapter() {
        let (tool, calls) = RecordingTool::ok(ToolKind::LiveSearch, "results");
        let registry = ToolRegistry::with_tools(all_credentials(), vec![tool]);

        let missing = registry.execute("live_search", &Map::new()).await;
        assert_eq!(
            missing,
            "Error: Invalid arguments for \"live_search\": missing required parameter \"query\""
        );

        let wrong_type = registry
            .execute("live_search", &args(json!({"query": ["a", "b"]})))
            .await;
        assert_eq!(
            wrong_type,
            "Error: Invalid arguments for \"live_search\": parameter \"query\" must be a string, got array"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn numbers_are_accepted_for_string_parameters() {
        let schema = json!({
            "type": "object",
            "properties": {"max_results": {"type": "string"}},
            "required": []
        });
        assert!(validate_arguments(&schema, &args(json!({"max_results": 10}))).is_ok());
        assert_eq!(
            string_arg(&args(json!({"max_results": 10})), "max_results").as_deref(),
            Some("10")
        );
    }

    #[test]
    fn parse_arguments_variants() {
        assert_eq!(
            parse_arguments(r#"{"query":"rust"}"#).unwrap()["query"],
            json!("rust")
        );
        assert!(parse_arguments("").unwrap().is_empty());
        assert!(parse_arguments("{not json").unwrap_err().starts_with("malformed JSON"));
        assert_eq!(
            parse_arguments("[1,2]").unwrap_err(),
            "expected a JSON object, got array"
        );
    }

    #[test]
    fn definitions_follow_tool_kind_order() {
        let (yt, _) = RecordingTool::ok(ToolKind::YoutubeSearch, "");
        let (exa, _) = RecordingTool::ok(ToolKind::ExaSearch, "");
        let registry = ToolRegistry::with_tools(all_credentials(), vec![yt, exa]);

        let names: Vec<_> = registry
            .definitions()
            .into_iter()
            .map(|d| d.function.name)
            .collect();
        assert_eq!(names, vec!["exa_search", "youtube_search"]);
    }

    #[test]
    fn real_registry_advertises_three_tools() {
        let registry = ToolRegistry::new(
            reqwest::Client::new(),
            &Endpoints::default(),
            Credentials::default(),
        );
        let defs = registry.definitions();
        assert_eq!(defs.len(), 3);
        for def in &defs {
            assert_eq!(def.tool_type, "function");
            assert_eq!(def.function.parameters["required"], json!(["query"]));
        }
    }
}
