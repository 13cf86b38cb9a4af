//! API request and response types.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::agent::Domain;
use crate::chat::{Message, ToolCall};

/// Request to answer the latest message of a conversation.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// Conversation so far, oldest first
    pub messages: Vec<Message>,

    /// Research mode (defaults to `general`)
    #[serde(default)]
    pub domain: Domain,
}

impl ChatRequest {
    /// Parse a raw request body.
    ///
    /// Every failure is a client error; the message is returned to the caller verbatim.
    pub fn parse(body: &[u8]) -> Result<Self, String> {
        let value: Value =
            serde_json::from_slice(body).map_err(|e| format!("Invalid JSON body: {}", e))?;

        let messages = match value.get("messages") {
            Some(Value::Array(items)) => items.clone(),
            _ => return Err("Messages array is required".to_string()),
        };
        let messages: Vec<Message> = serde_json::from_value(Value::Array(messages))
            .map_err(|e| format!("Invalid messages: {}", e))?;

        let domain = match value.get("domain") {
            None | Some(Value::Null) => Domain::default(),
            Some(raw) => serde_json::from_value(raw.clone())
                .map_err(|_| format!("Unknown domain: {}", raw))?,
        };

        Ok(Self { messages, domain })
    }
}

/// Reply to a chat request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// The assistant's answer
    pub message: Message,

    /// Every tool call made while answering, in execution order
    #[serde(rename = "toolCalls")]
    pub tool_calls: Vec<ToolCall>,
}

/// Error body for every non-2xx response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,

    /// Service version
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_defaults_to_general() {
        let req = ChatRequest::parse(br#"{"messages": []}"#).unwrap();
        assert_eq!(req.domain, Domain::General);

        let req = ChatRequest::parse(br#"{"messages": [], "domain": null}"#).unwrap();
        assert_eq!(req.domain, Domain::General);
    }

    #[test]
    fn parses_messages_and_domain() {
        let req = ChatRequest::parse(
            br#"{"messages": [{"role": "user", "content": "hi"}], "domain": "market_research"}"#,
        )
        .unwrap();
        assert_eq!(req.messages.len(), 1);
        assert_eq!(req.domain, Domain::MarketResearch);
    }

    #[test]
    fn rejects_bad_bodies() {
        assert_eq!(
            ChatRequest::parse(br#"{"domain": "general"}"#).unwrap_err(),
            "Messages array is required"
        );
        assert_eq!(
            ChatRequest::parse(br#"{"messages": "hello"}"#).unwrap_err(),
            "Messages array is required"
        );
        assert_eq!(
            ChatRequest::parse(b"[]").unwrap_err(),
            "Messages array is required"
        );
        assert!(ChatRequest::parse(b"{oops").unwrap_err().starts_with("Invalid JSON body"));
        assert!(ChatRequest::parse(br#"{"messages": [{"role": "user"}]}"#)
            .unwrap_err()
            .starts_with("Invalid messages"));
        assert_eq!(
            ChatRequest::parse(br#"{"messages": [], "domain": "sports"}"#).unwrap_err(),
            "Unknown domain: \"sports\""
        );
    }
}
