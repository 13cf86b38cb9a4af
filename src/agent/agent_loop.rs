//! Core agent loop implementation.

use std::sync::Arc;

use serde_json::{json, Map};
use thiserror::Error;

use crate::chat::{self, Message};
use crate::llm::{self, ChatMessage, FinishReason, LlmClient, LlmError, DEFAULT_TEMPERATURE};
use crate::tools::{self, ToolRegistry};

use super::prompt::{get_system_prompt, Domain};

/// Model round-trips allowed per chat turn.
pub const MAX_ITERATIONS: usize = 5;

/// Reply used when the model is still asking for tools after the last round-trip.
pub const MAX_ITERATIONS_MESSAGE: &str =
    "I've reached the maximum number of tool calls. Here's what I found so far based on my research.";

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// The model answered without requesting tools.
    Done,
    /// The model was still requesting tools when the iteration cap was hit.
    MaxIterationsReached,
}

/// Final answer plus every tool call made while producing it.
#[derive(Debug, Clone)]
pub struct AgentOutcome {
    pub content: String,
    pub tool_calls: Vec<chat::ToolCall>,
    pub iterations: usize,
    pub termination: Termination,
}

/// The research agent.
pub struct Agent {
    llm: Arc<dyn LlmClient>,
    tools: Arc<ToolRegistry>,
    api_key: String,
}

impl Agent {
    /// Create a new agent that calls the model with `api_key`.
    pub fn new(
        llm: Arc<dyn LlmClient>,
        tools: Arc<ToolRegistry>,
        api_key: impl Into<String>,
    ) -> Self {
        Self {
            llm,
            tools,
            api_key: api_key.into(),
        }
    }

    /// Answer the last message of a conversation.
    ///
    /// Tool failures are fed back to the model as tool results; only a failed
    /// model call aborts the run.
    pub async fn run(
        &self,
        messages: &[Message],
        domain: Domain,
    ) -> Result<AgentOutcome, AgentError> {
        let mut history = build_history(messages, domain);
        let tool_schemas = self.tools.definitions();
        let mut all_tool_calls: Vec<chat::ToolCall> = Vec::new();

        for iteration in 1..=MAX_ITERATIONS {
            tracing::debug!("Agent iteration {} ({} history entries)", iteration, history.len());

            let response = self
                .llm
                .chat_completion(&self.api_key, &history, Some(&tool_schemas), DEFAULT_TEMPERATURE)
                .await?;

            let wants_tools = response.finish_reason == Some(FinishReason::ToolCalls)
                && !response.tool_calls.is_empty();
            if !wants_tools {
                tracing::debug!(
                    "Agent finished after {} iteration(s), finish_reason={:?}",
                    iteration,
                    response.finish_reason
                );
                return Ok(AgentOutcome {
                    content: response.content,
                    tool_calls: all_tool_calls,
                    iterations: iteration,
                    termination: Termination::Done,
                });
            }

            history.push(ChatMessage::assistant_tool_calls(
                response.content,
                response.tool_calls.clone(),
            ));

            // Tool results must follow the call order.
            for tool_call in &response.tool_calls {
                let record = self.execute_tool_call(tool_call).await;
                let payload = json!({ "result": record.result }).to_string();
                history.push(ChatMessage::tool_result(
                    &tool_call.id,
                    &tool_call.function.name,
                    payload,
                ));
                all_tool_calls.push(record);
            }
        }

        tracing::info!(
            "Agent hit the {} iteration cap with {} tool call(s)",
            MAX_ITERATIONS,
            all_tool_calls.len()
        );
        Ok(AgentOutcome {
            content: MAX_ITERATIONS_MESSAGE.to_string(),
            tool_calls: all_tool_calls,
            iterations: MAX_ITERATIONS,
            termination: Termination::MaxIterationsReached,
        })
    }

    /// Execute a single tool call, recording its arguments and result.
    async fn execute_tool_call(&self, tool_call: &llm::ToolCall) -> chat::ToolCall {
        let name = &tool_call.function.name;
        let (arguments, result) = match tools::parse_arguments(&tool_call.function.arguments) {
            Ok(arguments) => {
                let result = self.tools.execute(name, &arguments).await;
                (arguments, result)
            }
            Err(reason) => (Map::new(), tools::invalid_arguments(name, &reason)),
        };

        chat::ToolCall {
            id: tool_call.id.clone(),
            name: name.clone(),
            arguments,
            result: Some(result),
        }
    }
}

/// Seed the model-facing history: system prompt, then each stored message's
/// role and content. Stored tool calls are not replayed.
fn build_history(messages: &[Message], domain: Domain) -> Vec<ChatMessage> {
    let mut history = Vec::with_capacity(messages.len() + 1);
    history.push(ChatMessage::system(get_system_prompt(domain)));
    history.extend(messages.iter().map(|msg| {
        let role = match msg.role {
            chat::Role::User => llm::Role::User,
            chat::Role::Assistant => llm::Role::Assistant,
            chat::Role::System => llm::Role::System,
        };
        ChatMessage::text(role, msg.content.clone())
    }));
    history
}
