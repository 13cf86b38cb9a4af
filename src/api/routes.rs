//! HTTP routes.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::types::{ChatRequest, ChatResponse, ErrorResponse, HealthResponse};
use crate::agent::Agent;
use crate::chat::Message;
use crate::config::Config;
use crate::llm::{LlmClient, OpenRouterClient};
use crate::tools::ToolRegistry;

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub llm: Arc<dyn LlmClient>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    /// State wired to the real upstream services.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("kimi-possible/", env!("CARGO_PKG_VERSION")))
            .build()?;
        let llm = Arc::new(OpenRouterClient::with_base_url(
            http.clone(),
            &config.endpoints.openrouter,
        ));
        let tools = Arc::new(ToolRegistry::new(
            http,
            &config.endpoints,
            config.credentials.clone(),
        ));
        Ok(Self { config, llm, tools })
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let addr = format!("{}:{}", config.host, config.port);
    let state = Arc::new(AppState::from_config(config)?);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = ErrorResponse {
        error: message.into(),
    };
    (status, Json(body)).into_response()
}

/// POST /api/chat
async fn chat(State(state): State<Arc<AppState>>, body: Bytes) -> Response {
    let request = match ChatRequest::parse(&body) {
        Ok(request) => request,
        Err(message) => {
            tracing::debug!("Rejected chat request: {}", message);
            return error_response(StatusCode::BAD_REQUEST, message);
        }
    };

    let Some(api_key) = state.config.credentials.openrouter_api_key.clone() else {
        tracing::error!("OPENROUTER_API_KEY is not configured");
        return error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            "OPENROUTER_API_KEY is not configured",
        );
    };

    tracing::info!(
        messages = request.messages.len(),
        domain = ?request.domain,
        "Chat request"
    );

    let agent = Agent::new(state.llm.clone(), state.tools.clone(), api_key);
    match agent.run(&request.messages, request.domain).await {
        Ok(outcome) => {
            tracing::info!(
                iterations = outcome.iterations,
                termination = ?outcome.termination,
                tool_calls = outcome.tool_calls.len(),
                "Chat answered"
            );
            let message = Message::assistant(outcome.content, outcome.tool_calls.clone());
            Json(ChatResponse {
                message,
                tool_calls: outcome.tool_calls,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("Chat API error: {}", e);
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /api/health
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
