//! HTTP API for the research assistant.
//!
//! ## Endpoints
//!
//! - `POST /api/chat` - Answer the latest message of a conversation
//! - `GET /api/health` - Health check

mod routes;
pub mod types;

pub use routes::{router, serve, AppState};
