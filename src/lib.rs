//! # Kimi Possible
//!
//! A conversational research assistant backed by live web search.
//!
//! This library provides:
//! - An HTTP API that answers chat conversations
//! - A tool-based agent loop over Exa, X.ai Live Search and YouTube
//! - Integration with OpenRouter for LLM access
//!
//! ## Architecture
//!
//! The agent follows the "tools in a loop" pattern:
//! 1. Receive a conversation and research domain via the API
//! 2. Build context with the domain's system prompt and the search tools
//! 3. Call the LLM, execute any requested searches
//! 4. Feed results back to the LLM, repeat until it answers or the cap is hit
//!
//! ## Example
//!
//! ```rust,ignore
//! use kimi_possible::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod chat;
pub mod config;
pub mod llm;
pub mod tools;

pub use config::Config;
