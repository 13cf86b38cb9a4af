//! Agent module - the research agent logic.
//!
//! The agent follows a "tools in a loop" pattern:
//! 1. Build the history from the system prompt and the conversation so far
//! 2. Call the LLM with the search tools
//! 3. If the LLM requests tool calls, execute them in order and feed results back
//! 4. Repeat until the LLM answers or the iteration cap is reached

mod agent_loop;
mod prompt;

pub use agent_loop::{
    Agent, AgentError, AgentOutcome, Termination, MAX_ITERATIONS, MAX_ITERATIONS_MESSAGE,
};
pub use prompt::{get_system_prompt, Domain};
