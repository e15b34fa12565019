//! ai-assistant - AI pair programming and code review tools served over MCP.
//!
//! The server exposes five tools (`pair`, `review`, `brainstorm`,
//! `review_performance`, `review_security`). Each call is turned into a
//! prompt, forwarded to an OpenRouter chat-completions endpoint, and the
//! model's text is returned to the caller unmodified.
//!
//! ```text
//! MCP host (stdio)
//!     |  tools/call
//! AssistantServer ── validate args ── prompts::* ── OpenRouterProvider ── HTTPS
//!     |                                                   |
//!     └── single text content  <──  choices[0].message.content
//! ```
//!
//! Configuration (model aliases, default model, API key env var) is read once
//! at startup; the server holds no other state across calls.

pub mod catalog;
pub mod config;
pub mod prompts;
pub mod providers;
pub mod server;

pub use config::Config;
pub use server::AssistantServer;
