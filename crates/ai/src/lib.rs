//! AI summarization adapter.
//!
//! Renders portfolio data into prompts, sends them to a text-generation
//! endpoint and normalizes the reply into a JSON object. Without an API key
//! the engine answers from canned demo payloads.
//!
//! - [`AiConfig`]: endpoint, model and credential settings.
//! - [`CompletionClient`]: the seam to the remote model; [`AnthropicClient`]
//!   is the HTTP implementation.
//! - [`AiEngine`]: runs prompts and never fails; errors become a structured
//!   payload.
//! - [`prompts`]: system instruction and prompt templates.
//! - [`format`]: turns a reply into display text.

pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod format;
pub mod prompts;

pub use client::{AnthropicClient, CompletionClient};
pub use config::AiConfig;
pub use engine::AiEngine;
pub use error::AiError;
pub use prompts::PromptKind;
