//! Agent Module
//!
//! The text-generation backend seam: a provider trait and its HTTP
//! implementation.

mod provider;

pub use provider::{ChatMessage, CompletionRequest, LLMProvider, OpenAICompatibleProvider, Role};
