//! CBN Builder
//!
//! Edits a Causal Bayesian Network through natural-language instructions
//! realized by a text-generation model:
//! - Prompt building and lenient reply interpretation
//! - Partial-JSON recovery for truncated replies
//! - Structural repair (every node gets a CPD)
//! - Rollback to the previous network on any failure

pub mod agent;
pub mod cbn;
pub mod config;
pub mod pipeline;
pub mod render;
pub mod session;

// Re-exports for convenience
pub use agent::{LLMProvider, OpenAICompatibleProvider};
pub use cbn::{Cbn, Cpd, Edge, Node};
pub use config::Config;
pub use pipeline::{CbnAssistant, FailureKind, TurnOutcome};
pub use session::Session;
