//! Pipeline Module
//!
//! One instruction, one backend call, one accepted (or rejected) network.

mod outcome;
pub mod prompt;
pub mod reply;

pub use outcome::{
    CbnUpdate, FailureKind, TurnError, TurnFailure, TurnOutcome, TurnParts, PARSE_FAILURE_ADVISORY, RETRY_PROMPT,
    UNEXPECTED_FAILURE_ADVISORY,
};
pub use reply::{interpret_reply, ParsedReply, ReplyError};

use std::sync::Arc;
use tracing::{debug, error, info};

use crate::agent::{CompletionRequest, LLMProvider};
use crate::cbn::{ensure_cpds, Cbn};
use crate::config::Config;

pub const INTERPRETATION_FAILURE: &str = "Error: Unable to generate interpretation.";

/// Drives update and interpretation requests against a provider.
#[derive(Clone)]
pub struct CbnAssistant {
    provider: Arc<dyn LLMProvider>,
    model: String,
    temperature: f32,
    max_tokens: u32,
    interpretation_max_tokens: u32,
}

impl CbnAssistant {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &Config) -> Self {
        Self {
            provider,
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            interpretation_max_tokens: config.interpretation_max_tokens,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Apply `instruction` to `current`.
    ///
    /// Never fails: on any fault the outcome carries `current` itself
    /// together with an advisory message.
    pub async fn process(&self, current: &Arc<Cbn>, instruction: &str) -> TurnOutcome {
        info!("Processing user input: {}", instruction);
        match self.try_process(current, instruction).await {
            Ok(update) => TurnOutcome::Updated(update),
            Err(err) => {
                match err.kind() {
                    FailureKind::Parse => error!("Failed to parse AI model response: {}", err),
                    FailureKind::Structure => error!("Invalid AI model response structure: {}", err),
                    FailureKind::Unexpected => error!("Unexpected error while processing user input: {}", err),
                }
                TurnOutcome::failed(&err, current)
            }
        }
    }

    async fn try_process(&self, current: &Cbn, instruction: &str) -> Result<CbnUpdate, TurnError> {
        let messages = prompt::update_messages(current, instruction);
        info!("Generated prompt: {}", messages[1].content);

        let request = CompletionRequest {
            model: self.model.clone(),
            messages,
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        info!("Sending request to AI model {}", self.model);
        let raw = self.provider.generate(request).await.map_err(TurnError::Backend)?;
        info!("Received response from AI model");
        info!("Raw AI response: {}", raw);

        let reply = interpret_reply(&raw).inspect_err(|e| {
            if let ReplyError::InvalidJson(_) = e {
                error!("Content attempted to parse: {}", raw);
            }
        })?;

        let mut candidate = Cbn::from_untrusted(&reply.updated_cbn)?;
        let report = ensure_cpds(&mut candidate)?;
        debug!("Accepted CBN with {} nodes, {} edges", candidate.nodes.len(), candidate.edges.len());

        Ok(CbnUpdate {
            cbn: Arc::new(candidate),
            tentative_suggestions: reply.tentative_suggestions,
            reflection_prompts: reply.reflection_prompts,
            subclaims: reply.subclaims,
            defaulted_cpds: report.defaulted,
        })
    }

    /// Short free-text explanation of the network's structure.
    pub async fn interpret(&self, cbn: &Cbn) -> String {
        info!("Generating LLM interpretation of CBN");
        let request = CompletionRequest {
            model: self.model.clone(),
            messages: prompt::interpret_messages(cbn),
            temperature: self.temperature,
            max_tokens: self.interpretation_max_tokens,
        };

        match self.provider.generate(request).await {
            Ok(text) => {
                let interpretation = text.trim().to_string();
                info!("Raw AI interpretation: {}", interpretation);
                info!("Successfully generated CBN interpretation");
                interpretation
            }
            Err(e) => {
                error!("Error generating CBN interpretation: {:#}", e);
                INTERPRETATION_FAILURE.to_string()
            }
        }
    }
}
