//! Session Module
//!
//! Threads the current network through successive turns for one user.

mod transcript;

pub use transcript::{ConversationTurn, Transcript};

use std::sync::Arc;
use tracing::{info, warn};

use crate::cbn::Cbn;
use crate::config::InterpretationTiming;
use crate::pipeline::{CbnAssistant, TurnOutcome};

pub const WELCOME_MESSAGE: &str = "Welcome to the Causal Bayesian Network Builder!

We're starting with a simple scenario about marine ecosystem restoration and carbon sequestration.

You can:
• Add new factors
• Modify relationships
• Update probabilities
• Ask questions about the model

What would you like to explore?";

/// Result of one submitted instruction
#[derive(Debug, Clone, PartialEq)]
pub struct TurnReport {
    pub outcome: TurnOutcome,
    pub interpretation: String,
}

impl TurnReport {
    /// One-line summary recorded in the transcript.
    pub fn summary(&self) -> String {
        match &self.outcome {
            TurnOutcome::Updated(update) => format!(
                "Updated the network ({} nodes, {} edges).",
                update.cbn.nodes.len(),
                update.cbn.edges.len()
            ),
            TurnOutcome::Failed(failure) => failure.advisory.clone(),
        }
    }
}

pub struct Session {
    assistant: CbnAssistant,
    initial: Arc<Cbn>,
    current: Arc<Cbn>,
    transcript: Transcript,
    timing: InterpretationTiming,
}

impl Session {
    pub fn new(assistant: CbnAssistant, initial: Cbn) -> Self {
        let initial = Arc::new(initial);
        Self {
            assistant,
            current: Arc::clone(&initial),
            initial,
            transcript: Transcript::default(),
            timing: InterpretationTiming::default(),
        }
    }

    pub fn with_timing(mut self, timing: InterpretationTiming) -> Self {
        self.timing = timing;
        self
    }

    pub fn current(&self) -> &Arc<Cbn> {
        &self.current
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Greeting plus an interpretation of the current network.
    pub async fn welcome(&mut self) -> (String, String) {
        self.transcript.add_assistant(WELCOME_MESSAGE);
        info!("Initialized chat with welcome message");
        let interpretation = self.assistant.interpret(&self.current).await;
        (WELCOME_MESSAGE.to_string(), interpretation)
    }

    /// Run one instruction and adopt the resulting network.
    pub async fn submit(&mut self, instruction: &str) -> TurnReport {
        self.transcript.add_user(instruction);

        let stale_interpretation = match self.timing {
            InterpretationTiming::BeforeUpdate => Some(self.assistant.interpret(&self.current).await),
            InterpretationTiming::AfterUpdate => None,
        };

        let outcome = self.assistant.process(&self.current, instruction).await;
        if let TurnOutcome::Failed(failure) = &outcome {
            warn!("Turn failed ({:?}), keeping previous network", failure.kind);
        }
        self.current = Arc::clone(outcome.cbn());

        let interpretation = match stale_interpretation {
            Some(text) => text,
            None => self.assistant.interpret(&self.current).await,
        };

        let report = TurnReport { outcome, interpretation };
        self.transcript.add_assistant(report.summary());
        report
    }

    /// Restore the starting network and forget the conversation.
    pub fn reset(&mut self) {
        self.current = Arc::clone(&self.initial);
        self.transcript.clear();
        info!("Session reset to the initial network");
    }
}
