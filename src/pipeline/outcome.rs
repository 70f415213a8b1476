//! Turn results
//!
//! A turn either produces a new network with advisory text, or fails and
//! hands back the previous network untouched. The failure kind is kept in
//! the type; the caller-visible shape is the same for every kind.

use std::sync::Arc;
use thiserror::Error;

use crate::cbn::{Cbn, DecodeError, ValidationError};
use crate::pipeline::reply::ReplyError;

pub const PARSE_FAILURE_ADVISORY: &str = "Error: Invalid or incomplete JSON response from AI model";
pub const UNEXPECTED_FAILURE_ADVISORY: &str = "Error: An unexpected error occurred";
pub const RETRY_PROMPT: &str = "Please try again";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Neither the full nor the repaired reply parsed.
    Parse,
    /// The reply parsed but lacks a required top-level field.
    Structure,
    /// Anything else: backend errors, undecodable records, impossible repairs.
    Unexpected,
}

/// Every per-turn fault, before it is folded into a [`TurnFailure`].
#[derive(Debug, Error)]
pub enum TurnError {
    #[error(transparent)]
    Reply(#[from] ReplyError),
    #[error("malformed updated_cbn: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("backend call failed: {0:#}")]
    Backend(anyhow::Error),
}

impl TurnError {
    pub fn kind(&self) -> FailureKind {
        match self {
            TurnError::Reply(ReplyError::InvalidJson(_)) => FailureKind::Parse,
            TurnError::Reply(ReplyError::MissingKey(_)) => FailureKind::Structure,
            TurnError::Decode(_) | TurnError::Validation(_) | TurnError::Backend(_) => FailureKind::Unexpected,
        }
    }

    /// Text shown to the user. Only structure failures name their cause.
    pub fn advisory(&self) -> String {
        match self.kind() {
            FailureKind::Parse => PARSE_FAILURE_ADVISORY.to_string(),
            FailureKind::Structure => format!("Error: {}", self),
            FailureKind::Unexpected => UNEXPECTED_FAILURE_ADVISORY.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CbnUpdate {
    pub cbn: Arc<Cbn>,
    pub tentative_suggestions: Vec<String>,
    pub reflection_prompts: Vec<String>,
    pub subclaims: Vec<String>,
    /// Nodes whose CPD was synthesized by the validator.
    pub defaulted_cpds: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TurnFailure {
    pub kind: FailureKind,
    /// The caller's network, same allocation as was passed in.
    pub previous: Arc<Cbn>,
    pub advisory: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Updated(CbnUpdate),
    Failed(TurnFailure),
}

/// Caller-facing view of a turn, identical in shape for success and failure.
#[derive(Debug, Clone, PartialEq)]
pub struct TurnParts {
    pub cbn: Arc<Cbn>,
    pub tentative_suggestions: Vec<String>,
    pub reflection_prompts: Vec<String>,
    pub subclaims: Vec<String>,
}

impl TurnOutcome {
    pub fn failed(error: &TurnError, previous: &Arc<Cbn>) -> Self {
        TurnOutcome::Failed(TurnFailure {
            kind: error.kind(),
            previous: Arc::clone(previous),
            advisory: error.advisory(),
        })
    }

    pub fn is_updated(&self) -> bool {
        matches!(self, TurnOutcome::Updated(_))
    }

    /// The network the caller should hold after this turn.
    pub fn cbn(&self) -> &Arc<Cbn> {
        match self {
            TurnOutcome::Updated(update) => &update.cbn,
            TurnOutcome::Failed(failure) => &failure.previous,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        match self {
            TurnOutcome::Updated(_) => None,
            TurnOutcome::Failed(failure) => Some(failure.kind),
        }
    }

    pub fn into_parts(self) -> TurnParts {
        match self {
            TurnOutcome::Updated(update) => TurnParts {
                cbn: update.cbn,
                tentative_suggestions: update.tentative_suggestions,
                reflection_prompts: update.reflection_prompts,
                subclaims: update.subclaims,
            },
            TurnOutcome::Failed(failure) => TurnParts {
                cbn: failure.previous,
                tentative_suggestions: vec![failure.advisory],
                reflection_prompts: vec![RETRY_PROMPT.to_string()],
                subclaims: Vec::new(),
            },
        }
    }
}
