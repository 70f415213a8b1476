//! Structural repair
//!
//! The only automatic repair: every node gets a CPD. Missing ones become a
//! uniform prior over the node's own states. Edges, normalization and
//! parent-key coverage are left exactly as the model produced them.

use thiserror::Error;
use tracing::warn;

use super::{Cbn, Cpd};

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("node '{0}' has no states, cannot synthesize a default CPD")]
    NoStates(String),
}

/// Nodes that received a synthesized CPD, in node order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RepairReport {
    pub defaulted: Vec<String>,
}

impl RepairReport {
    pub fn is_clean(&self) -> bool {
        self.defaulted.is_empty()
    }
}

/// Give every node in `cbn` a CPD, in place.
pub fn ensure_cpds(cbn: &mut Cbn) -> Result<RepairReport, ValidationError> {
    let mut report = RepairReport::default();

    for node in &cbn.nodes {
        if cbn.cpds.contains_key(&node.name) {
            continue;
        }
        if node.states.is_empty() {
            return Err(ValidationError::NoStates(node.name.clone()));
        }
        warn!("Node '{}' is missing CPD. Adding default CPD.", node.name);
        cbn.cpds.insert(node.name.clone(), Cpd::uniform(node.states.len()));
        report.defaulted.push(node.name.clone());
    }

    Ok(report)
}
