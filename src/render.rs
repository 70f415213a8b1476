//! Rendering helpers
//!
//! Text views of a network for the presentation layer: a Mermaid flowchart,
//! compact CPD summaries and pretty-printed JSON.

use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

use crate::cbn::{Cbn, Cpd, PRIOR_KEY};

/// `Prior: [0.6, 0.4]` for an unconditional CPD, otherwise
/// `P(Weak=[0.8, 0.2] | Strong=[0.3, 0.7])`.
pub fn format_probabilities(cpd: &Cpd) -> String {
    if let Some(row) = cpd.probabilities.get(PRIOR_KEY) {
        return format!("Prior: {}", format_row(row));
    }
    let rows = cpd
        .probabilities
        .iter()
        .map(|(key, row)| format!("{}={}", key, format_row(row)))
        .collect::<Vec<_>>()
        .join(" | ");
    format!("P({})", rows)
}

fn format_row(row: &Value) -> String {
    let Value::Array(entries) = row else {
        return row.to_string();
    };
    let items = entries
        .iter()
        .map(|v| match v {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{}]", items)
}

/// Mermaid `flowchart TD` definition for `cbn`.
///
/// Edges naming nodes that do not exist are left out of the diagram.
pub fn mermaid(cbn: &Cbn) -> String {
    let ids: HashMap<&str, String> = cbn
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.name.as_str(), format!("N{}", i)))
        .collect();

    let mut lines = vec![
        "flowchart TD".to_string(),
        "    classDef default fill:#BAE6FD,stroke:#0369A1,stroke-width:2px;".to_string(),
    ];

    for node in &cbn.nodes {
        let cpd = cbn
            .cpds
            .get(&node.name)
            .map(format_probabilities)
            .unwrap_or_else(|| "none".to_string());
        let label = format!(
            "{}<br/>States: {}<br/>CPD: {}",
            node.name,
            node.states.join(", "),
            cpd
        );
        lines.push(format!("    {}[\"{}\"]", ids[node.name.as_str()], escape_label(&label)));
    }

    for edge in &cbn.edges {
        match (ids.get(edge.from.as_str()), ids.get(edge.to.as_str())) {
            (Some(from), Some(to)) => lines.push(format!("    {} --> {}", from, to)),
            _ => debug!("Skipping edge {} -> {} with unknown endpoint", edge.from, edge.to),
        }
    }

    lines.join("\n")
}

fn escape_label(label: &str) -> String {
    label.replace('"', "#quot;")
}

pub fn pretty_json(cbn: &Cbn) -> String {
    serde_json::to_string_pretty(cbn).unwrap_or_else(|_| "{}".to_string())
}
