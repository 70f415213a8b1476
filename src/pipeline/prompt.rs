//! Prompt builder
//!
//! Pure serialization of the current network and the user's instruction.

use crate::agent::ChatMessage;
use crate::cbn::Cbn;

pub const UPDATE_SYSTEM_PROMPT: &str =
    "You are an AI assistant that helps build Causal Bayesian Networks. Always respond with valid JSON.";

pub const INTERPRET_SYSTEM_PROMPT: &str = "You are an AI assistant that interprets Causal Bayesian Networks.";

/// Messages asking the model to apply `instruction` to `cbn`.
pub fn update_messages(cbn: &Cbn, instruction: &str) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(UPDATE_SYSTEM_PROMPT),
        ChatMessage::user(update_prompt(cbn, instruction)),
    ]
}

pub fn update_prompt(cbn: &Cbn, instruction: &str) -> String {
    let current = serde_json::to_string_pretty(cbn).unwrap_or_else(|_| "{}".to_string());

    format!(
        r#"You are a helpful assistant for building Causal Bayesian Networks (CBNs).

## Current CBN
{current}

## User Input
"{instruction}"

## Task
1. Update the CBN to reflect the user input.
2. Offer tentative suggestions for relationships that look incomplete.
3. Write reflection prompts that help the user check completeness and consistency.
4. If the claim is complex, break it down into subclaims.

Respond with a single JSON object of exactly this shape:
{{
    "updated_cbn": {{
        "nodes": [{{"name": "...", "states": ["..."], "observable": true}}],
        "edges": [{{"from": "...", "to": "..."}}],
        "cpds": {{
            "NodeName": {{
                "parents": ["..."],
                "probabilities": {{"ParentStateA_ParentStateB": [0.5, 0.5]}}
            }}
        }}
    }},
    "tentative_suggestions": ["..."],
    "reflection_prompts": ["..."],
    "subclaims": ["..."]
}}

Rules:
- Every property name must be in double quotes.
- Do not put comments in the JSON.
- Probability keys join the parent states with "_" in the order of "parents"; use "" for a node without parents.
- If a CPD has many combinations you may include a subset for brevity, but the JSON must stay valid.
"#
    )
}

/// Messages asking for a short explanation of the network's structure.
pub fn interpret_messages(cbn: &Cbn) -> Vec<ChatMessage> {
    vec![
        ChatMessage::system(INTERPRET_SYSTEM_PROMPT),
        ChatMessage::user(interpret_prompt(cbn)),
    ]
}

pub fn interpret_prompt(cbn: &Cbn) -> String {
    let structure = cbn.structure();
    format!(
        r#"Given the following Causal Bayesian Network (CBN):

Nodes: {}
Edges: {}

Please provide a brief interpretation of this network. Explain the relationships between the nodes and any insights that can be drawn from the structure. Keep your explanation concise and clear.
"#,
        structure["nodes"], structure["edges"]
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::Role;

    #[test]
    fn test_update_prompt_is_deterministic() {
        let cbn = Cbn::seagrass_restoration();
        assert_eq!(update_prompt(&cbn, "add tourism"), update_prompt(&cbn, "add tourism"));
    }

    #[test]
    fn test_update_prompt_contents() {
        let cbn = Cbn::seagrass_restoration();
        let prompt = update_prompt(&cbn, "Add a node for tourism");
        assert!(prompt.contains("\"Add a node for tourism\""));
        assert!(prompt.contains("\"Poor_Limited\""));
        for key in ["updated_cbn", "tentative_suggestions", "reflection_prompts", "subclaims"] {
            assert!(prompt.contains(&format!("\"{}\"", key)), "missing {}", key);
        }
        assert!(prompt.contains("double quotes"));
        assert!(prompt.contains("comments"));
        assert!(prompt.contains("subset for brevity"));
    }

    #[test]
    fn test_update_messages_roles() {
        let messages = update_messages(&Cbn::default(), "start");
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0].role, Role::System);
        assert_eq!(messages[0].content, UPDATE_SYSTEM_PROMPT);
        assert_eq!(messages[1].role, Role::User);
    }

    #[test]
    fn test_interpret_prompt_has_no_cpds() {
        let prompt = interpret_prompt(&Cbn::seagrass_restoration());
        assert!(prompt.contains("Local Support"));
        assert!(prompt.contains("\"from\":\"Local Support\""));
        assert!(!prompt.contains("probabilities"));
    }
}
