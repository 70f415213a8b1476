#![allow(dead_code)]

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

use cbn_builder::agent::{CompletionRequest, LLMProvider};

/// Replays canned replies in order and records every request it receives.
pub struct ScriptedProvider {
    replies: Arc<Mutex<VecDeque<Result<String, String>>>>,
    requests: Arc<Mutex<Vec<CompletionRequest>>>,
}

impl ScriptedProvider {
    pub fn new<S: Into<String>>(replies: impl IntoIterator<Item = S>) -> Self {
        Self::with_results(replies.into_iter().map(|r| Ok(r.into())))
    }

    pub fn with_results(replies: impl IntoIterator<Item = Result<String, String>>) -> Self {
        Self {
            replies: Arc::new(Mutex::new(replies.into_iter().collect())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl LLMProvider for ScriptedProvider {
    async fn generate(&self, request: CompletionRequest) -> Result<String> {
        self.requests.lock().await.push(request);
        match self.replies.lock().await.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(e)) => Err(anyhow::anyhow!(e)),
            None => Err(anyhow::anyhow!("scripted provider exhausted")),
        }
    }
}

/// A well-formed update reply that adds a `Tourism` node without a CPD.
pub fn tourism_reply() -> String {
    serde_json::json!({
        "updated_cbn": {
            "nodes": [
                {"name": "Seagrass Biomass", "states": ["Low", "Medium", "High"], "observable": true},
                {"name": "Tourism", "states": ["Low", "Medium", "High"], "observable": true}
            ],
            "edges": [{"from": "Seagrass Biomass", "to": "Tourism"}],
            "cpds": {
                "Seagrass Biomass": {"parents": [], "probabilities": {"": [0.3, 0.4, 0.3]}}
            }
        },
        "tentative_suggestions": ["Consider how water quality affects tourism"],
        "reflection_prompts": ["Is tourism observable year-round?"],
        "subclaims": ["Healthy seagrass attracts divers"]
    })
    .to_string()
}
