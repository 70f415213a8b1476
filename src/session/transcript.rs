//! Transcript - Sliding window chat history
//!
//! Keeps the most recent turns of the conversation for display.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use crate::agent::Role;

/// A single conversation turn
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Transcript {
    turns: VecDeque<ConversationTurn>,
    max_turns: usize,
}

impl Transcript {
    pub fn new(max_turns: usize) -> Self {
        Self {
            turns: VecDeque::new(),
            max_turns,
        }
    }

    pub fn add_user(&mut self, content: impl Into<String>) {
        self.push(Role::User, content.into());
    }

    pub fn add_assistant(&mut self, content: impl Into<String>) {
        self.push(Role::Assistant, content.into());
    }

    fn push(&mut self, role: Role, content: String) {
        self.turns.push_back(ConversationTurn {
            role,
            content,
            timestamp: Utc::now(),
        });
        while self.turns.len() > self.max_turns {
            self.turns.pop_front();
        }
    }

    pub fn turns(&self) -> impl Iterator<Item = &ConversationTurn> {
        self.turns.iter()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn clear(&mut self) {
        self.turns.clear();
    }

    /// Plain-text rendering, one line per turn.
    pub fn format(&self) -> String {
        self.turns
            .iter()
            .map(|turn| {
                let who = match turn.role {
                    Role::User => "You",
                    Role::Assistant => "Assistant",
                    Role::System => "System",
                };
                format!("[{}] {}: {}", turn.timestamp.format("%H:%M:%S"), who, turn.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Transcript {
    fn default() -> Self {
        Self::new(50)
    }
}
