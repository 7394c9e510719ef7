// SPDX-FileCopyrightText: 2026 DevMate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Per-sender conversation history.
//!
//! Keeps the most recent turns per sender in process memory so the model
//! sees short-range context across messages. History is best-effort and
//! does not survive a restart.

use std::collections::VecDeque;

use dashmap::DashMap;

/// One completed conversation turn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Turn {
    /// What the user said.
    pub human: String,
    /// What the agent answered.
    pub ai: String,
}

/// Bounded per-sender conversation memory.
pub struct ConversationHistory {
    turns: DashMap<String, VecDeque<Turn>>,
    limit: usize,
}

impl ConversationHistory {
    /// Create a history keeping at most `limit` turns per sender.
    pub fn new(limit: usize) -> Self {
        Self {
            turns: DashMap::new(),
            limit,
        }
    }

    /// Record a completed turn, evicting the oldest beyond the limit.
    pub fn record(&self, sender: &str, human: impl Into<String>, ai: impl Into<String>) {
        let mut entry = self.turns.entry(sender.to_string()).or_default();
        entry.push_back(Turn {
            human: human.into(),
            ai: ai.into(),
        });
        while entry.len() > self.limit {
            entry.pop_front();
        }
    }

    /// Recent turns for a sender, oldest first.
    pub fn get(&self, sender: &str) -> Vec<Turn> {
        self.turns
            .get(sender)
            .map(|turns| turns.iter().cloned().collect())
            .unwrap_or_default()
    }
}
