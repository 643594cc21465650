use crate::error::ConversationError;
use crate::traits::{Role, Turn};
use std::collections::HashSet;

/// Append-only transcript replayed in full on every model call.
#[derive(Debug, Clone, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn seeded(task: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(task)],
        }
    }

    /// Appends `turn`. A turn carrying tool results must answer tool uses of
    /// the immediately preceding assistant turn, each at most once.
    pub fn append(&mut self, turn: Turn) -> Result<(), ConversationError> {
        let result_ids: Vec<&str> = turn.tool_result_ids().collect();
        if !result_ids.is_empty() {
            self.check_tool_results(&result_ids)?;
        }
        self.turns.push(turn);
        Ok(())
    }

    fn check_tool_results(&self, result_ids: &[&str]) -> Result<(), ConversationError> {
        let requested: HashSet<&str> = match self.turns.last() {
            Some(prev) if prev.role == Role::Assistant => prev.tool_uses().map(|u| u.id).collect(),
            _ => HashSet::new(),
        };

        let mut answered = HashSet::new();
        for &id in result_ids {
            if !requested.contains(id) {
                return Err(ConversationError::OrphanToolResult {
                    tool_use_id: id.to_string(),
                });
            }
            if !answered.insert(id) {
                return Err(ConversationError::DuplicateToolResult {
                    tool_use_id: id.to_string(),
                });
            }
        }
        Ok(())
    }

    pub fn snapshot(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}
