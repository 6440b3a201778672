//! The in-memory conversation log owned by a chat session.

use crate::types::Turn;

/// Append-only, ordered log of the turns in one conversation.
///
/// There is no capacity bound: the log grows for as long as the session
/// lives.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HistoryStore {
    turns: Vec<Turn>,
}

impl HistoryStore {
    /// Creates an empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `turn` to the end of the conversation.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// Returns a copy of the conversation as it stands now.
    ///
    /// The copy is detached: later appends are not reflected in it.
    pub fn snapshot(&self) -> Vec<Turn> {
        self.turns.clone()
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// The most recent turn, if any.
    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter()
    }
}
