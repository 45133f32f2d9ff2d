//! Per-document conversation log.
//!
//! Append-only: turns are never edited or removed. Prompt assembly reads a
//! window of the most recent turns; the full log is retained and returned
//! to API callers verbatim.

use crate::models::Turn;

/// Ordered log of conversation turns for one document.
#[derive(Debug, Default)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    pub fn new() -> Self {
        Self { turns: Vec::new() }
    }

    /// Append a turn. The only mutator.
    pub fn append(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    /// The last `n` turns in chronological order (all turns when the log is
    /// shorter than `n`).
    pub fn recent(&self, n: usize) -> &[Turn] {
        let start = self.turns.len().saturating_sub(n);
        &self.turns[start..]
    }

    /// The full log, oldest first.
    pub fn all(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recent_of_empty_is_empty() {
        let conversation = Conversation::new();
        assert!(conversation.recent(5).is_empty());
    }

    #[test]
    fn recent_returns_window_in_order() {
        let mut conversation = Conversation::new();
        for i in 0..8 {
            conversation.append(Turn::user(format!("q{}", i)));
        }
        let window = conversation.recent(5);
        assert_eq!(window.len(), 5);
        assert_eq!(window[0].content, "q3");
        assert_eq!(window[4].content, "q7");
    }

    #[test]
    fn recent_shorter_than_window() {
        let mut conversation = Conversation::new();
        conversation.append(Turn::user("only"));
        assert_eq!(conversation.recent(5).len(), 1);
    }

    #[test]
    fn full_log_retained_past_window() {
        let mut conversation = Conversation::new();
        for i in 0..20 {
            conversation.append(Turn::user(format!("q{}", i)));
        }
        assert_eq!(conversation.len(), 20);
        assert_eq!(conversation.all()[0].content, "q0");
    }
}
