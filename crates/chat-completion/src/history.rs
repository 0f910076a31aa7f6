use crate::{ConversationTurn, Role};

/// Ordered conversation turns. The first turn is the system prompt and is
/// never removed.
///
/// Growth is bounded: at most `window` non-system turns are retained. When the
/// window overflows the oldest turns go first, and a leading orphaned
/// assistant turn is dropped with its question.
#[derive(Debug, Clone)]
pub struct ConversationHistory {
    turns: Vec<ConversationTurn>,
    window: usize,
}

impl ConversationHistory {
    pub fn new(system_prompt: impl Into<String>, window: usize) -> Self {
        Self {
            turns: vec![ConversationTurn::system(system_prompt)],
            window: window.max(1),
        }
    }

    pub fn push_user(&mut self, content: impl Into<String>) {
        self.push(ConversationTurn::user(content));
    }

    pub fn push_assistant(&mut self, content: impl Into<String>) {
        self.push(ConversationTurn::assistant(content));
    }

    pub fn turns(&self) -> &[ConversationTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    /// Always false: the system turn is permanent.
    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    fn push(&mut self, turn: ConversationTurn) {
        self.turns.push(turn);
        self.trim_to_window();
    }

    fn trim_to_window(&mut self) {
        let excess = (self.turns.len() - 1).saturating_sub(self.window);
        if excess > 0 {
            self.turns.drain(1..=excess);
            tracing::debug!(dropped = excess, "history window trimmed");
        }
        while self.turns.len() > 1 && self.turns[1].role == Role::Assistant {
            self.turns.remove(1);
        }
    }
}
