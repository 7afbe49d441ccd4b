//! Session and turn types.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::persona::Persona;

/// Who said a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One immutable conversation turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub role: Role,
    pub content: String,
}

impl Turn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Per-conversation state.
#[derive(Debug, Clone)]
pub struct Session {
    pub key: String,
    active_persona: Persona,
    initial_persona: Persona,
    history: VecDeque<Turn>,
    max_history: usize,
    /// Most recent postcode the customer mentioned.
    pub last_postcode: Option<String>,
    /// How many slots of the last listing for `last_postcode` were shown.
    pub slots_shown: usize,
}

impl Session {
    pub fn new(key: impl Into<String>, initial_persona: Persona, max_history: usize) -> Self {
        Self {
            key: key.into(),
            active_persona: initial_persona,
            initial_persona,
            history: VecDeque::new(),
            max_history: max_history.max(1),
            last_postcode: None,
            slots_shown: 0,
        }
    }

    pub fn active_persona(&self) -> Persona {
        self.active_persona
    }

    pub fn set_active_persona(&mut self, persona: Persona) {
        if persona != self.active_persona {
            tracing::debug!(
                session = %self.key,
                from = %self.active_persona,
                to = %persona,
                "Active persona changed"
            );
        }
        self.active_persona = persona;
    }

    /// Oldest first.
    pub fn history(&self) -> Vec<Turn> {
        self.history.iter().cloned().collect()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Append a turn, dropping the oldest ones beyond the window.
    pub fn append_turn(&mut self, turn: Turn) {
        self.history.push_back(turn);
        while self.history.len() > self.max_history {
            self.history.pop_front();
        }
    }

    /// Drop the history but keep the persona and postcode.
    pub fn reset_history(&mut self) {
        self.history.clear();
    }

    /// Back to a fresh session.
    pub fn reset(&mut self) {
        self.active_persona = self.initial_persona;
        self.history.clear();
        self.last_postcode = None;
        self.slots_shown = 0;
    }

    /// Record a postcode lookup; a new postcode restarts the paging.
    pub fn record_listing(&mut self, postcode: &str, shown_through: usize) {
        self.last_postcode = Some(postcode.to_string());
        self.slots_shown = shown_through;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_window_keeps_newest() {
        let mut session = Session::new("s", Persona::Triage, 3);
        for i in 0..5 {
            session.append_turn(Turn::user(format!("m{i}")));
        }
        let contents: Vec<String> = session.history().into_iter().map(|t| t.content).collect();
        assert_eq!(contents, vec!["m2", "m3", "m4"]);
    }

    #[test]
    fn reset_history_keeps_persona() {
        let mut session = Session::new("s", Persona::Triage, 10);
        session.set_active_persona(Persona::Companion);
        session.append_turn(Turn::user("hi"));
        session.reset_history();
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.active_persona(), Persona::Companion);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut session = Session::new("s", Persona::ShopAssistant, 10);
        session.set_active_persona(Persona::Companion);
        session.append_turn(Turn::assistant("hello"));
        session.record_listing("HP4 3QH", 5);
        session.reset();

        assert_eq!(session.active_persona(), Persona::ShopAssistant);
        assert_eq!(session.history_len(), 0);
        assert_eq!(session.last_postcode, None);
        assert_eq!(session.slots_shown, 0);
    }

    #[test]
    fn turn_serializes_lowercase_role() {
        let json = serde_json::to_value(Turn::assistant("ok")).unwrap();
        assert_eq!(json["role"], "assistant");
    }
}
