use serde::{Deserialize, Serialize};

use crate::message::Message;

/// One authority-pushed batch of ordered messages, scoped to the
/// document/tree identified by `context_id`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub context_id: String,
    pub messages: Vec<Message>,
}

impl Event {
    pub fn new(context_id: impl Into<String>, messages: Vec<Message>) -> Self {
        Self { context_id: context_id.into(), messages }
    }
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Event({} [{}])",
            self.context_id,
            self.messages.iter().map(|m| m.kind().to_string()).collect::<Vec<_>>().join(", ")
        )
    }
}
