//! Controller event types

use serde::{Deserialize, Serialize};

use crate::message::Message;

/// Events emitted as a turn moves through the controller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TutorEvent {
    /// User turn appended, request about to be sent
    Submitted { message: Message },

    /// Model turn appended
    Answered { message: Message },

    /// The request failed; carries the user-facing text
    Failed { message: String },
}

impl TutorEvent {
    /// Whether this event ends a turn
    pub fn is_terminal(&self) -> bool {
        matches!(self, TutorEvent::Answered { .. } | TutorEvent::Failed { .. })
    }
}
