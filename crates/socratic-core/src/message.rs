//! Conversation messages

use serde::{Deserialize, Serialize};
use socratic_ai::{HistoryEntry, Role};

use crate::error::Error;

/// The original, unconcatenated fields of a user inquiry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredInput {
    pub topic: String,
    pub perspective: String,
}

/// What a turn carries, by author
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Turn {
    /// A student's inquiry
    User {
        input: StructuredInput,
        /// Topic and perspective joined for display and for history context
        display_text: String,
    },
    /// A tutor reply, already normalized
    Model { text: String },
}

/// One immutable conversation turn.
///
/// Serializes to the flat log record (`id`, `role`, `content`, `timestamp`,
/// `structuredInput`) so exported logs stay readable by existing consumers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "MessageRecord", try_from = "MessageRecord")]
pub struct Message {
    id: String,
    timestamp: i64,
    turn: Turn,
}

impl Message {
    /// Create a user turn with a fresh id
    pub fn user(input: StructuredInput, display_text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            turn: Turn::User {
                input,
                display_text: display_text.into(),
            },
        }
    }

    /// Create a model turn with a fresh id
    pub fn model(text: impl Into<String>, timestamp: i64) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp,
            turn: Turn::Model { text: text.into() },
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Creation time in milliseconds since the Unix epoch
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn turn(&self) -> &Turn {
        &self.turn
    }

    pub fn role(&self) -> Role {
        match self.turn {
            Turn::User { .. } => Role::User,
            Turn::Model { .. } => Role::Model,
        }
    }

    /// Plain-text body: the display string for users, the reply for the model
    pub fn content(&self) -> &str {
        match &self.turn {
            Turn::User { display_text, .. } => display_text,
            Turn::Model { text } => text,
        }
    }

    /// Present only on user turns
    pub fn structured_input(&self) -> Option<&StructuredInput> {
        match &self.turn {
            Turn::User { input, .. } => Some(input),
            Turn::Model { .. } => None,
        }
    }

    /// This turn as request context
    pub fn to_history_entry(&self) -> HistoryEntry {
        HistoryEntry::new(self.role(), self.content())
    }
}

/// Flat log representation of a [`Message`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageRecord {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub structured_input: Option<StructuredInput>,
}

impl From<Message> for MessageRecord {
    fn from(message: Message) -> Self {
        let role = message.role();
        let (content, structured_input) = match message.turn {
            Turn::User {
                input,
                display_text,
            } => (display_text, Some(input)),
            Turn::Model { text } => (text, None),
        };
        Self {
            id: message.id,
            role,
            content,
            timestamp: message.timestamp,
            structured_input,
        }
    }
}

impl TryFrom<MessageRecord> for Message {
    type Error = Error;

    fn try_from(record: MessageRecord) -> Result<Self, Self::Error> {
        let turn = match (record.role, record.structured_input) {
            (Role::User, Some(input)) => Turn::User {
                input,
                display_text: record.content,
            },
            (Role::User, None) => {
                return Err(Error::InvalidRecord(format!(
                    "user message {} has no structuredInput",
                    record.id
                )));
            }
            (Role::Model, None) => Turn::Model {
                text: record.content,
            },
            (Role::Model, Some(_)) => {
                return Err(Error::InvalidRecord(format!(
                    "model message {} carries structuredInput",
                    record.id
                )));
            }
        };
        Ok(Self {
            id: record.id,
            timestamp: record.timestamp,
            turn,
        })
    }
}
