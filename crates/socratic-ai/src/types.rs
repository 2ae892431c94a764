//! Core wire-level types shared by every generator

use serde::{Deserialize, Serialize};

/// Text substituted when the service answers successfully but with no text
pub const FALLBACK_RESPONSE: &str = "I apologize, but I couldn't generate a response at this time.";

/// Default model identifier
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Default sampling temperature
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Author of a conversation turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Model,
}

impl Role {
    /// Wire name of the role
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Model => "model",
        }
    }
}

/// One prior turn sent as context
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: Role,
    pub text: String,
}

impl HistoryEntry {
    pub fn new(role: Role, text: impl Into<String>) -> Self {
        Self {
            role,
            text: text.into(),
        }
    }
}

/// Everything a generator needs to produce one reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerateRequest {
    /// Model identifier (e.g., "gemini-3-flash-preview")
    pub model: String,
    /// Prior turns, oldest first
    pub history: Vec<HistoryEntry>,
    /// The new user prompt
    pub prompt: String,
    /// Fixed instruction constraining the reply format
    pub system_instruction: String,
    /// Sampling temperature
    pub temperature: f32,
}

impl GenerateRequest {
    /// Number of turns carried as context, including the new prompt
    pub fn turn_count(&self) -> usize {
        self.history.len() + 1
    }
}
