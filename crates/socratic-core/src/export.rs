//! Conversation log export and import

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::message::{Message, MessageRecord};

/// File name written by [`write_logs`]
pub const LOG_FILE_NAME: &str = "socratic_logs.json";

/// Pretty-printed JSON array of the given messages, in order
pub fn to_json(messages: &[Message]) -> Result<String> {
    Ok(serde_json::to_string_pretty(messages)?)
}

/// Write `messages` to `dir/socratic_logs.json`, creating `dir` if needed.
pub fn write_logs(dir: &Path, messages: &[Message]) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(LOG_FILE_NAME);
    std::fs::write(&path, to_json(messages)?)?;
    tracing::info!(path = %path.display(), messages = messages.len(), "exported conversation log");
    Ok(path)
}

/// Parse an exported log back into messages.
///
/// Fails on any record that breaks the message invariants, and on timestamps
/// that go backwards.
pub fn from_json(json: &str) -> Result<Vec<Message>> {
    let records: Vec<MessageRecord> = serde_json::from_str(json)?;
    let messages = records
        .into_iter()
        .map(Message::try_from)
        .collect::<Result<Vec<_>>>()?;

    if let Some(pair) = messages
        .windows(2)
        .find(|pair| pair[1].timestamp() < pair[0].timestamp())
    {
        return Err(Error::InvalidRecord(format!(
            "message {} is older than the message before it",
            pair[1].id()
        )));
    }
    Ok(messages)
}

/// Read a log file written by [`write_logs`]
pub fn read_logs(path: &Path) -> Result<Vec<Message>> {
    from_json(&std::fs::read_to_string(path)?)
}
