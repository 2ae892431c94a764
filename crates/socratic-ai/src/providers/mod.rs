//! Text generator implementations

pub mod google;

use crate::{Error, GenerateRequest, Result};
use async_trait::async_trait;

/// Trait for services that turn a conversation into one reply
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Produce the reply text for a request. One attempt, no retries.
    async fn generate(&self, request: &GenerateRequest) -> Result<String>;
}

/// Environment variables consulted for the access credential, in order
pub const API_KEY_ENV_VARS: &[&str] = &["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Resolve an API key from a provided value or the given lookup.
///
/// Empty values count as absent.
pub fn resolve_api_key<F>(provided: Option<&str>, lookup: F) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(key) = provided.filter(|k| !k.trim().is_empty()) {
        return Ok(key.to_string());
    }

    API_KEY_ENV_VARS
        .iter()
        .filter_map(|var| lookup(var))
        .find(|k| !k.trim().is_empty())
        .ok_or(Error::MissingApiKey)
}

/// Resolve an API key from a provided value or the process environment
pub fn get_api_key(provided: Option<&str>) -> Result<String> {
    resolve_api_key(provided, |var| std::env::var(var).ok())
}
