//! socratic-ai: generative-language client layer
//!
//! Wraps the external text-generation service behind the [`TextGenerator`]
//! trait. The only production implementation talks to Google's Gemini
//! `generateContent` endpoint.

pub mod error;
pub mod providers;
pub mod types;

pub use error::{Error, ErrorKind, Result};
pub use providers::TextGenerator;
pub use providers::google::GeminiClient;
pub use types::*;
