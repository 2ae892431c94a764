//! socratic-core: tutoring session runtime
//!
//! Holds the conversation (an append-only message store), turns a topic and
//! perspective into a request for the generative service, normalizes the
//! reply, and drives the idle/thinking state machine around the one call.

pub mod controller;
pub mod error;
pub mod events;
pub mod export;
pub mod message;
pub mod normalize;
pub mod prompt;
pub mod store;

pub use controller::{
    Controller, FAILURE_MESSAGE, LoadingState, PendingTurn, Snapshot, TurnOutcome, TutorConfig,
};
pub use error::{Error, Result, SubmitError};
pub use events::TutorEvent;
pub use export::{LOG_FILE_NAME, from_json, to_json, write_logs};
pub use message::{Message, StructuredInput, Turn};
pub use normalize::normalize;
pub use store::MessageStore;
