//! Custom widgets for the TUI

pub mod banner;
pub mod input_box;
pub mod inquiry_form;
pub mod markdown;
pub mod message_list;
pub mod spinner;

pub use banner::ErrorBanner;
pub use input_box::InputBox;
pub use inquiry_form::{Field, FormEvent, InquiryForm};
pub use message_list::{ChatEntry, MessageList};
pub use spinner::Spinner;
