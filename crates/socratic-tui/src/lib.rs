//! socratic-tui: Terminal UI components
//!
//! Widgets for the tutoring chat built on ratatui and crossterm: an inquiry
//! form, a conversation view with markdown replies, and the terminal guard.

pub mod input;
pub mod terminal;
pub mod theme;
pub mod widgets;

pub use terminal::TerminalSession;
pub use theme::Theme;
