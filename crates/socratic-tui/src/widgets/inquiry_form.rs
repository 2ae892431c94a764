//! Two-field inquiry form: a topic and the student's current perspective

use crate::input::Action;
use crate::theme::Theme;
use crate::widgets::InputBox;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Rows the form needs: two bordered fields and a hint line
pub const FORM_HEIGHT: u16 = 7;

/// Which field has focus
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Field {
    #[default]
    Topic,
    Perspective,
}

/// Result of feeding an action to the form
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEvent {
    /// Not a form action
    Ignored,
    /// Text or focus changed
    Updated,
    /// Enter on the perspective field with both fields filled
    Submit { topic: String, perspective: String },
}

#[derive(Debug, Clone)]
pub struct InquiryForm {
    topic: InputBox,
    perspective: InputBox,
    focus: Field,
    locked: bool,
}

impl Default for InquiryForm {
    fn default() -> Self {
        Self::new()
    }
}

impl InquiryForm {
    pub fn new() -> Self {
        let mut form = Self {
            topic: InputBox::new()
                .with_title("What do you want to explore?")
                .with_placeholder("e.g. Why is the sky blue?"),
            perspective: InputBox::new()
                .with_title("Your Perspective: The way I see it is...")
                .with_placeholder("e.g. It's reflecting the ocean."),
            focus: Field::Topic,
            locked: false,
        };
        form.sync_focus();
        form
    }

    pub fn focus(&self) -> Field {
        self.focus
    }

    pub fn set_focus(&mut self, field: Field) {
        self.focus = field;
        self.sync_focus();
    }

    pub fn topic(&self) -> &str {
        self.topic.content()
    }

    pub fn perspective(&self) -> &str {
        self.perspective.content()
    }

    /// Whether both fields hold something other than whitespace
    pub fn is_complete(&self) -> bool {
        !self.topic().trim().is_empty() && !self.perspective().trim().is_empty()
    }

    /// Lock or unlock both fields. A locked form accepts no edits or submissions.
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.topic.set_locked(locked);
        self.perspective.set_locked(locked);
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// Empty both fields and return focus to the topic
    pub fn clear(&mut self) {
        self.topic.clear();
        self.perspective.clear();
        self.set_focus(Field::Topic);
    }

    fn sync_focus(&mut self) {
        self.topic.set_focused(self.focus == Field::Topic);
        self.perspective.set_focused(self.focus == Field::Perspective);
    }

    fn toggle_focus(&mut self) {
        let next = match self.focus {
            Field::Topic => Field::Perspective,
            Field::Perspective => Field::Topic,
        };
        self.set_focus(next);
    }

    fn focused_mut(&mut self) -> &mut InputBox {
        match self.focus {
            Field::Topic => &mut self.topic,
            Field::Perspective => &mut self.perspective,
        }
    }

    /// Feed one action to the form; `width` is the form's render width
    pub fn handle_action(&mut self, action: &Action, width: u16) -> FormEvent {
        if self.locked {
            return FormEvent::Ignored;
        }

        match action {
            Action::Tab | Action::BackTab => {
                self.toggle_focus();
                FormEvent::Updated
            }
            Action::Submit if self.focus == Field::Topic => {
                self.set_focus(Field::Perspective);
                FormEvent::Updated
            }
            Action::Submit if self.is_complete() => FormEvent::Submit {
                topic: self.topic().to_string(),
                perspective: self.perspective().to_string(),
            },
            Action::Submit => {
                if self.topic().trim().is_empty() {
                    self.set_focus(Field::Topic);
                }
                FormEvent::Updated
            }
            other if other.is_edit() => {
                if self.focused_mut().handle_action(other, width) {
                    FormEvent::Updated
                } else {
                    FormEvent::Ignored
                }
            }
            _ => FormEvent::Ignored,
        }
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Length(1),
            ])
            .split(area);

        self.topic.render(rows[0], buf, theme);
        self.perspective.render(rows[1], buf, theme);

        let hint = if self.locked {
            Line::from(Span::styled(" Waiting for the tutor...", theme.dim_style()))
        } else {
            Line::from(vec![
                Span::styled(" Tab", theme.accent_style()),
                Span::styled(" switch field  ", theme.dim_style()),
                Span::styled("Enter", theme.accent_style()),
                Span::styled(
                    if self.focus == Field::Topic {
                        " next field"
                    } else {
                        " ask the tutor"
                    },
                    theme.dim_style(),
                ),
            ])
        };
        Paragraph::new(hint).render(rows[2], buf);
    }
}
