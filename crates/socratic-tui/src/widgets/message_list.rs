//! Conversation view: inquiry cards and tutor replies

use crate::theme::Theme;
use crate::widgets::markdown::{render_markdown, wrap_spans};
use crate::widgets::spinner::frame_at;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use std::time::Instant;

const INDENT: &str = "  ";

/// Lead-in shown before the perspective on inquiry cards
pub const PERSPECTIVE_PREFIX: &str = "The way I see it is...";

/// One entry in the conversation view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatEntry {
    /// A student's submission, shown as a card
    Inquiry { topic: String, perspective: String },
    /// A tutor reply, rendered as markdown
    Response { markdown: String },
}

impl ChatEntry {
    pub fn inquiry(topic: impl Into<String>, perspective: impl Into<String>) -> Self {
        ChatEntry::Inquiry {
            topic: topic.into(),
            perspective: perspective.into(),
        }
    }

    pub fn response(markdown: impl Into<String>) -> Self {
        ChatEntry::Response {
            markdown: markdown.into(),
        }
    }

    /// Rendered lines for this entry at `width` columns, trailing separator included
    pub fn lines(&self, theme: &Theme, width: usize) -> Vec<Line<'static>> {
        let mut lines = Vec::new();
        let indent = [Span::raw(INDENT)];
        let body_width = width.max(INDENT.len() + 1);

        match self {
            ChatEntry::Inquiry { topic, perspective } => {
                lines.push(Line::from(Span::styled(
                    "▶ Student's Inquiry",
                    theme.accent_bold(),
                )));
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(
                        "TOPIC / QUESTION",
                        theme.topic_style().add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.extend(wrap_spans(
                    vec![Span::styled(topic.clone(), theme.base_style())],
                    body_width,
                    &indent,
                    0,
                ));
                lines.push(Line::from(vec![
                    Span::raw(INDENT),
                    Span::styled(
                        "PERSPECTIVE",
                        theme.perspective_style().add_modifier(Modifier::BOLD),
                    ),
                ]));
                lines.extend(wrap_spans(
                    vec![
                        Span::styled(format!("{PERSPECTIVE_PREFIX} "), theme.dim_style()),
                        Span::styled(
                            perspective.clone(),
                            theme.base_style().add_modifier(Modifier::ITALIC),
                        ),
                    ],
                    body_width,
                    &indent,
                    0,
                ));
            }
            ChatEntry::Response { markdown } => {
                lines.push(tutor_header(theme));
                let inner = body_width.saturating_sub(INDENT.len());
                for line in render_markdown(markdown, theme, inner) {
                    let mut spans = vec![Span::raw(INDENT)];
                    spans.extend(line.spans);
                    lines.push(Line::from(spans));
                }
            }
        }

        lines.push(Line::from(""));
        lines
    }
}

fn tutor_header(theme: &Theme) -> Line<'static> {
    Line::from(Span::styled(
        "◀ Tutor",
        theme.header_style(),
    ))
}

/// Lines shown in place of the reply while a request is in flight
pub fn thinking_lines(theme: &Theme, started: Instant) -> Vec<Line<'static>> {
    vec![
        tutor_header(theme),
        Line::from(Span::styled(
            format!("{INDENT}{} Thinking...", frame_at(started.elapsed())),
            theme.dim_style().add_modifier(Modifier::ITALIC),
        )),
    ]
}

/// Total rendered height of the conversation at `width` columns
pub fn content_height(entries: &[ChatEntry], theme: &Theme, width: usize, thinking: bool) -> usize {
    let body: usize = entries.iter().map(|e| e.lines(theme, width).len()).sum();
    if thinking { body + 2 } else { body }
}

/// Scrollable conversation view
pub struct MessageList<'a> {
    entries: &'a [ChatEntry],
    theme: &'a Theme,
    scroll: usize,
    thinking: Option<Instant>,
}

impl<'a> MessageList<'a> {
    pub fn new(entries: &'a [ChatEntry], theme: &'a Theme) -> Self {
        Self {
            entries,
            theme,
            scroll: 0,
            thinking: None,
        }
    }

    /// Number of lines to skip from the top
    pub fn scroll(mut self, scroll: usize) -> Self {
        self.scroll = scroll;
        self
    }

    /// Show the thinking placeholder below the last entry
    pub fn thinking(mut self, started: Option<Instant>) -> Self {
        self.thinking = started;
        self
    }
}

impl Widget for MessageList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.width == 0 || area.height == 0 {
            return;
        }

        let width = area.width as usize;
        let mut all: Vec<Line<'static>> = self
            .entries
            .iter()
            .flat_map(|entry| entry.lines(self.theme, width))
            .collect();
        if let Some(started) = self.thinking {
            all.extend(thinking_lines(self.theme, started));
        }

        let visible: Vec<Line<'static>> = all
            .into_iter()
            .skip(self.scroll)
            .take(area.height as usize)
            .collect();
        Paragraph::new(visible).render(area, buf);
    }
}
