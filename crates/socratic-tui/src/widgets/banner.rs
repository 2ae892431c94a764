//! Single-line error banner

use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};

/// Full-width banner carrying the last failure message
pub struct ErrorBanner<'a> {
    message: &'a str,
    theme: &'a Theme,
}

impl<'a> ErrorBanner<'a> {
    pub fn new(message: &'a str, theme: &'a Theme) -> Self {
        Self { message, theme }
    }
}

impl Widget for ErrorBanner<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let style = self.theme.error_banner_style();
        buf.set_style(area, style);
        Paragraph::new(Line::from(vec![
            Span::styled(" ✖ ", style),
            Span::styled(self.message, style),
        ]))
        .style(style)
        .render(area, buf);
    }
}
