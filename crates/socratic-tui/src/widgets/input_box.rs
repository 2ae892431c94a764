//! Single-line text field

use crate::input::Action;
use crate::theme::Theme;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// Editable single-line field with a title, placeholder and horizontal scroll
#[derive(Debug, Default, Clone)]
pub struct InputBox {
    content: String,
    /// Cursor position in chars, not bytes
    cursor: usize,
    /// First visible column
    scroll: usize,
    title: String,
    placeholder: String,
    focused: bool,
    locked: bool,
}

impl InputBox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    /// A locked field ignores edits and renders dimmed
    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn set_content(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.char_count();
        self.scroll = 0;
    }

    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
        self.scroll = 0;
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_at(&self, char_idx: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_idx)
            .map_or(self.content.len(), |(i, _)| i)
    }

    fn column_of(&self, char_idx: usize) -> usize {
        self.content
            .chars()
            .take(char_idx)
            .map(|c| c.width().unwrap_or(0))
            .sum()
    }

    fn remove_range(&mut self, start: usize, end: usize) {
        let (from, to) = (self.byte_at(start), self.byte_at(end));
        self.content.replace_range(from..to, "");
        self.cursor = start;
    }

    fn insert(&mut self, c: char) {
        let at = self.byte_at(self.cursor);
        self.content.insert(at, c);
        self.cursor += 1;
    }

    /// Start of the word before the cursor
    fn word_start(&self) -> usize {
        let chars: Vec<char> = self.content.chars().take(self.cursor).collect();
        let mut idx = chars.len();
        while idx > 0 && chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        while idx > 0 && !chars[idx - 1].is_whitespace() {
            idx -= 1;
        }
        idx
    }

    /// Apply an editing action. Returns whether the field changed or moved.
    ///
    /// `width` is the outer width the field is rendered at.
    pub fn handle_action(&mut self, action: &Action, width: u16) -> bool {
        if self.locked {
            return false;
        }

        let len = self.char_count();
        let handled = match action {
            Action::Char(c) => {
                self.insert(*c);
                true
            }
            Action::Paste(text) => {
                // Line breaks collapse to single spaces
                let mut last_space = self.cursor > 0
                    && self.content.chars().nth(self.cursor - 1) == Some(' ');
                for c in text.chars() {
                    if c == '\n' || c == '\r' {
                        if !last_space && self.cursor > 0 {
                            self.insert(' ');
                            last_space = true;
                        }
                    } else {
                        self.insert(c);
                        last_space = c == ' ';
                    }
                }
                !text.is_empty()
            }
            Action::Backspace if self.cursor > 0 => {
                self.remove_range(self.cursor - 1, self.cursor);
                true
            }
            Action::Delete if self.cursor < len => {
                let at = self.cursor;
                self.remove_range(at, at + 1);
                true
            }
            Action::Left if self.cursor > 0 => {
                self.cursor -= 1;
                true
            }
            Action::Right if self.cursor < len => {
                self.cursor += 1;
                true
            }
            Action::Home => {
                self.cursor = 0;
                true
            }
            Action::End => {
                self.cursor = len;
                true
            }
            Action::ClearLine => {
                self.clear();
                true
            }
            Action::DeleteWord if self.cursor > 0 => {
                let start = self.word_start();
                self.remove_range(start, self.cursor);
                true
            }
            _ => false,
        };

        if handled {
            self.follow_cursor(width.saturating_sub(2) as usize);
        }
        handled
    }

    /// Keep the cursor inside a window `visible` columns wide
    fn follow_cursor(&mut self, visible: usize) {
        if visible == 0 {
            return;
        }
        let col = self.column_of(self.cursor);
        if col < self.scroll {
            self.scroll = col;
        } else if col >= self.scroll + visible {
            self.scroll = col + 1 - visible;
        }
    }

    fn visible_text(&self, width: usize) -> String {
        let mut col = 0;
        let mut out = String::new();
        for c in self.content.chars() {
            let w = c.width().unwrap_or(0);
            if col >= self.scroll {
                if col + w > self.scroll + width {
                    break;
                }
                out.push(c);
            }
            col += w;
        }
        out
    }

    pub fn render(&self, area: Rect, buf: &mut Buffer, theme: &Theme) {
        let border = if self.locked {
            theme.dim_style()
        } else if self.focused {
            theme.accent_style()
        } else {
            theme.border_style()
        };
        let mut block = Block::default().borders(Borders::ALL).border_style(border);
        if !self.title.is_empty() {
            block = block.title(Line::from(Span::styled(format!(" {} ", self.title), border)));
        }

        let inner = block.inner(area);
        block.render(area, buf);
        if inner.width == 0 || inner.height == 0 {
            return;
        }

        let (text, style) = if self.content.is_empty() {
            (self.placeholder.clone(), theme.dim_style())
        } else if self.locked {
            (self.visible_text(inner.width as usize), theme.dim_style())
        } else {
            (self.visible_text(inner.width as usize), theme.base_style())
        };
        Paragraph::new(text).style(style).render(inner, buf);

        if self.focused && !self.locked {
            let x = self.column_of(self.cursor).saturating_sub(self.scroll);
            if x < inner.width as usize {
                if let Some(cell) = buf.cell_mut((inner.x + x as u16, inner.y)) {
                    cell.set_style(Style::default().bg(theme.accent));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn typed(text: &str) -> InputBox {
        let mut input = InputBox::new();
        for c in text.chars() {
            input.handle_action(&Action::Char(c), 40);
        }
        input
    }

    fn row_text(buf: &Buffer, y: u16) -> String {
        (0..buf.area.width)
            .map(|x| buf[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_typing_and_cursor_edits() {
        let mut input = typed("helo");
        input.handle_action(&Action::Left, 40);
        input.handle_action(&Action::Char('l'), 40);
        assert_eq!(input.content(), "hello");

        input.handle_action(&Action::Home, 40);
        input.handle_action(&Action::Delete, 40);
        assert_eq!(input.content(), "ello");

        input.handle_action(&Action::End, 40);
        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "ell");
        assert_eq!(input.cursor(), 3);
    }

    #[test]
    fn test_multibyte_chars() {
        let mut input = typed("héllo wörld");
        input.handle_action(&Action::Backspace, 40);
        assert_eq!(input.content(), "héllo wörl");
        input.handle_action(&Action::Home, 40);
        input.handle_action(&Action::Right, 40);
        input.handle_action(&Action::Delete, 40);
        assert_eq!(input.content(), "hllo wörl");
    }

    #[test]
    fn test_delete_word() {
        let mut input = typed("the way I see it  ");
        input.handle_action(&Action::DeleteWord, 40);
        assert_eq!(input.content(), "the way I see ");
    }

    #[test]
    fn test_paste_collapses_newlines() {
        let mut input = InputBox::new();
        input.handle_action(&Action::Paste("first line\r\nsecond\n\nthird".into()), 80);
        assert_eq!(input.content(), "first line second third");
    }

    #[test]
    fn test_locked_ignores_edits() {
        let mut input = typed("abc");
        input.set_locked(true);
        assert!(!input.handle_action(&Action::Char('d'), 40));
        assert!(!input.handle_action(&Action::ClearLine, 40));
        assert_eq!(input.content(), "abc");
    }

    #[test]
    fn test_render_title_and_placeholder() {
        let input = InputBox::new()
            .with_title("Topic")
            .with_placeholder("What are you curious about?");
        let area = Rect::new(0, 0, 40, 3);
        let mut buf = Buffer::empty(area);
        input.render(area, &mut buf, &Theme::dark());

        assert!(row_text(&buf, 0).contains(" Topic "));
        assert!(row_text(&buf, 1).contains("What are you curious about?"));
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let mut input = InputBox::new();
        for c in "abcdefghijklmnopqrstuvwxyz".chars() {
            input.handle_action(&Action::Char(c), 12);
        }
        let area = Rect::new(0, 0, 12, 3);
        let mut buf = Buffer::empty(area);
        input.render(area, &mut buf, &Theme::dark());

        let row = row_text(&buf, 1);
        assert!(row.contains("vwxyz"), "row was {row:?}");
        assert!(!row.contains('a'));
    }
}
