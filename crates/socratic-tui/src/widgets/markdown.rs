//! Markdown rendering for tutor replies
//!
//! Replies are short structured documents (three `###` sections, emphasis,
//! lists, the occasional quote or code block). Level-3 headers are shown
//! uppercased in the header color. Output lines are already wrapped to the
//! requested width, so callers can count them to get the rendered height.

use crate::theme::Theme;
use pulldown_cmark::{Event, HeadingLevel, Parser, Tag, TagEnd};
use ratatui::{
    style::{Modifier, Style},
    text::{Line, Span},
};
use textwrap::{
    WordSeparator,
    core::{Fragment, break_words},
    wrap_algorithms::wrap_first_fit,
};
use unicode_width::UnicodeWidthStr;

const QUOTE_MARKER: &str = "│ ";

struct Renderer<'t> {
    theme: &'t Theme,
    width: usize,
    lines: Vec<Line<'static>>,
    current: Vec<Span<'static>>,
    styles: Vec<Style>,
    heading: Option<HeadingLevel>,
    quote_depth: usize,
    /// Next number for each open list; `None` for bullet lists
    lists: Vec<Option<u64>>,
    /// Hanging indent for continuation lines of the current list item
    hang: usize,
    code_block: Option<String>,
}

impl<'t> Renderer<'t> {
    fn new(theme: &'t Theme, width: usize) -> Self {
        Self {
            theme,
            width,
            lines: Vec::new(),
            current: Vec::new(),
            styles: vec![theme.base_style()],
            heading: None,
            quote_depth: 0,
            lists: Vec::new(),
            hang: 0,
            code_block: None,
        }
    }

    fn style(&self) -> Style {
        self.styles.last().copied().unwrap_or_default()
    }

    fn push_style(&mut self, f: impl FnOnce(Style) -> Style) {
        let next = f(self.style());
        self.styles.push(next);
    }

    fn pop_style(&mut self) {
        if self.styles.len() > 1 {
            self.styles.pop();
        }
    }

    fn quote_prefix(&self) -> Vec<Span<'static>> {
        (0..self.quote_depth)
            .map(|_| Span::styled(QUOTE_MARKER, self.theme.dim_style()))
            .collect()
    }

    fn flush(&mut self) {
        if self.current.is_empty() {
            return;
        }
        let spans = std::mem::take(&mut self.current);
        let prefix = self.quote_prefix();
        self.lines
            .extend(wrap_spans(spans, self.width, &prefix, self.hang));
    }

    fn blank(&mut self) {
        if self.lines.last().is_some_and(|l| l.width() > 0) {
            self.lines.push(Line::from(self.quote_prefix()));
        }
    }

    fn text(&mut self, text: &str) {
        if let Some(code) = self.code_block.as_mut() {
            code.push_str(text);
            return;
        }
        let content = if self.heading == Some(HeadingLevel::H3) {
            text.to_uppercase()
        } else {
            text.to_string()
        };
        self.current.push(Span::styled(content, self.style()));
    }

    fn start(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Heading { level, .. } => {
                self.flush();
                self.heading = Some(level);
                let style = match level {
                    HeadingLevel::H1 => self
                        .theme
                        .header_style()
                        .add_modifier(Modifier::UNDERLINED),
                    HeadingLevel::H2 | HeadingLevel::H3 => self.theme.header_style(),
                    _ => self.theme.accent_bold(),
                };
                self.styles.push(style);
            }
            Tag::BlockQuote(_) => {
                self.flush();
                self.quote_depth += 1;
                self.push_style(|s| s.add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code_block = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let depth = self.lists.len().saturating_sub(1);
                let marker = match self.lists.last_mut() {
                    Some(Some(n)) => {
                        let marker = format!("{n}. ");
                        *n += 1;
                        marker
                    }
                    _ => "• ".to_string(),
                };
                let indent = "  ".repeat(depth);
                self.hang = indent.width() + marker.width();
                self.current.push(Span::styled(
                    format!("{indent}{marker}"),
                    self.theme.dim_style(),
                ));
            }
            Tag::Emphasis => self.push_style(|s| s.add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(|s| s.add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => self.push_style(|s| s.add_modifier(Modifier::CROSSED_OUT)),
            Tag::Link { .. } => {
                let link = self.theme.link;
                self.push_style(|s| s.fg(link).add_modifier(Modifier::UNDERLINED));
            }
            _ => {}
        }
    }

    fn end(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Heading(_) => {
                self.flush();
                self.heading = None;
                self.pop_style();
                self.blank();
            }
            TagEnd::Paragraph => {
                self.flush();
                self.blank();
            }
            TagEnd::BlockQuote(_) => {
                self.flush();
                self.pop_style();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.blank();
            }
            TagEnd::CodeBlock => {
                let code = self.code_block.take().unwrap_or_default();
                let style = self.theme.code_style().add_modifier(Modifier::DIM);
                let room = self.width.saturating_sub(2).max(1);
                for code_line in code.lines() {
                    let shown: String = if code_line.width() > room {
                        let mut cut: String = code_line.chars().take(room.saturating_sub(1)).collect();
                        cut.push('…');
                        cut
                    } else {
                        code_line.to_string()
                    };
                    let mut spans = self.quote_prefix();
                    spans.push(Span::styled(format!("  {shown}"), style));
                    self.lines.push(Line::from(spans));
                }
                self.blank();
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.hang = 0;
                    self.blank();
                }
            }
            TagEnd::Item => {
                self.flush();
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link => {
                self.pop_style();
            }
            _ => {}
        }
    }

    fn finish(mut self) -> Vec<Line<'static>> {
        self.flush();
        while self.lines.last().is_some_and(|l| l.width() == 0 || is_bare_prefix(l)) {
            self.lines.pop();
        }
        self.lines
    }
}

fn is_bare_prefix(line: &Line<'_>) -> bool {
    line.spans.iter().all(|s| s.content == QUOTE_MARKER)
}

/// Convert markdown text to styled lines wrapped to `width` columns
pub fn render_markdown(text: &str, theme: &Theme, width: usize) -> Vec<Line<'static>> {
    let mut renderer = Renderer::new(theme, width);

    for event in Parser::new(text) {
        match event {
            Event::Start(tag) => renderer.start(tag),
            Event::End(tag) => renderer.end(tag),
            Event::Text(text) => renderer.text(&text),
            Event::Code(code) => {
                let style = renderer.theme.code_style().add_modifier(Modifier::BOLD);
                renderer.current.push(Span::styled(format!("`{code}`"), style));
            }
            Event::SoftBreak => renderer.current.push(Span::raw(" ")),
            Event::HardBreak => renderer.flush(),
            Event::Rule => {
                renderer.flush();
                let rule = "─".repeat(renderer.width.max(1));
                renderer
                    .lines
                    .push(Line::from(Span::styled(rule, theme.dim_style())));
            }
            _ => {}
        }
    }

    renderer.finish()
}

/// A word and the whitespace after it, each carrying the style of the span
/// it came from.
#[derive(Debug)]
struct StyledWord {
    word: String,
    style: Style,
    whitespace: String,
    whitespace_style: Style,
}

impl Fragment for StyledWord {
    fn width(&self) -> f64 {
        self.word.width() as f64
    }

    fn whitespace_width(&self) -> f64 {
        self.whitespace.width() as f64
    }

    fn penalty_width(&self) -> f64 {
        0.0
    }
}

/// Split styled spans into words no wider than `max_width`. Whitespace that
/// opens a span is attached to the previous word so no line starts with it.
fn styled_words(spans: &[Span<'static>], max_width: usize) -> Vec<StyledWord> {
    let mut words: Vec<StyledWord> = Vec::new();
    for span in spans {
        let found = WordSeparator::AsciiSpace.find_words(&span.content);
        for word in break_words(found, max_width) {
            if word.word.is_empty() {
                if let Some(prev) = words.last_mut() {
                    prev.whitespace.push_str(word.whitespace);
                    prev.whitespace_style = span.style;
                }
                continue;
            }
            words.push(StyledWord {
                word: word.word.to_string(),
                style: span.style,
                whitespace: word.whitespace.to_string(),
                whitespace_style: span.style,
            });
        }
    }
    words
}

/// Word wrap over styled spans with textwrap's first-fit algorithm.
///
/// Every line starts with `prefix`; continuation lines add `hang` spaces
/// after it. Words wider than the line are split.
pub fn wrap_spans(
    spans: Vec<Span<'static>>,
    width: usize,
    prefix: &[Span<'static>],
    hang: usize,
) -> Vec<Line<'static>> {
    let prefix_width: usize = prefix.iter().map(|s| s.width()).sum();
    let first_width = width.saturating_sub(prefix_width).max(1);
    let rest_width = first_width.saturating_sub(hang).max(1);

    let words = styled_words(&spans, rest_width);
    let wrapped = wrap_first_fit(&words, &[first_width as f64, rest_width as f64]);

    wrapped
        .into_iter()
        .enumerate()
        .map(|(idx, line_words)| {
            let mut line: Vec<Span<'static>> = prefix.to_vec();
            if idx > 0 && hang > 0 {
                line.push(Span::raw(" ".repeat(hang)));
            }
            for (i, word) in line_words.iter().enumerate() {
                push_text(&mut line, &word.word, word.style);
                if i + 1 < line_words.len() {
                    push_text(&mut line, &word.whitespace, word.whitespace_style);
                }
            }
            Line::from(line)
        })
        .collect()
}

fn push_text(line: &mut Vec<Span<'static>>, text: &str, style: Style) {
    match line.last_mut() {
        Some(last) if last.style == style => last.content.to_mut().push_str(text),
        _ => line.push(Span::styled(text.to_string(), style)),
    }
}
