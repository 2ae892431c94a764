//! TUI implementation for socratic

use crossterm::event::EventStream;
use futures::StreamExt;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, ScrollbarState},
};
use socratic_core::{Controller, Message, Snapshot, TurnOutcome, TutorEvent, Turn};
use socratic_tui::{
    TerminalSession, Theme,
    input::{Action, event_to_action},
    widgets::{
        ChatEntry, ErrorBanner, FormEvent, InquiryForm, MessageList, Spinner,
        inquiry_form::FORM_HEIGHT, message_list::content_height,
    },
};
use std::path::PathBuf;
use std::time::{Duration, Instant};

/// Lines moved per mouse wheel step
const WHEEL_STEP: usize = 3;

/// What the event loop should do after an input
#[derive(Debug, PartialEq, Eq)]
pub enum UiCommand {
    None,
    Submit { topic: String, perspective: String },
    Export,
    Quit,
}

/// Conversation view for one message
pub fn chat_entry(message: &Message) -> ChatEntry {
    match message.turn() {
        Turn::User { input, .. } => ChatEntry::inquiry(&input.topic, &input.perspective),
        Turn::Model { text } => ChatEntry::response(text),
    }
}

/// TUI application state
pub struct TuiState {
    entries: Vec<ChatEntry>,
    form: InquiryForm,
    /// Lines scrolled from the top; `usize::MAX` follows the bottom
    scroll: usize,
    /// Height of the conversation area at the last render
    viewport: usize,
    thinking_since: Option<Instant>,
    error: Option<String>,
    status: String,
    theme: Theme,
    model: String,
    export_dir: PathBuf,
}

impl TuiState {
    pub fn new(model: impl Into<String>, export_dir: PathBuf) -> Self {
        Self {
            entries: Vec::new(),
            form: InquiryForm::new(),
            scroll: 0,
            viewport: 0,
            thinking_since: None,
            error: None,
            status: "Ready".to_string(),
            theme: Theme::dark(),
            model: model.into(),
            export_dir,
        }
    }

    pub fn export_dir(&self) -> &PathBuf {
        &self.export_dir
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    fn scroll_to_bottom(&mut self) {
        self.scroll = usize::MAX;
    }

    /// Mirror the controller's state
    pub fn sync(&mut self, snapshot: &Snapshot) {
        let grew = snapshot.messages.len() != self.entries.len();
        self.entries = snapshot.messages.iter().map(chat_entry).collect();

        let thinking = !snapshot.loading.is_idle();
        match (thinking, self.thinking_since) {
            (true, None) => self.thinking_since = Some(Instant::now()),
            (false, Some(_)) => self.thinking_since = None,
            _ => {}
        }
        self.form.set_locked(thinking);
        self.error = snapshot.error.clone();

        if grew || thinking {
            self.scroll_to_bottom();
        }
    }

    /// Update the status line for a controller event
    pub fn handle_event(&mut self, event: &TutorEvent) {
        match event {
            TutorEvent::Submitted { .. } => self.status = "Thinking...".to_string(),
            TutorEvent::Answered { .. } => self.status = "Ready".to_string(),
            TutorEvent::Failed { .. } => self.status = "Request failed".to_string(),
        }
    }

    /// Handle one input action
    pub fn handle_action(&mut self, action: Action, width: u16) -> UiCommand {
        match action {
            a if a.is_exit() => UiCommand::Quit,
            Action::Export => UiCommand::Export,
            Action::PageUp => {
                self.scroll = self.scroll.saturating_sub(self.viewport.max(1));
                UiCommand::None
            }
            Action::PageDown => {
                self.scroll = self.scroll.saturating_add(self.viewport.max(1));
                UiCommand::None
            }
            Action::ScrollUp => {
                self.scroll = self.scroll.saturating_sub(WHEEL_STEP);
                UiCommand::None
            }
            Action::ScrollDown => {
                self.scroll = self.scroll.saturating_add(WHEEL_STEP);
                UiCommand::None
            }
            other => match self.form.handle_action(&other, width) {
                FormEvent::Submit { topic, perspective } => UiCommand::Submit { topic, perspective },
                FormEvent::Updated | FormEvent::Ignored => UiCommand::None,
            },
        }
    }

    /// Called once the controller has accepted a submission
    pub fn submission_accepted(&mut self) {
        self.form.clear();
        self.scroll_to_bottom();
    }

    /// Render the UI
    pub fn render(&mut self, frame: &mut Frame) {
        let size = frame.area();
        let banner = if self.error.is_some() { 1 } else { 0 };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),
                Constraint::Length(banner),
                Constraint::Length(1),
                Constraint::Length(FORM_HEIGHT),
            ])
            .split(size);

        self.render_messages(frame, chunks[0]);
        if let Some(error) = &self.error {
            frame.render_widget(ErrorBanner::new(error, &self.theme), chunks[1]);
        }
        self.render_status(frame, chunks[2]);
        self.form.render(chunks[3], frame.buffer_mut(), &self.theme);
    }

    fn render_messages(&mut self, frame: &mut Frame, area: Rect) {
        let title = Line::from(vec![
            Span::styled(" Socratic Mind: Educational AI Tutor ", self.theme.accent_bold()),
            Span::styled(format!("│ {} ", self.model), self.theme.dim_style()),
        ]);
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(self.theme.border_style())
            .title(title);

        let inner = block.inner(area);
        frame.render_widget(block, area);
        self.viewport = inner.height as usize;

        if inner.height == 0 || (self.entries.is_empty() && self.thinking_since.is_none()) {
            frame.render_widget(welcome(), inner);
            return;
        }

        // Leave a column for the scrollbar
        let text_width = inner.width.saturating_sub(1) as usize;
        let total = content_height(
            &self.entries,
            &self.theme,
            text_width,
            self.thinking_since.is_some(),
        );
        let max_scroll = total.saturating_sub(inner.height as usize);
        self.scroll = self.scroll.min(max_scroll);

        let text_area = Rect {
            width: inner.width.saturating_sub(1),
            ..inner
        };
        let list = MessageList::new(&self.entries, &self.theme)
            .scroll(self.scroll)
            .thinking(self.thinking_since);
        frame.render_widget(list, text_area);

        if total > inner.height as usize {
            let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight)
                .begin_symbol(Some("↑"))
                .end_symbol(Some("↓"))
                .track_symbol(Some("│"))
                .thumb_symbol("█");
            let mut scrollbar_state = ScrollbarState::new(max_scroll).position(self.scroll);
            frame.render_stateful_widget(scrollbar, inner, &mut scrollbar_state);
        }
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some(started) = self.thinking_since {
            frame.render_widget(Spinner::new("Thinking...", &self.theme, started), area);
            return;
        }

        let left = format!(" {} │ {}", self.model, self.status);
        let right = "Ctrl+E: export │ PgUp/PgDn: scroll │ Esc: quit ";
        let available = area.width as usize;
        let (lw, rw) = (left.chars().count(), right.chars().count());

        let line = if lw + rw + 2 <= available {
            Line::from(vec![
                Span::styled(left, self.theme.dim_style()),
                Span::raw(" ".repeat(available - lw - rw)),
                Span::styled(right, Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(left, self.theme.dim_style()))
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}

fn welcome() -> Paragraph<'static> {
    let key = |k: &'static str, what: &'static str| {
        Line::from(vec![
            Span::styled(format!("    {k:<10}"), Style::default().fg(Color::Cyan)),
            Span::styled(what, Style::default().fg(Color::White)),
        ])
    };

    Paragraph::new(vec![
        Line::from(""),
        Line::from(vec![
            Span::styled(
                "  Socratic Mind",
                Style::default()
                    .fg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            ),
            Span::styled(" - learn by explaining", Style::default().fg(Color::DarkGray)),
        ]),
        Line::from(""),
        Line::from(Span::styled(
            "  Pick a topic, say how you see it, and the tutor evaluates your view,",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "  deepens it, and leaves you with one question to think about.",
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(""),
        Line::from(Span::styled("  Example", Style::default().fg(Color::Yellow))),
        Line::from(""),
        key("Topic", "Why is the sky blue?"),
        key("View", "The way I see it is... it's reflecting the ocean."),
        Line::from(""),
        Line::from(Span::styled("  Keybindings", Style::default().fg(Color::Yellow))),
        Line::from(""),
        key("Tab", "Switch between topic and perspective"),
        key("Enter", "Next field / ask the tutor"),
        key("Ctrl+E", "Export conversation log"),
        key("PgUp/Dn", "Scroll history"),
        key("Esc", "Quit"),
    ])
}

enum Step {
    Continue,
    Quit,
    Submit { topic: String, perspective: String },
}

/// Apply one terminal event to the state; shared by both loop phases
fn on_terminal_event(
    state: &mut TuiState,
    controller: &Controller,
    event: Option<std::io::Result<crossterm::event::Event>>,
    width: u16,
) -> Step {
    let event = match event {
        Some(Ok(event)) => event,
        Some(Err(e)) => {
            tracing::error!(error = %e, "terminal event stream failed");
            return Step::Quit;
        }
        None => return Step::Quit,
    };
    let Some(action) = event_to_action(event) else {
        return Step::Continue;
    };

    match state.handle_action(action, width) {
        UiCommand::None => Step::Continue,
        UiCommand::Quit => Step::Quit,
        UiCommand::Export => {
            match controller.export_logs(state.export_dir()) {
                Ok(path) => state.set_status(format!("Exported to {}", path.display())),
                Err(e) => {
                    tracing::error!(error = %e, "export failed");
                    state.set_status(format!("Export failed: {e}"));
                }
            }
            Step::Continue
        }
        UiCommand::Submit { topic, perspective } => Step::Submit { topic, perspective },
    }
}

/// Run the TUI application
pub async fn run_tui(controller: Controller, export_dir: PathBuf) -> anyhow::Result<()> {
    let mut session = TerminalSession::enter()?;
    let mut state = TuiState::new(controller.config().model.clone(), export_dir);
    let mut events = controller.subscribe();
    let mut event_stream = EventStream::new();
    let mut tick_interval = tokio::time::interval(Duration::from_millis(80));

    let mut pending_submit: Option<(String, String)> = None;

    loop {
        if let Some((topic, perspective)) = pending_submit.take() {
            match controller.begin(&topic, &perspective) {
                Ok(pending) => {
                    state.submission_accepted();
                    state.sync(&controller.snapshot());

                    let mut turn = std::pin::pin!(pending.settle());
                    loop {
                        session.draw(|frame| state.render(frame))?;
                        let width = session.width()?;

                        tokio::select! {
                            biased;
                            outcome = &mut turn => {
                                tracing::debug!(
                                    answered = matches!(outcome, TurnOutcome::Answered(_)),
                                    "turn settled"
                                );
                                break;
                            }
                            event = events.recv() => {
                                if let Ok(event) = event {
                                    state.handle_event(&event);
                                }
                            }
                            event = event_stream.next() => {
                                // Quitting here drops the turn and releases the controller
                                match on_terminal_event(&mut state, &controller, event, width) {
                                    Step::Quit => return Ok(()),
                                    Step::Continue | Step::Submit { .. } => {}
                                }
                            }
                            _ = tick_interval.tick() => {}
                        }
                    }

                    while let Ok(event) = events.try_recv() {
                        state.handle_event(&event);
                    }
                    state.sync(&controller.snapshot());
                }
                Err(e) => state.set_status(format!("Not sent: {e}")),
            }
            continue;
        }

        session.draw(|frame| state.render(frame))?;
        let width = session.width()?;

        tokio::select! {
            biased;
            event = events.recv() => {
                if let Ok(event) = event {
                    state.handle_event(&event);
                    state.sync(&controller.snapshot());
                }
            }
            event = event_stream.next() => {
                match on_terminal_event(&mut state, &controller, event, width) {
                    Step::Quit => break,
                    Step::Continue => {}
                    Step::Submit { topic, perspective } => pending_submit = Some((topic, perspective)),
                }
            }
            _ = tick_interval.tick() => {}
        }
    }

    Ok(())
}
