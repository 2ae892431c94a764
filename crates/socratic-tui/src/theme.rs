//! Color theme support

use ratatui::style::{Color, Modifier, Style};

/// Color theme for the UI
#[derive(Debug, Clone)]
pub struct Theme {
    /// Background color
    pub bg: Color,
    /// Primary text color
    pub fg: Color,
    /// Dimmed/secondary text
    pub dim: Color,
    /// Accent color (title, focused field)
    pub accent: Color,
    /// Section headers in tutor replies
    pub header: Color,
    /// Topic label and text on inquiry cards
    pub topic: Color,
    /// Perspective label and text on inquiry cards
    pub perspective: Color,
    /// Error color
    pub error: Color,
    /// Border color
    pub border: Color,
    /// Code/preformatted text color
    pub code: Color,
    /// Link color
    pub link: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self::dark()
    }
}

impl Theme {
    /// Dark theme (default)
    pub fn dark() -> Self {
        Self {
            bg: Color::Reset,
            fg: Color::White,
            dim: Color::DarkGray,
            accent: Color::Cyan,
            header: Color::LightBlue,
            topic: Color::Yellow,
            perspective: Color::LightMagenta,
            error: Color::Red,
            border: Color::DarkGray,
            code: Color::Magenta,
            link: Color::Blue,
        }
    }

    /// Light theme
    pub fn light() -> Self {
        Self {
            bg: Color::White,
            fg: Color::Black,
            dim: Color::Gray,
            accent: Color::Blue,
            header: Color::Indexed(25),
            topic: Color::Rgb(180, 120, 0),
            perspective: Color::Magenta,
            error: Color::Red,
            border: Color::Gray,
            code: Color::Magenta,
            link: Color::Blue,
        }
    }

    pub fn base_style(&self) -> Style {
        Style::default().fg(self.fg).bg(self.bg)
    }

    pub fn dim_style(&self) -> Style {
        Style::default().fg(self.dim)
    }

    pub fn accent_style(&self) -> Style {
        Style::default().fg(self.accent)
    }

    pub fn accent_bold(&self) -> Style {
        self.accent_style().add_modifier(Modifier::BOLD)
    }

    /// Uppercased section header in a reply
    pub fn header_style(&self) -> Style {
        Style::default()
            .fg(self.header)
            .add_modifier(Modifier::BOLD)
    }

    pub fn topic_style(&self) -> Style {
        Style::default().fg(self.topic)
    }

    pub fn perspective_style(&self) -> Style {
        Style::default().fg(self.perspective)
    }

    pub fn error_style(&self) -> Style {
        Style::default().fg(self.error)
    }

    /// Full-width failure banner
    pub fn error_banner_style(&self) -> Style {
        Style::default()
            .fg(Color::White)
            .bg(self.error)
            .add_modifier(Modifier::BOLD)
    }

    pub fn code_style(&self) -> Style {
        Style::default().fg(self.code)
    }

    pub fn border_style(&self) -> Style {
        Style::default().fg(self.border)
    }
}
