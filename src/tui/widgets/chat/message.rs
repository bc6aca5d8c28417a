use ratatui::style::Style;

use crate::tui::theme::Theme;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

impl NoticeLevel {
    #[must_use]
    pub const fn icon(self) -> &'static str {
        match self {
            Self::Info => "ℹ",
            Self::Warning => "⚠",
            Self::Error => "✗",
        }
    }

    #[must_use]
    pub const fn style(self) -> Style {
        match self {
            Self::Info => Theme::muted(),
            Self::Warning => Theme::warning(),
            Self::Error => Theme::error(),
        }
    }
}

/// One visual block in the chat pane.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChatMessage {
    Question(String),
    Answer(String),
    /// The answer currently being received; drawn with a trailing cursor.
    Streaming(String),
    System { text: String, level: NoticeLevel },
}
