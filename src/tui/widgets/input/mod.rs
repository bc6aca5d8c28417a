mod action;
mod key_handler;
mod render;

pub use action::InputAction;

use crate::tui::theme::Theme;
use ratatui::style::Style;
use tui_textarea::{CursorMove, TextArea};

/// Prompt editor with slash-command completion.
pub struct InputWidget<'a> {
    textarea: TextArea<'a>,
    suggestions: Vec<&'static str>,
    selected_suggestion: usize,
}

impl InputWidget<'_> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            textarea: Self::create_textarea(Vec::new()),
            suggestions: Vec::new(),
            selected_suggestion: 0,
        }
    }

    #[must_use]
    pub fn text(&self) -> String {
        self.textarea.lines().join("\n")
    }

    pub fn set_text(&mut self, text: &str) {
        let lines = text.lines().map(ToString::to_string).collect();
        self.textarea = Self::create_textarea(lines);
        self.textarea.move_cursor(CursorMove::Bottom);
        self.textarea.move_cursor(CursorMove::End);
        self.suggestions.clear();
    }

    pub fn clear(&mut self) {
        self.textarea = Self::create_textarea(Vec::new());
        self.suggestions.clear();
        self.selected_suggestion = 0;
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.textarea.lines().iter().all(String::is_empty)
    }

    #[must_use]
    pub fn line_count(&self) -> usize {
        self.textarea.lines().len()
    }

    pub fn take(&mut self) -> String {
        let text = self.text();
        self.clear();
        text
    }

    #[must_use]
    pub fn suggestions(&self) -> &[&'static str] {
        &self.suggestions
    }

    fn create_textarea(lines: Vec<String>) -> TextArea<'static> {
        let mut textarea = TextArea::new(lines);
        textarea.set_cursor_line_style(Style::default());
        textarea.set_cursor_style(Theme::question());
        textarea
    }
}

impl Default for InputWidget<'_> {
    fn default() -> Self {
        Self::new()
    }
}
