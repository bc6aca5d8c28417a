use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use super::{InputAction, InputWidget};
use crate::tui::app::SLASH_COMMANDS;

impl InputWidget<'_> {
    pub fn handle_key(&mut self, key: KeyEvent) -> InputAction {
        match (key.code, key.modifiers) {
            (KeyCode::Tab, KeyModifiers::NONE) => {
                self.apply_selected_suggestion();
                InputAction::Continue
            }
            (KeyCode::BackTab, _) => {
                self.select_previous_suggestion();
                InputAction::Continue
            }

            (KeyCode::Down, KeyModifiers::NONE) => self.handle_down(),
            (KeyCode::Up, KeyModifiers::NONE) => self.handle_up(),

            (KeyCode::Enter, KeyModifiers::SHIFT | KeyModifiers::ALT) => {
                self.textarea.insert_newline();
                self.suggestions.clear();
                InputAction::Continue
            }
            (KeyCode::Enter, KeyModifiers::NONE) => self.handle_enter(),

            (KeyCode::Char('k' | 'u'), KeyModifiers::CONTROL) => {
                self.clear();
                InputAction::Clear
            }

            _ => {
                self.textarea.input(key);
                self.refresh_suggestions();
                InputAction::Continue
            }
        }
    }

    pub fn handle_paste(&mut self, text: &str) -> InputAction {
        self.suggestions.clear();
        self.textarea.insert_str(text.replace("\r\n", "\n"));
        InputAction::Continue
    }

    fn handle_down(&mut self) -> InputAction {
        if !self.suggestions.is_empty() {
            self.selected_suggestion = (self.selected_suggestion + 1) % self.suggestions.len();
            InputAction::Continue
        } else if self.textarea.cursor().0 + 1 >= self.textarea.lines().len() {
            InputAction::HistoryNext
        } else {
            self.textarea.input(KeyEvent::from(KeyCode::Down));
            InputAction::Continue
        }
    }

    fn handle_up(&mut self) -> InputAction {
        if !self.suggestions.is_empty() {
            self.select_previous_suggestion();
            InputAction::Continue
        } else if self.textarea.cursor().0 == 0 {
            InputAction::HistoryPrev
        } else {
            self.textarea.input(KeyEvent::from(KeyCode::Up));
            InputAction::Continue
        }
    }

    fn handle_enter(&mut self) -> InputAction {
        if let Some(command) = self.suggestions.get(self.selected_suggestion).copied() {
            self.clear();
            return InputAction::Submit(command.to_string());
        }

        if self.text().trim().is_empty() {
            InputAction::Continue
        } else {
            InputAction::Submit(self.take())
        }
    }

    fn refresh_suggestions(&mut self) {
        let text = self.text();
        self.selected_suggestion = 0;

        if !text.starts_with('/') || text.contains(char::is_whitespace) {
            self.suggestions.clear();
            return;
        }

        self.suggestions = SLASH_COMMANDS
            .iter()
            .copied()
            .filter(|cmd| cmd.starts_with(text.as_str()))
            .collect();
    }

    const fn select_previous_suggestion(&mut self) {
        if self.suggestions.is_empty() {
            return;
        }
        if self.selected_suggestion > 0 {
            self.selected_suggestion -= 1;
        } else {
            self.selected_suggestion = self.suggestions.len() - 1;
        }
    }

    fn apply_selected_suggestion(&mut self) {
        if let Some(command) = self.suggestions.get(self.selected_suggestion).copied() {
            self.set_text(command);
        }
    }
}
