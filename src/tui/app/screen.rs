use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::Frame;
use tracing::{debug, warn};

use super::commands::{HELP_TEXT, SlashCommand};
use super::render::{render_header, render_status};
use crate::core::ChatController;
use crate::transport::{Connector, SessionEvent};
use crate::tui::events::AppEvent;
use crate::tui::layout::calculate_layout;
use crate::tui::state::AppState;
use crate::tui::view::render_with_notices;
use crate::tui::widgets::{ChatWidget, InputAction, InputWidget, NoticeLevel};

const PAGE_SCROLL: usize = 10;

/// Everything drawn on screen, minus the terminal itself.
pub struct ChatScreen<C: Connector> {
    controller: ChatController<C>,
    state: AppState,
    input: InputWidget<'static>,
    endpoint: String,
}

impl<C: Connector> ChatScreen<C> {
    pub fn new(controller: ChatController<C>, endpoint: impl Into<String>) -> Self {
        Self {
            controller,
            state: AppState::new(),
            input: InputWidget::new(),
            endpoint: endpoint.into(),
        }
    }

    #[must_use]
    pub const fn should_quit(&self) -> bool {
        self.state.should_quit
    }

    #[must_use]
    pub const fn controller(&self) -> &ChatController<C> {
        &self.controller
    }

    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    pub fn handle_event(&mut self, event: AppEvent) {
        match event {
            AppEvent::Input(key) => self.handle_key(key),
            AppEvent::Paste(text) => {
                let action = self.input.handle_paste(&text);
                self.handle_input_action(action);
            }
            AppEvent::MouseScroll(delta) => {
                if delta < 0 {
                    self.state.scroll_up(delta.unsigned_abs() as usize);
                } else {
                    self.state.scroll_down(delta.unsigned_abs() as usize);
                }
            }
            AppEvent::Resize(..) => {}
            AppEvent::Transport(event) => self.handle_transport(event),
            AppEvent::Tick => {
                self.state.tick();
                let fired = self.controller.poll_timers();
                if fired > 0 {
                    debug!(fired, "scheduled closes fired");
                }
            }
        }
    }

    pub fn draw(&mut self, frame: &mut Frame) {
        let layout = calculate_layout(frame.area(), self.input.line_count());

        render_header(frame, layout.header, &self.endpoint);

        let messages = render_with_notices(&self.controller.view(), &self.state.notices);
        ChatWidget::new(&messages, &mut self.state.scroll).render(layout.chat, frame.buffer_mut());

        self.input.render(layout.input, frame);

        render_status(
            frame,
            layout.status,
            self.controller.is_busy(),
            self.state.elapsed(),
            self.state.spinner_frame(),
            self.controller.log().len(),
        );
    }

    fn handle_transport(&mut self, event: SessionEvent) {
        self.controller.handle_event(event);

        if let Some(error) = self.controller.take_last_error() {
            warn!(%error, "stream failed");
            let level = if error.is_stream_failure() {
                NoticeLevel::Error
            } else {
                NoticeLevel::Warning
            };
            self.notice(error.to_string(), level);
        }
        self.state.sync_busy(self.controller.is_busy());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Char('c') if ctrl => {
                if self.controller.is_busy() {
                    self.stop();
                } else if !self.input.is_empty() {
                    self.input.clear();
                    self.controller.set_draft("");
                } else {
                    self.state.quit();
                }
            }
            KeyCode::Char('d') if ctrl => {
                if self.input.is_empty() {
                    self.state.quit();
                }
            }
            KeyCode::Esc => {
                if self.controller.is_busy() {
                    self.stop();
                }
            }
            KeyCode::PageUp => self.state.scroll_up(PAGE_SCROLL),
            KeyCode::PageDown => self.state.scroll_down(PAGE_SCROLL),
            KeyCode::Home if ctrl => self.state.scroll_to_top(),
            KeyCode::End if ctrl => self.state.scroll_to_bottom(),
            _ => {
                let action = self.input.handle_key(key);
                self.handle_input_action(action);
            }
        }
    }

    fn handle_input_action(&mut self, action: InputAction) {
        match action {
            InputAction::Continue | InputAction::Clear => {}
            InputAction::Submit(text) => match SlashCommand::parse(&text) {
                Some(command) => self.run_command(command),
                None => self.submit(text),
            },
            InputAction::HistoryPrev => {
                if let Some(text) = self.state.history.older().map(str::to_string) {
                    self.input.set_text(&text);
                }
            }
            InputAction::HistoryNext => match self.state.history.newer().map(str::to_string) {
                Some(text) => self.input.set_text(&text),
                None => self.input.clear(),
            },
        }

        self.controller.set_draft(self.input.text());
    }

    fn submit(&mut self, text: String) {
        self.state.history.record(&text);
        self.state.scroll_to_bottom();

        if let Err(error) = self.controller.submit(text) {
            warn!(%error, "could not start stream");
            self.notice(error.to_string(), NoticeLevel::Error);
        } else {
            self.state.restart_timer();
        }
        self.state.sync_busy(self.controller.is_busy());
    }

    fn stop(&mut self) {
        self.controller.stop();
        self.state.sync_busy(false);
    }

    fn run_command(&mut self, command: SlashCommand) {
        match command {
            SlashCommand::Help => self.notice(HELP_TEXT, NoticeLevel::Info),
            SlashCommand::Stop => {
                if self.controller.is_busy() {
                    self.stop();
                } else {
                    self.notice("Nothing to stop.", NoticeLevel::Warning);
                }
            }
            SlashCommand::Exit => self.state.quit(),
        }
    }

    fn notice(&mut self, text: impl Into<String>, level: NoticeLevel) {
        let position = self.controller.log().len();
        self.state.add_notice(position, text, level);
    }
}
