mod history;

pub use history::PromptHistory;

use crate::tui::widgets::{NoticeLevel, ScrollState};
use std::time::{Duration, Instant};

/// Ticks per spinner glyph; at the 16 ms tick rate this is roughly 80 ms.
const TICKS_PER_SPINNER_STEP: usize = 5;

/// A status line shown in the chat pane but kept out of the conversation log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Number of log entries that precede this notice on screen.
    pub after_entries: usize,
    pub text: String,
    pub level: NoticeLevel,
}

/// Presentation-only state; the conversation itself lives in the controller.
pub struct AppState {
    pub should_quit: bool,
    pub frame: usize,
    pub history: PromptHistory,
    pub scroll: ScrollState,
    pub notices: Vec<Notice>,

    request_start: Option<Instant>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self {
            should_quit: false,
            frame: 0,
            history: PromptHistory::new(),
            scroll: ScrollState::new(),
            notices: Vec::new(),
            request_start: None,
        }
    }

    pub const fn tick(&mut self) {
        self.frame = self.frame.wrapping_add(1);
    }

    #[must_use]
    pub const fn spinner_frame(&self) -> usize {
        self.frame / TICKS_PER_SPINNER_STEP
    }

    pub const fn quit(&mut self) {
        self.should_quit = true;
    }

    /// Keeps the elapsed-time display in step with the controller's busy flag.
    pub fn sync_busy(&mut self, busy: bool) {
        match (busy, self.request_start) {
            (true, None) => self.request_start = Some(Instant::now()),
            (false, Some(_)) => self.request_start = None,
            _ => {}
        }
    }

    pub fn restart_timer(&mut self) {
        self.request_start = Some(Instant::now());
    }

    #[must_use]
    pub fn elapsed(&self) -> Option<Duration> {
        self.request_start.map(|start| start.elapsed())
    }

    pub fn add_notice(&mut self, after_entries: usize, text: impl Into<String>, level: NoticeLevel) {
        self.notices.push(Notice {
            after_entries,
            text: text.into(),
            level,
        });
        self.scroll.follow();
    }

    pub const fn scroll_up(&mut self, lines: usize) {
        self.scroll.scroll_up(lines);
    }

    pub fn scroll_down(&mut self, lines: usize) {
        self.scroll.scroll_down(lines);
    }

    pub const fn scroll_to_top(&mut self) {
        self.scroll.scroll_to_top();
    }

    pub const fn scroll_to_bottom(&mut self) {
        self.scroll.follow();
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
