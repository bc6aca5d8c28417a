use ratatui::layout::{Constraint, Layout, Rect};

const HEADER_HEIGHT: u16 = 3;
const STATUS_HEIGHT: u16 = 1;
const MAX_INPUT_LINES: u16 = 6;

pub struct LayoutAreas {
    pub header: Rect,
    pub chat: Rect,
    pub input: Rect,
    pub status: Rect,
}

/// Splits the frame top to bottom. The input grows with the draft, up to a
/// cap, and always keeps its separator row.
#[must_use]
pub fn calculate_layout(area: Rect, input_lines: usize) -> LayoutAreas {
    let input_height = 1 + (input_lines as u16).clamp(1, MAX_INPUT_LINES);

    let [header, chat, input, status] = Layout::vertical([
        Constraint::Length(HEADER_HEIGHT),
        Constraint::Min(3),
        Constraint::Length(input_height),
        Constraint::Length(STATUS_HEIGHT),
    ])
    .areas(area);

    LayoutAreas {
        header,
        chat,
        input,
        status,
    }
}
