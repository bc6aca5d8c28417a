use crate::tui::theme::{Glyphs, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use std::time::Duration;

const HINTS: &str = "Enter send | Esc stop | PgUp/PgDn scroll | /help";

fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs > 0 {
        format!("{secs}s")
    } else {
        format!("{}ms", elapsed.as_millis())
    }
}

pub fn render_status(
    frame: &mut Frame,
    area: Rect,
    busy: bool,
    elapsed: Option<Duration>,
    spinner_frame: usize,
    entries: usize,
) {
    let left = Line::from(vec![Span::raw(" "), Span::styled(HINTS, Theme::muted())]);
    frame
        .buffer_mut()
        .set_line(area.x, area.y, &left, area.width);

    let right = if busy {
        let glyph = Glyphs::SPINNER[spinner_frame % Glyphs::SPINNER.len()];
        let elapsed = elapsed.map(|d| format!(" {}", format_elapsed(d))).unwrap_or_default();
        Line::from(vec![
            Span::styled(format!("{glyph} Streaming{elapsed}"), Theme::warning()),
            Span::raw(" "),
        ])
    } else if entries > 0 {
        Line::from(vec![
            Span::styled(format!("{entries} entries"), Theme::muted()),
            Span::raw(" "),
        ])
    } else {
        return;
    };

    let width = right.width() as u16;
    let x = area.x + area.width.saturating_sub(width);
    frame.buffer_mut().set_line(x, area.y, &right, width);
}
