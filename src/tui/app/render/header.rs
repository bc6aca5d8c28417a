use crate::tui::theme::{Glyphs, Theme};
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph};

pub fn render_header(frame: &mut Frame, area: Rect, endpoint: &str) {
    let title = format!("streamchat v{}", env!("CARGO_PKG_VERSION"));
    let subtitle = format!("Endpoint: {endpoint}");

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(Theme::border())
        .border_set(ratatui::symbols::border::Set {
            bottom_left: Glyphs::ROUND_BOTTOM_LEFT,
            bottom_right: Glyphs::ROUND_BOTTOM_RIGHT,
            ..ratatui::symbols::border::ROUNDED
        });

    let lines = vec![
        Line::from(vec![
            Span::raw("  "),
            Span::styled(title, Theme::primary_bold()),
        ]),
        Line::from(vec![
            Span::raw("  "),
            Span::styled(subtitle, Theme::muted()),
        ]),
    ];

    frame.render_widget(Paragraph::new(lines).block(block), area);
}
