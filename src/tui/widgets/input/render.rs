use ratatui::Frame;
use ratatui::buffer::Buffer;
use ratatui::layout::{Position, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Widget};

use super::InputWidget;
use crate::tui::theme::{Glyphs, Theme};

const HINT_TEXT: &str = "↵ send";
const HINT_WIDTH: u16 = 8;
const MAX_VISIBLE_SUGGESTIONS: usize = 5;

impl InputWidget<'_> {
    pub fn render(&mut self, area: Rect, frame: &mut Frame) {
        render_separator(area, frame.buffer_mut());

        let input_area = input_area(area);
        let prefix_area = Rect {
            width: 2.min(input_area.width),
            height: 1.min(input_area.height),
            ..input_area
        };
        Paragraph::new(Line::from(Span::styled(Glyphs::QUESTION, Theme::question())))
            .render(prefix_area, frame.buffer_mut());

        if !self.is_empty() && input_area.width > HINT_WIDTH {
            let hint_area = Rect {
                x: input_area.x + input_area.width - HINT_WIDTH + 1,
                y: input_area.y,
                width: HINT_WIDTH - 1,
                height: 1,
            };
            Paragraph::new(Line::from(Span::styled(HINT_TEXT, Theme::muted())))
                .render(hint_area, frame.buffer_mut());
        }

        let text_area = textarea_area(input_area);
        self.textarea.set_block(Block::default().borders(Borders::NONE));
        frame.render_widget(&self.textarea, text_area);

        let (row, col) = self.textarea.cursor();
        frame.set_cursor_position(Position::new(
            text_area.x + col as u16,
            text_area.y + row as u16,
        ));

        if !self.suggestions.is_empty() {
            self.render_suggestions(area, frame.buffer_mut());
        }
    }

    fn render_suggestions(&self, area: Rect, buf: &mut Buffer) {
        let height = self.suggestions.len().min(MAX_VISIBLE_SUGGESTIONS) as u16 + 2;
        if area.y < height {
            return;
        }

        let popup = Rect {
            x: area.x + 2,
            y: area.y - height,
            width: 24.min(area.width.saturating_sub(4)),
            height,
        };

        let lines: Vec<Line> = self
            .suggestions
            .iter()
            .enumerate()
            .map(|(i, command)| {
                if i == self.selected_suggestion {
                    Line::from(vec![
                        Span::raw(" "),
                        Span::styled(*command, Theme::primary_bold()),
                        Span::styled(" ←", Theme::primary()),
                    ])
                } else {
                    Line::from(vec![Span::raw(" "), Span::styled(*command, Theme::muted())])
                }
            })
            .collect();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(Theme::primary())
            .border_set(ratatui::symbols::border::ROUNDED)
            .title(" Commands ");

        Paragraph::new(lines).block(block).render(popup, buf);
    }
}

fn render_separator(area: Rect, buf: &mut Buffer) {
    let line = Line::from(Span::styled("─".repeat(area.width as usize), Theme::border()));
    Paragraph::new(line).render(Rect { height: 1.min(area.height), ..area }, buf);
}

const fn input_area(area: Rect) -> Rect {
    Rect {
        x: area.x,
        y: area.y + 1,
        width: area.width,
        height: area.height.saturating_sub(1),
    }
}

const fn textarea_area(input_area: Rect) -> Rect {
    Rect {
        x: input_area.x + 2,
        y: input_area.y,
        width: input_area.width.saturating_sub(2 + HINT_WIDTH),
        height: input_area.height,
    }
}
