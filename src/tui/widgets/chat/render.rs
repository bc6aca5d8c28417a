use ratatui::style::Style;
use ratatui::text::{Line, Span};

use super::ChatMessage;
use super::NoticeLevel;
use crate::tui::theme::{Glyphs, Theme};

const GUTTER: usize = 2;

impl ChatMessage {
    pub fn render_to_lines(&self, width: u16) -> Vec<Line<'static>> {
        match self {
            Self::Question(text) => render_prefixed(text, width, Glyphs::QUESTION, Theme::question()),
            Self::Answer(text) => render_prefixed(text, width, Glyphs::ANSWER, Theme::answer()),
            Self::Streaming(text) => {
                let mut lines = render_prefixed(text, width, Glyphs::ANSWER, Theme::answer());
                append_cursor(&mut lines);
                lines
            }
            Self::System { text, level } => render_system(text, *level),
        }
    }
}

/// Wraps each source line separately so explicit newlines survive.
fn render_prefixed(text: &str, width: u16, prefix: &'static str, style: Style) -> Vec<Line<'static>> {
    let available = (width as usize).saturating_sub(GUTTER + 1).max(1);

    let wrapped: Vec<String> = text
        .split('\n')
        .flat_map(|line| {
            if line.is_empty() {
                vec![String::new()]
            } else {
                textwrap::wrap(line, available)
                    .into_iter()
                    .map(|piece| piece.into_owned())
                    .collect()
            }
        })
        .collect();

    wrapped
        .into_iter()
        .enumerate()
        .map(|(i, line)| {
            let lead = if i == 0 { prefix } else { "  " };
            Line::from(vec![Span::styled(lead, style), Span::styled(line, style)])
        })
        .collect()
}

fn render_system(text: &str, level: NoticeLevel) -> Vec<Line<'static>> {
    let style = level.style();

    text.lines()
        .enumerate()
        .map(|(i, line)| {
            let lead = if i == 0 {
                format!("{} ", level.icon())
            } else {
                "  ".to_string()
            };
            Line::from(vec![Span::styled(lead, style), Span::styled(line.to_string(), style)])
        })
        .collect()
}

fn append_cursor(lines: &mut Vec<Line<'static>>) {
    let cursor = Span::styled(Glyphs::CURSOR, Theme::primary());

    match lines.last_mut() {
        Some(last) => last.spans.push(cursor),
        None => lines.push(Line::from(vec![
            Span::styled(Glyphs::ANSWER, Theme::answer()),
            cursor,
        ])),
    }
}
