use ratatui::style::{Color, Modifier, Style};

pub struct Palette;

impl Palette {
    pub const CYAN: Color = Color::Rgb(0, 217, 255);
    pub const GREEN: Color = Color::Rgb(16, 185, 129);
    pub const AMBER: Color = Color::Rgb(245, 158, 11);
    pub const RED: Color = Color::Rgb(239, 68, 68);
    pub const GRAY: Color = Color::Rgb(107, 114, 128);
    pub const DARK_GRAY: Color = Color::Rgb(55, 65, 81);
    pub const WHITE: Color = Color::Rgb(255, 255, 255);
    pub const OFF_WHITE: Color = Color::Rgb(184, 184, 184);
}

pub struct Glyphs;

impl Glyphs {
    pub const ROUND_BOTTOM_LEFT: &'static str = "╰";
    pub const ROUND_BOTTOM_RIGHT: &'static str = "╯";
    pub const QUESTION: &'static str = "> ";
    pub const ANSWER: &'static str = "● ";
    pub const CURSOR: &'static str = "▊";
    pub const SPINNER: &'static [&'static str] =
        &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"];
}

pub struct Theme;

impl Theme {
    #[must_use]
    pub const fn primary() -> Style {
        Style::new().fg(Palette::CYAN)
    }

    #[must_use]
    pub const fn success() -> Style {
        Style::new().fg(Palette::GREEN)
    }

    #[must_use]
    pub const fn warning() -> Style {
        Style::new().fg(Palette::AMBER)
    }

    #[must_use]
    pub const fn error() -> Style {
        Style::new().fg(Palette::RED)
    }

    #[must_use]
    pub const fn muted() -> Style {
        Style::new().fg(Palette::GRAY)
    }

    #[must_use]
    pub const fn border() -> Style {
        Style::new().fg(Palette::DARK_GRAY)
    }

    #[must_use]
    pub const fn question() -> Style {
        Style::new().fg(Palette::WHITE)
    }

    #[must_use]
    pub const fn answer() -> Style {
        Style::new().fg(Palette::OFF_WHITE)
    }

    #[must_use]
    pub const fn primary_bold() -> Style {
        Style::new().fg(Palette::CYAN).add_modifier(Modifier::BOLD)
    }
}
