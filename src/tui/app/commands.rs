pub const HELP_TEXT: &str = r"Available commands:
/help - Show this help message
/stop - Stop the answer being streamed
/exit - Exit the application

Any other input, including text starting with '/', is sent as a prompt.

Keys: Enter send, Shift+Enter newline, Esc stop, Up/Down recall prompts,
PgUp/PgDn scroll, Ctrl+C clear input or quit";

pub const SLASH_COMMANDS: &[&str] = &["/help", "/stop", "/exit"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlashCommand {
    Help,
    Stop,
    Exit,
}

impl SlashCommand {
    /// Recognises a command only when it is the whole input; anything else is
    /// a prompt.
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim() {
            "/help" => Some(Self::Help),
            "/stop" => Some(Self::Stop),
            "/exit" | "/quit" => Some(Self::Exit),
            _ => None,
        }
    }
}
