use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChatError {
    #[error("Connection failed: {0}")]
    Connection(String),

    #[error("Malformed stream payload ({reason}): {payload}")]
    MalformedPayload { payload: String, reason: String },

    #[error("IO error: {0}")]
    Io(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, ChatError>;

impl ChatError {
    #[must_use]
    pub fn connection(reason: impl Into<String>) -> Self {
        Self::Connection(reason.into())
    }

    #[must_use]
    pub fn malformed(payload: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedPayload {
            payload: payload.into(),
            reason: reason.into(),
        }
    }

    /// Failures that end a stream without committing its partial answer.
    #[must_use]
    pub const fn is_stream_failure(&self) -> bool {
        matches!(self, Self::Connection(_) | Self::MalformedPayload { .. })
    }
}

impl From<std::io::Error> for ChatError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}
