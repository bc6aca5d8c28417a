use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

use crate::core::error::{ChatError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(u64);

impl SessionId {
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0 + 1)
    }

    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Raw notifications from a connection, in wire order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportEvent {
    Message(String),
    Error(String),
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionEvent {
    pub session: SessionId,
    pub event: TransportEvent,
}

impl SessionEvent {
    #[must_use]
    pub const fn new(session: SessionId, event: TransportEvent) -> Self {
        Self { session, event }
    }

    #[must_use]
    pub fn message(session: SessionId, data: impl Into<String>) -> Self {
        Self::new(session, TransportEvent::Message(data.into()))
    }

    #[must_use]
    pub fn error(session: SessionId, reason: impl Into<String>) -> Self {
        Self::new(session, TransportEvent::Error(reason.into()))
    }

    #[must_use]
    pub const fn closed(session: SessionId) -> Self {
        Self::new(session, TransportEvent::Closed)
    }
}

/// Payload of one stream event: `{"token": "...", "completed": false}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamRecord {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub completed: bool,
}

impl StreamRecord {
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            completed: false,
        }
    }

    #[must_use]
    pub fn completed() -> Self {
        Self {
            token: String::new(),
            completed: true,
        }
    }

    pub fn parse(data: &str) -> Result<Self> {
        serde_json::from_str(data).map_err(|e| ChatError::malformed(data, e.to_string()))
    }

    #[must_use]
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_default()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BaseUrl(Cow<'static, str>);

impl BaseUrl {
    #[must_use]
    pub fn new(url: impl Into<Cow<'static, str>>) -> Self {
        let url = url.into();
        let url = if url.ends_with('/') {
            Cow::Owned(url.trim_end_matches('/').to_string())
        } else {
            url
        };
        Self(url)
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `<base>/?prompt=<encoded>`, percent-encoding the prompt the way a
    /// browser's `encodeURIComponent` would.
    #[must_use]
    pub fn stream_url(&self, prompt: &str) -> String {
        format!("{}/?prompt={}", self.0, urlencoding::encode(prompt))
    }
}

impl fmt::Display for BaseUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for BaseUrl {
    fn from(url: String) -> Self {
        Self::new(url)
    }
}

impl From<&'static str> for BaseUrl {
    fn from(url: &'static str) -> Self {
        Self::new(url)
    }
}
