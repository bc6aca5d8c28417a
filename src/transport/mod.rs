//! Server-push transport: one disposable [`Connection`] per submitted prompt.
//!
//! Connections never touch chat state. They forward [`SessionEvent`]s into a
//! channel drained by whoever owns the [`crate::core::ChatController`].

pub mod http;
pub mod mock;
pub mod sse;
pub mod types;

pub use http::{HttpConfig, HttpConnector};
pub use sse::{SseEvent, SseParser};
pub use types::{BaseUrl, SessionEvent, SessionId, StreamRecord, TransportEvent};

use crate::core::error::Result;
use tokio::sync::mpsc;

pub type EventSender = mpsc::UnboundedSender<SessionEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<SessionEvent>;

/// A single-use server-push connection.
pub trait Connection: Send {
    /// Releases the transport. Must be idempotent and must not fail.
    fn close(&mut self);

    fn is_closed(&self) -> bool;
}

pub trait Connector {
    fn open(&self, session: SessionId, prompt: &str) -> Result<Box<dyn Connection>>;
}

#[must_use]
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}
