//! In-memory connector for driving a controller without a network.

use parking_lot::Mutex;
use std::sync::Arc;

use super::types::SessionId;
use super::{Connection, Connector};
use crate::core::error::{ChatError, Result};

#[derive(Debug, Default)]
struct Recorded {
    opened: Vec<(SessionId, String)>,
    released: Vec<SessionId>,
    close_calls: usize,
    refuse_next: Option<String>,
}

/// Records every open and close. Cloning shares the record, so a test can
/// keep a handle after moving the connector into a controller.
#[derive(Debug, Clone, Default)]
pub struct ScriptedConnector {
    recorded: Arc<Mutex<Recorded>>,
}

impl ScriptedConnector {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `open` fail as if the endpoint were unreachable.
    pub fn refuse_next(&self, reason: impl Into<String>) {
        self.recorded.lock().refuse_next = Some(reason.into());
    }

    #[must_use]
    pub fn opened(&self) -> Vec<(SessionId, String)> {
        self.recorded.lock().opened.clone()
    }

    #[must_use]
    pub fn last_session(&self) -> Option<SessionId> {
        self.recorded.lock().opened.last().map(|(id, _)| *id)
    }

    /// Sessions whose transport has actually been released, in release order.
    #[must_use]
    pub fn released(&self) -> Vec<SessionId> {
        self.recorded.lock().released.clone()
    }

    #[must_use]
    pub fn close_calls(&self) -> usize {
        self.recorded.lock().close_calls
    }

    #[must_use]
    pub fn is_released(&self, session: SessionId) -> bool {
        self.recorded.lock().released.contains(&session)
    }
}

impl Connector for ScriptedConnector {
    fn open(&self, session: SessionId, prompt: &str) -> Result<Box<dyn Connection>> {
        let mut recorded = self.recorded.lock();
        if let Some(reason) = recorded.refuse_next.take() {
            return Err(ChatError::Connection(reason));
        }
        recorded.opened.push((session, prompt.to_string()));

        Ok(Box::new(ScriptedConnection {
            session,
            closed: false,
            recorded: Arc::clone(&self.recorded),
        }))
    }
}

struct ScriptedConnection {
    session: SessionId,
    closed: bool,
    recorded: Arc<Mutex<Recorded>>,
}

impl Connection for ScriptedConnection {
    fn close(&mut self) {
        let mut recorded = self.recorded.lock();
        recorded.close_calls += 1;
        if !self.closed {
            self.closed = true;
            recorded.released.push(self.session);
        }
    }

    fn is_closed(&self) -> bool {
        self.closed
    }
}
