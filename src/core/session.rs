use std::fmt;
use tracing::{debug, trace};

use super::error::{ChatError, Result};
use crate::transport::{Connection, Connector, SessionId, StreamRecord, TransportEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Streaming,
    Completing,
    Closed,
}

impl SessionState {
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Streaming | Self::Completing)
    }
}

/// What a single transport event did to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// A token was appended to the buffer.
    Token,
    /// The terminal record arrived; the session is now Completing.
    Completed,
    /// The stream failed while still wanted.
    Failed(ChatError),
    /// A transport error after an intentional close.
    Suppressed,
    /// The event arrived after the session stopped accepting input.
    Ignored,
}

/// One outstanding prompt/response exchange. Never reused once Closed.
pub struct StreamSession {
    id: SessionId,
    prompt: String,
    state: SessionState,
    buffer: String,
    connection: Option<Box<dyn Connection>>,
}

impl StreamSession {
    pub fn open<C: Connector + ?Sized>(connector: &C, id: SessionId, prompt: &str) -> Result<Self> {
        let mut session = Self {
            id,
            prompt: prompt.to_string(),
            state: SessionState::Idle,
            buffer: String::new(),
            connection: None,
        };

        session.connection = Some(connector.open(id, prompt)?);
        session.state = SessionState::Streaming;
        debug!(session = %id, "session streaming");
        Ok(session)
    }

    pub fn apply(&mut self, event: TransportEvent) -> SessionOutcome {
        match (self.state, event) {
            (SessionState::Streaming, TransportEvent::Message(data)) => {
                match StreamRecord::parse(&data) {
                    Ok(record) if record.completed => {
                        self.state = SessionState::Completing;
                        SessionOutcome::Completed
                    }
                    Ok(record) => {
                        self.buffer.push_str(&record.token);
                        SessionOutcome::Token
                    }
                    Err(e) => SessionOutcome::Failed(e),
                }
            }
            (SessionState::Streaming, TransportEvent::Error(reason)) => {
                SessionOutcome::Failed(ChatError::Connection(reason))
            }
            (SessionState::Streaming, TransportEvent::Closed) => SessionOutcome::Failed(
                ChatError::connection("stream ended before completion"),
            ),
            (SessionState::Completing | SessionState::Closed, TransportEvent::Error(reason)) => {
                debug!(session = %self.id, %reason, "suppressing error after close");
                SessionOutcome::Suppressed
            }
            (state, event) => {
                trace!(session = %self.id, ?state, ?event, "ignoring late event");
                SessionOutcome::Ignored
            }
        }
    }

    pub fn begin_completing(&mut self) {
        if self.state == SessionState::Streaming {
            self.state = SessionState::Completing;
        }
    }

    pub fn close(&mut self) {
        if let Some(mut connection) = self.connection.take() {
            connection.close();
        }
        self.state = SessionState::Closed;
    }

    pub fn take_buffer(&mut self) -> String {
        std::mem::take(&mut self.buffer)
    }

    #[must_use]
    pub const fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn buffer(&self) -> &str {
        &self.buffer
    }
}

impl fmt::Debug for StreamSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSession")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("buffered", &self.buffer.len())
            .finish_non_exhaustive()
    }
}

impl Drop for StreamSession {
    fn drop(&mut self) {
        self.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::mock::ScriptedConnector;

    fn token(text: &str) -> TransportEvent {
        TransportEvent::Message(StreamRecord::token(text).to_json())
    }

    fn completed() -> TransportEvent {
        TransportEvent::Message(StreamRecord::completed().to_json())
    }

    fn open(connector: &ScriptedConnector) -> StreamSession {
        StreamSession::open(connector, SessionId::new(1), "Hello").expect("open")
    }

    #[test]
    fn open_starts_streaming() {
        let connector = ScriptedConnector::new();
        let session = open(&connector);

        assert_eq!(session.state(), SessionState::Streaming);
        assert!(session.state().is_active());
        assert_eq!(session.prompt(), "Hello");
        assert!(session.buffer().is_empty());
        assert_eq!(connector.opened()[0].1, "Hello");
    }

    #[test]
    fn open_failure_is_connection_error() {
        let connector = ScriptedConnector::new();
        connector.refuse_next("refused");

        let err = StreamSession::open(&connector, SessionId::new(1), "x").unwrap_err();
        assert_eq!(err, ChatError::Connection("refused".into()));
    }

    #[test]
    fn tokens_concatenate_without_separators() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        for t in ["Hi", " there", "", "!\n", "ok"] {
            assert_eq!(session.apply(token(t)), SessionOutcome::Token);
        }

        assert_eq!(session.buffer(), "Hi there!\nok");
    }

    #[test]
    fn completed_record_stops_accumulation() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        session.apply(token("a"));
        assert_eq!(session.apply(completed()), SessionOutcome::Completed);
        assert_eq!(session.state(), SessionState::Completing);

        assert_eq!(session.apply(token("late")), SessionOutcome::Ignored);
        assert_eq!(session.buffer(), "a");
    }

    #[test]
    fn terminal_record_token_is_not_appended() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        let record = StreamRecord {
            token: "tail".into(),
            completed: true,
        };
        session.apply(TransportEvent::Message(record.to_json()));

        assert!(session.buffer().is_empty());
    }

    #[test]
    fn malformed_payload_fails() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        let outcome = session.apply(TransportEvent::Message("{not json".into()));
        assert!(matches!(
            outcome,
            SessionOutcome::Failed(ChatError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn error_while_streaming_fails() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        let outcome = session.apply(TransportEvent::Error("reset by peer".into()));
        assert_eq!(
            outcome,
            SessionOutcome::Failed(ChatError::Connection("reset by peer".into()))
        );
    }

    #[test]
    fn server_close_before_completion_fails() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        assert!(matches!(
            session.apply(TransportEvent::Closed),
            SessionOutcome::Failed(ChatError::Connection(_))
        ));
    }

    #[test]
    fn error_after_intentional_close_is_suppressed() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        session.begin_completing();
        assert_eq!(
            session.apply(TransportEvent::Error("aborted".into())),
            SessionOutcome::Suppressed
        );

        session.close();
        assert_eq!(
            session.apply(TransportEvent::Error("aborted".into())),
            SessionOutcome::Suppressed
        );
        assert_eq!(session.apply(TransportEvent::Closed), SessionOutcome::Ignored);
    }

    #[test]
    fn close_is_idempotent() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        session.close();
        assert!(!session.state().is_active());
        session.close();
        drop(session);

        assert_eq!(connector.released(), vec![SessionId::new(1)]);
        assert_eq!(connector.close_calls(), 1);
    }

    #[test]
    fn take_buffer_resets() {
        let connector = ScriptedConnector::new();
        let mut session = open(&connector);

        session.apply(token("12"));
        assert_eq!(session.take_buffer(), "12");
        assert!(session.buffer().is_empty());
    }
}
