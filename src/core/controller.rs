use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, trace, warn};

use super::clock::{Clock, SystemClock};
use super::error::{ChatError, Result};
use super::log::{ConversationEntry, ConversationLog};
use super::observer::{ChatView, ObserverSet, StateObserver};
use super::session::{SessionOutcome, StreamSession};
use crate::transport::{Connector, SessionEvent, SessionId};

pub const DEFAULT_GRACE_DELAY: Duration = Duration::from_millis(1000);

/// A stopped session whose transport is released once `deadline` passes.
#[derive(Debug)]
struct ScheduledClose {
    session: StreamSession,
    deadline: Instant,
}

/// Owns the conversation log and at most one live stream.
///
/// Every public mutation notifies the registered [`StateObserver`]s.
pub struct ChatController<C: Connector> {
    connector: C,
    clock: Arc<dyn Clock>,
    grace_delay: Duration,
    log: ConversationLog,
    draft: String,
    busy: bool,
    active: Option<StreamSession>,
    closing: Option<ScheduledClose>,
    next_id: SessionId,
    last_error: Option<ChatError>,
    observers: ObserverSet,
}

impl<C: Connector> ChatController<C> {
    #[must_use]
    pub fn new(connector: C, grace_delay: Duration) -> Self {
        Self {
            connector,
            clock: Arc::new(SystemClock),
            grace_delay,
            log: ConversationLog::new(),
            draft: String::new(),
            busy: false,
            active: None,
            closing: None,
            next_id: SessionId::new(1),
            last_error: None,
            observers: ObserverSet::new(),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn add_observer(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.add(observer);
    }

    pub fn set_draft(&mut self, text: impl Into<String>) {
        let text = text.into();
        if text != self.draft {
            self.draft = text;
            self.notify();
        }
    }

    /// Sends a prompt, superseding any stream still in flight.
    ///
    /// Blank prompts are ignored. If the endpoint cannot be reached the
    /// question stays in the log, busy is cleared and the error is returned
    /// (and kept in [`Self::last_error`]).
    pub fn submit(&mut self, prompt: impl Into<String>) -> Result<()> {
        let prompt = prompt.into();
        if prompt.trim().is_empty() {
            return Ok(());
        }

        self.retire_previous();

        self.busy = true;
        self.draft.clear();
        self.last_error = None;
        self.log.append(ConversationEntry::question(prompt.clone()));

        let id = self.next_id;
        self.next_id = id.next();

        match StreamSession::open(&self.connector, id, &prompt) {
            Ok(session) => {
                info!(session = %id, "prompt submitted");
                self.active = Some(session);
                self.notify();
                Ok(())
            }
            Err(e) => {
                warn!(session = %id, error = %e, "failed to open stream");
                self.busy = false;
                self.last_error = Some(e.clone());
                self.notify();
                Err(e)
            }
        }
    }

    /// Ends the active stream, keeping whatever has arrived so far.
    ///
    /// The transport is released after the grace delay, see
    /// [`Self::poll_timers`].
    pub fn stop(&mut self) {
        let Some(mut session) = self.active.take() else {
            trace!("stop ignored: no active session");
            return;
        };

        self.busy = false;
        session.begin_completing();

        let answer = session.buffer();
        if answer.trim().is_empty() {
            debug!(session = %session.id(), "stream ended with an empty answer");
        } else {
            self.log.append(ConversationEntry::answer(answer));
        }

        if let Some(mut previous) = self.closing.take() {
            previous.session.close();
        }
        let deadline = self.clock.now() + self.grace_delay;
        info!(session = %session.id(), "stream finalized, close scheduled");
        self.closing = Some(ScheduledClose { session, deadline });

        self.notify();
    }

    pub fn handle_event(&mut self, event: SessionEvent) {
        let SessionEvent { session: id, event } = event;

        let outcome = match self.active.as_mut() {
            Some(session) if session.id() == id => session.apply(event),
            _ => {
                match self.closing.as_mut() {
                    Some(scheduled) if scheduled.session.id() == id => {
                        scheduled.session.apply(event);
                    }
                    _ => trace!(session = %id, "event for retired session dropped"),
                }
                return;
            }
        };

        match outcome {
            SessionOutcome::Token => self.notify(),
            SessionOutcome::Completed => self.stop(),
            SessionOutcome::Failed(error) => self.fail_active(error),
            SessionOutcome::Suppressed | SessionOutcome::Ignored => {}
        }
    }

    /// Releases the stopped session once its grace delay has elapsed. Returns
    /// the number of closes fired.
    pub fn poll_timers(&mut self) -> usize {
        let now = self.clock.now();
        match self.closing.take() {
            Some(scheduled) if scheduled.deadline <= now => {
                let mut session = scheduled.session;
                session.close();
                session.take_buffer();
                debug!(session = %session.id(), "scheduled close fired");
                self.notify();
                1
            }
            pending => {
                self.closing = pending;
                0
            }
        }
    }

    #[must_use]
    pub fn next_deadline(&self) -> Option<Instant> {
        self.closing.as_ref().map(|scheduled| scheduled.deadline)
    }

    #[must_use]
    pub fn view(&self) -> ChatView<'_> {
        ChatView {
            log: &self.log,
            draft: &self.draft,
            display_buffer: self.display_buffer(),
            busy: self.busy,
        }
    }

    #[must_use]
    pub const fn log(&self) -> &ConversationLog {
        &self.log
    }

    #[must_use]
    pub fn draft(&self) -> &str {
        &self.draft
    }

    /// Text of the live stream, or of the stopped one until its close fires.
    #[must_use]
    pub fn display_buffer(&self) -> &str {
        self.active
            .as_ref()
            .or_else(|| self.closing.as_ref().map(|scheduled| &scheduled.session))
            .map_or("", StreamSession::buffer)
    }

    #[must_use]
    pub const fn is_busy(&self) -> bool {
        self.busy
    }

    #[must_use]
    pub const fn active_session(&self) -> Option<SessionId> {
        match &self.active {
            Some(session) => Some(session.id()),
            None => None,
        }
    }

    #[must_use]
    pub const fn last_error(&self) -> Option<&ChatError> {
        self.last_error.as_ref()
    }

    pub fn take_last_error(&mut self) -> Option<ChatError> {
        self.last_error.take()
    }

    #[must_use]
    pub const fn connector(&self) -> &C {
        &self.connector
    }

    /// Commits and closes whatever the previous submission left behind, so
    /// the next session never overlaps it.
    fn retire_previous(&mut self) {
        if let Some(mut session) = self.active.take() {
            session.begin_completing();
            let answer = session.take_buffer();
            if !answer.trim().is_empty() {
                self.log.append(ConversationEntry::answer(answer));
            }
            session.close();
            info!(session = %session.id(), "superseded by new prompt");
        }

        if let Some(mut scheduled) = self.closing.take() {
            scheduled.session.close();
        }
    }

    fn fail_active(&mut self, error: ChatError) {
        if let Some(mut session) = self.active.take() {
            warn!(session = %session.id(), %error, "stream failed");
            session.close();
        }
        self.busy = false;
        self.last_error = Some(error);
        self.notify();
    }

    fn notify(&self) {
        if !self.observers.is_empty() {
            self.observers.notify(&self.view());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::log::Role;
    use crate::transport::StreamRecord;
    use crate::transport::mock::ScriptedConnector;
    use parking_lot::Mutex;

    const GRACE: Duration = Duration::from_millis(1000);

    struct Harness {
        controller: ChatController<ScriptedConnector>,
        connector: ScriptedConnector,
        clock: Arc<ManualClock>,
    }

    impl Harness {
        fn new() -> Self {
            let connector = ScriptedConnector::new();
            let clock = Arc::new(ManualClock::new());
            let controller =
                ChatController::new(connector.clone(), GRACE).with_clock(clock.clone());
            Self {
                controller,
                connector,
                clock,
            }
        }

        fn session(&self) -> SessionId {
            self.connector.last_session().expect("a session was opened")
        }

        fn token(&mut self, text: &str) {
            let id = self.session();
            self.token_for(id, text);
        }

        fn token_for(&mut self, id: SessionId, text: &str) {
            self.controller
                .handle_event(SessionEvent::message(id, StreamRecord::token(text).to_json()));
        }

        fn complete(&mut self) {
            let id = self.session();
            self.controller
                .handle_event(SessionEvent::message(id, StreamRecord::completed().to_json()));
        }

        fn entries(&self) -> Vec<(Role, String)> {
            self.controller
                .log()
                .iter()
                .map(|e| (e.role(), e.text().to_string()))
                .collect()
        }
    }

    fn q(text: &str) -> (Role, String) {
        (Role::Question, text.to_string())
    }

    fn a(text: &str) -> (Role, String) {
        (Role::Answer, text.to_string())
    }

    #[test]
    fn hello_scenario_commits_concatenated_answer() {
        let mut h = Harness::new();

        h.controller.submit("Hello").unwrap();
        assert!(h.controller.is_busy());

        h.token("Hi");
        h.token(" there");
        assert_eq!(h.controller.display_buffer(), "Hi there");

        h.complete();

        assert_eq!(h.entries(), vec![q("Hello"), a("Hi there")]);
        assert!(!h.controller.is_busy());
    }

    #[test]
    fn count_scenario_stop_keeps_truncated_answer() {
        let mut h = Harness::new();

        h.controller.submit("Count").unwrap();
        let id = h.session();
        h.token("1");
        h.token("2");
        h.controller.stop();

        assert_eq!(h.entries(), vec![q("Count"), a("12")]);
        assert!(!h.controller.is_busy());

        h.token_for(id, "3");
        h.complete();

        assert_eq!(h.entries(), vec![q("Count"), a("12")]);
        assert_eq!(h.controller.display_buffer(), "12");
    }

    #[test]
    fn submit_uses_prompt_and_clears_draft() {
        let mut h = Harness::new();
        h.controller.set_draft("  spaced prompt ");

        h.controller.submit("  spaced prompt ").unwrap();

        assert_eq!(h.controller.draft(), "");
        assert_eq!(h.entries(), vec![q("  spaced prompt ")]);
        assert_eq!(h.connector.opened()[0].1, "  spaced prompt ");
        assert_eq!(h.controller.display_buffer(), "");
    }

    #[test]
    fn blank_prompts_are_noops() {
        let mut h = Harness::new();
        h.controller.set_draft("   ");

        h.controller.submit("").unwrap();
        h.controller.submit("   ").unwrap();
        h.controller.submit("\t\n").unwrap();

        assert!(h.controller.log().is_empty());
        assert!(!h.controller.is_busy());
        assert_eq!(h.controller.draft(), "   ");
        assert!(h.connector.opened().is_empty());
    }

    #[test]
    fn superseding_submit_commits_old_answer_before_new_question() {
        let mut h = Harness::new();

        h.controller.submit("first").unwrap();
        let first = h.session();
        h.token("partial");

        h.controller.submit("second").unwrap();
        let second = h.session();

        assert_eq!(h.entries(), vec![q("first"), a("partial"), q("second")]);
        assert!(h.connector.is_released(first));
        assert!(!h.connector.is_released(second));
        assert_eq!(h.controller.active_session(), Some(second));
        assert_eq!(h.controller.display_buffer(), "");

        h.token_for(first, "stale");
        assert_eq!(h.controller.display_buffer(), "");
    }

    #[test]
    fn superseding_empty_stream_adds_no_answer() {
        let mut h = Harness::new();

        h.controller.submit("first").unwrap();
        h.token("  ");
        h.controller.submit("second").unwrap();

        assert_eq!(h.entries(), vec![q("first"), q("second")]);
    }

    #[test]
    fn stop_with_empty_buffer_appends_nothing() {
        let mut h = Harness::new();

        h.controller.submit("quiet").unwrap();
        h.controller.stop();

        assert_eq!(h.entries(), vec![q("quiet")]);
        assert!(!h.controller.is_busy());
    }

    #[test]
    fn double_stop_appends_at_most_one_answer() {
        let mut h = Harness::new();

        h.controller.submit("x").unwrap();
        h.token("y");
        h.controller.stop();
        h.controller.stop();

        assert_eq!(h.entries(), vec![q("x"), a("y")]);
    }

    #[test]
    fn stop_when_idle_is_noop() {
        let mut h = Harness::new();
        h.controller.stop();

        assert!(h.controller.log().is_empty());
        assert!(h.controller.next_deadline().is_none());
    }

    #[test]
    fn close_waits_for_grace_delay() {
        let mut h = Harness::new();

        h.controller.submit("x").unwrap();
        let id = h.session();
        h.token("y");
        h.controller.stop();

        assert!(!h.connector.is_released(id));
        assert_eq!(h.controller.poll_timers(), 0);

        h.clock.advance(GRACE - Duration::from_millis(1));
        assert_eq!(h.controller.poll_timers(), 0);
        assert!(!h.connector.is_released(id));

        h.clock.advance(Duration::from_millis(1));
        assert_eq!(h.controller.poll_timers(), 1);
        assert!(h.connector.is_released(id));
        assert_eq!(h.controller.display_buffer(), "");
        assert!(h.controller.next_deadline().is_none());
    }

    #[test]
    fn completion_schedules_close() {
        let mut h = Harness::new();

        h.controller.submit("x").unwrap();
        let id = h.session();
        h.token("y");
        h.complete();

        assert_eq!(h.controller.next_deadline(), Some(h.clock.now() + GRACE));

        h.clock.advance(GRACE);
        h.controller.poll_timers();
        assert!(h.connector.is_released(id));
        assert_eq!(h.connector.close_calls(), 1);
    }

    #[test]
    fn submit_during_grace_releases_pending_close() {
        let mut h = Harness::new();

        h.controller.submit("one").unwrap();
        let first = h.session();
        h.token("1");
        h.controller.stop();

        h.controller.submit("two").unwrap();

        assert!(h.connector.is_released(first));
        assert!(h.controller.next_deadline().is_none());
        assert_eq!(h.entries(), vec![q("one"), a("1"), q("two")]);
    }

    #[test]
    fn open_failure_resets_busy_and_keeps_log() {
        let mut h = Harness::new();
        h.connector.refuse_next("connection refused");

        let err = h.controller.submit("hi").unwrap_err();

        assert_eq!(err, ChatError::Connection("connection refused".into()));
        assert!(!h.controller.is_busy());
        assert_eq!(h.entries(), vec![q("hi")]);
        assert_eq!(h.controller.last_error(), Some(&err));
        assert!(h.controller.active_session().is_none());
    }

    #[test]
    fn mid_stream_error_discards_partial_answer() {
        let mut h = Harness::new();

        h.controller.submit("hi").unwrap();
        let id = h.session();
        h.token("par");
        h.controller
            .handle_event(SessionEvent::error(id, "connection reset"));

        assert_eq!(h.entries(), vec![q("hi")]);
        assert!(!h.controller.is_busy());
        assert!(h.connector.is_released(id));
        assert!(matches!(
            h.controller.take_last_error(),
            Some(ChatError::Connection(_))
        ));
        assert!(h.controller.last_error().is_none());
    }

    #[test]
    fn malformed_payload_is_surfaced() {
        let mut h = Harness::new();

        h.controller.submit("hi").unwrap();
        let id = h.session();
        h.controller.handle_event(SessionEvent::message(id, "garbage"));

        assert!(!h.controller.is_busy());
        assert_eq!(h.entries(), vec![q("hi")]);
        assert!(matches!(
            h.controller.last_error(),
            Some(ChatError::MalformedPayload { .. })
        ));
    }

    #[test]
    fn error_after_stop_is_suppressed() {
        let mut h = Harness::new();

        h.controller.submit("hi").unwrap();
        let id = h.session();
        h.token("ok");
        h.controller.stop();
        h.controller.handle_event(SessionEvent::error(id, "aborted"));

        assert!(h.controller.last_error().is_none());
        assert_eq!(h.entries(), vec![q("hi"), a("ok")]);

        h.clock.advance(GRACE);
        h.controller.poll_timers();
        h.controller.handle_event(SessionEvent::error(id, "aborted"));
        assert!(h.controller.last_error().is_none());
    }

    #[test]
    fn sessions_get_fresh_ids() {
        let mut h = Harness::new();

        h.controller.submit("a").unwrap();
        h.controller.submit("b").unwrap();

        let ids: Vec<SessionId> = h.connector.opened().into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![SessionId::new(1), SessionId::new(2)]);
    }

    struct Recorder {
        views: Mutex<Vec<(usize, String, bool)>>,
    }

    impl StateObserver for Recorder {
        fn state_changed(&self, view: &ChatView<'_>) {
            self.views
                .lock()
                .push((view.log.len(), view.display_buffer.to_string(), view.busy));
        }
    }

    #[test]
    fn observers_see_every_token_in_order() {
        let mut h = Harness::new();
        let recorder = Arc::new(Recorder {
            views: Mutex::new(Vec::new()),
        });
        h.controller.add_observer(recorder.clone());

        h.controller.submit("Hello").unwrap();
        h.token("Hi");
        h.token(" there");
        h.complete();

        let views = recorder.views.lock().clone();
        assert_eq!(
            views,
            vec![
                (1, String::new(), true),
                (1, "Hi".to_string(), true),
                (1, "Hi there".to_string(), true),
                (2, "Hi there".to_string(), false),
            ]
        );
    }

    #[test]
    fn drop_releases_live_transports() {
        let connector = ScriptedConnector::new();
        {
            let mut controller = ChatController::new(connector.clone(), GRACE);
            controller.submit("x").unwrap();
        }
        assert_eq!(connector.released(), vec![SessionId::new(1)]);
    }
}
