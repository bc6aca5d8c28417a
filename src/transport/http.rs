use futures::StreamExt;
use reqwest::Client;
use reqwest::header::{ACCEPT, CACHE_CONTROL};
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{debug, warn};

use super::sse::SseParser;
use super::types::{BaseUrl, SessionEvent, SessionId, TransportEvent};
use super::{Connection, Connector, EventSender};
use crate::core::error::{ChatError, Result};

#[derive(Debug, Clone)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub user_agent: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            connect_timeout: Duration::from_secs(10),
            user_agent: None,
        }
    }
}

impl HttpConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub const fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = Some(user_agent.into());
        self
    }
}

/// Opens one `GET <base>/?prompt=...` event stream per session. Each stream is
/// pumped by its own task, which stops as soon as the connection is closed.
#[derive(Clone)]
pub struct HttpConnector {
    client: Client,
    base_url: BaseUrl,
    events: EventSender,
}

impl HttpConnector {
    pub fn new(config: &HttpConfig, base_url: BaseUrl, events: EventSender) -> Result<Self> {
        // No overall request timeout: streams stay open for as long as the
        // server keeps generating.
        let mut builder = Client::builder().connect_timeout(config.connect_timeout);

        if let Some(ref ua) = config.user_agent {
            builder = builder.user_agent(ua);
        }

        let client = builder
            .build()
            .map_err(|e| ChatError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            events,
        })
    }

    #[must_use]
    pub const fn base_url(&self) -> &BaseUrl {
        &self.base_url
    }
}

impl Connector for HttpConnector {
    fn open(&self, session: SessionId, prompt: &str) -> Result<Box<dyn Connection>> {
        let url = reqwest::Url::parse(&self.base_url.stream_url(prompt))
            .map_err(|e| ChatError::connection(format!("invalid endpoint {}: {e}", self.base_url)))?;

        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| ChatError::connection(format!("no async runtime: {e}")))?;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let request = self
            .client
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .header(CACHE_CONTROL, "no-cache");

        debug!(%session, endpoint = %self.base_url, "opening event stream");
        runtime.spawn(pump(request, session, self.events.clone(), shutdown_rx));

        Ok(Box::new(HttpConnection {
            session,
            shutdown: Some(shutdown_tx),
        }))
    }
}

impl std::fmt::Debug for HttpConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConnector")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

pub struct HttpConnection {
    session: SessionId,
    shutdown: Option<oneshot::Sender<()>>,
}

impl Connection for HttpConnection {
    fn close(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            // The pump may already have finished; a dropped receiver is fine.
            let _ = tx.send(());
            debug!(session = %self.session, "event stream closed");
        }
    }

    fn is_closed(&self) -> bool {
        self.shutdown.is_none()
    }
}

impl Drop for HttpConnection {
    fn drop(&mut self) {
        self.close();
    }
}

async fn pump(
    request: reqwest::RequestBuilder,
    session: SessionId,
    events: EventSender,
    mut shutdown: oneshot::Receiver<()>,
) {
    let send = |event: TransportEvent| events.send(SessionEvent::new(session, event)).is_ok();

    let response = tokio::select! {
        _ = &mut shutdown => return,
        response = request.send() => response,
    };

    let response = match response {
        Ok(response) => response,
        Err(e) => {
            warn!(%session, error = %e, "event stream request failed");
            send(TransportEvent::Error(e.to_string()));
            return;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(%session, %status, "event stream rejected");
        send(TransportEvent::Error(format!("HTTP {status}")));
        return;
    }

    let mut body = Box::pin(response.bytes_stream());
    let mut parser = SseParser::new();

    loop {
        tokio::select! {
            _ = &mut shutdown => return,
            chunk = body.next() => match chunk {
                Some(Ok(bytes)) => {
                    for event in parser.process_chunk(&bytes) {
                        if event.is_message() && !send(TransportEvent::Message(event.data)) {
                            return;
                        }
                    }
                }
                Some(Err(e)) => {
                    send(TransportEvent::Error(e.to_string()));
                    return;
                }
                None => {
                    if let Some(event) = parser.finish().filter(super::sse::SseEvent::is_message) {
                        send(TransportEvent::Message(event.data));
                    }
                    send(TransportEvent::Closed);
                    return;
                }
            }
        }
    }
}
