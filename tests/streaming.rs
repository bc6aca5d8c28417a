use std::time::Duration;

use streamchat::core::{ChatController, ChatError, ConversationEntry};
use streamchat::transport::{
    BaseUrl, EventReceiver, HttpConfig, HttpConnector, StreamRecord, TransportEvent,
    event_channel,
};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SSE_HEADERS: &str =
    "HTTP/1.1 200 OK\r\nContent-Type: text/event-stream\r\nConnection: close\r\n\r\n";

/// Accepts one request, answers with `response`, then hangs up. Resolves to
/// the request line the client sent.
async fn serve_once(response: String) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut request = Vec::new();
        let mut buf = [0u8; 1024];
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();

        String::from_utf8_lossy(&request)
            .lines()
            .next()
            .unwrap_or_default()
            .to_string()
    });

    (url, handle)
}

/// Like [`serve_once`], but writes `head`, waits for `resume`, then writes
/// `tail` before hanging up.
async fn serve_stalled(
    head: String,
    tail: String,
) -> (String, oneshot::Sender<()>, JoinHandle<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    let (resume_tx, resume_rx) = oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();

        let mut buf = [0u8; 1024];
        let mut request = Vec::new();
        while !request.windows(4).any(|w| w == b"\r\n\r\n") {
            let n = socket.read(&mut buf).await.unwrap();
            if n == 0 {
                break;
            }
            request.extend_from_slice(&buf[..n]);
        }

        socket.write_all(head.as_bytes()).await.unwrap();
        socket.flush().await.unwrap();

        let _ = resume_rx.await;
        // The client may already have hung up.
        let _ = socket.write_all(tail.as_bytes()).await;
        let _ = socket.shutdown().await;
    });

    (url, resume_tx, handle)
}

fn sse_event(record: &StreamRecord) -> String {
    format!("data: {}\n\n", record.to_json())
}

fn controller_for(url: &str) -> (ChatController<HttpConnector>, EventReceiver) {
    controller_with_grace(url, Duration::ZERO)
}

fn controller_with_grace(
    url: &str,
    grace: Duration,
) -> (ChatController<HttpConnector>, EventReceiver) {
    let (tx, rx) = event_channel();
    let connector =
        HttpConnector::new(&HttpConfig::new(), BaseUrl::new(url.to_string()), tx).unwrap();
    (ChatController::new(connector, grace), rx)
}

async fn drain(controller: &mut ChatController<HttpConnector>, rx: &mut EventReceiver) {
    let pump = async {
        while controller.is_busy() {
            let Some(event) = rx.recv().await else { break };
            controller.handle_event(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(5), pump)
        .await
        .expect("stream did not finish in time");
    controller.poll_timers();
}

#[tokio::test]
async fn hello_scenario_over_http() {
    let body = [
        sse_event(&StreamRecord::token("Hi")),
        ": keep-alive\n\n".to_string(),
        sse_event(&StreamRecord::token(" there")),
        sse_event(&StreamRecord::completed()),
    ]
    .concat();
    let (url, server) = serve_once(format!("{SSE_HEADERS}{body}")).await;
    let (mut controller, mut rx) = controller_for(&url);

    controller.submit("Hello world").unwrap();
    drain(&mut controller, &mut rx).await;

    assert_eq!(
        server.await.unwrap(),
        "GET /?prompt=Hello%20world HTTP/1.1"
    );
    assert_eq!(
        controller.log().entries(),
        &[
            ConversationEntry::question("Hello world"),
            ConversationEntry::answer("Hi there"),
        ]
    );
    assert!(!controller.is_busy());
    assert!(controller.last_error().is_none());
}

#[tokio::test]
async fn server_error_status_is_connection_failure() {
    let response =
        "HTTP/1.1 500 Internal Server Error\r\nContent-Length: 0\r\nConnection: close\r\n\r\n";
    let (url, _server) = serve_once(response.to_string()).await;
    let (mut controller, mut rx) = controller_for(&url);

    controller.submit("Hello").unwrap();
    drain(&mut controller, &mut rx).await;

    assert!(matches!(controller.last_error(), Some(ChatError::Connection(_))));
    assert_eq!(controller.log().entries(), &[ConversationEntry::question("Hello")]);
    assert!(!controller.is_busy());
}

#[tokio::test]
async fn hang_up_before_completion_discards_partial_answer() {
    let body = sse_event(&StreamRecord::token("partial"));
    let (url, _server) = serve_once(format!("{SSE_HEADERS}{body}")).await;
    let (mut controller, mut rx) = controller_for(&url);

    controller.submit("Hello").unwrap();
    drain(&mut controller, &mut rx).await;

    assert!(matches!(controller.last_error(), Some(ChatError::Connection(_))));
    assert_eq!(controller.log().len(), 1);
}

#[tokio::test]
async fn malformed_record_is_reported() {
    let body = "data: not json\n\n";
    let (url, _server) = serve_once(format!("{SSE_HEADERS}{body}")).await;
    let (mut controller, mut rx) = controller_for(&url);

    controller.submit("Hello").unwrap();
    drain(&mut controller, &mut rx).await;

    assert!(matches!(
        controller.last_error(),
        Some(ChatError::MalformedPayload { .. })
    ));
    assert_eq!(controller.log().len(), 1);
}

#[tokio::test]
async fn unreachable_endpoint_fails_without_answer() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let (mut controller, mut rx) = controller_for(&url);

    controller.submit("Hello").unwrap();
    drain(&mut controller, &mut rx).await;

    assert!(matches!(controller.last_error(), Some(ChatError::Connection(_))));
    assert_eq!(controller.log().entries(), &[ConversationEntry::question("Hello")]);
}

#[tokio::test]
async fn stop_keeps_partial_answer_and_ignores_later_bytes() {
    let head = [
        SSE_HEADERS.to_string(),
        sse_event(&StreamRecord::token("1")),
        sse_event(&StreamRecord::token("2")),
    ]
    .concat();
    let tail = [
        sse_event(&StreamRecord::token("3")),
        sse_event(&StreamRecord::completed()),
    ]
    .concat();
    let (url, resume, server) = serve_stalled(head, tail).await;
    // A long grace delay keeps the connection open while the tail arrives.
    let (mut controller, mut rx) = controller_with_grace(&url, Duration::from_secs(60));

    controller.submit("Count").unwrap();
    let first_tokens = async {
        while controller.display_buffer() != "12" {
            let event = rx.recv().await.unwrap();
            controller.handle_event(event);
        }
    };
    tokio::time::timeout(Duration::from_secs(5), first_tokens)
        .await
        .expect("tokens did not arrive in time");

    controller.stop();
    assert!(!controller.is_busy());

    resume.send(()).unwrap();
    let late_events = async {
        while let Some(event) = rx.recv().await {
            let closed = event.event == TransportEvent::Closed;
            controller.handle_event(event);
            if closed {
                break;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), late_events)
        .await
        .expect("server did not finish in time");
    server.await.unwrap();

    assert_eq!(
        controller.log().entries(),
        &[
            ConversationEntry::question("Count"),
            ConversationEntry::answer("12"),
        ]
    );
    assert!(controller.last_error().is_none());
    assert_eq!(controller.poll_timers(), 0);
    assert!(controller.next_deadline().is_some());
}
