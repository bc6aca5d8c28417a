use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::debug;

use crate::config::AppConfig;
use crate::core::{ChatController, ChatView, Result, StateObserver};
use crate::transport::{Connector, EventReceiver, HttpConnector, TransportEvent, event_channel};

/// Writes each newly streamed slice of the display buffer to stdout.
#[derive(Default)]
struct TokenPrinter {
    printed: Mutex<usize>,
}

impl StateObserver for TokenPrinter {
    fn state_changed(&self, view: &ChatView<'_>) {
        let mut printed = self.printed.lock();
        if !view.busy {
            return;
        }
        if view.display_buffer.len() < *printed {
            *printed = 0;
        }

        let fresh = &view.display_buffer[*printed..];
        if fresh.is_empty() {
            return;
        }

        let mut stdout = io::stdout().lock();
        if stdout.write_all(fresh.as_bytes()).and_then(|()| stdout.flush()).is_ok() {
            *printed = view.display_buffer.len();
        }
    }
}

pub async fn run_ask(config: &AppConfig, prompt: String, stop_after: Option<usize>) -> Result<()> {
    let (tx, rx) = event_channel();
    let connector = HttpConnector::new(&config.http_config(), config.base_url(), tx)?;

    let mut controller = ChatController::new(connector, config.grace_delay());
    controller.add_observer(Arc::new(TokenPrinter::default()));

    controller.submit(prompt)?;
    let result = drive(&mut controller, rx, stop_after).await;

    println!();
    result
}

async fn drive<C: Connector>(
    controller: &mut ChatController<C>,
    mut rx: EventReceiver,
    stop_after: Option<usize>,
) -> Result<()> {
    let mut tokens = 0usize;

    while controller.is_busy() {
        let Some(event) = rx.recv().await else {
            break;
        };

        let is_message = matches!(event.event, TransportEvent::Message(_));
        controller.handle_event(event);

        if let Some(error) = controller.take_last_error() {
            return Err(error);
        }

        if is_message && controller.is_busy() {
            tokens += 1;
            if stop_after.is_some_and(|limit| tokens >= limit) {
                debug!(tokens, "stopping stream early");
                controller.stop();
            }
        }
    }

    if let Some(deadline) = controller.next_deadline() {
        tokio::time::sleep_until(deadline.into()).await;
        controller.poll_timers();
    }

    Ok(())
}
