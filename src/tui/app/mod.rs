mod commands;
mod render;
mod screen;
mod terminal;

pub use commands::SLASH_COMMANDS;
pub use screen::ChatScreen;

use crate::config::AppConfig;
use crate::core::ChatController;
use crate::core::error::Result;
use crate::transport::{HttpConnector, event_channel};
use crate::tui::events::{AppEvent, terminal_event_loop, tick_loop, transport_forward_loop};
use tokio::sync::mpsc;
use tracing::{debug, info};

use terminal::{Tui, restore_terminal, setup_terminal};

pub struct TuiApp {
    screen: ChatScreen<HttpConnector>,
    event_rx: mpsc::UnboundedReceiver<AppEvent>,
    event_tx: mpsc::UnboundedSender<AppEvent>,
    terminal: Tui,
}

impl TuiApp {
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (event_tx, event_rx) = mpsc::unbounded_channel();

        let (transport_tx, transport_rx) = event_channel();
        let base_url = config.base_url();
        let connector = HttpConnector::new(&config.http_config(), base_url.clone(), transport_tx)?;
        tokio::spawn(transport_forward_loop(transport_rx, event_tx.clone()));

        let controller = ChatController::new(connector, config.grace_delay());
        let terminal = setup_terminal()?;

        Ok(Self {
            screen: ChatScreen::new(controller, base_url.as_str()),
            event_rx,
            event_tx,
            terminal,
        })
    }

    pub async fn run(&mut self) -> Result<()> {
        let tx1 = self.event_tx.clone();
        let tx2 = self.event_tx.clone();

        tokio::spawn(async move {
            if let Err(e) = terminal_event_loop(tx1).await {
                debug!(error = %e, "terminal event loop ended");
            }
        });

        tokio::spawn(async move {
            tick_loop(tx2).await;
        });

        info!("chat session started");

        while !self.screen.should_quit() {
            self.terminal.draw(|f| self.screen.draw(f))?;

            match self.event_rx.recv().await {
                Some(event) => self.screen.handle_event(event),
                None => break,
            }
        }

        info!(
            entries = self.screen.controller().log().len(),
            "chat session ended"
        );
        restore_terminal(&mut self.terminal)?;

        Ok(())
    }
}

impl Drop for TuiApp {
    fn drop(&mut self) {
        let _ = restore_terminal(&mut self.terminal);
    }
}
