pub mod app;
pub mod events;
pub mod layout;
pub mod state;
pub mod theme;
pub mod view;
pub mod widgets;

pub use app::{ChatScreen, TuiApp};
pub use view::{render_messages, render_with_notices};

use crate::config::AppConfig;
use crate::core::error::Result;

pub async fn run_tui(config: &AppConfig) -> Result<()> {
    let mut app = TuiApp::new(config)?;
    app.run().await
}
