pub mod clock;
pub mod controller;
pub mod error;
pub mod log;
pub mod observer;
pub mod session;

pub use clock::{Clock, ManualClock, SystemClock};
pub use controller::{ChatController, DEFAULT_GRACE_DELAY};
pub use error::{ChatError, Result};
pub use log::{ConversationEntry, ConversationLog, Role};
pub use observer::{ChatView, ObserverSet, StateObserver};
pub use session::{SessionOutcome, SessionState, StreamSession};
