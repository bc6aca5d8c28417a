pub mod chat;
pub mod input;

pub use chat::{ChatMessage, ChatWidget, NoticeLevel, ScrollState};
pub use input::{InputAction, InputWidget};
