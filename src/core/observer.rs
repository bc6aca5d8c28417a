use std::sync::Arc;

use super::log::ConversationLog;

/// Read-only snapshot of everything a renderer needs.
#[derive(Debug, Clone, Copy)]
pub struct ChatView<'a> {
    pub log: &'a ConversationLog,
    pub draft: &'a str,
    pub display_buffer: &'a str,
    pub busy: bool,
}

pub trait StateObserver: Send + Sync {
    fn state_changed(&self, view: &ChatView<'_>);
}

#[derive(Default)]
pub struct ObserverSet {
    observers: Vec<Arc<dyn StateObserver>>,
}

impl ObserverSet {
    #[must_use]
    pub fn new() -> Self {
        Self {
            observers: Vec::new(),
        }
    }

    pub fn add(&mut self, observer: Arc<dyn StateObserver>) {
        self.observers.push(observer);
    }

    pub fn notify(&self, view: &ChatView<'_>) {
        for observer in &self.observers {
            observer.state_changed(view);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.observers.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}
