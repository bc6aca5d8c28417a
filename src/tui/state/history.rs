const MAX_HISTORY_SIZE: usize = 100;

/// Previously submitted prompts, recalled with Up/Down.
#[derive(Debug, Clone, Default)]
pub struct PromptHistory {
    prompts: Vec<String>,
    cursor: Option<usize>,
}

impl PromptHistory {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            prompts: Vec::new(),
            cursor: None,
        }
    }

    pub fn record(&mut self, prompt: &str) {
        self.cursor = None;

        if prompt.trim().is_empty() || self.prompts.last().is_some_and(|last| last == prompt) {
            return;
        }

        self.prompts.push(prompt.to_string());
        if self.prompts.len() > MAX_HISTORY_SIZE {
            self.prompts.remove(0);
        }
    }

    /// Steps back in time; sticks at the oldest prompt.
    pub fn older(&mut self) -> Option<&str> {
        let last = self.prompts.len().checked_sub(1)?;
        let index = self.cursor.map_or(last, |i| i.saturating_sub(1));
        self.cursor = Some(index);
        self.prompts.get(index).map(String::as_str)
    }

    /// Steps forward; returns `None` once past the newest prompt.
    pub fn newer(&mut self) -> Option<&str> {
        let index = self.cursor? + 1;
        if index >= self.prompts.len() {
            self.cursor = None;
            return None;
        }
        self.cursor = Some(index);
        self.prompts.get(index).map(String::as_str)
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.prompts.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
