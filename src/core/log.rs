use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Question,
    Answer,
}

impl Role {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Question => "question",
            Self::Answer => "answer",
        }
    }
}

/// A single question or answer. Fields are private so an entry cannot be
/// edited once it is in the log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversationEntry {
    role: Role,
    text: String,
}

impl ConversationEntry {
    #[must_use]
    pub fn question(text: impl Into<String>) -> Self {
        Self {
            role: Role::Question,
            text: text.into(),
        }
    }

    #[must_use]
    pub fn answer(text: impl Into<String>) -> Self {
        Self {
            role: Role::Answer,
            text: text.into(),
        }
    }

    #[must_use]
    pub const fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Append-only record of the conversation, in submission/completion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConversationLog {
    entries: Vec<ConversationEntry>,
}

impl ConversationLog {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn append(&mut self, entry: ConversationEntry) {
        self.entries.push(entry);
    }

    #[must_use]
    pub fn entries(&self) -> &[ConversationEntry] {
        &self.entries
    }

    #[must_use]
    pub fn last(&self) -> Option<&ConversationEntry> {
        self.entries.last()
    }

    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ConversationEntry> {
        self.entries.iter()
    }
}

impl<'a> IntoIterator for &'a ConversationLog {
    type Item = &'a ConversationEntry;
    type IntoIter = std::slice::Iter<'a, ConversationEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}
