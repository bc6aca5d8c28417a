use crate::core::{ChatView, Role};
use crate::tui::state::Notice;
use crate::tui::widgets::ChatMessage;

/// Maps controller state onto chat pane blocks.
///
/// Log entries keep their order; the in-progress buffer is appended as a
/// streaming block only while a request is in flight.
#[must_use]
pub fn render_messages(view: &ChatView<'_>) -> Vec<ChatMessage> {
    render_with_notices(view, &[])
}

/// Like [`render_messages`], with system notices slotted in after the log
/// entry count each one was raised at.
#[must_use]
pub fn render_with_notices(view: &ChatView<'_>, notices: &[Notice]) -> Vec<ChatMessage> {
    let mut messages = Vec::with_capacity(view.log.len() + notices.len() + 1);
    let mut pending = notices.iter().peekable();

    for (position, entry) in view.log.iter().enumerate() {
        while let Some(notice) = pending.next_if(|n| n.after_entries <= position) {
            messages.push(system(notice));
        }

        messages.push(match entry.role() {
            Role::Question => ChatMessage::Question(entry.text().to_string()),
            Role::Answer => ChatMessage::Answer(entry.text().to_string()),
        });
    }

    messages.extend(pending.map(system));

    if view.busy {
        messages.push(ChatMessage::Streaming(view.display_buffer.to_string()));
    }

    messages
}

fn system(notice: &Notice) -> ChatMessage {
    ChatMessage::System {
        text: notice.text.clone(),
        level: notice.level,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{ConversationEntry, ConversationLog};
    use crate::tui::widgets::NoticeLevel;

    fn view<'a>(log: &'a ConversationLog, buffer: &'a str, busy: bool) -> ChatView<'a> {
        ChatView {
            log,
            draft: "",
            display_buffer: buffer,
            busy,
        }
    }

    fn hello_log() -> ConversationLog {
        let mut log = ConversationLog::new();
        log.append(ConversationEntry::question("Hello"));
        log.append(ConversationEntry::answer("Hi there"));
        log
    }

    #[test]
    fn renders_entries_in_order() {
        let log = hello_log();
        let messages = render_messages(&view(&log, "", false));

        assert_eq!(
            messages,
            vec![
                ChatMessage::Question("Hello".to_string()),
                ChatMessage::Answer("Hi there".to_string()),
            ]
        );
    }

    #[test]
    fn busy_appends_streaming_buffer() {
        let mut log = ConversationLog::new();
        log.append(ConversationEntry::question("Count"));
        let messages = render_messages(&view(&log, "1 2", true));

        assert_eq!(messages.last(), Some(&ChatMessage::Streaming("1 2".to_string())));
    }

    #[test]
    fn busy_with_empty_buffer_still_shows_placeholder() {
        let log = ConversationLog::new();
        let messages = render_messages(&view(&log, "", true));

        assert_eq!(messages, vec![ChatMessage::Streaming(String::new())]);
    }

    #[test]
    fn idle_hides_leftover_buffer() {
        let log = hello_log();
        let messages = render_messages(&view(&log, "Hi there", false));

        assert_eq!(messages.len(), 2);
    }

    #[test]
    fn notices_land_after_their_entry_count() {
        let log = hello_log();
        let notices = vec![
            Notice {
                after_entries: 1,
                text: "middle".to_string(),
                level: NoticeLevel::Warning,
            },
            Notice {
                after_entries: 2,
                text: "end".to_string(),
                level: NoticeLevel::Error,
            },
        ];

        let messages = render_with_notices(&view(&log, "", false), &notices);

        assert_eq!(messages.len(), 4);
        assert!(matches!(&messages[1], ChatMessage::System { text, .. } if text == "middle"));
        assert!(matches!(&messages[3], ChatMessage::System { text, .. } if text == "end"));
    }
}
