use bytes::{Buf, BytesMut};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SseEvent {
    pub event_type: Option<String>,
    pub data: String,
}

impl SseEvent {
    #[must_use]
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            event_type: None,
            data: data.into(),
        }
    }

    /// Untyped events and `event: message` are what an `onmessage` handler
    /// receives; named events go to dedicated listeners.
    #[must_use]
    pub fn is_message(&self) -> bool {
        self.event_type.as_deref().is_none_or(|t| t == "message")
    }
}

/// Incremental `text/event-stream` decoder. Chunks may split lines or events
/// anywhere; incomplete input stays buffered until the next chunk. Lines end
/// with LF, CR or CRLF.
#[derive(Debug, Default)]
pub struct SseParser {
    pending: BytesMut,
    event_type: Option<String>,
    data_lines: Vec<String>,
    /// The last line ended in CR, so a leading LF belongs to it.
    after_cr: bool,
}

impl SseParser {
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: BytesMut::new(),
            event_type: None,
            data_lines: Vec::new(),
            after_cr: false,
        }
    }

    pub fn process_chunk(&mut self, chunk: &[u8]) -> Vec<SseEvent> {
        self.pending.extend_from_slice(chunk);

        let mut events = Vec::new();

        loop {
            if self.after_cr && !self.pending.is_empty() {
                if self.pending[0] == b'\n' {
                    self.pending.advance(1);
                }
                self.after_cr = false;
            }

            let Some(line_end) = self.pending.iter().position(|&b| b == b'\n' || b == b'\r')
            else {
                break;
            };

            let raw = self.pending.split_to(line_end + 1);
            self.after_cr = raw[line_end] == b'\r';
            let line = String::from_utf8_lossy(&raw[..line_end]);

            if line.is_empty() {
                if let Some(event) = self.dispatch() {
                    events.push(event);
                }
            } else {
                self.process_line(&line);
            }
        }

        events
    }

    /// Flushes an event left unterminated when the stream ends.
    pub fn finish(&mut self) -> Option<SseEvent> {
        self.after_cr = false;
        if !self.pending.is_empty() {
            let rest = self.pending.split();
            self.process_line(&String::from_utf8_lossy(&rest));
        }
        self.dispatch()
    }

    fn process_line(&mut self, line: &str) {
        if line.starts_with(':') {
            return;
        }

        let (field, value) = match line.split_once(':') {
            Some((field, value)) => (field, value.strip_prefix(' ').unwrap_or(value)),
            None => (line, ""),
        };

        match field {
            "event" => self.event_type = Some(value.to_string()),
            "data" => self.data_lines.push(value.to_string()),
            _ => {}
        }
    }

    fn dispatch(&mut self) -> Option<SseEvent> {
        if self.data_lines.is_empty() {
            self.event_type = None;
            return None;
        }

        let data = self.data_lines.join("\n");
        self.data_lines.clear();
        Some(SseEvent {
            event_type: self.event_type.take(),
            data,
        })
    }
}
