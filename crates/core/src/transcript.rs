use serde::Serialize;

use crate::payload::ResponsePayload;

/// One entry of a chat transcript. Entries are immutable once appended.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChatMessage {
    User { text: String },
    Ai { payload: ResponsePayload },
    Error { text: String },
    Info { text: String },
}

impl ChatMessage {
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    pub fn ai(payload: ResponsePayload) -> Self {
        Self::Ai { payload }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self::Error { text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self::Info { text: text.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::User { .. } => "user",
            Self::Ai { .. } => "ai",
            Self::Error { .. } => "error",
            Self::Info { .. } => "info",
        }
    }

    /// Plain text of the entry, if it has any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::User { text } | Self::Error { text } | Self::Info { text } => Some(text),
            Self::Ai { .. } => None,
        }
    }
}

/// Append-only, insertion-ordered log of chat messages.
///
/// Entries can be appended and read, never removed or edited.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct Transcript {
    entries: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail and return the new entry's index.
    pub fn append(&mut self, message: ChatMessage) -> usize {
        self.entries.push(message);
        self.entries.len() - 1
    }

    pub fn entries(&self) -> &[ChatMessage] {
        &self.entries
    }

    /// Entries appended at or after `index`.
    pub fn since(&self, index: usize) -> &[ChatMessage] {
        self.entries.get(index..).unwrap_or_default()
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn append_keeps_order_and_returns_index() {
        let mut transcript = Transcript::new();
        assert_eq!(transcript.append(ChatMessage::user("Q1")), 0);
        assert_eq!(transcript.append(ChatMessage::info("note")), 1);
        assert_eq!(
            transcript.entries(),
            &[ChatMessage::user("Q1"), ChatMessage::info("note")]
        );
        assert_eq!(transcript.since(1), &[ChatMessage::info("note")]);
        assert!(transcript.since(5).is_empty());
    }

    #[test]
    fn messages_serialize_with_kind_tag() {
        let message = ChatMessage::ai(ResponsePayload::TextMessage {
            content: "answer".to_string(),
        });
        assert_eq!(
            serde_json::to_value(&message).expect("serialize message"),
            json!({
                "kind": "ai",
                "payload": {"display_type": "text_message", "content": "answer"}
            })
        );
        assert_eq!(
            serde_json::to_value(ChatMessage::error("boom")).expect("serialize message"),
            json!({"kind": "error", "text": "boom"})
        );
    }
}
