use crate::{ChatMessage, Role};

/// Concatenates streamed text chunks.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StreamAccumulator {
    text: String,
}

impl StreamAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a chunk and return everything received so far.
    pub fn push(&mut self, chunk: &str) -> &str {
        self.text.push_str(chunk);
        &self.text
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn into_string(self) -> String {
        self.text
    }
}

/// Ordered chat history. Only the last message is ever rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, role: Role, content: impl Into<String>) {
        self.messages.push(ChatMessage::new(role, content));
    }

    /// Rewrite the last message if it belongs to `role`, otherwise start a new turn.
    pub fn upsert_last(&mut self, role: Role, content: &str) {
        match self.messages.last_mut() {
            Some(last) if last.role == role => {
                last.content.clear();
                last.content.push_str(content);
            }
            _ => self.messages.push(ChatMessage::new(role, content)),
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn last(&self) -> Option<&ChatMessage> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}
