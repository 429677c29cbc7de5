//! Append-only message log for a single conversation.

use std::sync::Arc;

use super::message::Message;

/// Ordered message log. Order is append order; nothing is removed or edited.
#[derive(Debug, Clone, Default)]
pub struct MessageThread {
    messages: Vec<Message>,
}

impl MessageThread {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message. Only the registry calls this.
    pub(crate) fn append(&mut self, message: Message) -> &Message {
        debug_assert!(
            self.messages.last().map_or(true, |last| last.id < message.id),
            "message ids must grow with append order"
        );
        self.messages.push(message);
        &self.messages[self.messages.len() - 1]
    }

    /// Copy of the thread as it is right now. Later appends are not visible
    /// through it.
    pub fn snapshot(&self) -> ThreadSnapshot {
        ThreadSnapshot {
            messages: self.messages.as_slice().into(),
        }
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }
}

/// Frozen, cheaply cloneable view of a thread. Can be iterated any number of
/// times.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadSnapshot {
    messages: Arc<[Message]>,
}

impl ThreadSnapshot {
    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.messages.iter()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Message> {
        self.messages.get(index)
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn as_slice(&self) -> &[Message] {
        &self.messages
    }
}

impl<'a> IntoIterator for &'a ThreadSnapshot {
    type Item = &'a Message;
    type IntoIter = std::slice::Iter<'a, Message>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
