//! Conversations, customers and channels.
//!
//! A conversation owns exactly one thread and a read state. Its "last message"
//! summary is always derived from the thread tail, so it can never drift from
//! the thread contents.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use super::message::{Message, SenderRole};
use super::thread::MessageThread;

/// Unique conversation ID.
pub type ConversationId = String;

/// Unique customer ID.
pub type CustomerId = String;

/// The person on the other end of a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    /// Avatar image reference (usually a URL).
    pub avatar: String,
}

impl Customer {
    pub fn new(id: impl Into<String>, name: impl Into<String>, avatar: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            avatar: avatar.into(),
        }
    }

    /// Fallback avatar when the image can't be shown.
    pub fn initial(&self) -> char {
        self.name.chars().next().unwrap_or('?')
    }
}

/// External messaging surface a conversation arrived through.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Facebook,
    Whatsapp,
    Instagram,
}

impl Channel {
    pub fn as_str(self) -> &'static str {
        match self {
            Channel::Facebook => "facebook",
            Channel::Whatsapp => "whatsapp",
            Channel::Instagram => "instagram",
        }
    }

    /// Display name of the channel.
    pub fn label(self) -> &'static str {
        match self {
            Channel::Facebook => "Facebook Messenger",
            Channel::Whatsapp => "WhatsApp Business",
            Channel::Instagram => "Instagram Direct",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "facebook" => Ok(Channel::Facebook),
            "whatsapp" => Ok(Channel::Whatsapp),
            "instagram" => Ok(Channel::Instagram),
            _ => Err(format!("Unknown channel: {}", s)),
        }
    }
}

/// Unread counter and read flag, updated together.
///
/// `unread_count == 0` implies `is_read`. The only way to change the state is
/// through the transitions below, which all keep that true.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadState {
    unread_count: u32,
    is_read: bool,
}

impl ReadState {
    pub fn read() -> Self {
        Self {
            unread_count: 0,
            is_read: true,
        }
    }

    pub fn with_unread(count: u32) -> Self {
        Self {
            unread_count: count,
            is_read: count == 0,
        }
    }

    pub fn unread_count(self) -> u32 {
        self.unread_count
    }

    pub fn is_read(self) -> bool {
        self.is_read
    }

    pub(crate) fn record_customer_message(&mut self) {
        self.unread_count = self.unread_count.saturating_add(1);
        self.is_read = false;
    }

    /// Returns true if anything changed.
    pub(crate) fn mark_read(&mut self) -> bool {
        let changed = !self.is_read || self.unread_count != 0;
        *self = Self::read();
        changed
    }
}

impl Default for ReadState {
    fn default() -> Self {
        Self::read()
    }
}

/// Summary of the newest message in a conversation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LastMessage {
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub is_read: bool,
}

/// One customer's exchange on one channel.
#[derive(Debug, Clone)]
pub struct Conversation {
    id: ConversationId,
    customer: Arc<Customer>,
    channel: Channel,
    thread: MessageThread,
    read_state: ReadState,
}

impl Conversation {
    pub(crate) fn new(id: ConversationId, customer: Customer, channel: Channel) -> Self {
        Self {
            id,
            customer: Arc::new(customer),
            channel,
            thread: MessageThread::new(),
            read_state: ReadState::read(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn customer(&self) -> &Arc<Customer> {
        &self.customer
    }

    pub fn channel(&self) -> Channel {
        self.channel
    }

    pub fn thread(&self) -> &MessageThread {
        &self.thread
    }

    pub fn read_state(&self) -> ReadState {
        self.read_state
    }

    pub fn unread_count(&self) -> u32 {
        self.read_state.unread_count()
    }

    /// None only for a conversation created without any messages.
    pub fn last_message(&self) -> Option<LastMessage> {
        self.thread.last().map(|m| LastMessage {
            text: m.text.clone(),
            sent_at: m.sent_at,
            is_read: self.read_state.is_read(),
        })
    }

    pub(crate) fn push(&mut self, message: Message) -> &Message {
        if message.sender == SenderRole::Customer {
            self.read_state.record_customer_message();
        }
        self.thread.append(message)
    }

    /// Append history without touching the read state.
    pub(crate) fn push_history(&mut self, message: Message) {
        self.thread.append(message);
    }

    pub(crate) fn set_read_state(&mut self, read_state: ReadState) {
        self.read_state = read_state;
    }

    pub(crate) fn mark_read(&mut self) -> bool {
        self.read_state.mark_read()
    }
}

/// A message that existed before the conversation was registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryMessage {
    pub sender: SenderRole,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

/// Request to register a conversation, optionally with prior history.
#[derive(Debug, Clone)]
pub struct NewConversation {
    pub id: ConversationId,
    pub customer: Customer,
    pub channel: Channel,
    pub history: Vec<HistoryMessage>,
    pub unread_count: u32,
}

impl NewConversation {
    pub fn new(id: impl Into<String>, customer: Customer, channel: Channel) -> Self {
        Self {
            id: id.into(),
            customer,
            channel,
            history: Vec::new(),
            unread_count: 0,
        }
    }

    pub fn with_message(
        mut self,
        sender: SenderRole,
        text: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        self.history.push(HistoryMessage {
            sender,
            text: text.into(),
            sent_at,
        });
        self
    }

    pub fn with_unread(mut self, count: u32) -> Self {
        self.unread_count = count;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::MessageId;

    fn conversation() -> Conversation {
        Conversation::new(
            "c1".to_string(),
            Customer::new("cust1", "Sarah Wilson", "https://i.pravatar.cc/150?u=sarah"),
            Channel::Facebook,
        )
    }

    #[test]
    fn test_read_state_transitions() {
        let mut state = ReadState::with_unread(2);
        assert!(!state.is_read());

        state.record_customer_message();
        assert_eq!(state.unread_count(), 3);

        assert!(state.mark_read());
        assert_eq!(state, ReadState::read());
        assert!(!state.mark_read());

        assert!(ReadState::with_unread(0).is_read());
    }

    #[test]
    fn test_last_message_follows_thread() {
        let mut conv = conversation();
        assert!(conv.last_message().is_none());

        conv.push(Message::new(
            MessageId::new(1),
            SenderRole::Customer,
            "Hi",
            Utc::now(),
        ));
        let last = conv.last_message().unwrap();
        assert_eq!(last.text, "Hi");
        assert!(!last.is_read);
        assert_eq!(conv.unread_count(), 1);

        conv.push(Message::new(
            MessageId::new(2),
            SenderRole::Operator,
            "Hello!",
            Utc::now(),
        ));
        assert_eq!(conv.last_message().unwrap().text, "Hello!");
        assert_eq!(conv.unread_count(), 1);
    }

    #[test]
    fn test_channel_parse() {
        assert_eq!("WhatsApp".parse::<Channel>().unwrap(), Channel::Whatsapp);
        assert!("pager".parse::<Channel>().is_err());
        assert_eq!(Channel::Facebook.to_string(), "facebook");
    }

    #[test]
    fn test_customer_initial() {
        assert_eq!(conversation().customer().initial(), 'S');
        assert_eq!(Customer::new("x", "", "").initial(), '?');
    }
}
