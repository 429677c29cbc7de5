//! Conversation registry: owns every conversation and mediates all mutations.

use chrono::Utc;
use std::collections::HashMap;

use crate::error::{Error, Result};

use super::conversation::{Conversation, ConversationId, NewConversation, ReadState};
use super::events::StateChange;
use super::message::{Message, MessageId, SenderRole};
use super::thread::ThreadSnapshot;

/// Owns all conversations, keyed by id.
///
/// Listing order is insertion order. Every mutation records a [`StateChange`]
/// which the owner collects with [`ConversationRegistry::take_changes`].
#[derive(Debug, Default)]
pub struct ConversationRegistry {
    conversations: Vec<Conversation>,
    index: HashMap<ConversationId, usize>,
    next_message_id: u64,
    changes: Vec<StateChange>,
}

impl ConversationRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a conversation at the end of the list order.
    pub fn add_conversation(&mut self, new: NewConversation) -> Result<&Conversation> {
        if new.id.trim().is_empty() {
            return Err(Error::InvalidInput(
                "conversation id must not be empty".to_string(),
            ));
        }
        if self.index.contains_key(&new.id) {
            return Err(Error::InvalidInput(format!(
                "conversation '{}' already exists",
                new.id
            )));
        }
        validate_history(&new)?;

        let NewConversation {
            id,
            customer,
            channel,
            history,
            unread_count,
        } = new;

        let mut conversation = Conversation::new(id.clone(), customer, channel);
        for entry in history {
            let message = Message::new(self.allocate_id(), entry.sender, entry.text, entry.sent_at);
            conversation.push_history(message);
        }
        conversation.set_read_state(ReadState::with_unread(unread_count));

        let position = self.conversations.len();
        self.conversations.push(conversation);
        self.index.insert(id.clone(), position);

        tracing::debug!("Registered conversation {}", id);
        self.changes.push(StateChange::ConversationAdded {
            conversation_id: id,
        });

        Ok(&self.conversations[position])
    }

    /// Conversations in insertion order. The iterator can be cloned to walk the
    /// list again.
    pub fn list_conversations(&self) -> std::slice::Iter<'_, Conversation> {
        self.conversations.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Conversation> {
        self.index.get(id).map(|&i| &self.conversations[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn first(&self) -> Option<&Conversation> {
        self.conversations.first()
    }

    pub fn len(&self) -> usize {
        self.conversations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.conversations.is_empty()
    }

    pub fn get_thread(&self, id: &str) -> Result<ThreadSnapshot> {
        self.get(id)
            .map(|c| c.thread().snapshot())
            .ok_or_else(|| Error::conversation_not_found(id))
    }

    /// Append a message to a conversation's thread.
    ///
    /// Customer messages bump the unread counter; operator and assistant
    /// messages leave the read state alone.
    pub fn append_message(
        &mut self,
        id: &str,
        sender: SenderRole,
        text: &str,
    ) -> Result<Message> {
        let position = *self
            .index
            .get(id)
            .ok_or_else(|| Error::conversation_not_found(id))?;

        if text.trim().is_empty() {
            return Err(Error::InvalidInput(
                "message text must not be empty".to_string(),
            ));
        }

        let message = Message::new(self.allocate_id(), sender, text, Utc::now());
        let appended = self.conversations[position].push(message).clone();

        tracing::debug!("Appended {} to {} ({:?})", appended.id, id, sender);
        self.changes.push(StateChange::MessageAppended {
            conversation_id: id.to_string(),
            message: appended.clone(),
        });

        Ok(appended)
    }

    /// Clear the unread state. Unknown ids are ignored. Returns whether the id
    /// was known.
    pub fn mark_read(&mut self, id: &str) -> bool {
        let Some(&position) = self.index.get(id) else {
            return false;
        };

        if self.conversations[position].mark_read() {
            tracing::debug!("Marked {} as read", id);
        }
        self.changes.push(StateChange::MarkedRead {
            conversation_id: id.to_string(),
        });
        true
    }

    /// Drain the changes recorded since the last call.
    pub fn take_changes(&mut self) -> Vec<StateChange> {
        std::mem::take(&mut self.changes)
    }

    fn allocate_id(&mut self) -> MessageId {
        self.next_message_id += 1;
        MessageId::new(self.next_message_id)
    }
}

fn validate_history(new: &NewConversation) -> Result<()> {
    if let Some(entry) = new.history.iter().find(|m| m.text.trim().is_empty()) {
        return Err(Error::InvalidInput(format!(
            "conversation '{}' has an empty message from {:?}",
            new.id, entry.sender
        )));
    }

    if new
        .history
        .windows(2)
        .any(|pair| pair[1].sent_at < pair[0].sent_at)
    {
        return Err(Error::InvalidInput(format!(
            "conversation '{}' history is not in chronological order",
            new.id
        )));
    }

    let customer_messages = new
        .history
        .iter()
        .filter(|m| m.sender == SenderRole::Customer)
        .count();
    if new.unread_count as usize > customer_messages {
        return Err(Error::InvalidInput(format!(
            "conversation '{}' has {} unread but only {} customer messages",
            new.id, new.unread_count, customer_messages
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::conversation::{Channel, Customer};
    use chrono::Duration;

    fn customer(id: &str) -> Customer {
        Customer::new(id, "Sarah Wilson", "https://i.pravatar.cc/150?u=sarah")
    }

    fn registry_with_c1() -> ConversationRegistry {
        let mut registry = ConversationRegistry::new();
        registry
            .add_conversation(
                NewConversation::new("c1", customer("cust1"), Channel::Facebook)
                    .with_message(SenderRole::Customer, "Hi", Utc::now())
                    .with_unread(1),
            )
            .unwrap();
        registry.take_changes();
        registry
    }

    #[test]
    fn test_append_counts_and_order() {
        let mut registry = registry_with_c1();

        for text in ["one", "two", "three"] {
            registry
                .append_message("c1", SenderRole::Operator, text)
                .unwrap();
        }

        let thread = registry.get_thread("c1").unwrap();
        let texts: Vec<_> = thread.iter().map(|m| m.text.as_str()).collect();
        assert_eq!(texts, vec!["Hi", "one", "two", "three"]);

        let ids: Vec<_> = thread.iter().map(|m| m.id).collect();
        let mut sorted = ids.clone();
        sorted.sort();
        assert_eq!(ids, sorted);
    }

    #[test]
    fn test_append_rejects_blank_text() {
        let mut registry = registry_with_c1();

        for text in ["", "   ", "\n\t"] {
            let err = registry
                .append_message("c1", SenderRole::Operator, text)
                .unwrap_err();
            assert!(err.is_invalid_input());
        }

        assert_eq!(registry.get_thread("c1").unwrap().len(), 1);
        assert!(registry.take_changes().is_empty());
    }

    #[test]
    fn test_append_unknown_conversation() {
        let mut registry = registry_with_c1();
        let err = registry
            .append_message("missing-id", SenderRole::Operator, "hi")
            .unwrap_err();
        assert!(err.is_not_found());
        assert!(registry.get_thread("missing-id").unwrap_err().is_not_found());
    }

    #[test]
    fn test_unread_only_counts_customer_messages() {
        let mut registry = registry_with_c1();

        registry
            .append_message("c1", SenderRole::Operator, "Hello!")
            .unwrap();
        registry
            .append_message("c1", SenderRole::Assistant, "Automated")
            .unwrap();
        assert_eq!(registry.get("c1").unwrap().unread_count(), 1);

        registry
            .append_message("c1", SenderRole::Customer, "Are you there?")
            .unwrap();
        let conv = registry.get("c1").unwrap();
        assert_eq!(conv.unread_count(), 2);
        assert_eq!(conv.last_message().unwrap().text, "Are you there?");
        assert!(!conv.last_message().unwrap().is_read);
    }

    #[test]
    fn test_mark_read_idempotent() {
        let mut registry = registry_with_c1();

        assert!(registry.mark_read("c1"));
        let once = registry.get("c1").unwrap().read_state();
        assert!(registry.mark_read("c1"));
        let twice = registry.get("c1").unwrap().read_state();

        assert_eq!(once, twice);
        assert_eq!(twice.unread_count(), 0);
        assert!(registry.get("c1").unwrap().last_message().unwrap().is_read);
    }

    #[test]
    fn test_mark_read_unknown_is_noop() {
        let mut registry = registry_with_c1();
        assert!(!registry.mark_read("nope"));
        assert!(registry.take_changes().is_empty());
    }

    #[test]
    fn test_list_in_insertion_order() {
        let mut registry = ConversationRegistry::new();
        for id in ["c3", "c1", "c2"] {
            registry
                .add_conversation(NewConversation::new(id, customer(id), Channel::Whatsapp))
                .unwrap();
        }

        let listing = registry.list_conversations();
        let ids: Vec<_> = listing.clone().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["c3", "c1", "c2"]);
        assert_eq!(listing.count(), 3);
        assert_eq!(registry.first().unwrap().id(), "c3");
    }

    #[test]
    fn test_add_conversation_validation() {
        let mut registry = registry_with_c1();

        let dup = registry.add_conversation(NewConversation::new(
            "c1",
            customer("cust1"),
            Channel::Facebook,
        ));
        assert!(dup.unwrap_err().is_invalid_input());

        let too_many_unread = NewConversation::new("c2", customer("cust2"), Channel::Facebook)
            .with_message(SenderRole::Customer, "Hello", Utc::now())
            .with_unread(2);
        assert!(registry
            .add_conversation(too_many_unread)
            .unwrap_err()
            .is_invalid_input());

        let now = Utc::now();
        let out_of_order = NewConversation::new("c3", customer("cust3"), Channel::Facebook)
            .with_message(SenderRole::Customer, "second", now)
            .with_message(SenderRole::Customer, "first", now - Duration::minutes(5));
        assert!(registry
            .add_conversation(out_of_order)
            .unwrap_err()
            .is_invalid_input());

        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_changes_recorded() {
        let mut registry = registry_with_c1();
        let message = registry
            .append_message("c1", SenderRole::Operator, "Hello!")
            .unwrap();
        registry.mark_read("c1");

        assert_eq!(
            registry.take_changes(),
            vec![
                StateChange::MessageAppended {
                    conversation_id: "c1".to_string(),
                    message,
                },
                StateChange::MarkedRead {
                    conversation_id: "c1".to_string(),
                },
            ]
        );
        assert!(registry.take_changes().is_empty());
    }
}
