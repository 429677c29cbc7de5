//! Read-only views for the display layer. Recomputed in full on every call.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;

use super::conversation::{Channel, Conversation, ConversationId, Customer};
use super::registry::ConversationRegistry;
use super::selection::SelectionController;
use super::thread::ThreadSnapshot;

/// One row of the conversation list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConversationSummary {
    pub id: ConversationId,
    pub customer_name: String,
    pub avatar: String,
    pub channel: Channel,
    pub last_message_text: String,
    pub last_message_time: Option<DateTime<Utc>>,
    pub is_read: bool,
    pub unread_count: u32,
}

impl ConversationSummary {
    pub fn from_conversation(conversation: &Conversation) -> Self {
        let last = conversation.last_message();
        let read_state = conversation.read_state();
        Self {
            id: conversation.id().to_string(),
            customer_name: conversation.customer().name.clone(),
            avatar: conversation.customer().avatar.clone(),
            channel: conversation.channel(),
            last_message_text: last.as_ref().map(|m| m.text.clone()).unwrap_or_default(),
            last_message_time: last.map(|m| m.sent_at),
            is_read: read_state.is_read(),
            unread_count: read_state.unread_count(),
        }
    }

    /// "10 mins ago" style age of the last message.
    pub fn last_message_age(&self, now: DateTime<Utc>) -> String {
        self.last_message_time
            .map(|at| relative_time(at, now))
            .unwrap_or_default()
    }
}

/// Conversation list in registry order.
pub fn conversation_summaries(registry: &ConversationRegistry) -> Vec<ConversationSummary> {
    registry
        .list_conversations()
        .map(ConversationSummary::from_conversation)
        .collect()
}

/// Header and messages of the selected conversation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveThread {
    pub conversation_id: ConversationId,
    pub customer: Arc<Customer>,
    pub channel: Channel,
    pub last_active: Option<DateTime<Utc>>,
    pub messages: ThreadSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThreadView {
    /// Nothing is selected.
    Empty,
    Active(ActiveThread),
}

impl ThreadView {
    pub fn is_empty(&self) -> bool {
        matches!(self, ThreadView::Empty)
    }

    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            ThreadView::Empty => None,
            ThreadView::Active(active) => Some(&active.conversation_id),
        }
    }

    /// Customer of the active conversation, e.g. for order creation.
    pub fn customer(&self) -> Option<&Customer> {
        match self {
            ThreadView::Empty => None,
            ThreadView::Active(active) => Some(&active.customer),
        }
    }

    pub fn messages(&self) -> Option<&ThreadSnapshot> {
        match self {
            ThreadView::Empty => None,
            ThreadView::Active(active) => Some(&active.messages),
        }
    }
}

pub fn active_thread_view(
    registry: &ConversationRegistry,
    selection: &SelectionController,
) -> ThreadView {
    match selection.active(registry) {
        None => ThreadView::Empty,
        Some(conversation) => ThreadView::Active(ActiveThread {
            conversation_id: conversation.id().to_string(),
            customer: Arc::clone(conversation.customer()),
            channel: conversation.channel(),
            last_active: conversation.thread().last().map(|m| m.sent_at),
            messages: conversation.thread().snapshot(),
        }),
    }
}

/// Human-readable age, e.g. "just now", "1 min ago", "3 hours ago".
pub fn relative_time(then: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let minutes = (now - then).num_minutes().max(0);

    if minutes < 1 {
        return "just now".to_string();
    }

    let (value, unit) = if minutes < 60 {
        (minutes, "min")
    } else if minutes < 60 * 24 {
        (minutes / 60, "hour")
    } else {
        (minutes / (60 * 24), "day")
    };

    if value == 1 {
        format!("1 {} ago", unit)
    } else {
        format!("{} {}s ago", value, unit)
    }
}
