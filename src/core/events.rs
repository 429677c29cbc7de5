//! State-change notifications emitted after every mutation.

use serde::Serialize;

use super::conversation::ConversationId;
use super::message::Message;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StateChange {
    ConversationAdded {
        conversation_id: ConversationId,
    },
    MessageAppended {
        conversation_id: ConversationId,
        message: Message,
    },
    MarkedRead {
        conversation_id: ConversationId,
    },
    SelectionChanged {
        conversation_id: Option<ConversationId>,
    },
}

impl StateChange {
    pub fn conversation_id(&self) -> Option<&str> {
        match self {
            StateChange::ConversationAdded { conversation_id }
            | StateChange::MessageAppended { conversation_id, .. }
            | StateChange::MarkedRead { conversation_id } => Some(conversation_id),
            StateChange::SelectionChanged { conversation_id } => conversation_id.as_deref(),
        }
    }
}
