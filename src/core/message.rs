//! Messages exchanged inside a conversation.

use chrono::{DateTime, Local, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Registry-assigned message id. Strictly increasing across the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MessageId(u64);

impl MessageId {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// Who wrote a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SenderRole {
    /// The end customer on the external channel.
    #[serde(rename = "customer")]
    Customer,
    /// The human operator using the console.
    #[serde(rename = "business", alias = "operator")]
    Operator,
    /// The automated assistant.
    #[serde(rename = "ai", alias = "assistant")]
    Assistant,
}

impl SenderRole {
    pub fn label(self) -> &'static str {
        match self {
            SenderRole::Customer => "Customer",
            SenderRole::Operator => "You",
            SenderRole::Assistant => "AI Assistant",
        }
    }
}

/// A message in a thread. Never changes after it is appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: MessageId,
    pub text: String,
    pub sent_at: DateTime<Utc>,
    pub sender: SenderRole,
}

impl Message {
    pub(crate) fn new(
        id: MessageId,
        sender: SenderRole,
        text: impl Into<String>,
        sent_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            text: text.into(),
            sent_at,
            sender,
        }
    }

    /// Wall-clock time in local time, e.g. "10:30 AM".
    pub fn clock_time(&self) -> String {
        self.sent_at.with_timezone(&Local).format("%I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_id_display() {
        assert_eq!(MessageId::new(7).to_string(), "m7");
        assert!(MessageId::new(2) > MessageId::new(1));
    }

    #[test]
    fn test_sender_role_wire_names() {
        assert_eq!(
            serde_json::to_string(&SenderRole::Operator).unwrap(),
            "\"business\""
        );
        assert_eq!(
            serde_json::from_str::<SenderRole>("\"assistant\"").unwrap(),
            SenderRole::Assistant
        );
        assert_eq!(
            serde_json::from_str::<SenderRole>("\"ai\"").unwrap(),
            SenderRole::Assistant
        );
    }
}
