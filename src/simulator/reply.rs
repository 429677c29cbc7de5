//! Automated-assistant reply text.

use crate::config::DEFAULT_REPLY_TEXT;
use crate::core::Message;

/// Produces the assistant's follow-up to an operator message.
pub trait ReplyGenerator: Send + Sync {
    fn reply(&self, conversation_id: &str, trigger: &Message) -> String;
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct CannedReply {
    text: String,
}

impl CannedReply {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for CannedReply {
    fn default() -> Self {
        Self::new(DEFAULT_REPLY_TEXT)
    }
}

impl ReplyGenerator for CannedReply {
    fn reply(&self, _conversation_id: &str, _trigger: &Message) -> String {
        self.text.clone()
    }
}
