//! Seed data for populating a registry at startup.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::{Channel, ConversationRegistry, Customer, NewConversation, SenderRole};
use crate::error::{Error, Result};

const DEMO_SEED: &str = include_str!("../data/demo_seed.json");

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedData {
    pub conversations: Vec<SeedConversation>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedConversation {
    pub id: String,
    pub customer: Customer,
    pub channel: Channel,
    #[serde(default)]
    pub unread_count: u32,
    #[serde(default)]
    pub messages: Vec<SeedMessage>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedMessage {
    pub sender: SenderRole,
    pub text: String,
    /// Age of the message at load time.
    #[serde(default)]
    pub minutes_ago: u32,
}

impl SeedData {
    /// Built-in demo conversations.
    pub fn demo() -> Result<Self> {
        Self::from_json(DEMO_SEED)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let seed = Self::from_json(&content)?;
        tracing::debug!(
            "Loaded {} seed conversations from {}",
            seed.conversations.len(),
            path.display()
        );
        Ok(seed)
    }

    /// Validate and load into a fresh registry. Message times are placed
    /// relative to `now`.
    pub fn into_registry(self, now: DateTime<Utc>) -> Result<ConversationRegistry> {
        let mut registry = ConversationRegistry::new();

        for conversation in self.conversations {
            let id = conversation.id.clone();
            registry
                .add_conversation(conversation.into_new(now))
                .map_err(|e| match e {
                    Error::InvalidInput(reason) => {
                        Error::InvalidInput(format!("seed conversation '{}': {}", id, reason))
                    }
                    other => other,
                })?;
        }

        // Seeding is not a runtime change.
        registry.take_changes();
        Ok(registry)
    }
}

impl SeedConversation {
    fn into_new(self, now: DateTime<Utc>) -> NewConversation {
        let mut new = NewConversation::new(self.id, self.customer, self.channel)
            .with_unread(self.unread_count);
        for message in self.messages {
            let sent_at = now - Duration::minutes(i64::from(message.minutes_ago));
            new = new.with_message(message.sender, message.text, sent_at);
        }
        new
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_demo_seed() {
        let registry = SeedData::demo().unwrap().into_registry(Utc::now()).unwrap();
        assert_eq!(registry.len(), 5);

        let ids: Vec<_> = registry.list_conversations().map(|c| c.id()).collect();
        assert_eq!(ids, vec!["c1", "c2", "c3", "c4", "c5"]);

        let c1 = registry.get("c1").unwrap();
        assert_eq!(c1.customer().name, "Sarah Wilson");
        assert_eq!(c1.thread().len(), 8);
        assert_eq!(c1.unread_count(), 2);
        assert!(!c1.last_message().unwrap().is_read);

        for conversation in registry.list_conversations() {
            if conversation.unread_count() == 0 {
                assert!(conversation.last_message().unwrap().is_read);
            }
        }
    }

    #[test]
    fn test_message_times_follow_minutes_ago() {
        let now = Utc::now();
        let registry = SeedData::demo().unwrap().into_registry(now).unwrap();
        let c2 = registry.get("c2").unwrap();
        assert_eq!(
            c2.last_message().unwrap().sent_at,
            now - Duration::minutes(60)
        );
    }

    #[test]
    fn test_invalid_seed_rejected() {
        let json = r#"{
            "conversations": [{
                "id": "c1",
                "customer": {"id": "cust1", "name": "Sarah", "avatar": ""},
                "channel": "facebook",
                "unread_count": 3,
                "messages": [{"sender": "customer", "text": "Hi"}]
            }]
        }"#;
        let err = SeedData::from_json(json)
            .unwrap()
            .into_registry(Utc::now())
            .unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("c1"));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut seed = SeedData::demo().unwrap();
        let copy = seed.conversations[0].clone();
        seed.conversations.push(copy);
        assert!(seed.into_registry(Utc::now()).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_from_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"conversations": [{{"id": "x", "customer": {{"id": "k", "name": "Kim", "avatar": ""}}, "channel": "instagram"}}]}}"#
        )
        .unwrap();

        let registry = SeedData::from_path(file.path())
            .unwrap()
            .into_registry(Utc::now())
            .unwrap();
        let x = registry.get("x").unwrap();
        assert_eq!(x.channel(), Channel::Instagram);
        assert!(x.last_message().is_none());
    }
}
