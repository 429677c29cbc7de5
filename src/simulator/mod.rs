//! Inbound event simulator.
//!
//! Stands in for a real automated-response service: every operator message
//! gets exactly one assistant follow-up after a fixed delay.

pub mod reply;
pub mod scheduler;

pub use reply::{CannedReply, ReplyGenerator};
pub use scheduler::{FollowUp, FollowUpScheduler};

use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;

use crate::core::{SenderRole, StateChange};

/// Watches state changes and schedules assistant follow-ups.
pub struct InboundSimulator<T> {
    generator: Box<dyn ReplyGenerator>,
    scheduler: FollowUpScheduler<T>,
}

impl<T> InboundSimulator<T>
where
    T: From<FollowUp> + Send + 'static,
{
    pub fn new(
        mailbox: WeakUnboundedSender<T>,
        delay: Duration,
        generator: Box<dyn ReplyGenerator>,
    ) -> Self {
        Self {
            generator,
            scheduler: FollowUpScheduler::new(mailbox, delay),
        }
    }

    /// React to a change. Only operator messages schedule anything.
    pub fn observe(&mut self, change: &StateChange) -> bool {
        let StateChange::MessageAppended {
            conversation_id,
            message,
        } = change
        else {
            return false;
        };
        if message.sender != SenderRole::Operator {
            return false;
        }

        let text = self.generator.reply(conversation_id, message);
        self.scheduler.schedule(conversation_id, message.id, text);
        true
    }

    pub fn is_current(&self, follow_up: &FollowUp) -> bool {
        self.scheduler.is_current(follow_up)
    }

    pub fn cancel_all(&mut self) -> usize {
        self.scheduler.cancel_all()
    }

    pub fn pending(&self) -> usize {
        self.scheduler.pending()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Message, MessageId};
    use chrono::Utc;
    use tokio::sync::mpsc;

    struct Echo;

    impl ReplyGenerator for Echo {
        fn reply(&self, conversation_id: &str, trigger: &Message) -> String {
            format!("{} got: {}", conversation_id, trigger.text)
        }
    }

    fn appended(sender: SenderRole) -> StateChange {
        StateChange::MessageAppended {
            conversation_id: "c1".to_string(),
            message: Message::new(MessageId::new(4), sender, "Hello!", Utc::now()),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_only_operator_messages_trigger() {
        let (tx, mut rx) = mpsc::unbounded_channel::<FollowUp>();
        let mut simulator =
            InboundSimulator::new(tx.downgrade(), Duration::from_millis(1000), Box::new(Echo));

        assert!(!simulator.observe(&appended(SenderRole::Customer)));
        assert!(!simulator.observe(&appended(SenderRole::Assistant)));
        assert!(!simulator.observe(&StateChange::MarkedRead {
            conversation_id: "c1".to_string()
        }));
        assert!(simulator.observe(&appended(SenderRole::Operator)));
        assert_eq!(simulator.pending(), 1);

        let follow_up = rx.recv().await.unwrap();
        assert_eq!(follow_up.text, "c1 got: Hello!");
        assert_eq!(follow_up.trigger, MessageId::new(4));
        assert!(simulator.is_current(&follow_up));
    }

    #[test]
    fn test_canned_reply() {
        let message = Message::new(MessageId::new(1), SenderRole::Operator, "x", Utc::now());
        assert_eq!(
            CannedReply::new("Thanks!").reply("c1", &message),
            "Thanks!"
        );
        assert_eq!(
            CannedReply::default().reply("c1", &message),
            crate::config::DEFAULT_REPLY_TEXT
        );
    }
}
