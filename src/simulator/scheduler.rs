//! Deferred follow-up scheduling.

use std::time::Duration;
use tokio::sync::mpsc::WeakUnboundedSender;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::core::{ConversationId, MessageId};

/// A follow-up whose timer has fired, on its way back to the session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FollowUp {
    pub conversation_id: ConversationId,
    /// Operator message that caused it.
    pub trigger: MessageId,
    pub text: String,
    /// Cancellation epoch at scheduling time.
    pub epoch: u64,
}

/// Spawns one timer per scheduled follow-up and posts it to a mailbox when the
/// timer fires.
///
/// The mailbox is held weakly: once its owner is gone, fired follow-ups are
/// dropped without a trace.
pub struct FollowUpScheduler<T> {
    mailbox: WeakUnboundedSender<T>,
    delay: Duration,
    epoch: u64,
    tasks: Vec<JoinHandle<()>>,
}

impl<T> FollowUpScheduler<T>
where
    T: From<FollowUp> + Send + 'static,
{
    pub fn new(mailbox: WeakUnboundedSender<T>, delay: Duration) -> Self {
        Self {
            mailbox,
            delay,
            epoch: 0,
            tasks: Vec::new(),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Schedule a follow-up `delay` from now. Never coalesces with earlier ones.
    pub fn schedule(&mut self, conversation_id: &str, trigger: MessageId, text: String) {
        self.tasks.retain(|task| !task.is_finished());

        let follow_up = FollowUp {
            conversation_id: conversation_id.to_string(),
            trigger,
            text,
            epoch: self.epoch,
        };
        let mailbox = self.mailbox.clone();
        let delay = self.delay;

        self.tasks.push(tokio::spawn(async move {
            sleep(delay).await;
            if let Some(mailbox) = mailbox.upgrade() {
                let _ = mailbox.send(follow_up.into());
            }
        }));
    }

    /// Whether a fired follow-up was scheduled after the last `cancel_all`.
    pub fn is_current(&self, follow_up: &FollowUp) -> bool {
        follow_up.epoch == self.epoch
    }

    /// Abort every pending timer. Follow-ups that already fired but were not
    /// yet consumed become stale. Returns how many timers were aborted.
    pub fn cancel_all(&mut self) -> usize {
        let mut aborted = 0;
        for task in self.tasks.drain(..) {
            if !task.is_finished() {
                task.abort();
                aborted += 1;
            }
        }
        self.epoch += 1;
        aborted
    }

    /// Timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.tasks.iter().filter(|task| !task.is_finished()).count()
    }
}

impl<T> Drop for FollowUpScheduler<T> {
    fn drop(&mut self) {
        for task in &self.tasks {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::sync::mpsc::{self, error::TryRecvError};

    fn id(n: u64) -> MessageId {
        MessageId::new(n)
    }

    #[tokio::test(start_paused = true)]
    async fn test_fires_after_delay() {
        let (tx, mut rx) = mpsc::unbounded_channel::<FollowUp>();
        let mut scheduler = FollowUpScheduler::new(tx.downgrade(), Duration::from_millis(1000));

        scheduler.schedule("c1", id(1), "reply".to_string());
        assert_eq!(scheduler.pending(), 1);

        sleep(Duration::from_millis(999)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        sleep(Duration::from_millis(2)).await;
        let follow_up = rx.try_recv().unwrap();
        assert_eq!(follow_up.conversation_id, "c1");
        assert_eq!(follow_up.trigger, id(1));
        assert!(scheduler.is_current(&follow_up));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_coalescing() {
        let (tx, mut rx) = mpsc::unbounded_channel::<FollowUp>();
        let mut scheduler = FollowUpScheduler::new(tx.downgrade(), Duration::from_millis(1000));

        scheduler.schedule("c1", id(1), "first".to_string());
        sleep(Duration::from_millis(100)).await;
        scheduler.schedule("c1", id(2), "second".to_string());
        assert_eq!(scheduler.pending(), 2);

        sleep(Duration::from_millis(1200)).await;
        assert_eq!(rx.try_recv().unwrap().trigger, id(1));
        assert_eq!(rx.try_recv().unwrap().trigger, id(2));
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_all() {
        let (tx, mut rx) = mpsc::unbounded_channel::<FollowUp>();
        let mut scheduler = FollowUpScheduler::new(tx.downgrade(), Duration::from_millis(1000));

        scheduler.schedule("c1", id(1), "reply".to_string());
        scheduler.schedule("c2", id(2), "reply".to_string());
        assert_eq!(scheduler.cancel_all(), 2);
        assert_eq!(scheduler.pending(), 0);

        sleep(Duration::from_secs(5)).await;
        assert_eq!(rx.try_recv(), Err(TryRecvError::Empty));

        let stale = FollowUp {
            conversation_id: "c1".to_string(),
            trigger: id(1),
            text: String::new(),
            epoch: 0,
        };
        assert!(!scheduler.is_current(&stale));
    }

    #[tokio::test(start_paused = true)]
    async fn test_closed_mailbox_is_silent() {
        let (tx, rx) = mpsc::unbounded_channel::<FollowUp>();
        let mut scheduler = FollowUpScheduler::new(tx.downgrade(), Duration::from_millis(10));
        scheduler.schedule("c1", id(1), "reply".to_string());

        drop(rx);
        drop(tx);

        sleep(Duration::from_millis(50)).await;
        assert_eq!(scheduler.pending(), 0);
    }
}
