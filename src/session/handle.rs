//! Cloneable front door to a running session.

use std::sync::Arc;
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::{Stream, StreamExt};

use crate::core::{
    Conversation, ConversationSummary, Message, NewConversation, SenderRole, StateChange,
    ThreadSnapshot, ThreadView,
};
use crate::error::{Error, Result};

use super::command::Command;

/// Handle to a session actor. Every call is queued on the session mailbox and
/// answered in order. Fails with [`Error::SessionClosed`] once the session has
/// stopped.
#[derive(Clone)]
pub struct SessionHandle {
    id: Arc<str>,
    mailbox: mpsc::UnboundedSender<Command>,
    changes: broadcast::Sender<StateChange>,
}

impl SessionHandle {
    pub(crate) fn new(
        id: Arc<str>,
        mailbox: mpsc::UnboundedSender<Command>,
        changes: broadcast::Sender<StateChange>,
    ) -> Self {
        Self {
            id,
            mailbox,
            changes,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    async fn request<R>(&self, make: impl FnOnce(oneshot::Sender<R>) -> Command) -> Result<R> {
        let (reply, response) = oneshot::channel();
        self.mailbox
            .send(make(reply))
            .map_err(|_| Error::SessionClosed)?;
        response.await.map_err(|_| Error::SessionClosed)
    }

    /// Snapshot of every conversation in list order.
    pub async fn list_conversations(&self) -> Result<Vec<Conversation>> {
        self.request(|reply| Command::ListConversations { reply })
            .await
    }

    pub async fn conversation_summaries(&self) -> Result<Vec<ConversationSummary>> {
        self.request(|reply| Command::Summaries { reply }).await
    }

    pub async fn active_thread_view(&self) -> Result<ThreadView> {
        self.request(|reply| Command::ActiveThread { reply }).await
    }

    pub async fn get_thread(&self, conversation_id: &str) -> Result<ThreadSnapshot> {
        self.request(|reply| Command::GetThread {
            conversation_id: conversation_id.to_string(),
            reply,
        })
        .await?
    }

    pub async fn append_message(
        &self,
        conversation_id: &str,
        sender: SenderRole,
        text: &str,
    ) -> Result<Message> {
        self.request(|reply| Command::Append {
            conversation_id: conversation_id.to_string(),
            sender,
            text: text.to_string(),
            reply,
        })
        .await?
    }

    /// Send as the operator. Schedules an assistant follow-up.
    pub async fn send_operator_message(&self, conversation_id: &str, text: &str) -> Result<Message> {
        self.append_message(conversation_id, SenderRole::Operator, text)
            .await
    }

    /// Returns whether the conversation exists. Unknown ids are not an error.
    pub async fn mark_read(&self, conversation_id: &str) -> Result<bool> {
        self.request(|reply| Command::MarkRead {
            conversation_id: conversation_id.to_string(),
            reply,
        })
        .await
    }

    pub async fn select(&self, conversation_id: &str) -> Result<()> {
        self.request(|reply| Command::Select {
            conversation_id: conversation_id.to_string(),
            reply,
        })
        .await?
    }

    pub async fn clear_selection(&self) -> Result<()> {
        self.request(|reply| Command::ClearSelection { reply })
            .await
    }

    pub async fn add_conversation(&self, conversation: NewConversation) -> Result<()> {
        self.request(|reply| Command::AddConversation {
            conversation,
            reply,
        })
        .await?
    }

    /// Cancel every pending follow-up. Returns how many timers were stopped.
    pub async fn cancel_all(&self) -> Result<usize> {
        self.request(|reply| Command::CancelAll { reply }).await
    }

    pub async fn pending_follow_ups(&self) -> Result<usize> {
        self.request(|reply| Command::PendingFollowUps { reply })
            .await
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// Stream of state changes. Notifications missed by a slow reader are
    /// skipped.
    pub fn changes(&self) -> impl Stream<Item = StateChange> + Send + Unpin + 'static {
        BroadcastStream::new(self.subscribe()).filter_map(|change| change.ok())
    }

    /// Stop the session and cancel pending follow-ups.
    pub async fn shutdown(&self) -> Result<()> {
        self.request(|reply| Command::Shutdown { reply }).await
    }
}
