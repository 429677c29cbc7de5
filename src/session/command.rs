//! Mailbox commands handled by the session actor.

use tokio::sync::oneshot;

use crate::core::{
    Conversation, ConversationSummary, Message, NewConversation, SenderRole, ThreadSnapshot,
    ThreadView,
};
use crate::error::Result;
use crate::simulator::FollowUp;

pub(crate) enum Command {
    ListConversations {
        reply: oneshot::Sender<Vec<Conversation>>,
    },
    Summaries {
        reply: oneshot::Sender<Vec<ConversationSummary>>,
    },
    ActiveThread {
        reply: oneshot::Sender<ThreadView>,
    },
    GetThread {
        conversation_id: String,
        reply: oneshot::Sender<Result<ThreadSnapshot>>,
    },
    Append {
        conversation_id: String,
        sender: SenderRole,
        text: String,
        reply: oneshot::Sender<Result<Message>>,
    },
    MarkRead {
        conversation_id: String,
        reply: oneshot::Sender<bool>,
    },
    Select {
        conversation_id: String,
        reply: oneshot::Sender<Result<()>>,
    },
    ClearSelection {
        reply: oneshot::Sender<()>,
    },
    AddConversation {
        conversation: NewConversation,
        reply: oneshot::Sender<Result<()>>,
    },
    CancelAll {
        reply: oneshot::Sender<usize>,
    },
    PendingFollowUps {
        reply: oneshot::Sender<usize>,
    },
    /// Posted by the simulator when a timer fires.
    FollowUp(FollowUp),
    Shutdown {
        reply: oneshot::Sender<()>,
    },
}

impl From<FollowUp> for Command {
    fn from(follow_up: FollowUp) -> Self {
        Command::FollowUp(follow_up)
    }
}
