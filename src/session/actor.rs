//! The task that owns all conversation state.

use tokio::sync::{broadcast, mpsc};

use crate::core::{
    active_thread_view, conversation_summaries, ConversationRegistry, SelectionController,
    SenderRole, StateChange,
};
use crate::simulator::{FollowUp, InboundSimulator};

use super::command::Command;

pub(crate) struct SessionActor {
    id: String,
    registry: ConversationRegistry,
    selection: SelectionController,
    simulator: InboundSimulator<Command>,
    changes: broadcast::Sender<StateChange>,
    mailbox: mpsc::UnboundedReceiver<Command>,
}

impl SessionActor {
    pub(crate) fn new(
        id: String,
        registry: ConversationRegistry,
        selection: SelectionController,
        simulator: InboundSimulator<Command>,
        changes: broadcast::Sender<StateChange>,
        mailbox: mpsc::UnboundedReceiver<Command>,
    ) -> Self {
        Self {
            id,
            registry,
            selection,
            simulator,
            changes,
            mailbox,
        }
    }

    /// Process commands one at a time until shutdown or until every handle is
    /// dropped.
    pub(crate) async fn run(mut self) {
        tracing::info!(session = %self.id, "Session started with {} conversations", self.registry.len());

        while let Some(command) = self.mailbox.recv().await {
            if !self.handle(command) {
                break;
            }
        }

        let cancelled = self.simulator.cancel_all();
        tracing::info!(session = %self.id, cancelled, "Session stopped");
    }

    /// Returns false when the actor should stop.
    fn handle(&mut self, command: Command) -> bool {
        match command {
            Command::ListConversations { reply } => {
                let _ = reply.send(self.registry.list_conversations().cloned().collect());
            }
            Command::Summaries { reply } => {
                let _ = reply.send(conversation_summaries(&self.registry));
            }
            Command::ActiveThread { reply } => {
                let _ = reply.send(active_thread_view(&self.registry, &self.selection));
            }
            Command::GetThread {
                conversation_id,
                reply,
            } => {
                let _ = reply.send(self.registry.get_thread(&conversation_id));
            }
            Command::Append {
                conversation_id,
                sender,
                text,
                reply,
            } => {
                let result = self.registry.append_message(&conversation_id, sender, &text);
                self.publish();
                let _ = reply.send(result);
            }
            Command::MarkRead {
                conversation_id,
                reply,
            } => {
                let known = self.registry.mark_read(&conversation_id);
                self.publish();
                let _ = reply.send(known);
            }
            Command::Select {
                conversation_id,
                reply,
            } => {
                let result = self.selection.select(&mut self.registry, &conversation_id);
                if result.is_ok() {
                    self.publish();
                    self.emit(StateChange::SelectionChanged {
                        conversation_id: Some(conversation_id),
                    });
                }
                let _ = reply.send(result);
            }
            Command::ClearSelection { reply } => {
                if self.selection.clear() {
                    self.emit(StateChange::SelectionChanged {
                        conversation_id: None,
                    });
                }
                let _ = reply.send(());
            }
            Command::AddConversation {
                conversation,
                reply,
            } => {
                let result = self.registry.add_conversation(conversation).map(|_| ());
                self.publish();
                let _ = reply.send(result);
            }
            Command::CancelAll { reply } => {
                let cancelled = self.simulator.cancel_all();
                tracing::debug!(session = %self.id, cancelled, "Cancelled pending follow-ups");
                let _ = reply.send(cancelled);
            }
            Command::PendingFollowUps { reply } => {
                let _ = reply.send(self.simulator.pending());
            }
            Command::FollowUp(follow_up) => self.deliver_follow_up(follow_up),
            Command::Shutdown { reply } => {
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    /// Append a fired follow-up. Stale or undeliverable follow-ups are dropped
    /// silently.
    fn deliver_follow_up(&mut self, follow_up: FollowUp) {
        if !self.simulator.is_current(&follow_up) {
            return;
        }
        if self
            .registry
            .append_message(&follow_up.conversation_id, SenderRole::Assistant, &follow_up.text)
            .is_ok()
        {
            self.publish();
        }
    }

    /// Hand registry changes to the simulator, then to subscribers.
    fn publish(&mut self) {
        for change in self.registry.take_changes() {
            self.simulator.observe(&change);
            self.emit(change);
        }
    }

    fn emit(&self, change: StateChange) {
        // No subscribers is fine.
        let _ = self.changes.send(change);
    }
}
