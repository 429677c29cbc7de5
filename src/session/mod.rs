//! Operator session: the single writer for all conversation state.
//!
//! Registry, selection and simulator live inside one spawned task. Callers and
//! simulator timers talk to it through the same mailbox, so a follow-up can
//! never interleave with a direct append or read-marking.

mod actor;
mod command;
mod handle;

pub use handle::SessionHandle;

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};

use crate::core::{ConversationRegistry, SelectionController};
use crate::simulator::{InboundSimulator, ReplyGenerator};

use actor::SessionActor;

/// Capacity of the state-change broadcast buffer.
const CHANGE_BUFFER: usize = 256;

/// Runtime options for a session.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Delay before the assistant follow-up.
    pub reply_delay: Duration,
    /// Select the first conversation on start.
    pub preselect_first: bool,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            reply_delay: Duration::from_millis(1000),
            preselect_first: false,
        }
    }
}

pub struct Session;

impl Session {
    /// Spawn a session owning `registry`. Must be called inside a tokio runtime.
    pub fn spawn(
        mut registry: ConversationRegistry,
        options: SessionOptions,
        generator: Box<dyn ReplyGenerator>,
    ) -> SessionHandle {
        let id: Arc<str> = ulid::Ulid::new().to_string().into();
        let (mailbox_tx, mailbox_rx) = mpsc::unbounded_channel();
        let (changes, _) = broadcast::channel(CHANGE_BUFFER);

        let mut selection = SelectionController::new();
        if options.preselect_first {
            if let Some(first) = selection.select_first(&mut registry) {
                tracing::debug!(session = %id, "Preselected {}", first);
            }
        }
        // Nobody can be subscribed yet.
        registry.take_changes();

        let simulator = InboundSimulator::new(mailbox_tx.downgrade(), options.reply_delay, generator);
        let actor = SessionActor::new(
            id.to_string(),
            registry,
            selection,
            simulator,
            changes.clone(),
            mailbox_rx,
        );
        tokio::spawn(actor.run());

        SessionHandle::new(id, mailbox_tx, changes)
    }
}
