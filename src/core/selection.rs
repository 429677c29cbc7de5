//! Which conversation the operator is looking at.

use crate::error::{Error, Result};

use super::conversation::{Conversation, ConversationId};
use super::registry::ConversationRegistry;

/// Selection state. Refers to a conversation by id only.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    None,
    Conversation(ConversationId),
}

/// Tracks the active conversation for one operator session.
#[derive(Debug, Default)]
pub struct SelectionController {
    state: Selection,
}

impl SelectionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Selection {
        &self.state
    }

    /// Select a conversation and mark it read in one step.
    ///
    /// Unknown ids fail with `NotFound` and leave the selection as it was.
    pub fn select(&mut self, registry: &mut ConversationRegistry, id: &str) -> Result<()> {
        if !registry.contains(id) {
            return Err(Error::conversation_not_found(id));
        }

        self.state = Selection::Conversation(id.to_string());
        registry.mark_read(id);
        Ok(())
    }

    /// Select the first conversation in list order, if there is one.
    pub fn select_first(&mut self, registry: &mut ConversationRegistry) -> Option<ConversationId> {
        let id = registry.first()?.id().to_string();
        self.select(registry, &id).ok()?;
        Some(id)
    }

    /// Drop the selection. Returns true if something was selected.
    pub fn clear(&mut self) -> bool {
        !matches!(std::mem::take(&mut self.state), Selection::None)
    }

    /// Resolve the selection against the registry. A selected id that no longer
    /// exists reads as no selection.
    pub fn active<'r>(&self, registry: &'r ConversationRegistry) -> Option<&'r Conversation> {
        match &self.state {
            Selection::None => None,
            Selection::Conversation(id) => registry.get(id),
        }
    }

    pub fn active_id(&self) -> Option<&str> {
        match &self.state {
            Selection::None => None,
            Selection::Conversation(id) => Some(id),
        }
    }
}
