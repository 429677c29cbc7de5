//! Core module - conversations, threads, selection and projections.
//!
//! Everything here is synchronous, owned data. The session module wraps it in a
//! single-writer task so deferred follow-ups and operator calls are serialized.

pub mod conversation;
pub mod events;
pub mod message;
pub mod projection;
pub mod registry;
pub mod selection;
pub mod thread;

pub use conversation::{
    Channel, Conversation, ConversationId, Customer, CustomerId, HistoryMessage, LastMessage,
    NewConversation, ReadState,
};
pub use events::StateChange;
pub use message::{Message, MessageId, SenderRole};
pub use projection::{
    active_thread_view, conversation_summaries, relative_time, ActiveThread,
    ConversationSummary, ThreadView,
};
pub use registry::ConversationRegistry;
pub use selection::{Selection, SelectionController};
pub use thread::{MessageThread, ThreadSnapshot};
