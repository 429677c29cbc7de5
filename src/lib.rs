//! ConvoDesk library root.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod logging;
pub mod seed;
pub mod session;
pub mod simulator;

pub use cli::Commands;
pub use config::{load_settings, Settings};
pub use core::{
    Channel, Conversation, ConversationRegistry, ConversationSummary, Customer, Message,
    MessageId, NewConversation, SenderRole, StateChange, ThreadSnapshot, ThreadView,
};
pub use error::{Error, Result};
pub use seed::SeedData;
pub use session::{Session, SessionHandle, SessionOptions};
pub use simulator::{CannedReply, ReplyGenerator};
