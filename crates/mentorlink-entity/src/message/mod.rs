//! Direct messages and per-counterparty conversation summaries.

pub mod conversation;
pub mod model;

pub use conversation::{ConversationRow, ConversationSummary};
pub use model::{Message, MessageView, NewMessage};
